//! Core types and data structures for the e-invoicing system

use serde::{Deserialize, Serialize};

/// Tax categories recognized by the invoicing authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxCategory {
    /// Value-added tax (standard, reduced, and zero-rated)
    Vat,
    /// Excise duties (alcohol, tobacco, fuel)
    Excise,
    /// Customs duties (import/export)
    Customs,
    /// Withholding tax deducted at source
    Withholding,
    /// Any levy that does not fit the categories above
    Other,
}

impl std::fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TaxCategory::Vat => "VAT",
            TaxCategory::Excise => "EXCISE",
            TaxCategory::Customs => "CUSTOMS",
            TaxCategory::Withholding => "WITHHOLDING",
            TaxCategory::Other => "OTHER",
        };
        write!(f, "{}", label)
    }
}

/// Invoice currency codes (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Nigerian Naira
    Ngn,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// West African CFA franc
    Xof,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Ngn
    }
}

/// Errors that can occur in the e-invoicing core
#[derive(Debug, thiserror::Error)]
pub enum EinvoiceError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Crypto error: {0}")]
    Crypto(String),
    #[error("Format error: {0}")]
    Format(String),
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for e-invoicing operations
pub type EinvoiceResult<T> = Result<T, EinvoiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_category_display() {
        assert_eq!(TaxCategory::Vat.to_string(), "VAT");
        assert_eq!(TaxCategory::Withholding.to_string(), "WITHHOLDING");
    }

    #[test]
    fn test_tax_category_serde_round_trip() {
        let json = serde_json::to_string(&TaxCategory::Excise).unwrap();
        assert_eq!(json, "\"EXCISE\"");
        let back: TaxCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaxCategory::Excise);
    }

    #[test]
    fn test_currency_serde_uses_iso_codes() {
        assert_eq!(serde_json::to_string(&Currency::Ngn).unwrap(), "\"NGN\"");
        assert_eq!(Currency::default(), Currency::Ngn);
    }
}
