//! Validation utilities shared by the invoice models

use bigdecimal::BigDecimal;

use crate::types::{EinvoiceError, EinvoiceResult};

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(amount: &BigDecimal, field: &str) -> EinvoiceResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(EinvoiceError::Validation(format!(
            "{} cannot be negative",
            field
        )))
    } else {
        Ok(())
    }
}

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(amount: &BigDecimal, field: &str) -> EinvoiceResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(EinvoiceError::Validation(format!(
            "{} must be positive",
            field
        )))
    } else {
        Ok(())
    }
}

/// Validate that a percentage rate is within [0, 100]
pub fn validate_rate(rate: &BigDecimal, field: &str) -> EinvoiceResult<()> {
    if *rate < BigDecimal::from(0) || *rate > BigDecimal::from(100) {
        Err(EinvoiceError::Validation(format!(
            "{} must be between 0 and 100",
            field
        )))
    } else {
        Ok(())
    }
}

/// Validate that an amount carries at most `max` fractional digits
pub fn validate_scale(amount: &BigDecimal, max: i64, field: &str) -> EinvoiceResult<()> {
    if amount.normalized().fractional_digit_count() > max {
        Err(EinvoiceError::Validation(format!(
            "{} cannot have more than {} decimal places",
            field, max
        )))
    } else {
        Ok(())
    }
}

/// Validate an invoice number (non-empty, at least 3 characters,
/// uppercase alphanumerics with dashes and slashes)
pub fn validate_invoice_number(invoice_number: &str) -> EinvoiceResult<()> {
    let trimmed = invoice_number.trim();
    if trimmed.len() < 3 {
        return Err(EinvoiceError::Validation(
            "Invoice number must be at least 3 characters".to_string(),
        ));
    }

    if trimmed.len() > 50 {
        return Err(EinvoiceError::Validation(
            "Invoice number cannot exceed 50 characters".to_string(),
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '/')
    {
        return Err(EinvoiceError::Validation(
            "Invoice number can only contain uppercase letters, digits, dashes, and slashes"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate a description field (non-empty, bounded length)
pub fn validate_description(description: &str, max_len: usize, field: &str) -> EinvoiceResult<()> {
    if description.trim().is_empty() {
        return Err(EinvoiceError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }

    if description.len() > max_len {
        return Err(EinvoiceError::Validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }

    Ok(())
}
