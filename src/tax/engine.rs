//! Tax calculation engine operating on fixed-point decimals
//!
//! All operations are pure with respect to the engine: the only shared
//! state is the HSN registry consulted for exemptions and rates. Every
//! monetary result is rounded half-up to 2 decimal places.

use bigdecimal::{num_bigint::BigInt, BigDecimal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::hsn::{standard_vat_rate, HsnRegistry};
use crate::types::{EinvoiceResult, TaxCategory};
use crate::utils::rounding::round_currency;
use crate::utils::validation::{validate_non_negative_amount, validate_rate};

/// Result of a single tax calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculation {
    /// Tax category the calculation falls under
    pub category: TaxCategory,
    /// Rate percentage used
    pub rate: BigDecimal,
    /// Amount the tax was computed on
    pub base_amount: BigDecimal,
    /// Calculated tax amount (2 decimal places, half-up)
    pub tax_amount: BigDecimal,
    /// Exemption reason when the calculation short-circuited to zero
    pub exemption_reason: Option<String>,
}

/// A tax to apply when stacking several levies on one amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedTax {
    pub category: TaxCategory,
    pub rate: BigDecimal,
}

impl AppliedTax {
    pub fn new(category: TaxCategory, rate: BigDecimal) -> Self {
        Self { category, rate }
    }
}

/// Breakdown of several taxes applied to one amount, bucketed by
/// category family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTaxBreakdown {
    pub vat: BigDecimal,
    pub excise: BigDecimal,
    pub customs: BigDecimal,
    pub other: BigDecimal,
    pub total: BigDecimal,
    pub details: Vec<TaxCalculation>,
}

impl MultiTaxBreakdown {
    fn empty() -> Self {
        Self {
            vat: BigDecimal::from(0),
            excise: BigDecimal::from(0),
            customs: BigDecimal::from(0),
            other: BigDecimal::from(0),
            total: BigDecimal::from(0),
            details: Vec::new(),
        }
    }

    fn bucket(&mut self, category: TaxCategory, tax_amount: &BigDecimal) {
        match category {
            TaxCategory::Vat => self.vat += tax_amount,
            TaxCategory::Excise => self.excise += tax_amount,
            TaxCategory::Customs => self.customs += tax_amount,
            TaxCategory::Withholding | TaxCategory::Other => self.other += tax_amount,
        }
        self.total += tax_amount;
    }
}

/// Decomposition of a tax-inclusive total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseTax {
    pub base_amount: BigDecimal,
    pub tax_amount: BigDecimal,
}

/// Summary over a set of tax calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub total_base: BigDecimal,
    pub total_tax: BigDecimal,
    /// Overall tax as a percentage of the total base (2 decimal places)
    pub effective_rate: BigDecimal,
    pub by_category: HashMap<TaxCategory, BigDecimal>,
}

/// Tax calculation engine backed by an HSN registry
#[derive(Debug, Clone)]
pub struct TaxEngine {
    registry: Arc<HsnRegistry>,
}

impl TaxEngine {
    /// Create a new engine consulting the given registry
    pub fn new(registry: Arc<HsnRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this engine consults
    pub fn registry(&self) -> &HsnRegistry {
        &self.registry
    }

    /// Calculate tax for a line amount.
    ///
    /// An exempt HSN code short-circuits to rate 0 with the registry's
    /// reason attached, regardless of any custom rate. Otherwise the
    /// rate is resolved as custom rate, then registry rate for the HSN
    /// code (unknown codes fall back to the standard VAT rate), then
    /// the standard VAT rate.
    pub fn calculate_line_tax(
        &self,
        amount: &BigDecimal,
        hsn_code: Option<&str>,
        custom_rate: Option<&BigDecimal>,
    ) -> EinvoiceResult<TaxCalculation> {
        validate_non_negative_amount(amount, "amount")?;
        if let Some(rate) = custom_rate {
            validate_rate(rate, "custom rate")?;
        }

        if let Some(code) = hsn_code {
            if self.registry.is_exempt(code) {
                return Ok(TaxCalculation {
                    category: TaxCategory::Vat,
                    rate: BigDecimal::from(0),
                    base_amount: amount.clone(),
                    tax_amount: BigDecimal::from(0),
                    exemption_reason: self.registry.exemption_reason(code),
                });
            }
        }

        let rate = match (custom_rate, hsn_code) {
            (Some(rate), _) => rate.clone(),
            (None, Some(code)) => self.registry.tax_rate(code),
            (None, None) => standard_vat_rate(),
        };

        let tax_amount = round_currency(&(amount * &rate / BigDecimal::from(100)));

        Ok(TaxCalculation {
            category: TaxCategory::Vat,
            rate,
            base_amount: amount.clone(),
            tax_amount,
            exemption_reason: None,
        })
    }

    /// Apply several taxes to one amount, each computed off the same
    /// base (additive stacking)
    pub fn calculate_multiple_taxes(
        &self,
        amount: &BigDecimal,
        taxes: &[AppliedTax],
    ) -> EinvoiceResult<MultiTaxBreakdown> {
        validate_non_negative_amount(amount, "amount")?;

        let mut breakdown = MultiTaxBreakdown::empty();
        for tax in taxes {
            validate_rate(&tax.rate, "tax rate")?;
            let tax_amount = round_currency(&(amount * &tax.rate / BigDecimal::from(100)));

            breakdown.details.push(TaxCalculation {
                category: tax.category,
                rate: tax.rate.clone(),
                base_amount: amount.clone(),
                tax_amount: tax_amount.clone(),
                exemption_reason: None,
            });
            breakdown.bucket(tax.category, &tax_amount);
        }

        Ok(breakdown)
    }

    /// Apply several taxes where each subsequent tax is computed off the
    /// base plus all previously calculated taxes (tax-on-tax regimes)
    pub fn calculate_cascading_tax(
        &self,
        amount: &BigDecimal,
        taxes: &[AppliedTax],
    ) -> EinvoiceResult<MultiTaxBreakdown> {
        validate_non_negative_amount(amount, "amount")?;

        let mut breakdown = MultiTaxBreakdown::empty();
        let mut running_amount = amount.clone();
        for tax in taxes {
            validate_rate(&tax.rate, "tax rate")?;
            let tax_amount = round_currency(&(&running_amount * &tax.rate / BigDecimal::from(100)));

            breakdown.details.push(TaxCalculation {
                category: tax.category,
                rate: tax.rate.clone(),
                base_amount: running_amount.clone(),
                tax_amount: tax_amount.clone(),
                exemption_reason: None,
            });
            running_amount += &tax_amount;
            breakdown.bucket(tax.category, &tax_amount);
        }

        Ok(breakdown)
    }

    /// Decompose a tax-inclusive total into base and tax amounts
    pub fn calculate_reverse_tax(
        &self,
        total: &BigDecimal,
        rate: &BigDecimal,
    ) -> EinvoiceResult<ReverseTax> {
        validate_non_negative_amount(total, "total")?;
        validate_rate(rate, "rate")?;

        let divisor = (BigDecimal::from(100) + rate) / BigDecimal::from(100);
        let base_amount = round_currency(&(total / divisor));
        let tax_amount = total - &base_amount;

        Ok(ReverseTax {
            base_amount,
            tax_amount,
        })
    }

    /// Check that a tax amount matches the expected computation within
    /// a 0.01 tolerance (absorbs rounding on either side)
    pub fn validate_tax_calculation(
        &self,
        base_amount: &BigDecimal,
        tax_amount: &BigDecimal,
        rate: &BigDecimal,
    ) -> bool {
        let expected = round_currency(&(base_amount * rate / BigDecimal::from(100)));
        let tolerance = BigDecimal::new(BigInt::from(1), 2);
        (tax_amount - expected).abs() <= tolerance
    }

    /// Calculate withholding tax at the given rate (default 10%)
    pub fn calculate_withholding_tax(
        &self,
        amount: &BigDecimal,
        rate: Option<&BigDecimal>,
    ) -> EinvoiceResult<BigDecimal> {
        validate_non_negative_amount(amount, "amount")?;
        let rate = match rate {
            Some(rate) => {
                validate_rate(rate, "withholding rate")?;
                rate.clone()
            }
            None => BigDecimal::from(10),
        };
        Ok(round_currency(&(amount * rate / BigDecimal::from(100))))
    }

    /// Summarize a set of calculations: totals, effective rate, and
    /// per-category tax amounts
    pub fn tax_summary(&self, calculations: &[TaxCalculation]) -> TaxSummary {
        let total_base: BigDecimal = calculations.iter().map(|c| &c.base_amount).sum();
        let total_tax: BigDecimal = calculations.iter().map(|c| &c.tax_amount).sum();

        let mut by_category: HashMap<TaxCategory, BigDecimal> = HashMap::new();
        for calc in calculations {
            *by_category
                .entry(calc.category)
                .or_insert_with(|| BigDecimal::from(0)) += &calc.tax_amount;
        }

        let effective_rate = if total_base > BigDecimal::from(0) {
            round_currency(&(&total_tax / &total_base * BigDecimal::from(100)))
        } else {
            BigDecimal::from(0)
        };

        TaxSummary {
            total_base,
            total_tax,
            effective_rate,
            by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn engine() -> TaxEngine {
        TaxEngine::new(Arc::new(HsnRegistry::with_defaults()))
    }

    #[test]
    fn test_line_tax_default_rate() {
        let calc = engine()
            .calculate_line_tax(&dec("100"), None, None)
            .unwrap();
        assert_eq!(calc.rate, dec("7.5"));
        assert_eq!(calc.tax_amount, dec("7.50"));
        assert!(calc.exemption_reason.is_none());
    }

    #[test]
    fn test_line_tax_custom_rate_wins_over_registry() {
        let calc = engine()
            .calculate_line_tax(&dec("100"), Some("8471"), Some(&dec("10")))
            .unwrap();
        assert_eq!(calc.rate, dec("10"));
        assert_eq!(calc.tax_amount, dec("10.00"));
    }

    #[test]
    fn test_line_tax_exemption_overrides_custom_rate() {
        let calc = engine()
            .calculate_line_tax(&dec("500"), Some("3004"), Some(&dec("7.5")))
            .unwrap();
        assert_eq!(calc.rate, BigDecimal::from(0));
        assert_eq!(calc.tax_amount, BigDecimal::from(0));
        assert!(calc.exemption_reason.is_some());
    }

    #[test]
    fn test_line_tax_unknown_code_falls_back() {
        let calc = engine()
            .calculate_line_tax(&dec("200"), Some("9999"), None)
            .unwrap();
        assert_eq!(calc.rate, dec("7.5"));
        assert_eq!(calc.tax_amount, dec("15.00"));
    }

    #[test]
    fn test_line_tax_rejects_negative_amount() {
        assert!(engine().calculate_line_tax(&dec("-1"), None, None).is_err());
    }

    #[test]
    fn test_line_tax_rounds_half_up() {
        // 33.33 * 7.5% = 2.49975 -> 2.50
        let calc = engine()
            .calculate_line_tax(&dec("33.33"), None, None)
            .unwrap();
        assert_eq!(calc.tax_amount, dec("2.50"));
    }

    #[test]
    fn test_multiple_taxes_same_base() {
        let taxes = vec![
            AppliedTax::new(TaxCategory::Vat, dec("10")),
            AppliedTax::new(TaxCategory::Excise, dec("10")),
        ];
        let breakdown = engine()
            .calculate_multiple_taxes(&dec("1000"), &taxes)
            .unwrap();

        assert_eq!(breakdown.vat, dec("100.00"));
        assert_eq!(breakdown.excise, dec("100.00"));
        assert_eq!(breakdown.total, dec("200.00"));
        assert_eq!(breakdown.details.len(), 2);
        assert_eq!(breakdown.details[1].base_amount, dec("1000"));
    }

    #[test]
    fn test_cascading_taxes_compound() {
        let taxes = vec![
            AppliedTax::new(TaxCategory::Vat, dec("10")),
            AppliedTax::new(TaxCategory::Excise, dec("10")),
        ];
        let breakdown = engine()
            .calculate_cascading_tax(&dec("1000"), &taxes)
            .unwrap();

        // Second tax is computed on 1000 + 100 = 1100
        assert_eq!(breakdown.vat, dec("100.00"));
        assert_eq!(breakdown.excise, dec("110.00"));
        assert_eq!(breakdown.total, dec("210.00"));
        assert_eq!(breakdown.details[1].base_amount, dec("1100.00"));
    }

    #[test]
    fn test_zero_rate_tax_still_appears_in_details() {
        let taxes = vec![AppliedTax::new(TaxCategory::Vat, dec("0"))];
        let breakdown = engine()
            .calculate_multiple_taxes(&dec("1000"), &taxes)
            .unwrap();
        assert_eq!(breakdown.details.len(), 1);
        assert_eq!(breakdown.total, dec("0.00"));
    }

    #[test]
    fn test_withholding_buckets_as_other() {
        let taxes = vec![AppliedTax::new(TaxCategory::Withholding, dec("5"))];
        let breakdown = engine()
            .calculate_multiple_taxes(&dec("1000"), &taxes)
            .unwrap();
        assert_eq!(breakdown.other, dec("50.00"));
        assert_eq!(breakdown.vat, BigDecimal::from(0));
    }

    #[test]
    fn test_reverse_tax() {
        let reverse = engine()
            .calculate_reverse_tax(&dec("107.50"), &dec("7.5"))
            .unwrap();
        assert_eq!(reverse.base_amount, dec("100.00"));
        assert_eq!(reverse.tax_amount, dec("7.50"));
    }

    #[test]
    fn test_reverse_tax_zero_rate() {
        let reverse = engine()
            .calculate_reverse_tax(&dec("250.00"), &dec("0"))
            .unwrap();
        assert_eq!(reverse.base_amount, dec("250.00"));
        assert_eq!(reverse.tax_amount, dec("0.00"));
    }

    #[test]
    fn test_validate_tax_calculation_tolerance() {
        let engine = engine();
        assert!(engine.validate_tax_calculation(&dec("100"), &dec("7.50"), &dec("7.5")));
        assert!(engine.validate_tax_calculation(&dec("100"), &dec("7.51"), &dec("7.5")));
        assert!(!engine.validate_tax_calculation(&dec("100"), &dec("7.60"), &dec("7.5")));
    }

    #[test]
    fn test_withholding_default_rate() {
        let tax = engine()
            .calculate_withholding_tax(&dec("1000"), None)
            .unwrap();
        assert_eq!(tax, dec("100.00"));

        let custom = engine()
            .calculate_withholding_tax(&dec("1000"), Some(&dec("5")))
            .unwrap();
        assert_eq!(custom, dec("50.00"));
    }

    #[test]
    fn test_tax_summary() {
        let engine = engine();
        let calcs = vec![
            engine.calculate_line_tax(&dec("100"), None, None).unwrap(),
            engine
                .calculate_line_tax(&dec("200"), Some("9999"), None)
                .unwrap(),
        ];
        let summary = engine.tax_summary(&calcs);

        assert_eq!(summary.total_base, dec("300"));
        assert_eq!(summary.total_tax, dec("22.50"));
        assert_eq!(summary.effective_rate, dec("7.50"));
        assert_eq!(summary.by_category[&TaxCategory::Vat], dec("22.50"));
    }

    #[test]
    fn test_summary_of_no_base_has_zero_effective_rate() {
        let summary = engine().tax_summary(&[]);
        assert_eq!(summary.effective_rate, BigDecimal::from(0));
    }
}
