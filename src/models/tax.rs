//! Invoice-level tax breakdown types

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::TaxCategory;
use crate::utils::rounding::round_currency;

/// Tax figures for one category appearing on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxDetail {
    /// Tax category
    pub category: TaxCategory,
    /// Rate percentage applied to the category
    pub rate: BigDecimal,
    /// Amount subject to tax in this category
    pub taxable_amount: BigDecimal,
    /// Calculated tax amount
    pub tax_amount: BigDecimal,
    /// Portion of the taxable amount that was exempt
    pub exempt_amount: BigDecimal,
}

impl TaxDetail {
    /// Effective rate: tax as a percentage of the taxable amount
    pub fn effective_rate(&self) -> BigDecimal {
        if self.taxable_amount == BigDecimal::from(0) {
            return BigDecimal::from(0);
        }
        round_currency(&(&self.tax_amount / &self.taxable_amount * BigDecimal::from(100)))
    }
}

/// Complete tax breakdown for an invoice
///
/// `total_tax` and `total_amount` are derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Subtotal before discounts, charges, and tax
    pub subtotal: BigDecimal,
    /// Total discount across all line items
    pub total_discount: BigDecimal,
    /// Total additional charges across all line items
    pub total_charges: BigDecimal,
    /// Total taxable amount
    pub taxable_amount: BigDecimal,
    /// Per-category tax details
    pub tax_details: Vec<TaxDetail>,
}

impl TaxBreakdown {
    /// Total tax across all categories
    pub fn total_tax(&self) -> BigDecimal {
        self.tax_details.iter().map(|d| &d.tax_amount).sum()
    }

    /// Total amount including tax
    pub fn total_amount(&self) -> BigDecimal {
        &self.taxable_amount + self.total_tax()
    }
}
