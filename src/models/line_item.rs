//! Invoice line items with discounts, charges, and derived amounts

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::hsn::{HsnRegistry, standard_vat_rate};
use crate::types::{EinvoiceError, EinvoiceResult, TaxCategory};
use crate::utils::rounding::round_currency;
use crate::utils::validation::{
    validate_description, validate_non_negative_amount, validate_positive_amount, validate_rate,
    validate_scale,
};

/// A line item discount: a fixed amount or a percentage of the base
/// amount, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// Fixed discount amount
    Amount(BigDecimal),
    /// Percentage of the base amount, in [0, 100]
    Percent(BigDecimal),
}

impl Discount {
    /// Validate the discount value
    pub fn validate(&self) -> EinvoiceResult<()> {
        match self {
            Discount::Amount(amount) => {
                validate_non_negative_amount(amount, "discount amount")?;
                validate_scale(amount, 2, "discount amount")
            }
            Discount::Percent(percent) => validate_rate(percent, "discount percent"),
        }
    }
}

/// An additional charge on a line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Charge amount
    pub amount: BigDecimal,
    /// Charge description
    pub description: String,
    /// Tax category for the charge, when taxed separately
    pub tax_category: Option<TaxCategory>,
}

impl Charge {
    /// Create a new charge
    pub fn new(amount: BigDecimal, description: &str) -> Self {
        Self {
            amount,
            description: description.to_string(),
            tax_category: None,
        }
    }

    /// Validate the charge
    pub fn validate(&self) -> EinvoiceResult<()> {
        validate_non_negative_amount(&self.amount, "charge amount")?;
        validate_scale(&self.amount, 2, "charge amount")?;
        validate_description(&self.description, 100, "Charge description")
    }
}

/// Invoice line item
///
/// All monetary figures derived from a line item (base, discount,
/// taxable, tax, total) are computed on every read; nothing derived is
/// ever stored on the struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description
    pub description: String,
    /// HSN/SAC classification code (4-8 digits)
    pub hsn_code: String,
    /// Quantity (up to 3 decimal places)
    pub quantity: BigDecimal,
    /// Unit price before tax (up to 2 decimal places)
    pub unit_price: BigDecimal,
    /// Optional discount
    pub discount: Option<Discount>,
    /// Additional charges (at most 10)
    pub charges: Vec<Charge>,
    /// Tax category
    pub tax_category: TaxCategory,
    /// Tax rate percentage
    pub tax_rate: BigDecimal,
    /// Tax exemption status
    pub tax_exempt: bool,
    /// Exemption reason, required when exempt
    pub tax_exempt_reason: Option<String>,
}

impl LineItem {
    /// Create a line item with default VAT settings
    pub fn new(description: &str, hsn_code: &str, quantity: BigDecimal, unit_price: BigDecimal) -> Self {
        Self {
            description: description.to_string(),
            hsn_code: hsn_code.to_string(),
            quantity,
            unit_price,
            discount: None,
            charges: Vec::new(),
            tax_category: TaxCategory::Vat,
            tax_rate: standard_vat_rate(),
            tax_exempt: false,
            tax_exempt_reason: None,
        }
    }

    /// Validate all line item invariants
    pub fn validate(&self) -> EinvoiceResult<()> {
        validate_description(&self.description, 500, "Item description")?;

        if !HsnRegistry::validate_format(&self.hsn_code) {
            return Err(EinvoiceError::Validation(format!(
                "Invalid HSN code format: {}",
                self.hsn_code
            )));
        }

        validate_positive_amount(&self.quantity, "quantity")?;
        validate_scale(&self.quantity, 3, "quantity")?;
        validate_non_negative_amount(&self.unit_price, "unit price")?;
        validate_scale(&self.unit_price, 2, "unit price")?;
        validate_rate(&self.tax_rate, "tax rate")?;

        if let Some(discount) = &self.discount {
            discount.validate()?;
        }

        if self.charges.len() > 10 {
            return Err(EinvoiceError::Validation(
                "A line item cannot carry more than 10 charges".to_string(),
            ));
        }
        for charge in &self.charges {
            charge.validate()?;
        }

        if self.tax_exempt && self.tax_exempt_reason.is_none() {
            return Err(EinvoiceError::Validation(
                "Tax exemption reason required when tax exempt".to_string(),
            ));
        }

        Ok(())
    }

    /// Base amount: quantity x unit price
    pub fn base_amount(&self) -> BigDecimal {
        &self.quantity * &self.unit_price
    }

    /// Discount amount resolved against the base amount
    pub fn discount_amount(&self) -> BigDecimal {
        match &self.discount {
            Some(Discount::Amount(amount)) => amount.clone(),
            Some(Discount::Percent(percent)) => {
                round_currency(&(self.base_amount() * percent / BigDecimal::from(100)))
            }
            None => BigDecimal::from(0),
        }
    }

    /// Sum of all additional charges
    pub fn charge_amount(&self) -> BigDecimal {
        self.charges.iter().map(|c| &c.amount).sum()
    }

    /// Taxable amount after discount and charges
    pub fn taxable_amount(&self) -> BigDecimal {
        self.base_amount() - self.discount_amount() + self.charge_amount()
    }

    /// Rate actually applied: zero when exempt
    pub fn effective_tax_rate(&self) -> BigDecimal {
        if self.tax_exempt {
            BigDecimal::from(0)
        } else {
            self.tax_rate.clone()
        }
    }

    /// Tax amount (2 decimal places, half-up); zero when exempt
    pub fn tax_amount(&self) -> BigDecimal {
        if self.tax_exempt {
            return BigDecimal::from(0);
        }
        round_currency(&(self.taxable_amount() * &self.tax_rate / BigDecimal::from(100)))
    }

    /// Line total including tax
    pub fn line_total(&self) -> BigDecimal {
        self.taxable_amount() + self.tax_amount()
    }
}

/// Builder for line items
#[derive(Debug)]
pub struct LineItemBuilder {
    item: LineItem,
}

impl LineItemBuilder {
    /// Start building a line item
    pub fn new(description: &str, hsn_code: &str) -> Self {
        Self {
            item: LineItem::new(description, hsn_code, BigDecimal::from(1), BigDecimal::from(0)),
        }
    }

    /// Set the quantity
    pub fn quantity(mut self, quantity: BigDecimal) -> Self {
        self.item.quantity = quantity;
        self
    }

    /// Set the unit price
    pub fn unit_price(mut self, unit_price: BigDecimal) -> Self {
        self.item.unit_price = unit_price;
        self
    }

    /// Apply a percentage discount
    pub fn discount_percent(mut self, percent: BigDecimal) -> Self {
        self.item.discount = Some(Discount::Percent(percent));
        self
    }

    /// Apply a fixed discount amount
    pub fn discount_amount(mut self, amount: BigDecimal) -> Self {
        self.item.discount = Some(Discount::Amount(amount));
        self
    }

    /// Add an additional charge
    pub fn charge(mut self, amount: BigDecimal, description: &str) -> Self {
        self.item.charges.push(Charge::new(amount, description));
        self
    }

    /// Set tax category and rate
    pub fn tax(mut self, category: TaxCategory, rate: BigDecimal) -> Self {
        self.item.tax_category = category;
        self.item.tax_rate = rate;
        self
    }

    /// Mark the item tax exempt with a reason
    pub fn tax_exemption(mut self, reason: &str) -> Self {
        self.item.tax_exempt = true;
        self.item.tax_exempt_reason = Some(reason.to_string());
        self
    }

    /// Resolve exemption status and rate from an HSN registry: exempt
    /// codes get the registry's reason, taxable codes its rate
    pub fn with_registry(mut self, registry: &HsnRegistry) -> Self {
        if registry.is_exempt(&self.item.hsn_code) {
            self.item.tax_exempt = true;
            self.item.tax_exempt_reason = registry
                .exemption_reason(&self.item.hsn_code)
                .or_else(|| Some("HSN code is VAT exempt".to_string()));
            self.item.tax_rate = BigDecimal::from(0);
        } else {
            self.item.tax_rate = registry.tax_rate(&self.item.hsn_code);
        }
        self
    }

    /// Validate and build the line item
    pub fn build(self) -> EinvoiceResult<LineItem> {
        self.item.validate()?;
        Ok(self.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn laptop_item() -> LineItem {
        let mut item = LineItem::new("Office laptop", "8471", dec("10"), dec("100.00"));
        item.discount = Some(Discount::Percent(dec("10")));
        item
    }

    #[test]
    fn test_derived_amounts() {
        let item = laptop_item();
        assert_eq!(item.base_amount(), dec("1000.00"));
        assert_eq!(item.discount_amount(), dec("100.00"));
        assert_eq!(item.taxable_amount(), dec("900.00"));
        assert_eq!(item.tax_amount(), dec("67.50"));
        assert_eq!(item.line_total(), dec("967.50"));
    }

    #[test]
    fn test_derived_amounts_are_idempotent() {
        let item = laptop_item();
        assert_eq!(item.line_total(), item.line_total());
        assert_eq!(item.tax_amount(), item.tax_amount());
    }

    #[test]
    fn test_charges_increase_taxable_amount() {
        let mut item = laptop_item();
        item.charges.push(Charge::new(dec("50.00"), "Delivery"));
        assert_eq!(item.charge_amount(), dec("50.00"));
        assert_eq!(item.taxable_amount(), dec("950.00"));
    }

    #[test]
    fn test_exempt_item_has_zero_tax() {
        let mut item = laptop_item();
        item.tax_exempt = true;
        item.tax_exempt_reason = Some("Medical exemption".to_string());
        assert_eq!(item.tax_amount(), BigDecimal::from(0));
        assert_eq!(item.effective_tax_rate(), BigDecimal::from(0));
        assert_eq!(item.line_total(), dec("900.00"));
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_exempt_without_reason_fails_validation() {
        let mut item = laptop_item();
        item.tax_exempt = true;
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_quantity_and_price_scales() {
        let mut item = LineItem::new("Loose grain", "1006", dec("1.125"), dec("10.00"));
        item.tax_exempt = true;
        item.tax_exempt_reason = Some("Basic food".to_string());
        assert!(item.validate().is_ok());

        item.quantity = dec("1.1255");
        assert!(item.validate().is_err());

        item.quantity = dec("1.125");
        item.unit_price = dec("10.005");
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_invalid_hsn_rejected() {
        let item = LineItem::new("Widget", "84x1", dec("1"), dec("10.00"));
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let item = LineItemBuilder::new("Office laptop", "8471")
            .quantity(dec("10"))
            .unit_price(dec("100.00"))
            .discount_percent(dec("10"))
            .build()
            .unwrap();

        assert_eq!(item.line_total(), dec("967.50"));
        assert_eq!(item.tax_category, TaxCategory::Vat);
    }

    #[test]
    fn test_builder_with_registry_resolves_exemption() {
        let registry = HsnRegistry::with_defaults();

        let exempt = LineItemBuilder::new("Medicaments", "3004")
            .quantity(dec("5"))
            .unit_price(dec("20.00"))
            .with_registry(&registry)
            .build()
            .unwrap();
        assert!(exempt.tax_exempt);
        assert!(exempt.tax_exempt_reason.is_some());
        assert_eq!(exempt.tax_amount(), BigDecimal::from(0));

        let taxable = LineItemBuilder::new("Laptop", "8471")
            .quantity(dec("1"))
            .unit_price(dec("100.00"))
            .with_registry(&registry)
            .build()
            .unwrap();
        assert!(!taxable.tax_exempt);
        assert_eq!(taxable.tax_rate, dec("7.5"));
    }

    #[test]
    fn test_builder_rejects_invalid_discount() {
        let result = LineItemBuilder::new("Widget", "8471")
            .quantity(dec("1"))
            .unit_price(dec("10.00"))
            .discount_percent(dec("150"))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_too_many_charges_rejected() {
        let mut item = laptop_item();
        for i in 0..11 {
            item.charges
                .push(Charge::new(dec("1.00"), &format!("Charge {}", i)));
        }
        assert!(item.validate().is_err());
    }
}
