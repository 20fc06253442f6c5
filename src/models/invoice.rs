//! Invoice aggregate with derived totals and sealing semantics

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::line_item::LineItem;
use crate::models::tax::{TaxBreakdown, TaxDetail};
use crate::types::{Currency, EinvoiceError, EinvoiceResult, TaxCategory};
use crate::utils::validation::validate_invoice_number;

const MAX_LINE_ITEMS: usize = 1000;

/// Invoice for submission to the e-invoicing authority
///
/// Line items and the seal artifacts (IRN, signature, QR code) are kept
/// private: all totals are recomputed from the line items on every read,
/// and any line-item mutation invalidates a previously applied seal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    invoice_number: String,
    issue_date: NaiveDate,
    line_items: Vec<LineItem>,
    /// Invoice currency
    pub currency: Currency,
    /// Free-form notes
    pub notes: Option<String>,
    irn: Option<String>,
    signature: Option<String>,
    qr_code: Option<String>,
    /// When the invoice was created
    pub created_at: NaiveDateTime,
    /// When the invoice was last updated
    pub updated_at: NaiveDateTime,
}

impl Invoice {
    /// Create a new invoice; the number is normalized to uppercase and
    /// all line items are validated
    pub fn new(
        invoice_number: &str,
        issue_date: NaiveDate,
        line_items: Vec<LineItem>,
    ) -> EinvoiceResult<Self> {
        let invoice_number = invoice_number.trim().to_uppercase();
        let now = chrono::Utc::now().naive_utc();

        let invoice = Self {
            invoice_number,
            issue_date,
            line_items,
            currency: Currency::default(),
            notes: None,
            irn: None,
            signature: None,
            qr_code: None,
            created_at: now,
            updated_at: now,
        };
        invoice.validate()?;
        Ok(invoice)
    }

    /// Validate the invoice number and every line item
    pub fn validate(&self) -> EinvoiceResult<()> {
        validate_invoice_number(&self.invoice_number)?;

        if self.line_items.is_empty() {
            return Err(EinvoiceError::Validation(
                "At least one line item is required".to_string(),
            ));
        }
        if self.line_items.len() > MAX_LINE_ITEMS {
            return Err(EinvoiceError::Validation(format!(
                "An invoice cannot carry more than {} line items",
                MAX_LINE_ITEMS
            )));
        }

        for item in &self.line_items {
            item.validate()?;
        }

        Ok(())
    }

    /// Invoice number (normalized)
    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    /// Issue date
    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    /// Line items
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Number of line items
    pub fn line_count(&self) -> usize {
        self.line_items.len()
    }

    /// Add a line item; invalidates any existing seal
    pub fn add_line_item(&mut self, item: LineItem) -> EinvoiceResult<()> {
        item.validate()?;
        if self.line_items.len() >= MAX_LINE_ITEMS {
            return Err(EinvoiceError::Validation(format!(
                "An invoice cannot carry more than {} line items",
                MAX_LINE_ITEMS
            )));
        }
        self.line_items.push(item);
        self.invalidate_seal();
        Ok(())
    }

    /// Remove a line item by index; invalidates any existing seal
    pub fn remove_line_item(&mut self, index: usize) -> EinvoiceResult<LineItem> {
        if index >= self.line_items.len() {
            return Err(EinvoiceError::Validation(format!(
                "No line item at index {}",
                index
            )));
        }
        if self.line_items.len() == 1 {
            return Err(EinvoiceError::Validation(
                "At least one line item is required".to_string(),
            ));
        }
        let item = self.line_items.remove(index);
        self.invalidate_seal();
        Ok(item)
    }

    /// Replace all line items; invalidates any existing seal
    pub fn set_line_items(&mut self, line_items: Vec<LineItem>) -> EinvoiceResult<()> {
        let previous = std::mem::replace(&mut self.line_items, line_items);
        if let Err(error) = self.validate() {
            self.line_items = previous;
            return Err(error);
        }
        self.invalidate_seal();
        Ok(())
    }

    fn invalidate_seal(&mut self) {
        self.irn = None;
        self.signature = None;
        self.qr_code = None;
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Subtotal: sum of line base amounts
    pub fn subtotal(&self) -> BigDecimal {
        self.line_items.iter().map(|i| i.base_amount()).sum()
    }

    /// Total discount across line items
    pub fn total_discount(&self) -> BigDecimal {
        self.line_items.iter().map(|i| i.discount_amount()).sum()
    }

    /// Total additional charges across line items
    pub fn total_charges(&self) -> BigDecimal {
        self.line_items.iter().map(|i| i.charge_amount()).sum()
    }

    /// Total taxable amount across line items
    pub fn taxable_amount(&self) -> BigDecimal {
        self.line_items.iter().map(|i| i.taxable_amount()).sum()
    }

    /// Total tax across line items
    pub fn total_tax(&self) -> BigDecimal {
        self.line_items.iter().map(|i| i.tax_amount()).sum()
    }

    /// Total invoice amount including tax
    pub fn total_amount(&self) -> BigDecimal {
        self.line_items.iter().map(|i| i.line_total()).sum()
    }

    /// Group line items into a per-category tax breakdown
    pub fn tax_breakdown(&self) -> TaxBreakdown {
        let mut by_category: HashMap<TaxCategory, TaxDetail> = HashMap::new();
        let mut order: Vec<TaxCategory> = Vec::new();

        for item in &self.line_items {
            let detail = by_category.entry(item.tax_category).or_insert_with(|| {
                order.push(item.tax_category);
                TaxDetail {
                    category: item.tax_category,
                    rate: item.effective_tax_rate(),
                    taxable_amount: BigDecimal::from(0),
                    tax_amount: BigDecimal::from(0),
                    exempt_amount: BigDecimal::from(0),
                }
            });
            detail.taxable_amount += item.taxable_amount();
            detail.tax_amount += item.tax_amount();
            if item.tax_exempt {
                detail.exempt_amount += item.taxable_amount();
            }
        }

        let tax_details = order
            .into_iter()
            .filter_map(|category| by_category.remove(&category))
            .collect();

        TaxBreakdown {
            subtotal: self.subtotal(),
            total_discount: self.total_discount(),
            total_charges: self.total_charges(),
            taxable_amount: self.taxable_amount(),
            tax_details,
        }
    }

    /// Attach the submission artifacts, sealing the invoice
    pub fn seal(&mut self, irn: String, signature: String, qr_code: String) {
        self.irn = Some(irn);
        self.signature = Some(signature);
        self.qr_code = Some(qr_code);
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Whether the invoice carries submission artifacts
    pub fn is_sealed(&self) -> bool {
        self.irn.is_some()
    }

    /// Invoice Reference Number, once sealed
    pub fn irn(&self) -> Option<&str> {
        self.irn.as_deref()
    }

    /// Digital signature (base64 ciphertext), once sealed
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// QR code (base64 PNG), once sealed
    pub fn qr_code(&self) -> Option<&str> {
        self.qr_code.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::line_item::{Discount, LineItemBuilder};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn laptop_invoice() -> Invoice {
        let mut item = LineItem::new("Office laptop", "8471", dec("10"), dec("100.00"));
        item.discount = Some(Discount::Percent(dec("10")));
        Invoice::new(
            "INV-2024-001",
            NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
            vec![item],
        )
        .unwrap()
    }

    #[test]
    fn test_invoice_totals_match_single_line() {
        let invoice = laptop_invoice();
        assert_eq!(invoice.subtotal(), dec("1000.00"));
        assert_eq!(invoice.total_discount(), dec("100.00"));
        assert_eq!(invoice.taxable_amount(), dec("900.00"));
        assert_eq!(invoice.total_tax(), dec("67.50"));
        assert_eq!(invoice.total_amount(), dec("967.50"));
    }

    #[test]
    fn test_totals_are_idempotent() {
        let invoice = laptop_invoice();
        assert_eq!(invoice.total_amount(), invoice.total_amount());
        assert_eq!(invoice.tax_breakdown(), invoice.tax_breakdown());
    }

    #[test]
    fn test_invoice_number_is_normalized() {
        let item = LineItem::new("Widget", "8471", dec("1"), dec("10.00"));
        let invoice = Invoice::new(
            "  inv-001  ",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![item],
        )
        .unwrap();
        assert_eq!(invoice.invoice_number(), "INV-001");
    }

    #[test]
    fn test_empty_invoice_rejected() {
        let result = Invoice::new(
            "INV-001",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mutation_invalidates_seal() {
        let mut invoice = laptop_invoice();
        invoice.seal(
            "INV-2024-001-94ND90NR-20240611".to_string(),
            "sig".to_string(),
            "qr".to_string(),
        );
        assert!(invoice.is_sealed());

        let extra = LineItem::new("Mouse", "8471", dec("1"), dec("25.00"));
        invoice.add_line_item(extra).unwrap();

        assert!(!invoice.is_sealed());
        assert!(invoice.irn().is_none());
        assert!(invoice.signature().is_none());
        assert!(invoice.qr_code().is_none());
    }

    #[test]
    fn test_remove_last_line_item_rejected() {
        let mut invoice = laptop_invoice();
        assert!(invoice.remove_line_item(0).is_err());

        let extra = LineItem::new("Mouse", "8471", dec("1"), dec("25.00"));
        invoice.add_line_item(extra).unwrap();
        let removed = invoice.remove_line_item(1).unwrap();
        assert_eq!(removed.description, "Mouse");
    }

    #[test]
    fn test_set_line_items_rolls_back_on_invalid() {
        let mut invoice = laptop_invoice();
        let bad = LineItem::new("Broken", "84", dec("1"), dec("10.00"));
        assert!(invoice.set_line_items(vec![bad]).is_err());
        // Previous items retained
        assert_eq!(invoice.line_count(), 1);
        assert_eq!(invoice.line_items()[0].description, "Office laptop");
    }

    #[test]
    fn test_tax_breakdown_groups_by_category() {
        let registry = crate::hsn::HsnRegistry::with_defaults();
        let laptop = LineItemBuilder::new("Laptop", "8471")
            .quantity(dec("10"))
            .unit_price(dec("100.00"))
            .with_registry(&registry)
            .build()
            .unwrap();
        let medicine = LineItemBuilder::new("Medicaments", "3004")
            .quantity(dec("5"))
            .unit_price(dec("40.00"))
            .with_registry(&registry)
            .build()
            .unwrap();

        let invoice = Invoice::new(
            "INV-002",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            vec![laptop, medicine],
        )
        .unwrap();

        let breakdown = invoice.tax_breakdown();
        assert_eq!(breakdown.subtotal, dec("1200.00"));
        assert_eq!(breakdown.taxable_amount, dec("1200.00"));
        assert_eq!(breakdown.tax_details.len(), 1); // both are VAT category

        let vat = &breakdown.tax_details[0];
        assert_eq!(vat.category, TaxCategory::Vat);
        assert_eq!(vat.tax_amount, dec("75.00"));
        assert_eq!(vat.exempt_amount, dec("200.00"));
        assert_eq!(breakdown.total_tax(), dec("75.00"));
        assert_eq!(breakdown.total_amount(), dec("1275.00"));
    }
}
