//! Traits for reference-data loading and validation extensibility

use async_trait::async_trait;

use crate::hsn::HsnEntry;
use crate::models::{Invoice, LineItem};
use crate::types::EinvoiceResult;

/// Source of HSN reference data
///
/// The core never fetches classification tables over the network; an
/// external collaborator (API client, cache, fixture file) implements
/// this trait and the registry imports whatever it yields.
#[async_trait]
pub trait HsnSource: Send + Sync {
    /// Load all available HSN entries from the source
    async fn load_entries(&self) -> EinvoiceResult<Vec<HsnEntry>>;
}

/// Trait for implementing custom invoice validation rules
pub trait InvoiceValidator: Send + Sync {
    /// Validate an invoice before sealing or submission
    fn validate_invoice(&self, invoice: &Invoice) -> EinvoiceResult<()>;

    /// Validate a single line item
    fn validate_line_item(&self, item: &LineItem) -> EinvoiceResult<()>;
}

/// Default validator applying the built-in model rules
pub struct DefaultInvoiceValidator;

impl InvoiceValidator for DefaultInvoiceValidator {
    fn validate_invoice(&self, invoice: &Invoice) -> EinvoiceResult<()> {
        invoice.validate()
    }

    fn validate_line_item(&self, item: &LineItem) -> EinvoiceResult<()> {
        item.validate()
    }
}
