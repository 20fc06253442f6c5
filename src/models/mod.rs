//! Invoice value objects with derived totals

pub mod invoice;
pub mod line_item;
pub mod tax;

pub use invoice::Invoice;
pub use line_item::{Charge, Discount, LineItem, LineItemBuilder};
pub use tax::{TaxBreakdown, TaxDetail};
