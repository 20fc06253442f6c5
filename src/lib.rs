//! # E-Invoice Core
//!
//! A compliance-focused e-invoicing library covering tax computation,
//! Invoice Reference Number (IRN) handling, digital signing, and QR
//! code generation for submission to a national e-invoicing authority.
//!
//! ## Features
//!
//! - **Tax engine**: fixed-point line and invoice tax with half-up
//!   currency rounding, additive and cascading tax stacking, and
//!   reverse (tax-inclusive) decomposition
//! - **HSN registry**: classification codes mapped to rates and VAT
//!   exemptions, with chapter-prefix fallback
//! - **Invoice models**: line items and invoices whose totals are
//!   always derived, never stored
//! - **IRN codec**: build, validate, and parse authority-verifiable
//!   reference numbers
//! - **Signing pipeline**: RSA PKCS#1 v1.5 encryption of the canonical
//!   signing payload
//! - **QR encoder**: PNG output of signed invoice data
//!
//! ## Quick Start
//!
//! ```rust
//! use einvoice_core::{Invoice, LineItemBuilder};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//! use std::str::FromStr;
//!
//! let item = LineItemBuilder::new("Office laptop", "8471")
//!     .quantity(BigDecimal::from(10))
//!     .unit_price(BigDecimal::from_str("100.00").unwrap())
//!     .discount_percent(BigDecimal::from(10))
//!     .build()
//!     .unwrap();
//!
//! let issue_date = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
//! let invoice = Invoice::new("INV-2024-001", issue_date, vec![item]).unwrap();
//! assert_eq!(invoice.total_amount(), BigDecimal::from_str("967.50").unwrap());
//!
//! let irn = einvoice_core::irn::build(
//!     invoice.invoice_number(),
//!     "94ND90NR",
//!     Some(invoice.issue_date()),
//! )
//! .unwrap();
//! assert_eq!(irn, "INV-2024-001-94ND90NR-20240611");
//! ```

pub mod crypto;
pub mod hsn;
pub mod irn;
pub mod models;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use crypto::{
    EncryptionResult, ErrorCorrection, QrEncoder, QrInfo, QrOptions, Signer, SigningFlow,
    SigningPayload, SigningResult,
};
pub use hsn::{standard_vat_rate, HsnEntry, HsnRegistry, HsnStatistics};
pub use models::{Charge, Discount, Invoice, LineItem, LineItemBuilder, TaxBreakdown, TaxDetail};
pub use tax::{AppliedTax, MultiTaxBreakdown, ReverseTax, TaxCalculation, TaxEngine, TaxSummary};
pub use traits::*;
pub use types::*;
