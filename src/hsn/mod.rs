//! HSN code classification and exemption registry

pub mod registry;

pub use registry::{HsnEntry, HsnRegistry, HsnStatistics};

use bigdecimal::{num_bigint::BigInt, BigDecimal};

/// The jurisdiction's standard VAT rate (7.5%), applied whenever an HSN
/// code is absent from the registry.
pub fn standard_vat_rate() -> BigDecimal {
    BigDecimal::new(BigInt::from(75), 1)
}
