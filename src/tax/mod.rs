//! Tax computation engine

pub mod engine;

pub use engine::{
    AppliedTax, MultiTaxBreakdown, ReverseTax, TaxCalculation, TaxEngine, TaxSummary,
};
