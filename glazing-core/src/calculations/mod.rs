//! Pricing for the quote estimator.
//!
//! Pure functions only: no I/O and no clocks. The asynchronous pricing
//! service in [`crate::service`] delegates here.

pub mod pricing;
pub mod vat;

pub use pricing::{PriceTable, price, unit_price};
pub use vat::VatNotice;
