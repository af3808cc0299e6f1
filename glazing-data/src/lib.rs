//! CSV price-table loading for the estimator.

pub mod loader;

pub use loader::{PriceTableLoader, PriceTableLoaderError, UnitPriceRecord};
