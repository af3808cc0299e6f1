//! Domain core for the A406 Windows quote estimator: selection models,
//! pricing, the four-step wizard, async service seams and the lead store
//! abstraction.

pub mod calculations;
pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod wizard;

pub use calculations::{PriceTable, VatNotice, price, unit_price};
pub use catalog::Catalog;
pub use db::{DbConfig, QuoteRepository, RepositoryError, RepositoryRegistry};
pub use error::QuoteError;
pub use models::*;
pub use wizard::{NavigationIntent, QuoteWizard, WizardStep};
