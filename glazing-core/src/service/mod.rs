//! Asynchronous seams around the estimator.
//!
//! The wizard never computes a price inline. It hands a [`PricingRequest`] to
//! a [`PricingService`] and, once it reaches the result step, the host passes
//! the [`Estimate`](crate::models::Estimate) to an [`EstimateDispatcher`].

pub mod cancel;
pub mod dispatch;
pub mod pricing;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Material, Quantity, ServiceType};

pub use cancel::{CancelHandle, CancelSignal, cancellation, quote_cancellable};
pub use dispatch::{EstimateDispatcher, NoopDispatcher};
pub use pricing::{PricingService, SimulatedPricingService};

/// Failures a pricing or dispatch backend can report.
///
/// The `Display` text is what the customer sees after a rollback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("pricing service unavailable: {0}")]
    Unavailable(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid details: {0}")]
    Validation(String),
}

/// Snapshot of the selection sent to a pricing backend.
///
/// `ticket` identifies the request so a late answer for an abandoned request
/// can be told apart from the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub ticket: u64,
    pub service: ServiceType,
    pub material: Material,
    pub quantity: Quantity,
}
