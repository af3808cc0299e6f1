use thiserror::Error;

use crate::models::{Material, Pounds, Quantity, ServiceType};
use crate::service::ServiceError;
use crate::wizard::WizardStep;

/// Errors raised by the estimator's models, pricing and state machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// Quantity outside `[1, 20]`.
    #[error("quantity {0} is outside the allowed range 1-20")]
    QuantityOutOfRange(i64),

    /// Material not offered for the selected service.
    #[error("{material} is not available for {service}")]
    InvalidMaterial {
        service: ServiceType,
        material: Material,
    },

    /// The action is not legal in the current step.
    #[error("cannot {action} while at {step}")]
    InvalidTransition {
        action: &'static str,
        step: WizardStep,
    },

    /// One or more contact fields are empty.
    #[error("missing contact details: {}", .0.join(", "))]
    IncompleteContact(Vec<&'static str>),

    #[error("a calculation is already in progress")]
    CalculationInFlight,

    /// A pricing outcome arrived for a request that was cancelled or replaced.
    #[error("pricing result for request {0} is no longer wanted")]
    StaleCalculation(u64),

    #[error("price for {quantity} x {unit} does not fit")]
    PriceOverflow { unit: Pounds, quantity: Quantity },

    /// The pricing backend failed; the wizard has rolled back.
    #[error(transparent)]
    Service(#[from] ServiceError),
}
