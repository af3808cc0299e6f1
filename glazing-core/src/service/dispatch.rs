use async_trait::async_trait;
use tracing::info;

use super::ServiceError;
use crate::models::Estimate;

/// Delivers a finished estimate to the customer (email, CRM, lead store...).
#[async_trait]
pub trait EstimateDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        estimate: &Estimate,
    ) -> Result<(), ServiceError>;
}

/// Logs the estimate and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDispatcher;

#[async_trait]
impl EstimateDispatcher for NoopDispatcher {
    async fn dispatch(
        &self,
        estimate: &Estimate,
    ) -> Result<(), ServiceError> {
        info!(
            email = %estimate.selection.contact.email,
            price = estimate.price.get(),
            "estimate ready (no dispatcher configured)"
        );
        Ok(())
    }
}
