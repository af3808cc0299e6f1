use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{PricingRequest, ServiceError};
use crate::calculations::PriceTable;
use crate::models::Pounds;

/// Produces the price for a [`PricingRequest`].
#[async_trait]
pub trait PricingService: Send + Sync {
    async fn quote(
        &self,
        request: &PricingRequest,
    ) -> Result<Pounds, ServiceError>;
}

/// Local stand-in for a remote pricing backend: waits a fixed delay, then
/// prices from a [`PriceTable`]. Only fails if the table overflows.
#[derive(Debug, Clone)]
pub struct SimulatedPricingService {
    delay: Duration,
    table: PriceTable,
}

impl SimulatedPricingService {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

    pub fn new(
        delay: Duration,
        table: PriceTable,
    ) -> Self {
        Self { delay, table }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn table(&self) -> &PriceTable {
        &self.table
    }
}

impl Default for SimulatedPricingService {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY, PriceTable::default())
    }
}

#[async_trait]
impl PricingService for SimulatedPricingService {
    async fn quote(
        &self,
        request: &PricingRequest,
    ) -> Result<Pounds, ServiceError> {
        debug!(
            ticket = request.ticket,
            service = request.service.as_str(),
            material = request.material.as_str(),
            quantity = request.quantity.get(),
            delay_ms = self.delay.as_millis() as u64,
            "pricing request"
        );
        tokio::time::sleep(self.delay).await;

        self.table
            .price(request.service, request.material, request.quantity)
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }
}
