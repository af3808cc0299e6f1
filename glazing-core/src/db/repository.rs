use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Material, NewQuoteRequest, Pounds, QuoteRequest, ServiceType, UnitPrice};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    // Quote requests (leads)
    async fn create_request(
        &self,
        request: NewQuoteRequest,
    ) -> Result<QuoteRequest, RepositoryError>;

    async fn get_request(
        &self,
        id: i64,
    ) -> Result<QuoteRequest, RepositoryError>;

    /// Newest first.
    async fn list_requests(
        &self,
        service: Option<ServiceType>,
    ) -> Result<Vec<QuoteRequest>, RepositoryError>;

    async fn delete_request(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Unit prices
    async fn list_unit_prices(&self) -> Result<Vec<UnitPrice>, RepositoryError>;

    async fn upsert_unit_price(
        &self,
        service: ServiceType,
        material: Material,
        unit_price: Pounds,
    ) -> Result<(), RepositoryError>;

    /// Upserts every price or none of them.
    async fn upsert_unit_prices(
        &self,
        prices: &[UnitPrice],
    ) -> Result<(), RepositoryError>;
}
