use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Estimate, Material, Pounds, Quantity, ServiceType};

/// A completed estimate recorded as a sales lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: i64,
    pub service: ServiceType,
    pub material: Material,
    pub quantity: Quantity,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub estimated_price: Pounds,
    pub created_at: DateTime<Utc>,
}

/// For recording new requests (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuoteRequest {
    pub service: ServiceType,
    pub material: Material,
    pub quantity: Quantity,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub estimated_price: Pounds,
}

impl From<&Estimate> for NewQuoteRequest {
    fn from(estimate: &Estimate) -> Self {
        let selection = &estimate.selection;
        Self {
            service: selection.service,
            material: selection.material,
            quantity: selection.quantity,
            name: selection.contact.name.clone(),
            email: selection.contact.email.clone(),
            phone: selection.contact.phone.clone(),
            estimated_price: estimate.price,
        }
    }
}

/// One row of a stored price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPrice {
    pub service: ServiceType,
    pub material: Material,
    pub unit_price: Pounds,
}
