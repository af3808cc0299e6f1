use serde::{Deserialize, Serialize};

use super::{ContactDetails, Material, Quantity, ServiceType};

/// Everything the customer has chosen so far in the estimator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSelection {
    pub service: ServiceType,
    pub quantity: Quantity,
    pub material: Material,
    pub contact: ContactDetails,
}

impl QuoteSelection {
    /// Whether `material` is one of the options for `service`.
    pub fn material_is_valid(&self) -> bool {
        self.service.offers(self.material)
    }

    /// Resets `material` to the service default if it is not offered.
    /// Returns `true` when a reset happened.
    pub fn revalidate_material(&mut self) -> bool {
        if self.material_is_valid() {
            return false;
        }
        self.material = self.service.default_material();
        true
    }
}
