//! Unit-price lookup and quote pricing.
//!
//! The built-in table:
//!
//! | Service | Material  | Unit price |
//! |---------|-----------|------------|
//! | Windows | Aluminium | £1,200     |
//! | Windows | uPVC      | £650       |
//! | Doors   | Aluminium | £3,800     |
//! | Doors   | Composite | £1,500     |
//!
//! A quote is `unit price × quantity`. No rounding is ever needed.
//!
//! # Example
//!
//! ```
//! use glazing_core::calculations::price;
//! use glazing_core::{Material, Pounds, Quantity, ServiceType};
//!
//! let quantity = Quantity::new(4).unwrap();
//! assert_eq!(price(ServiceType::Windows, Material::Upvc, quantity), Pounds::new(2600));
//! ```

use std::collections::BTreeMap;

use crate::error::QuoteError;
use crate::models::{Material, Pounds, Quantity, ServiceType, UnitPrice};

const WINDOWS_UPVC: Pounds = Pounds::new(650);
const WINDOWS_ALUMINIUM: Pounds = Pounds::new(1200);
const DOORS_COMPOSITE: Pounds = Pounds::new(1500);
const DOORS_ALUMINIUM: Pounds = Pounds::new(3800);

/// Unit price from the built-in table.
///
/// Any window material other than uPVC is priced as Aluminium, and any door
/// material other than Composite is priced as Aluminium.
pub fn unit_price(
    service: ServiceType,
    material: Material,
) -> Pounds {
    match (service, material) {
        (ServiceType::Windows, Material::Upvc) => WINDOWS_UPVC,
        (ServiceType::Windows, _) => WINDOWS_ALUMINIUM,
        (ServiceType::Doors, Material::Composite) => DOORS_COMPOSITE,
        (ServiceType::Doors, _) => DOORS_ALUMINIUM,
    }
}

/// Price of `quantity` units from the built-in table.
pub fn price(
    service: ServiceType,
    material: Material,
    quantity: Quantity,
) -> Pounds {
    // 20 × £3,800 is the largest possible result; it cannot overflow.
    Pounds::new(unit_price(service, material).get() * quantity.get())
}

/// A (service, material) → unit price table supplied by the host.
///
/// Entries not present fall back to [`unit_price`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable {
    entries: BTreeMap<(ServiceType, Material), Pounds>,
}

impl PriceTable {
    /// A table with no overrides; every lookup uses the built-in prices.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_unit_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = UnitPrice>,
    {
        let mut table = Self::empty();
        for row in prices {
            table.set_unit_price(row.service, row.material, row.unit_price);
        }
        table
    }

    pub fn set_unit_price(
        &mut self,
        service: ServiceType,
        material: Material,
        price: Pounds,
    ) {
        self.entries.insert((service, material), price);
    }

    pub fn with_unit_price(
        mut self,
        service: ServiceType,
        material: Material,
        price: Pounds,
    ) -> Self {
        self.set_unit_price(service, material, price);
        self
    }

    pub fn unit_price(
        &self,
        service: ServiceType,
        material: Material,
    ) -> Pounds {
        self.entries
            .get(&(service, material))
            .copied()
            .unwrap_or_else(|| unit_price(service, material))
    }

    /// `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// [`QuoteError::PriceOverflow`] if a custom unit price is large enough
    /// to overflow.
    pub fn price(
        &self,
        service: ServiceType,
        material: Material,
        quantity: Quantity,
    ) -> Result<Pounds, QuoteError> {
        let unit = self.unit_price(service, material);
        unit.checked_mul(quantity)
            .ok_or(QuoteError::PriceOverflow { unit, quantity })
    }

    /// Effective unit price for every offered (service, material) pair.
    pub fn rows(&self) -> Vec<UnitPrice> {
        ServiceType::all()
            .iter()
            .flat_map(|service| {
                service.materials().iter().map(move |material| UnitPrice {
                    service: *service,
                    material: *material,
                    unit_price: self.unit_price(*service, *material),
                })
            })
            .collect()
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::from_unit_prices([
            UnitPrice {
                service: ServiceType::Windows,
                material: Material::Aluminium,
                unit_price: WINDOWS_ALUMINIUM,
            },
            UnitPrice {
                service: ServiceType::Windows,
                material: Material::Upvc,
                unit_price: WINDOWS_UPVC,
            },
            UnitPrice {
                service: ServiceType::Doors,
                material: Material::Aluminium,
                unit_price: DOORS_ALUMINIUM,
            },
            UnitPrice {
                service: ServiceType::Doors,
                material: Material::Composite,
                unit_price: DOORS_COMPOSITE,
            },
        ])
    }
}
