use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quantity;

/// A whole-pound amount. Estimates never carry pence.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pounds(u32);

impl Pounds {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }

    /// `None` on overflow.
    pub fn checked_mul(
        self,
        quantity: Quantity,
    ) -> Option<Pounds> {
        self.0.checked_mul(quantity.get()).map(Pounds)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl From<u32> for Pounds {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Renders as `£12,400`.
impl fmt::Display for Pounds {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "£{}", group_thousands(&self.0.to_string()))
    }
}

/// Inserts `,` every three digits from the right of an unsigned digit string.
pub(crate) fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
