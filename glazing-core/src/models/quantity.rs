use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// Number of units in a quote, always within `[Quantity::MIN, Quantity::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u8);

impl Quantity {
    pub const MIN: Quantity = Quantity(1);
    pub const MAX: Quantity = Quantity(20);

    /// Rejects values outside the allowed range.
    pub fn new(value: u32) -> Result<Self, QuoteError> {
        if value < u32::from(Self::MIN.0) || value > u32::from(Self::MAX.0) {
            return Err(QuoteError::QuantityOutOfRange(i64::from(value)));
        }
        Ok(Self(value as u8))
    }

    /// Slider semantics: anything outside the range snaps to the nearest bound.
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        Self(clamped as u8)
    }

    pub fn get(&self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuoteError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
