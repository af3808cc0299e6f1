//! VAT annotation shown beside an estimate.
//!
//! Estimates are quoted exclusive of VAT. The notice only describes the tax;
//! it is never folded into [`Estimate::price`](crate::models::Estimate).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{Pounds, group_thousands};

/// Rounds to pence, half away from zero.
fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatNotice {
    /// Fractional rate, e.g. `0.20`.
    pub rate: Decimal,
}

impl VatNotice {
    /// UK standard rate, 20%.
    pub fn standard() -> Self {
        Self {
            rate: Decimal::new(20, 2),
        }
    }

    /// Rate as a whole percentage, e.g. `20`.
    pub fn percent(&self) -> Decimal {
        (self.rate * Decimal::ONE_HUNDRED).normalize()
    }

    /// `+ VAT @ 20%`
    pub fn label(&self) -> String {
        format!("+ VAT @ {}%", self.percent())
    }

    /// VAT payable on `net`, rounded to pence.
    pub fn amount(
        &self,
        net: Pounds,
    ) -> Decimal {
        round_half_up(net.to_decimal() * self.rate)
    }

    /// `net` plus VAT, for display only.
    pub fn gross(
        &self,
        net: Pounds,
    ) -> Decimal {
        net.to_decimal() + self.amount(net)
    }

    /// Formats a pound amount from [`VatNotice::gross`] as `£3,120.00`.
    pub fn format_amount(amount: Decimal) -> String {
        let rounded = round_half_up(amount);
        let whole = rounded.abs().trunc();
        let pence = ((rounded.abs() - whole) * Decimal::ONE_HUNDRED)
            .to_u32()
            .unwrap_or(0);
        let whole = whole.to_u64().unwrap_or(0);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{sign}£{}.{:02}",
            group_thousands(&whole.to_string()),
            pence
        )
    }
}

impl Default for VatNotice {
    fn default() -> Self {
        Self::standard()
    }
}
