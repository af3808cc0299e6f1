use serde::{Deserialize, Serialize};

use super::{Pounds, QuoteSelection};
use crate::calculations::VatNotice;

/// The terminal result of the estimator.
///
/// `price` is exclusive of VAT; `vat` is an annotation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub selection: QuoteSelection,
    pub price: Pounds,
    pub vat: VatNotice,
}

impl Estimate {
    pub fn new(
        selection: QuoteSelection,
        price: Pounds,
    ) -> Self {
        Self {
            selection,
            price,
            vat: VatNotice::standard(),
        }
    }

    /// `Estimate for <first name>` heading line.
    pub fn heading(&self) -> String {
        format!("Estimate for {}", self.selection.contact.first_name())
    }
}
