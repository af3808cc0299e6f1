mod contact;
mod estimate;
mod material;
mod pounds;
mod quantity;
mod quote_request;
mod selection;
mod service_type;

pub use contact::ContactDetails;
pub use estimate::Estimate;
pub use material::Material;
pub(crate) use pounds::group_thousands;
pub use pounds::Pounds;
pub use quantity::Quantity;
pub use quote_request::{NewQuoteRequest, QuoteRequest, UnitPrice};
pub use selection::QuoteSelection;
pub use service_type::ServiceType;
