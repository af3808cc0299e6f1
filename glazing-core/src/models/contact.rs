use serde::{Deserialize, Serialize};

/// Contact details captured before an estimate is released.
///
/// Only emptiness is checked. Email and phone formats are not validated here;
/// a pricing backend may reject them with
/// [`ServiceError::Validation`](crate::service::ServiceError::Validation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ContactDetails {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// True once all three fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.phone.is_empty()
    }

    /// Names of the fields still empty, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.phone.is_empty() {
            missing.push("phone");
        }
        missing
    }

    /// First word of the name, used to greet the customer on the result.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}
