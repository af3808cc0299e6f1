use std::fmt;

use serde::{Deserialize, Serialize};

use super::Material;

/// The two product lines the estimator can price.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Windows,
    Doors,
}

impl ServiceType {
    pub fn all() -> &'static [ServiceType] {
        &[ServiceType::Windows, ServiceType::Doors]
    }

    /// Short code used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Doors => "doors",
        }
    }

    /// Case-insensitive inverse of [`ServiceType::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" => Some(Self::Windows),
            "doors" => Some(Self::Doors),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Windows => "Windows & Glazing",
            Self::Doors => "Doors & Security",
        }
    }

    /// Materials offered for this service, in display order.
    pub fn materials(&self) -> &'static [Material] {
        match self {
            Self::Windows => &[Material::Aluminium, Material::Upvc],
            Self::Doors => &[Material::Aluminium, Material::Composite],
        }
    }

    /// The material a fresh configuration starts with.
    pub fn default_material(&self) -> Material {
        self.materials()[0]
    }

    pub fn offers(&self, material: Material) -> bool {
        self.materials().contains(&material)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
