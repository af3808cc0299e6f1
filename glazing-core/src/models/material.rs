use std::fmt;

use serde::{Deserialize, Serialize};

/// Frame material. Which values are valid depends on the
/// [`ServiceType`](super::ServiceType).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Material {
    #[default]
    Aluminium,
    #[serde(rename = "uPVC")]
    Upvc,
    Composite,
}

impl Material {
    /// Every material, in display order.
    pub fn all() -> &'static [Material] {
        &[Material::Aluminium, Material::Upvc, Material::Composite]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aluminium => "Aluminium",
            Self::Upvc => "uPVC",
            Self::Composite => "Composite",
        }
    }

    /// Case-insensitive; accepts `aluminum` as well.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aluminium" | "aluminum" => Some(Self::Aluminium),
            "upvc" => Some(Self::Upvc),
            "composite" => Some(Self::Composite),
            _ => None,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
