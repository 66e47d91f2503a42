//! Top-level product categories.

use serde::{Deserialize, Serialize};

/// The two storefront departments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fashion,
    Tech,
}

impl Category {
    /// Snake-case name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fashion => "fashion",
            Self::Tech => "tech",
        }
    }

    /// Subcategories the storefront navigation knows about.
    #[must_use]
    pub const fn subcategories(&self) -> &'static [&'static str] {
        match self {
            Self::Fashion => &["men", "women", "kids", "shoes", "accessories"],
            Self::Tech => &["phones", "laptops", "audio", "wearables", "accessories"],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fashion" => Ok(Self::Fashion),
            "tech" => Ok(Self::Tech),
            other => Err(format!("invalid category: {other}")),
        }
    }
}
