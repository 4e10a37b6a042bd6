//! Product size options.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Garment size attached to a cart line.
///
/// Serialized in lowercase to match the backend (`"small"`, `"medium"`, `"large"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ProductSize {
    /// All sizes in display order.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Wire value of the size.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for ProductSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
