//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Conceptual state of a shopping cart.
///
/// A cart is `Empty` until the first item is added and returns to `Empty`
/// when cleared, checked out, or when its last item is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    #[default]
    Empty,
    NonEmpty,
}

impl CartState {
    /// State of a cart holding `line_count` line items.
    #[must_use]
    pub const fn from_line_count(line_count: usize) -> Self {
        if line_count == 0 {
            Self::Empty
        } else {
            Self::NonEmpty
        }
    }
}

impl std::fmt::Display for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::NonEmpty => write!(f, "non_empty"),
        }
    }
}
