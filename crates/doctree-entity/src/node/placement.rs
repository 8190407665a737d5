//! Requested sibling position for moves and reorders.

use serde::{Deserialize, Serialize};

/// Where a node should land among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "position", content = "reference_id", rename_all = "lowercase")]
pub enum Placement {
    /// After every existing sibling.
    #[default]
    End,
    /// Immediately before the referenced sibling.
    Before(i64),
    /// Immediately after the referenced sibling.
    After(i64),
}

impl Placement {
    /// The referenced sibling, if any.
    pub fn reference_id(&self) -> Option<i64> {
        match self {
            Self::End => None,
            Self::Before(id) | Self::After(id) => Some(*id),
        }
    }
}
