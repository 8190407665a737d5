//! Node kind and delete state enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a node is a folder or a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "doc_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// A container that may hold children.
    Folder,
    /// A leaf holding content.
    #[default]
    Document,
}

impl DocType {
    /// Check if nodes of this kind may have children.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deletion state of a node, derived from `deleted_at` and
/// `explicitly_deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteState {
    /// Not deleted.
    Active,
    /// Deleted as the direct target of a delete; shown in the trash.
    ExplicitlyDeleted,
    /// Deleted only because an ancestor was deleted.
    CascadeDeleted,
}

impl DeleteState {
    /// Derive the state from the two stored columns.
    pub fn from_columns(deleted: bool, explicitly_deleted: bool) -> Self {
        match (deleted, explicitly_deleted) {
            (false, _) => Self::Active,
            (true, true) => Self::ExplicitlyDeleted,
            (true, false) => Self::CascadeDeleted,
        }
    }

    /// Check if the node is deleted in either way.
    pub fn is_deleted(&self) -> bool {
        !matches!(self, Self::Active)
    }
}
