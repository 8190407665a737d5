//! Node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::kind::{DeleteState, DocType};

/// A folder or document in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Node {
    /// Store-assigned identifier, never reused.
    pub id: i64,
    /// Globally unique resource identifier.
    pub jrn: String,
    /// URL-safe short name.
    pub slug: String,
    /// Full materialized path (e.g., `/guides/setup`).
    pub path: String,
    /// Folder or document.
    pub doc_type: DocType,
    /// Logical partition this node lives in.
    pub space_id: Option<i64>,
    /// Parent folder ID (null for root-level nodes).
    pub parent_id: Option<i64>,
    /// Fractional index among siblings.
    pub sort_order: f64,
    /// Monotonic version used for optimistic concurrency.
    pub version: i64,
    /// When the node was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Whether this node was the direct target of its delete.
    pub explicitly_deleted: bool,
    /// Document body.
    pub content: String,
    /// MIME type of the body.
    pub content_type: String,
    /// Arbitrary metadata (title and friends).
    pub content_metadata: Option<Value>,
    /// Provenance of imported content (`path`, `integrationId`).
    pub source_metadata: Option<Value>,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Check if this is a root-level node (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if the node is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Deletion state derived from the stored columns.
    pub fn delete_state(&self) -> DeleteState {
        DeleteState::from_columns(self.deleted_at.is_some(), self.explicitly_deleted)
    }

    /// The human-readable title stored in the content metadata.
    pub fn title(&self) -> Option<&str> {
        title_of(self.content_metadata.as_ref())
    }
}

/// Data required to create a new node.
///
/// Omitted `jrn`, `slug`, `path`, and `sort_order` values are derived at
/// creation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNode {
    /// Explicit resource identifier.
    pub jrn: Option<String>,
    /// Explicit slug.
    pub slug: Option<String>,
    /// Explicit materialized path.
    pub path: Option<String>,
    /// Folder or document.
    pub doc_type: DocType,
    /// Logical partition.
    pub space_id: Option<i64>,
    /// Parent folder (None for root).
    pub parent_id: Option<i64>,
    /// Explicit sibling position.
    pub sort_order: Option<f64>,
    /// Document body.
    pub content: String,
    /// MIME type of the body.
    pub content_type: String,
    /// Arbitrary metadata.
    pub content_metadata: Option<Value>,
    /// Provenance of imported content.
    pub source_metadata: Option<Value>,
}

impl NewNode {
    /// A root-level folder with the given title.
    pub fn folder(title: &str) -> Self {
        Self {
            doc_type: DocType::Folder,
            content_type: "text/markdown".to_string(),
            content_metadata: Some(serde_json::json!({ "title": title })),
            ..Self::default()
        }
    }

    /// A root-level markdown document with the given title and body.
    pub fn document(title: &str, content: impl Into<String>) -> Self {
        Self {
            doc_type: DocType::Document,
            content: content.into(),
            content_type: "text/markdown".to_string(),
            content_metadata: Some(serde_json::json!({ "title": title })),
            ..Self::default()
        }
    }

    /// Place the node inside a space.
    pub fn in_space(mut self, space_id: i64) -> Self {
        self.space_id = Some(space_id);
        self
    }

    /// Place the node under a parent folder.
    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Use an explicit slug instead of deriving one.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// The title stored in the content metadata.
    pub fn title(&self) -> Option<&str> {
        title_of(self.content_metadata.as_ref())
    }
}

fn title_of(metadata: Option<&Value>) -> Option<&str> {
    metadata
        .and_then(|m| m.get("title"))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
}
