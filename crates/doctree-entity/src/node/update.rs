//! Content write payloads and outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::Node;

/// A content write against an existing node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocWrite {
    /// New document body.
    pub content: String,
    /// New MIME type.
    pub content_type: String,
    /// New metadata.
    pub content_metadata: Option<Value>,
    /// Version the caller claims for this write. The newer-wins update
    /// requires it to exceed the stored version; the strict update ignores
    /// it and writes `expected + 1`.
    pub version: i64,
}

impl DocWrite {
    /// Build a write that keeps everything from `node` except the body and
    /// claims the next version.
    pub fn next_content(node: &Node, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: node.content_type.clone(),
            content_metadata: node.content_metadata.clone(),
            version: node.version + 1,
        }
    }
}

/// Result of a strict compare-and-swap update.
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    /// The write was applied; carries the refreshed row.
    Updated(Node),
    /// The stored version did not match (or the row is gone).
    Conflict,
}

impl CasOutcome {
    /// Check if the write was rejected.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }

    /// The updated node, if the write was applied.
    pub fn into_node(self) -> Option<Node> {
        match self {
            Self::Updated(node) => Some(node),
            Self::Conflict => None,
        }
    }
}

/// Restricts source-path lookups to content imported by one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceScope {
    /// The integration whose imports are searched.
    pub integration_id: i64,
}
