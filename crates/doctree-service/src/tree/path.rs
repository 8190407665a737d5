//! Materialized path construction.
//!
//! Every path written by this crate is produced here.

/// Build a node's path from its parent's path and its own slug.
///
/// A missing or empty parent path means the node is at root level.
pub fn build_path(parent_path: Option<&str>, slug: &str) -> String {
    match parent_path {
        Some(parent) if !parent.is_empty() => format!("{parent}/{slug}"),
        _ => format!("/{slug}"),
    }
}
