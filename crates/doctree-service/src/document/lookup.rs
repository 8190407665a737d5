//! Query shapes for listing and source-path lookups.

use serde::{Deserialize, Serialize};

use doctree_database::repositories::NodeFilter;

/// Listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Only nodes whose jrn starts with this prefix.
    pub jrn_prefix: Option<String>,
    /// Only nodes of this space.
    pub space_id: Option<i64>,
    /// Include the internal root namespace.
    #[serde(default)]
    pub include_internal: bool,
}

impl ListQuery {
    /// Translate into a repository filter.
    ///
    /// Nodes under `internal_prefix` are hidden unless the caller asks for
    /// them, either with `include_internal` or by listing that namespace
    /// directly.
    pub fn to_filter(&self, internal_prefix: &str) -> NodeFilter {
        let targets_internal = self
            .jrn_prefix
            .as_deref()
            .is_some_and(|p| p.starts_with(internal_prefix));
        let exclude = !self.include_internal && !targets_internal && !internal_prefix.is_empty();

        NodeFilter {
            jrn_prefix: self.jrn_prefix.clone().filter(|p| !p.is_empty()),
            space_id: self.space_id,
            exclude_jrn_prefix: exclude.then(|| internal_prefix.to_string()),
        }
    }
}

/// Last segment of a source path, used when no node matches the full path.
///
/// Returns `None` when the path has no separator, since the exact lookup has
/// already covered it.
pub fn source_file_name(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    let (_, name) = trimmed.rsplit_once('/')?;
    (!name.is_empty()).then_some(name)
}
