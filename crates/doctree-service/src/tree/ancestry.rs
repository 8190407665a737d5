//! Descendant checks over materialized paths.

use std::sync::Arc;

use doctree_core::result::AppResult;
use doctree_database::repositories::NodeRepository;

/// Whether `target_path` lies strictly below `ancestor_path`.
///
/// The trailing separator keeps `/guides-old` from matching `/guides`.
pub fn is_path_descendant(target_path: &str, ancestor_path: &str) -> bool {
    !ancestor_path.is_empty()
        && target_path
            .strip_prefix(ancestor_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Answers "is A inside B" with a single read of both paths instead of a
/// walk up the parent chain.
#[derive(Debug, Clone)]
pub struct AncestryChecker {
    node_repo: Arc<NodeRepository>,
}

impl AncestryChecker {
    /// Creates a new ancestry checker.
    pub fn new(node_repo: Arc<NodeRepository>) -> Self {
        Self { node_repo }
    }

    /// True when `target_id` is `ancestor_id` itself or lies anywhere below
    /// it. Unknown ids are never descendants.
    pub async fn is_descendant_of(&self, target_id: i64, ancestor_id: i64) -> AppResult<bool> {
        if target_id == ancestor_id {
            return Ok(true);
        }

        let paths = self.node_repo.find_paths(&[target_id, ancestor_id]).await?;
        let path_of = |id: i64| {
            paths
                .iter()
                .find(|(node_id, _)| *node_id == id)
                .map(|(_, path)| path.as_str())
        };

        Ok(match (path_of(target_id), path_of(ancestor_id)) {
            (Some(target), Some(ancestor)) => is_path_descendant(target, ancestor),
            _ => false,
        })
    }
}
