//! Subtree traversal and the plans applied by move, delete, and restore.
//!
//! Traversals use an explicit worklist so deep trees never grow the call
//! stack, and a visited set so corrupt legacy data with a parent cycle
//! cannot loop forever. Planners are pure: they take the loaded subtree and
//! return the rows to write, each child's path computed from its parent's
//! already-computed path.

use std::collections::{HashMap, HashSet, VecDeque};

use sqlx::PgConnection;

use doctree_core::result::AppResult;
use doctree_database::repositories::NodeRepository;
use doctree_entity::node::Node;

use super::path::build_path;

/// Load every descendant of `root_id` (not the root itself), deleted or
/// not, breadth first.
pub async fn load_subtree(conn: &mut PgConnection, root_id: i64) -> AppResult<Vec<Node>> {
    let mut subtree = Vec::new();
    let mut visited = HashSet::from([root_id]);
    let mut worklist = VecDeque::from([root_id]);

    while let Some(parent_id) = worklist.pop_front() {
        for child in NodeRepository::children_in(conn, parent_id).await? {
            if visited.insert(child.id) {
                worklist.push_back(child.id);
                subtree.push(child);
            }
        }
    }
    Ok(subtree)
}

fn children_by_parent(subtree: &[Node]) -> HashMap<i64, Vec<&Node>> {
    let mut map: HashMap<i64, Vec<&Node>> = HashMap::new();
    for node in subtree {
        if let Some(parent_id) = node.parent_id {
            map.entry(parent_id).or_default().push(node);
        }
    }
    map
}

/// New path for every descendant of `root_id` once the root's path becomes
/// `root_path`.
pub fn plan_path_rewrite(root_id: i64, root_path: &str, subtree: &[Node]) -> Vec<(i64, String)> {
    let children = children_by_parent(subtree);
    let mut planned = Vec::with_capacity(subtree.len());
    let mut visited = HashSet::from([root_id]);
    let mut worklist = VecDeque::from([(root_id, root_path.to_string())]);

    while let Some((parent_id, parent_path)) = worklist.pop_front() {
        for child in children.get(&parent_id).into_iter().flatten() {
            if !visited.insert(child.id) {
                continue;
            }
            let path = build_path(Some(&parent_path), &child.slug);
            planned.push((child.id, path.clone()));
            worklist.push_back((child.id, path));
        }
    }
    planned
}

/// Ids to mark cascade-deleted when the root of `subtree` is deleted.
///
/// Descendants already trashed on their own are skipped so that their
/// explicit flag survives.
pub fn plan_cascade_delete(subtree: &[Node]) -> Vec<i64> {
    subtree
        .iter()
        .filter(|node| !node.explicitly_deleted || node.deleted_at.is_none())
        .map(|node| node.id)
        .collect()
}

/// One row touched by a restore cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreStep {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub path: String,
    /// `true` to clear the delete markers, `false` to only rewrite the path
    /// of a node that was already active.
    pub revive: bool,
}

/// Rows to restore beneath a restored root whose path is now `root_path`.
///
/// Cascade-deleted descendants come back; explicitly deleted ones, and
/// everything beneath them, stay in the trash.
pub fn plan_restore(root_id: i64, root_path: &str, subtree: &[Node]) -> Vec<RestoreStep> {
    let children = children_by_parent(subtree);
    let mut steps = Vec::new();
    let mut visited = HashSet::from([root_id]);
    let mut worklist = VecDeque::from([(root_id, root_path.to_string())]);

    while let Some((parent_id, parent_path)) = worklist.pop_front() {
        for child in children.get(&parent_id).into_iter().flatten() {
            if !visited.insert(child.id) {
                continue;
            }
            let revive = match (child.deleted_at.is_some(), child.explicitly_deleted) {
                (true, true) => continue,
                (true, false) => true,
                (false, _) => false,
            };
            let path = build_path(Some(&parent_path), &child.slug);
            steps.push(RestoreStep {
                id: child.id,
                parent_id: child.parent_id,
                path: path.clone(),
                revive,
            });
            worklist.push_back((child.id, path));
        }
    }
    steps
}
