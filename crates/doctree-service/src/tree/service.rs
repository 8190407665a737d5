//! Structural tree mutations: create, move, reorder, soft delete, restore.
//!
//! Validation runs before a transaction is opened. Once inside, any error
//! drops the transaction (rolling it back) and is returned unchanged.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use doctree_core::config::TreeConfig;
use doctree_core::error::{AppError, MoveRejection};
use doctree_core::result::AppResult;
use doctree_database::repositories::{InsertNode, NodeRepository};
use doctree_entity::node::{DeleteState, NewNode, Node, Placement};

use super::ancestry::AncestryChecker;
use super::cascade::{load_subtree, plan_cascade_delete, plan_path_rewrite, plan_restore};
use super::ordering::{self, SiblingSlot};
use super::path::build_path;
use super::slug::{derive_jrn, derive_slug};

/// Owns every mutation that changes the shape of the tree.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Node repository.
    node_repo: Arc<NodeRepository>,
    /// Cycle detection.
    ancestry: AncestryChecker,
    /// Tree settings.
    config: TreeConfig,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(node_repo: Arc<NodeRepository>, config: TreeConfig) -> Self {
        Self {
            ancestry: AncestryChecker::new(Arc::clone(&node_repo)),
            node_repo,
            config,
        }
    }

    /// Whether `target_id` is `ancestor_id` or lies below it.
    pub async fn is_descendant_of(&self, target_id: i64, ancestor_id: i64) -> AppResult<bool> {
        self.ancestry.is_descendant_of(target_id, ancestor_id).await
    }

    /// Highest sort order among the active children of `parent_id`.
    pub async fn get_max_sort_order(
        &self,
        space_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> AppResult<Option<f64>> {
        self.node_repo.max_sort_order(space_id, parent_id).await
    }

    /// Every descendant of a node, deleted or not, breadth first.
    pub async fn find_descendants(&self, id: i64) -> AppResult<Vec<Node>> {
        let mut tx = self.node_repo.begin().await?;
        let subtree = load_subtree(&mut tx, id).await?;
        NodeRepository::commit(tx).await?;
        Ok(subtree)
    }

    /// Creates a node, deriving whatever the caller left out.
    ///
    /// A parent that is missing or in the trash is ignored and the node is
    /// created at root level.
    pub async fn create(&self, new: NewNode) -> AppResult<Node> {
        let parent = match new.parent_id {
            Some(parent_id) => match self.node_repo.find_by_id(parent_id).await? {
                Some(parent) if parent.is_deleted() => {
                    warn!(parent_id, "Parent is deleted, creating node at root");
                    None
                }
                Some(parent) if !parent.doc_type.is_folder() => {
                    return Err(AppError::validation(format!(
                        "Cannot create a node under document {parent_id}"
                    )));
                }
                Some(parent) => Some(parent),
                None => {
                    warn!(parent_id, "Parent not found, creating node at root");
                    None
                }
            },
            None => None,
        };
        let parent_id = parent.as_ref().map(|p| p.id);

        let slug = match new.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => derive_slug(new.title(), self.config.slug_suffix_len),
        };
        let jrn = new
            .jrn
            .filter(|j| !j.is_empty())
            .unwrap_or_else(|| derive_jrn(new.doc_type, &slug));
        let path = new
            .path
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| build_path(parent.as_ref().map(|p| p.path.as_str()), &slug));
        let sort_order = match new.sort_order {
            Some(order) => order,
            None => ordering::next_after(
                self.node_repo
                    .max_sort_order(new.space_id, parent_id)
                    .await?,
            ),
        };

        let node = self
            .node_repo
            .create(&InsertNode {
                jrn,
                slug,
                path,
                doc_type: new.doc_type,
                space_id: new.space_id,
                parent_id,
                sort_order,
                content: new.content,
                content_type: new.content_type,
                content_metadata: new.content_metadata,
                source_metadata: new.source_metadata,
            })
            .await?;

        info!(
            node_id = node.id,
            jrn = %node.jrn,
            path = %node.path,
            "Node created"
        );
        Ok(node)
    }

    /// Moves a node under `new_parent_id` (root when `None`) at `placement`.
    ///
    /// Folders carry their whole subtree along; every descendant path is
    /// rewritten in the same transaction.
    pub async fn move_node(
        &self,
        id: i64,
        new_parent_id: Option<i64>,
        placement: Placement,
    ) -> AppResult<Node> {
        let node = self.require_active(id).await?;

        if new_parent_id == node.parent_id && placement == Placement::End {
            debug!(node_id = id, "Move is a no-op");
            return Ok(node);
        }

        let target = self.validate_target(&node, new_parent_id).await?;
        let path = build_path(target.as_ref().map(|t| t.path.as_str()), &node.slug);

        let siblings: Vec<SiblingSlot> = self
            .node_repo
            .list_children(node.space_id, new_parent_id)
            .await?
            .iter()
            .map(SiblingSlot::from)
            .collect();
        let sort_order = ordering::position_for(&siblings, id, placement).map_err(|e| {
            AppError::reference_not_in_scope(format!("{e}: reference not in target folder"))
        })?;

        let mut tx = self.node_repo.begin().await?;
        let moved =
            NodeRepository::update_placement(&mut tx, id, new_parent_id, &path, sort_order).await?;

        let mut rewritten = 0usize;
        if moved.doc_type.is_folder() {
            let subtree = load_subtree(&mut tx, id).await?;
            for (descendant_id, descendant_path) in plan_path_rewrite(id, &path, &subtree) {
                NodeRepository::update_path(&mut tx, descendant_id, &descendant_path, true)
                    .await?;
                rewritten += 1;
            }
        }
        NodeRepository::commit(tx).await?;

        info!(
            node_id = id,
            new_parent = ?new_parent_id,
            reference = ?placement.reference_id(),
            path = %moved.path,
            sort_order = moved.sort_order,
            descendants = rewritten,
            "Node moved"
        );
        Ok(moved)
    }

    /// Changes a node's position among its current siblings.
    ///
    /// Siblings are read and the new position written in one transaction.
    pub async fn reorder_at(&self, id: i64, placement: Placement) -> AppResult<Node> {
        let mut tx = self.node_repo.begin().await?;

        let node = NodeRepository::lock_by_id(&mut tx, id)
            .await?
            .filter(|n| !n.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;

        let siblings: Vec<SiblingSlot> =
            NodeRepository::siblings_in(&mut tx, node.space_id, node.parent_id)
                .await?
                .iter()
                .map(SiblingSlot::from)
                .collect();

        if ordering::is_already_at_position(&siblings, id, placement) {
            debug!(node_id = id, ?placement, "Node already in position");
            return Ok(node);
        }

        let sort_order = ordering::position_for(&siblings, id, placement).map_err(|e| {
            AppError::reference_not_in_scope(format!("{e}: reference not in the same folder"))
        })?;

        let reordered = NodeRepository::update_sort_order(&mut tx, id, sort_order).await?;
        NodeRepository::commit(tx).await?;

        info!(node_id = id, sort_order, "Node reordered");
        Ok(reordered)
    }

    /// Moves a node to the trash along with its descendants.
    ///
    /// Descendants that were already trashed on their own keep their
    /// explicit flag, so restoring this node later leaves them in the trash.
    pub async fn soft_delete(&self, id: i64) -> AppResult<Node> {
        let now = Utc::now();
        let mut tx = self.node_repo.begin().await?;

        let node = NodeRepository::find_by_id_in(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;
        if node.delete_state() == DeleteState::ExplicitlyDeleted {
            debug!(node_id = id, "Node already in the trash");
            return Ok(node);
        }
        let deleted = NodeRepository::mark_explicitly_deleted(&mut tx, id, now).await?;

        let subtree = load_subtree(&mut tx, id).await?;
        let cascaded =
            NodeRepository::mark_cascade_deleted(&mut tx, &plan_cascade_delete(&subtree), now)
                .await?;
        NodeRepository::commit(tx).await?;

        info!(node_id = id, path = %deleted.path, cascaded, "Node deleted");
        Ok(deleted)
    }

    /// Brings a node back from the trash.
    ///
    /// When the parent is gone or still deleted the node lands at root.
    /// Cascade-deleted descendants come back with it; independently trashed
    /// ones stay where they are.
    pub async fn restore(&self, id: i64) -> AppResult<Node> {
        let mut tx = self.node_repo.begin().await?;

        let node = NodeRepository::find_by_id_in(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;
        if !node.is_deleted() {
            debug!(node_id = id, "Restore of an active node is a no-op");
            return Ok(node);
        }

        let parent = match node.parent_id {
            Some(parent_id) => NodeRepository::find_by_id_in(&mut tx, parent_id)
                .await?
                .filter(|p| !p.is_deleted()),
            None => None,
        };
        if node.parent_id.is_some() && parent.is_none() {
            warn!(
                node_id = id,
                parent_id = ?node.parent_id,
                "Parent missing or deleted, restoring node at root"
            );
        }
        let parent_id = parent.as_ref().map(|p| p.id);
        let path = build_path(parent.as_ref().map(|p| p.path.as_str()), &node.slug);

        let siblings: Vec<SiblingSlot> =
            NodeRepository::siblings_in(&mut tx, node.space_id, parent_id)
                .await?
                .iter()
                .map(SiblingSlot::from)
                .collect();
        let sort_order =
            restored_sort_order(SiblingSlot::from(&node), node.parent_id, parent_id, &siblings);

        let restored =
            NodeRepository::restore_row(&mut tx, id, parent_id, &path, sort_order).await?;

        let subtree = load_subtree(&mut tx, id).await?;
        let mut revived = 0usize;
        for step in plan_restore(id, &path, &subtree) {
            if step.revive {
                NodeRepository::restore_row(&mut tx, step.id, step.parent_id, &step.path, None)
                    .await?;
                revived += 1;
            } else {
                NodeRepository::update_path(&mut tx, step.id, &step.path, false).await?;
            }
        }
        NodeRepository::commit(tx).await?;

        info!(
            node_id = id,
            path = %restored.path,
            sort_order = restored.sort_order,
            revived,
            "Node restored"
        );
        Ok(restored)
    }

    async fn require_active(&self, id: i64) -> AppResult<Node> {
        self.node_repo
            .find_by_id(id)
            .await?
            .filter(|n| !n.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Checks that `node` may live under `new_parent_id` and returns the
    /// loaded target folder.
    async fn validate_target(
        &self,
        node: &Node,
        new_parent_id: Option<i64>,
    ) -> AppResult<Option<Node>> {
        let Some(target_id) = new_parent_id else {
            return Ok(None);
        };
        if target_id == node.id {
            return Err(AppError::invalid_move(MoveRejection::SelfMove));
        }
        if node.doc_type.is_folder() && self.is_descendant_of(target_id, node.id).await? {
            return Err(AppError::invalid_move(MoveRejection::CyclicMove));
        }

        let target = self
            .node_repo
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::invalid_move(MoveRejection::TargetNotFound))?;
        if target.is_deleted() {
            return Err(AppError::invalid_move(MoveRejection::TargetDeleted));
        }
        if !target.doc_type.is_folder() {
            return Err(AppError::invalid_move(MoveRejection::TargetNotFolder));
        }
        if target.space_id != node.space_id {
            return Err(AppError::invalid_move(MoveRejection::CrossSpace));
        }
        Ok(Some(target))
    }
}

/// Position for a node coming back from the trash under `parent_id`.
///
/// The stored position is kept when the node returns to its previous parent
/// and no active sibling took it; otherwise the node goes to the end.
fn restored_sort_order(
    node: SiblingSlot,
    previous_parent: Option<i64>,
    parent_id: Option<i64>,
    siblings: &[SiblingSlot],
) -> Option<f64> {
    let taken = siblings
        .iter()
        .any(|s| s.id != node.id && s.sort_order == node.sort_order);
    if parent_id == previous_parent && !taken {
        None
    } else {
        Some(ordering::at_end(siblings))
    }
}
