//! Document reads and the two versioned write paths.

use std::sync::Arc;

use tracing::{debug, info};

use doctree_core::config::TreeConfig;
use doctree_core::error::AppError;
use doctree_core::result::AppResult;
use doctree_core::types::pagination::{PageRequest, PageResponse};
use doctree_database::repositories::NodeRepository;
use doctree_entity::node::{CasOutcome, DocWrite, Node, SourceScope};

use super::lookup::{ListQuery, source_file_name};

/// Reads, lookups, and content updates for nodes.
#[derive(Debug, Clone)]
pub struct DocumentService {
    /// Node repository.
    node_repo: Arc<NodeRepository>,
    /// Tree settings.
    config: TreeConfig,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(node_repo: Arc<NodeRepository>, config: TreeConfig) -> Self {
        Self { node_repo, config }
    }

    /// Gets a node by ID, deleted or not.
    pub async fn read_by_id(&self, id: i64) -> AppResult<Option<Node>> {
        self.node_repo.find_by_id(id).await
    }

    /// Gets a node by jrn, deleted or not.
    pub async fn read_by_jrn(&self, jrn: &str) -> AppResult<Option<Node>> {
        self.node_repo.find_by_jrn(jrn).await
    }

    /// Gets every node matching one of `jrns`. Unknown jrns are skipped.
    pub async fn read_many_by_jrns(&self, jrns: &[String]) -> AppResult<Vec<Node>> {
        if jrns.is_empty() {
            return Ok(Vec::new());
        }
        self.node_repo.find_many_by_jrns(jrns).await
    }

    /// Lists active nodes ordered by path.
    pub async fn list(&self, query: &ListQuery, page: &PageRequest) -> AppResult<PageResponse<Node>> {
        let filter = query.to_filter(&self.config.internal_jrn_prefix);
        self.node_repo.list(&filter, page).await
    }

    /// Lists the active children of a folder, or the root level when
    /// `parent_id` is `None`, in sibling order.
    pub async fn list_children(
        &self,
        space_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> AppResult<Vec<Node>> {
        self.node_repo.list_children(space_id, parent_id).await
    }

    /// Lists the nodes a user put in the trash.
    pub async fn list_trash(&self, space_id: Option<i64>) -> AppResult<Vec<Node>> {
        self.node_repo.list_trash(space_id).await
    }

    /// Whether the trash holds anything that was deleted directly beneath
    /// this node.
    pub async fn has_deleted_children(&self, id: i64) -> AppResult<bool> {
        self.node_repo.has_deleted_children(id).await
    }

    /// Finds an active folder by its exact title.
    pub async fn find_by_exact_folder_name(
        &self,
        space_id: Option<i64>,
        name: &str,
    ) -> AppResult<Option<Node>> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        self.node_repo.find_folder_by_title(space_id, name).await
    }

    /// Finds the node imported from `path`.
    ///
    /// An exact `source_metadata.path` match wins. Otherwise the last path
    /// segment is matched against the tail of stored source paths, which
    /// finds content whose import root moved.
    pub async fn find_by_source_path(
        &self,
        path: &str,
        scope: Option<SourceScope>,
    ) -> AppResult<Option<Node>> {
        if path.is_empty() {
            return Ok(None);
        }
        if let Some(node) = self.node_repo.find_by_exact_source_path(path, scope).await? {
            return Ok(Some(node));
        }
        match source_file_name(path) {
            Some(name) => self.node_repo.find_by_source_file_name(name, scope).await,
            None => Ok(None),
        }
    }

    /// Applies `write` only if its version is newer than the stored one.
    ///
    /// Returns `None` when the stored version is equal or newer. This is not
    /// an error; the caller's write simply lost.
    pub async fn update_doc(&self, id: i64, write: &DocWrite) -> AppResult<Option<Node>> {
        let updated = self.node_repo.update_if_newer(id, write).await?;
        match &updated {
            Some(node) => info!(node_id = id, version = node.version, "Node content updated"),
            None => debug!(
                node_id = id,
                incoming = write.version,
                "Content write not newer, skipped"
            ),
        }
        Ok(updated)
    }

    /// Applies `write` only if the stored version still equals
    /// `expected_version`, writing `expected_version + 1`.
    ///
    /// The row is locked for the duration of the check, so two writers with
    /// the same expected version cannot both succeed.
    pub async fn update_doc_if_version(
        &self,
        id: i64,
        expected_version: i64,
        write: &DocWrite,
    ) -> AppResult<CasOutcome> {
        let mut tx = self.node_repo.begin().await?;

        let current = NodeRepository::lock_by_id(&mut tx, id).await?;
        match current {
            Some(node) if node.version == expected_version => {}
            other => {
                NodeRepository::rollback(tx).await?;
                debug!(
                    node_id = id,
                    expected_version,
                    found = ?other.map(|n| n.version),
                    "Version conflict"
                );
                return Ok(CasOutcome::Conflict);
            }
        }

        let node = NodeRepository::write_content(&mut tx, id, write, expected_version + 1).await?;
        NodeRepository::commit(tx).await?;

        info!(node_id = id, version = node.version, "Node content updated");
        Ok(CasOutcome::Updated(node))
    }

    /// Changes only the title in the content metadata. Slug, jrn, and path
    /// stay as they are.
    pub async fn rename_title_only(&self, id: i64, title: &str) -> AppResult<Node> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Title must not be empty"));
        }
        let node = self
            .node_repo
            .rename_title(id, title)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;

        info!(node_id = id, title, "Node renamed");
        Ok(node)
    }
}
