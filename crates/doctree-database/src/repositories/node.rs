//! Node repository implementation.
//!
//! Methods taking `&self` run on the pool. Associated functions taking a
//! `&mut PgConnection` are meant to be called on an open transaction
//! (`&mut *tx`) so that multi-row tree mutations commit or roll back as one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};

use doctree_core::error::{AppError, ErrorKind};
use doctree_core::result::AppResult;
use doctree_core::traits::Repository;
use doctree_core::types::pagination::{PageRequest, PageResponse};
use doctree_entity::node::{DocType, DocWrite, Node, SourceScope};

/// A fully resolved row ready for insertion.
///
/// Every derived field (`jrn`, `slug`, `path`, `sort_order`) has already been
/// computed by the caller.
#[derive(Debug, Clone)]
pub struct InsertNode {
    pub jrn: String,
    pub slug: String,
    pub path: String,
    pub doc_type: DocType,
    pub space_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub sort_order: f64,
    pub content: String,
    pub content_type: String,
    pub content_metadata: Option<Value>,
    pub source_metadata: Option<Value>,
}

/// Filters for [`NodeRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    /// Only nodes whose jrn starts with this prefix.
    pub jrn_prefix: Option<String>,
    /// Only nodes in this space.
    pub space_id: Option<i64>,
    /// Hide nodes whose jrn starts with this prefix.
    pub exclude_jrn_prefix: Option<String>,
}

/// The subset of columns needed to rebuild materialized paths.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PathRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub slug: String,
    pub path: String,
}

/// The subset of columns needed to repair sibling ordering.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SiblingRow {
    pub id: i64,
    pub space_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub sort_order: f64,
}

/// Repository for node CRUD, tree queries, and versioned content writes.
#[derive(Debug, Clone)]
pub struct NodeRepository {
    pool: PgPool,
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

fn tx_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Transaction, message, e)
}

impl NodeRepository {
    /// Create a new node repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a transaction on the pool.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(tx_err("Failed to begin transaction"))
    }

    /// Commit a transaction opened with [`NodeRepository::begin`].
    pub async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(tx_err("Failed to commit transaction"))
    }

    /// Roll back a transaction opened with [`NodeRepository::begin`].
    pub async fn rollback(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.rollback()
            .await
            .map_err(tx_err("Failed to roll back transaction"))
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Find a node by ID, deleted or not.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM docs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find node"))
    }

    /// Find a node by its resource identifier.
    pub async fn find_by_jrn(&self, jrn: &str) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM docs WHERE jrn = $1")
            .bind(jrn)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find node by jrn"))
    }

    /// Find every node whose jrn is in the given list. Unknown jrns are
    /// skipped.
    pub async fn find_many_by_jrns(&self, jrns: &[String]) -> AppResult<Vec<Node>> {
        if jrns.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Node>("SELECT * FROM docs WHERE jrn = ANY($1) ORDER BY id ASC")
            .bind(jrns.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to find nodes by jrns"))
    }

    /// Load the stored paths of the given nodes in one round trip.
    pub async fn find_paths(&self, ids: &[i64]) -> AppResult<Vec<(i64, String)>> {
        sqlx::query_as::<_, (i64, String)>("SELECT id, path FROM docs WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to load node paths"))
    }

    /// List active nodes with optional jrn prefix and space filters.
    pub async fn list(
        &self,
        filter: &NodeFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Node>> {
        const WHERE: &str = "WHERE deleted_at IS NULL \
             AND ($1::text IS NULL OR starts_with(jrn, $1)) \
             AND ($2::bigint IS NULL OR space_id = $2) \
             AND ($3::text IS NULL OR NOT starts_with(jrn, $3))";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM docs {WHERE}"))
            .bind(filter.jrn_prefix.as_deref())
            .bind(filter.space_id)
            .bind(filter.exclude_jrn_prefix.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count nodes"))?;

        let nodes = sqlx::query_as::<_, Node>(&format!(
            "SELECT * FROM docs {WHERE} ORDER BY path ASC, id ASC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.jrn_prefix.as_deref())
        .bind(filter.space_id)
        .bind(filter.exclude_jrn_prefix.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list nodes"))?;

        Ok(PageResponse::new(nodes, page, total.max(0) as u64))
    }

    /// List active children of a parent (or root) in sibling order.
    pub async fn list_children(
        &self,
        space_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs \
             WHERE space_id IS NOT DISTINCT FROM $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND deleted_at IS NULL \
             ORDER BY sort_order ASC, id ASC",
        )
        .bind(space_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list children"))
    }

    /// List explicitly deleted nodes of a space, newest deletion first.
    pub async fn list_trash(&self, space_id: Option<i64>) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs \
             WHERE space_id IS NOT DISTINCT FROM $1 \
             AND deleted_at IS NOT NULL AND explicitly_deleted \
             ORDER BY deleted_at DESC, id DESC",
        )
        .bind(space_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list trash"))
    }

    /// Highest `sort_order` among active siblings, if there are any.
    pub async fn max_sort_order(
        &self,
        space_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> AppResult<Option<f64>> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT MAX(sort_order) FROM docs \
             WHERE space_id IS NOT DISTINCT FROM $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND deleted_at IS NULL",
        )
        .bind(space_id)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to read max sort order"))
    }

    /// Whether any direct child of the node sits in the trash.
    pub async fn has_deleted_children(&self, id: i64) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM docs \
                WHERE parent_id = $1 AND deleted_at IS NOT NULL AND explicitly_deleted \
             )",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to check deleted children"))
    }

    /// Find an active folder whose title matches exactly.
    pub async fn find_folder_by_title(
        &self,
        space_id: Option<i64>,
        title: &str,
    ) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs \
             WHERE doc_type = 'folder' AND deleted_at IS NULL \
             AND content_metadata ->> 'title' = $2 \
             AND ($1::bigint IS NULL OR space_id = $1) \
             ORDER BY id ASC LIMIT 1",
        )
        .bind(space_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find folder by name"))
    }

    /// Find an active node imported from exactly this source path.
    pub async fn find_by_exact_source_path(
        &self,
        path: &str,
        scope: Option<SourceScope>,
    ) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs \
             WHERE deleted_at IS NULL AND source_metadata ->> 'path' = $1 \
             AND ($2::text IS NULL OR source_metadata ->> 'integrationId' = $2) \
             ORDER BY id ASC LIMIT 1",
        )
        .bind(path)
        .bind(scope.map(|s| s.integration_id.to_string()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find node by source path"))
    }

    /// Find an active node whose source path ends with this file name.
    pub async fn find_by_source_file_name(
        &self,
        file_name: &str,
        scope: Option<SourceScope>,
    ) -> AppResult<Option<Node>> {
        let suffix = format!("/{file_name}");
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs \
             WHERE deleted_at IS NULL \
             AND (source_metadata ->> 'path' = $1 \
                  OR right(source_metadata ->> 'path', length($2)) = $2) \
             AND ($3::text IS NULL OR source_metadata ->> 'integrationId' = $3) \
             ORDER BY id ASC LIMIT 1",
        )
        .bind(file_name)
        .bind(&suffix)
        .bind(scope.map(|s| s.integration_id.to_string()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find node by source file name"))
    }

    // ── Single-statement writes ──────────────────────────────────

    /// Insert a fully resolved node.
    pub async fn create(&self, data: &InsertNode) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "INSERT INTO docs (jrn, slug, path, doc_type, space_id, parent_id, sort_order, \
                content, content_type, content_metadata, source_metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(&data.jrn)
        .bind(&data.slug)
        .bind(&data.path)
        .bind(data.doc_type)
        .bind(data.space_id)
        .bind(data.parent_id)
        .bind(data.sort_order)
        .bind(&data.content)
        .bind(&data.content_type)
        .bind(&data.content_metadata)
        .bind(&data.source_metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("docs_jrn_key") => {
                AppError::conflict(format!("Node jrn '{}' already exists", data.jrn))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create node", e),
        })
    }

    /// Apply a content write only if its version is newer than the stored
    /// one. Returns `None` when the stored row is missing or not older.
    pub async fn update_if_newer(&self, id: i64, write: &DocWrite) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(
            "UPDATE docs SET content = $2, content_type = $3, content_metadata = $4, \
                version = $5, updated_at = NOW() \
             WHERE id = $1 AND version < $5 RETURNING *",
        )
        .bind(id)
        .bind(&write.content)
        .bind(&write.content_type)
        .bind(&write.content_metadata)
        .bind(write.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update node content"))
    }

    /// Replace the title in the content metadata. Slug and path stay as they
    /// are.
    pub async fn rename_title(&self, id: i64, title: &str) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>(
            "UPDATE docs SET \
                content_metadata = jsonb_set(COALESCE(content_metadata, '{}'::jsonb), \
                    '{title}', to_jsonb($2::text)), \
                version = version + 1, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to rename node"))
    }

    // ── Repair queries ───────────────────────────────────────────

    /// Nodes stored without a slug.
    pub async fn find_missing_slugs(&self) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM docs WHERE slug = '' ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to find nodes without slug"))
    }

    /// Nodes stored without a jrn but with a slug to derive one from.
    pub async fn find_missing_jrns(&self) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs WHERE jrn = '' AND slug <> '' ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find nodes without jrn"))
    }

    /// Every node's hierarchy columns, for path rebuilding.
    pub async fn path_rows(&self) -> AppResult<Vec<PathRow>> {
        sqlx::query_as::<_, PathRow>("SELECT id, parent_id, slug, path FROM docs ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to load path rows"))
    }

    /// Active siblings of every sibling group that contains at least one
    /// duplicated `sort_order`.
    pub async fn duplicate_sibling_groups(&self) -> AppResult<Vec<SiblingRow>> {
        sqlx::query_as::<_, SiblingRow>(
            "SELECT id, space_id, parent_id, sort_order FROM ( \
                SELECT id, space_id, parent_id, sort_order, \
                       MAX(n) OVER (PARTITION BY space_id, parent_id) AS worst \
                FROM ( \
                    SELECT id, space_id, parent_id, sort_order, \
                           COUNT(*) OVER (PARTITION BY space_id, parent_id, sort_order) AS n \
                    FROM docs WHERE deleted_at IS NULL \
                ) counted \
             ) grouped \
             WHERE worst > 1 \
             ORDER BY space_id ASC NULLS FIRST, parent_id ASC NULLS FIRST, sort_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find duplicate sort orders"))
    }

    /// Set a node's slug.
    pub async fn set_slug(&self, id: i64, slug: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE docs SET slug = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to set slug"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Set a node's jrn.
    pub async fn set_jrn(&self, id: i64, jrn: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE docs SET jrn = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(jrn)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.constraint() == Some("docs_jrn_key") =>
                {
                    AppError::conflict(format!("Node jrn '{jrn}' already exists"))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to set jrn", e),
            })?;
        Ok(result.rows_affected() > 0)
    }

    // ── Transaction-scoped helpers ───────────────────────────────

    /// Find a node by ID on an open connection.
    pub async fn find_by_id_in(conn: &mut PgConnection, id: i64) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM docs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(tx_err("Failed to find node"))
    }

    /// Read a node and hold its row lock until the transaction ends.
    pub async fn lock_by_id(conn: &mut PgConnection, id: i64) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM docs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(tx_err("Failed to lock node"))
    }

    /// All direct children of a node, deleted or not.
    pub async fn children_in(conn: &mut PgConnection, parent_id: i64) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs WHERE parent_id = $1 ORDER BY sort_order ASC, id ASC",
        )
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(tx_err("Failed to load children"))
    }

    /// Active siblings under a parent (or root) on an open connection, in
    /// sibling order.
    pub async fn siblings_in(
        conn: &mut PgConnection,
        space_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "SELECT * FROM docs \
             WHERE space_id IS NOT DISTINCT FROM $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND deleted_at IS NULL \
             ORDER BY sort_order ASC, id ASC",
        )
        .bind(space_id)
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(tx_err("Failed to load siblings"))
    }

    /// Move a node: new parent, path, and sort order, with a version bump.
    pub async fn update_placement(
        conn: &mut PgConnection,
        id: i64,
        parent_id: Option<i64>,
        path: &str,
        sort_order: f64,
    ) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "UPDATE docs SET parent_id = $2, path = $3, sort_order = $4, \
                version = version + 1, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .bind(path)
        .bind(sort_order)
        .fetch_optional(&mut *conn)
        .await
        .map_err(tx_err("Failed to move node"))?
        .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Rewrite a descendant's path after an ancestor moved.
    pub async fn update_path(
        conn: &mut PgConnection,
        id: i64,
        path: &str,
        bump_version: bool,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE docs SET path = $2, \
                version = version + CASE WHEN $3 THEN 1 ELSE 0 END, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(path)
        .bind(bump_version)
        .execute(&mut *conn)
        .await
        .map_err(tx_err("Failed to rewrite descendant path"))?;
        Ok(())
    }

    /// Change only a node's sibling position.
    pub async fn update_sort_order(
        conn: &mut PgConnection,
        id: i64,
        sort_order: f64,
    ) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "UPDATE docs SET sort_order = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(sort_order)
        .fetch_optional(&mut *conn)
        .await
        .map_err(tx_err("Failed to reorder node"))?
        .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Renumber a batch of siblings.
    pub async fn set_sort_orders(
        conn: &mut PgConnection,
        updates: &[(i64, f64)],
    ) -> AppResult<u64> {
        let ids: Vec<i64> = updates.iter().map(|(id, _)| *id).collect();
        let orders: Vec<f64> = updates.iter().map(|(_, order)| *order).collect();
        let result = sqlx::query(
            "UPDATE docs SET sort_order = u.sort_order, updated_at = NOW() \
             FROM UNNEST($1::bigint[], $2::float8[]) AS u(id, sort_order) \
             WHERE docs.id = u.id",
        )
        .bind(ids)
        .bind(orders)
        .execute(&mut *conn)
        .await
        .map_err(tx_err("Failed to renumber siblings"))?;
        Ok(result.rows_affected())
    }

    /// Mark a node as the direct target of a delete.
    ///
    /// A node already deleted on its own keeps its original `deleted_at`.
    pub async fn mark_explicitly_deleted(
        conn: &mut PgConnection,
        id: i64,
        at: DateTime<Utc>,
    ) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "UPDATE docs SET \
                deleted_at = CASE WHEN explicitly_deleted AND deleted_at IS NOT NULL \
                    THEN deleted_at ELSE $2 END, \
                explicitly_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(tx_err("Failed to delete node"))?
        .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Cascade a delete onto descendants, skipping the ones that were
    /// trashed on their own.
    pub async fn mark_cascade_deleted(
        conn: &mut PgConnection,
        ids: &[i64],
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE docs SET deleted_at = $2, explicitly_deleted = FALSE, updated_at = NOW() \
             WHERE id = ANY($1) AND (NOT explicitly_deleted OR deleted_at IS NULL)",
        )
        .bind(ids.to_vec())
        .bind(at)
        .execute(&mut *conn)
        .await
        .map_err(tx_err("Failed to cascade delete"))?;
        Ok(result.rows_affected())
    }

    /// Bring a node back with a recomputed parent and path. A `sort_order`
    /// of `None` keeps the stored position.
    pub async fn restore_row(
        conn: &mut PgConnection,
        id: i64,
        parent_id: Option<i64>,
        path: &str,
        sort_order: Option<f64>,
    ) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "UPDATE docs SET deleted_at = NULL, explicitly_deleted = FALSE, \
                parent_id = $2, path = $3, sort_order = COALESCE($4, sort_order), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .bind(path)
        .bind(sort_order)
        .fetch_optional(&mut *conn)
        .await
        .map_err(tx_err("Failed to restore node"))?
        .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Write content with an explicit version.
    pub async fn write_content(
        conn: &mut PgConnection,
        id: i64,
        write: &DocWrite,
        version: i64,
    ) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "UPDATE docs SET content = $2, content_type = $3, content_metadata = $4, \
                version = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&write.content)
        .bind(&write.content_type)
        .bind(&write.content_metadata)
        .bind(version)
        .fetch_optional(&mut *conn)
        .await
        .map_err(tx_err("Failed to write node content"))?
        .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    /// Set a node's path on an open connection (repair only, no version
    /// bump).
    pub async fn set_path_in(conn: &mut PgConnection, id: i64, path: &str) -> AppResult<()> {
        Self::update_path(conn, id, path, false).await
    }
}

#[async_trait]
impl Repository<Node, i64> for NodeRepository {
    async fn find_by_id(&self, id: &i64) -> AppResult<Option<Node>> {
        NodeRepository::find_by_id(self, *id).await
    }

    async fn find_many(&self, ids: &[i64]) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM docs WHERE id = ANY($1) ORDER BY id ASC")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to find nodes"))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Node>> {
        self.list(&NodeFilter::default(), page).await
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM docs WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count nodes"))?;
        Ok(count as u64)
    }
}
