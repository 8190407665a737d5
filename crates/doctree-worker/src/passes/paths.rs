//! Materialized path backfill.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tracing;

use doctree_database::repositories::{NodeRepository, PathRow};
use doctree_service::tree::build_path;

use super::{PassError, RepairPass};

/// Paths to write for rows whose path is empty.
///
/// Walks top down from every row without a known parent so that a child's
/// path is always built from its parent's stored or freshly planned path.
/// Rows without a slug are skipped along with everything beneath them
/// until their slug is backfilled.
pub fn plan_path_backfill(rows: &[PathRow]) -> Vec<(i64, String)> {
    let known: HashSet<i64> = rows.iter().map(|r| r.id).collect();
    let mut children: HashMap<i64, Vec<&PathRow>> = HashMap::new();
    let mut worklist: VecDeque<(&PathRow, Option<String>)> = VecDeque::new();

    for row in rows {
        match row.parent_id.filter(|p| known.contains(p)) {
            Some(parent_id) => children.entry(parent_id).or_default().push(row),
            None => worklist.push_back((row, None)),
        }
    }

    let mut planned = Vec::new();
    let mut visited = HashSet::new();
    while let Some((row, parent_path)) = worklist.pop_front() {
        if !visited.insert(row.id) || row.slug.is_empty() {
            continue;
        }
        let path = if row.path.is_empty() {
            let path = build_path(parent_path.as_deref(), &row.slug);
            planned.push((row.id, path.clone()));
            path
        } else {
            row.path.clone()
        };
        for child in children.get(&row.id).into_iter().flatten() {
            worklist.push_back((child, Some(path.clone())));
        }
    }
    planned
}

/// Fills empty materialized paths from the parent chain.
#[derive(Debug)]
pub struct PathBackfillPass {
    /// Node repository
    node_repo: Arc<NodeRepository>,
}

impl PathBackfillPass {
    /// Create a new path backfill pass
    pub fn new(node_repo: Arc<NodeRepository>) -> Self {
        Self { node_repo }
    }
}

#[async_trait]
impl RepairPass for PathBackfillPass {
    fn name(&self) -> &str {
        "backfill_paths"
    }

    async fn run(&self) -> Result<u64, PassError> {
        let rows = self.node_repo.path_rows().await.map_err(PassError::Scan)?;
        let planned = plan_path_backfill(&rows);
        if planned.is_empty() {
            return Ok(0);
        }

        let mut tx = self.node_repo.begin().await?;
        for (id, path) in &planned {
            NodeRepository::set_path_in(&mut tx, *id, path).await?;
        }
        NodeRepository::commit(tx).await?;

        tracing::debug!(rows = planned.len(), "Paths backfilled");
        Ok(planned.len() as u64)
    }
}
