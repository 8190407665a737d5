//! Renumbering of sibling groups with colliding sort orders.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing;

use doctree_database::repositories::{NodeRepository, SiblingRow};

use super::{PassError, RepairPass};

/// New sort orders for every sibling group in `rows`.
///
/// Each group is renumbered `1.0, 2.0, ..` in its current `(sort_order, id)`
/// order, which keeps the visible order and separates ties by id. Rows that
/// already hold their new value are left out.
pub fn plan_renumber(rows: &[SiblingRow]) -> Vec<(i64, f64)> {
    let mut groups: BTreeMap<(Option<i64>, Option<i64>), Vec<&SiblingRow>> = BTreeMap::new();
    for row in rows {
        groups.entry((row.space_id, row.parent_id)).or_default().push(row);
    }

    let mut planned = Vec::new();
    for siblings in groups.values_mut() {
        siblings.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        for (index, row) in siblings.iter().enumerate() {
            let order = (index + 1) as f64;
            if row.sort_order != order {
                planned.push((row.id, order));
            }
        }
    }
    planned
}

/// Renumbers sibling groups where two active nodes share a sort order.
#[derive(Debug)]
pub struct SortOrderDedupePass {
    /// Node repository
    node_repo: Arc<NodeRepository>,
}

impl SortOrderDedupePass {
    /// Create a new sort order dedupe pass
    pub fn new(node_repo: Arc<NodeRepository>) -> Self {
        Self { node_repo }
    }
}

#[async_trait]
impl RepairPass for SortOrderDedupePass {
    fn name(&self) -> &str {
        "dedupe_sort_orders"
    }

    async fn run(&self) -> Result<u64, PassError> {
        let rows = self
            .node_repo
            .duplicate_sibling_groups()
            .await
            .map_err(PassError::Scan)?;
        let planned = plan_renumber(&rows);
        if planned.is_empty() {
            return Ok(0);
        }

        let mut tx = self.node_repo.begin().await?;
        let updated = NodeRepository::set_sort_orders(&mut tx, &planned).await?;
        NodeRepository::commit(tx).await?;

        tracing::debug!(rows = updated, "Sibling sort orders renumbered");
        Ok(updated)
    }
}
