//! One-shot repair sweep run at startup.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing;

use doctree_core::config::TreeConfig;
use doctree_database::repositories::NodeRepository;

use crate::passes::{
    JrnBackfillPass, PathBackfillPass, RepairPass, SlugBackfillPass, SortOrderDedupePass,
};

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Rows fixed per pass, in run order.
    pub repaired: Vec<(String, u64)>,
    /// Passes that failed.
    pub failed: Vec<String>,
}

impl SweepReport {
    /// Rows fixed by the named pass, if it succeeded.
    pub fn repaired_by(&self, pass: &str) -> Option<u64> {
        self.repaired
            .iter()
            .find(|(name, _)| name == pass)
            .map(|(_, count)| *count)
    }

    /// Total rows fixed across all passes.
    pub fn total_repaired(&self) -> u64 {
        self.repaired.iter().map(|(_, count)| count).sum()
    }

    /// Whether every pass completed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs the repair passes one after another.
#[derive(Debug)]
pub struct MigrationSweeper {
    /// Passes in run order
    passes: Vec<Arc<dyn RepairPass>>,
}

impl MigrationSweeper {
    /// Create a sweeper with the standard passes.
    ///
    /// Slugs are backfilled first since jrns and paths are derived from
    /// them.
    pub fn new(node_repo: Arc<NodeRepository>, config: &TreeConfig) -> Self {
        Self::with_passes(vec![
            Arc::new(SlugBackfillPass::new(
                Arc::clone(&node_repo),
                config.slug_suffix_len,
            )),
            Arc::new(JrnBackfillPass::new(Arc::clone(&node_repo))),
            Arc::new(PathBackfillPass::new(Arc::clone(&node_repo))),
            Arc::new(SortOrderDedupePass::new(node_repo)),
        ])
    }

    /// Create a sweeper with custom passes
    pub fn with_passes(passes: Vec<Arc<dyn RepairPass>>) -> Self {
        Self { passes }
    }

    /// Run every pass once. A failing pass is logged and skipped.
    pub async fn run(&self) -> SweepReport {
        let started = Instant::now();
        let mut report = SweepReport::default();

        for pass in &self.passes {
            match pass.run().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(pass = pass.name(), repaired = count, "Repair pass fixed rows");
                    } else {
                        tracing::debug!(pass = pass.name(), "Repair pass found nothing to fix");
                    }
                    report.repaired.push((pass.name().to_string(), count));
                }
                Err(e) => {
                    tracing::warn!(pass = pass.name(), error = %e, "Repair pass failed");
                    report.failed.push(pass.name().to_string());
                }
            }
        }

        tracing::info!(
            repaired = report.total_repaired(),
            failed = report.failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Migration sweep complete"
        );
        report
    }
}
