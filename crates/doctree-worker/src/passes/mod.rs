//! Repair pass trait and implementations.

pub mod identifiers;
pub mod paths;
pub mod sort_order;

use async_trait::async_trait;

use doctree_core::error::AppError;

pub use identifiers::{JrnBackfillPass, SlugBackfillPass};
pub use paths::{PathBackfillPass, plan_path_backfill};
pub use sort_order::{SortOrderDedupePass, plan_renumber};

/// A single, idempotent data repair.
#[async_trait]
pub trait RepairPass: Send + Sync + std::fmt::Debug {
    /// Name used in logs and in the sweep report.
    fn name(&self) -> &str;

    /// Run the repair and return the number of rows fixed.
    async fn run(&self) -> Result<u64, PassError>;
}

/// Error from a repair pass
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    /// The pass could not read the rows it needs to inspect.
    #[error("Repair scan failed: {0}")]
    Scan(#[source] AppError),

    /// Writing a repaired row failed.
    #[error("Repair write failed: {0}")]
    Write(#[from] AppError),
}
