//! Startup maintenance for doctree.
//!
//! This crate provides:
//! - A [`MigrationSweeper`] that runs every repair pass once, in order
//! - Repair passes that backfill slugs, jrns, and paths left empty by
//!   legacy imports, and renumber sibling groups with colliding sort orders
//!
//! Passes are independent: one failing pass is logged and recorded in the
//! [`SweepReport`] while the remaining passes still run.

pub mod passes;
pub mod sweeper;

pub use passes::{PassError, RepairPass};
pub use sweeper::{MigrationSweeper, SweepReport};
