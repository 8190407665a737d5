//! # doctree-service
//!
//! Business logic for the document tree. [`TreeService`] owns every
//! structural mutation (create, move, reorder, soft delete, restore);
//! [`DocumentService`] owns reads, lookups, and versioned content writes.
//!
//! Services follow constructor injection: the repository is provided at
//! construction time via an `Arc`.

pub mod document;
pub mod tree;

pub use document::{DocumentService, ListQuery};
pub use tree::{AncestryChecker, TreeService};
