//! # doctree-entity
//!
//! Domain entity models for doctree. [`node::Node`] represents a row of the
//! `docs` table; the remaining types are value objects passed to and
//! returned from tree and document operations. Database entities derive
//! `sqlx::FromRow`.

pub mod node;

pub use node::{
    CasOutcome, DeleteState, DocType, DocWrite, NewNode, Node, Placement, SourceScope,
};
