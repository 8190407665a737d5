//! Repository implementations for doctree entities.

pub mod node;

pub use node::{InsertNode, NodeFilter, NodeRepository, PathRow, SiblingRow};
