//! Core type definitions used across the doctree workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
