//! Core traits defined in `doctree-core` and implemented by other crates.

pub mod repository;

pub use repository::Repository;
