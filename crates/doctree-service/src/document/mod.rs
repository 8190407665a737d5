//! Document reads, lookups, and versioned content writes.

pub mod lookup;
pub mod service;

pub use lookup::{ListQuery, source_file_name};
pub use service::DocumentService;
