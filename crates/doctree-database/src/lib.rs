//! # doctree-database
//!
//! PostgreSQL connection management, the schema migration runner, and the
//! node repository backing the document tree.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::NodeRepository;
