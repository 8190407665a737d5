//! # doctree-core
//!
//! Core crate for doctree. Contains the unified error system, configuration
//! schemas, the generic repository trait, and pagination types.
//!
//! This crate has **no** internal dependencies on other doctree crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, MoveRejection};
pub use result::AppResult;
