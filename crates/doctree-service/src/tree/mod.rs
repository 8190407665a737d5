//! Tree structure: paths, sibling ordering, ancestry, and mutations.

pub mod ancestry;
pub mod cascade;
pub mod ordering;
pub mod path;
pub mod service;
pub mod slug;

pub use ancestry::AncestryChecker;
pub use ordering::{ReferenceNotSibling, SiblingSlot};
pub use path::build_path;
pub use service::TreeService;
