//! Node (folder or document) domain entities.

pub mod kind;
pub mod model;
pub mod placement;
pub mod update;

pub use kind::{DeleteState, DocType};
pub use model::{NewNode, Node};
pub use placement::Placement;
pub use update::{CasOutcome, DocWrite, SourceScope};
