//! Unified application error types for doctree.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested node, parent, reference, or target was not found.
    NotFound,
    /// A structural move was rejected (see [`MoveRejection`]).
    InvalidMove,
    /// A move/reorder reference is not a sibling in the requested scope.
    ReferenceNotInScope,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// A store error occurred while a multi-step mutation was in flight.
    Transaction,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::InvalidMove => write!(f, "INVALID_MOVE"),
            Self::ReferenceNotInScope => write!(f, "REFERENCE_NOT_IN_SCOPE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Transaction => write!(f, "TRANSACTION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The reason a move was refused.
///
/// Carried as the source of an [`ErrorKind::InvalidMove`] (or, for a missing
/// target, [`ErrorKind::NotFound`]) error so that callers can tell the user
/// exactly why the action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MoveRejection {
    /// The node was asked to become its own parent.
    #[error("cannot move a node into itself")]
    SelfMove,
    /// The target folder is a descendant of the folder being moved.
    #[error("cannot move a folder into one of its descendants")]
    CyclicMove,
    /// The target folder does not exist.
    #[error("target folder not found")]
    TargetNotFound,
    /// The target exists but is a document.
    #[error("target is not a folder")]
    TargetNotFolder,
    /// The target folder is in the trash.
    #[error("target folder is deleted")]
    TargetDeleted,
    /// The target folder belongs to another space.
    #[error("target folder is in another space")]
    CrossSpace,
}

/// The unified application error used throughout doctree.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire library boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an error for a rejected move.
    ///
    /// A missing target is reported as [`ErrorKind::NotFound`]; every other
    /// rejection is [`ErrorKind::InvalidMove`].
    pub fn invalid_move(rejection: MoveRejection) -> Self {
        let kind = match rejection {
            MoveRejection::TargetNotFound => ErrorKind::NotFound,
            _ => ErrorKind::InvalidMove,
        };
        Self::with_source(kind, rejection.to_string(), rejection)
    }

    /// Create an error for a reference that is not a sibling in scope.
    pub fn reference_not_in_scope(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceNotInScope, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Return the move rejection carried by this error, if any.
    pub fn move_rejection(&self) -> Option<MoveRejection> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<MoveRejection>())
            .copied()
    }

    /// Check whether this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        // Opaque sources cannot be cloned; the move rejection is kept.
        let source = self
            .move_rejection()
            .map(|r| Box::new(r) as Box<dyn std::error::Error + Send + Sync>);
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
