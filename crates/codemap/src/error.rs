//! Error types for codemap operations.
//!
//! Errors are split along the same line the rest of the crate draws:
//!
//! - **`Error`**: Failures that stop an operation (I/O, unreadable code maps,
//!   bad configuration)
//! - **`ValidationError`**: Structural problems in a persisted code map,
//!   reported with enough context to find the offending element
//!
//! ## Error Philosophy
//!
//! Query methods never fail. Asking for the callers of a symbol that does not
//! exist, or searching with a pattern that matches nothing, yields an empty
//! result. Only operations that touch the outside world (loading, saving,
//! reading facts or configuration) return `Result`.
//!
//! Imprecise input from a fact producer (unknown edge endpoints, duplicate
//! edges, colliding qualified names) is normalized rather than rejected.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for codemap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for codemap operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be parsed as JSON at all
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required file does not exist
    #[error("{what} not found: {}", path.display())]
    NotFound {
        /// What was being looked for (e.g. "code map", "fact file")
        what: &'static str,
        /// Where it was expected
        path: PathBuf,
    },

    /// A code map failed schema validation
    #[error("code map validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// A query named a symbol that is not in the graph
    #[error("symbol not found: {0}")]
    UnknownSymbol(String),
}

impl Error {
    /// Returns `true` if this error means a file or symbol was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownSymbol(_))
    }
}

/// Structural defect found while validating a code map document.
///
/// `context` names the element that failed: `"code map"` for the top-level
/// object, `"symbols[3]"` or `"dependencies[0].locations[1]"` for nested ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The document root is not a JSON object
    #[error("code map must be a JSON object, found {found}")]
    NotAMapping {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// A required key is absent
    #[error("missing required field '{field}' in {context}")]
    MissingField {
        /// Name of the missing key
        field: String,
        /// Element that should have carried it
        context: String,
    },

    /// A key is present but holds the wrong JSON type
    #[error("field '{field}' in {context} must be {expected}, found {found}")]
    WrongType {
        /// Name of the offending key
        field: String,
        /// Element containing the key
        context: String,
        /// Expected JSON type
        expected: &'static str,
        /// JSON type that was found
        found: &'static str,
    },

    /// A key has the right type but an unacceptable value
    #[error("field '{field}' in {context} has invalid value {value:?}: {reason}")]
    InvalidValue {
        /// Name of the offending key
        field: String,
        /// Element containing the key
        context: String,
        /// The rejected value, rendered as text
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ValidationError {
    /// Name of the field this error is about, if it concerns a single field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NotAMapping { .. } => None,
            Self::MissingField { field, .. }
            | Self::WrongType { field, .. }
            | Self::InvalidValue { field, .. } => Some(field),
        }
    }
}
