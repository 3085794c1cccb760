//! Error types for codegrade-spec

use thiserror::Error;

/// Result type alias for specification operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or validating a specification
#[derive(Debug, Error)]
pub enum Error {
    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown value type tag in the schema
    #[error("Unknown value type: {0}")]
    UnknownType(String),

    /// A schema invariant does not hold
    #[error("Invalid specification: {0}")]
    Validation(String),

    /// A test-case literal cannot be cast to its declared type
    #[error("Literal {literal:?} cannot be cast to {ty}")]
    BadLiteral {
        /// The offending literal text
        literal: String,
        /// Target type tag
        ty: &'static str,
    },

    /// Submission file exceeds the configured size limit
    #[error("Submission is {size} bytes, limit is {limit} bytes")]
    SubmissionTooLarge {
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },
}
