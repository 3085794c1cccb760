//! Error types for codegrade-engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or supervising an evaluation
#[derive(Debug, Error)]
pub enum Error {
    /// The requested language has no registered runtime strategy
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A collaborator tool (static analyzer, compiler front end) failed to
    /// run at all; this is operational, not a quality finding
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Harness payload serialization error
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Specification-level error surfaced during evaluation
    #[error(transparent)]
    Spec(#[from] codegrade_spec::Error),

    /// Grading or report error surfaced during evaluation
    #[error(transparent)]
    Report(#[from] codegrade_report::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
