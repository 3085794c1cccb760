//! Error types for codegrade-report

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during grading or report persistence
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer outcomes were supplied than the policy promises; this is an
    /// operational error, not a grading signal
    #[error("Outcome shortfall: expected {expected} outcomes, got {actual}")]
    OutcomeShortfall {
        /// Outcomes the policy promises
        expected: usize,
        /// Outcomes actually supplied
        actual: usize,
    },

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
