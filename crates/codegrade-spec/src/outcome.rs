//! Outcome vocabulary shared by the engine and the grade computer.

use serde::{Deserialize, Serialize};

/// Classified result of one test-case execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The harness reported a matching return value
    Passed,
    /// The harness reported a mismatch or an uncaught fault
    Failed,
    /// The child process exceeded its time budget
    TimedOut,
    /// The child process died from a signal
    Crashed,
    /// Infrastructure-level ambiguity; never a quality signal
    Inconclusive,
}

impl Outcome {
    /// Whether this outcome deducts from the running score.
    ///
    /// Crashed and TimedOut grade identically to Failed. Inconclusive is
    /// operational ambiguity and never affects the score.
    #[must_use]
    pub const fn counts_against_grade(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut | Self::Crashed)
    }

    /// Whether this outcome is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// An outcome plus its diagnostic payload (captured output or error detail)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedOutcome {
    /// The classified outcome
    pub outcome: Outcome,
    /// Captured output or error detail
    pub diagnostic: String,
}

impl ClassifiedOutcome {
    /// Build a classified outcome
    #[must_use]
    pub fn new(outcome: Outcome, diagnostic: impl Into<String>) -> Self {
        Self {
            outcome,
            diagnostic: diagnostic.into(),
        }
    }
}
