//! Grading policy: how findings and test outcomes turn into deductions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Deduction rule for one wellness category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellnessRule {
    /// Cap on the total deduction this category may cause
    pub max_deduction: f64,
    /// Deduction per reported issue
    pub per_issue_penalty: f64,
}

/// Policy for the test-case phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestPolicy {
    /// Cap on the total deduction the test phase may cause
    pub max_deduction: f64,
    /// Number of test cases the specification promises
    pub expected_count: usize,
    /// Per-test execution budget in seconds
    pub timeout_secs: f64,
}

impl TestPolicy {
    /// Per-test execution budget
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Deduction applied per failed test case
    #[must_use]
    pub fn per_test_weight(&self) -> f64 {
        if self.expected_count == 0 {
            0.0
        } else {
            self.max_deduction / self.expected_count as f64
        }
    }
}

/// Complete grading policy for one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPolicy {
    /// Grade ceiling; the score starts here and only goes down
    pub grade_max: f64,
    /// Deduction rules keyed by wellness category name
    pub wellness: BTreeMap<String, WellnessRule>,
    /// Test-case phase policy
    pub tests: TestPolicy,
}

impl EvaluationPolicy {
    /// Declared wellness category names, in deterministic order
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.wellness.keys().cloned().collect()
    }
}
