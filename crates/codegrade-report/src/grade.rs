//! Grade accumulation.
//!
//! The grade is an immutable value threaded through the phases: each phase
//! takes a [`Grade`] and returns a new one. The score starts at the policy
//! ceiling and is strictly non-increasing.

use crate::error::{Error, Result};
use codegrade_spec::{ClassifiedOutcome, EvaluationPolicy, TestPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Final grade value: points in `[0, ceiling]`, or Indeterminate when the
/// pipeline could not complete. Indeterminate is never coerced to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GradeValue {
    /// A computed score
    Points(f64),
    /// The pipeline hit an operational error before a score existed
    Indeterminate,
}

impl GradeValue {
    /// Render the `<score>/<ceiling>` display form, or `None` when
    /// indeterminate. Scores round to two decimals.
    #[must_use]
    pub fn render(&self, ceiling: f64) -> String {
        match self {
            Self::Points(p) => format!("{:.2}/{:.2}", round2(*p), round2(ceiling)),
            Self::Indeterminate => "None".to_string(),
        }
    }
}

impl fmt::Display for GradeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Points(p) => write!(f, "{:.2}", round2(*p)),
            Self::Indeterminate => f.write_str("None"),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Running grade accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    ceiling: f64,
    score: f64,
}

impl Grade {
    /// Start a grade at the policy ceiling
    #[must_use]
    pub fn new(ceiling: f64) -> Self {
        Self {
            ceiling,
            score: ceiling,
        }
    }

    /// Current score
    #[must_use]
    pub fn points(&self) -> f64 {
        self.score
    }

    /// The ceiling this grade started from
    #[must_use]
    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    /// Collapse the grade to zero (signature or compile gate failure)
    #[must_use]
    pub fn zeroed(self) -> Self {
        Self {
            score: 0.0,
            ..self
        }
    }

    /// The grade as a final value
    #[must_use]
    pub fn value(&self) -> GradeValue {
        GradeValue::Points(self.score)
    }

    /// Apply the wellness phase.
    ///
    /// For each category the policy declares, the deduction is
    /// `min(max_deduction, per_issue_penalty * issue_count)`, applied
    /// sequentially and clamped at zero. Categories absent from `counts`
    /// deduct nothing.
    #[must_use]
    pub fn apply_wellness(self, policy: &EvaluationPolicy, counts: &BTreeMap<String, usize>) -> Self {
        let mut score = self.score;
        for (category, rule) in &policy.wellness {
            let issues = counts.get(category).copied().unwrap_or(0);
            let deduction = (rule.per_issue_penalty * issues as f64).min(rule.max_deduction);
            if score > deduction {
                score -= deduction;
            } else {
                score = 0.0;
            }
            log::debug!("wellness {category}: {issues} issues, deduction {deduction:.2}");
        }
        Self { score, ..self }
    }

    /// Apply the test phase.
    ///
    /// Each Failed, TimedOut or Crashed outcome deducts
    /// `max_deduction / expected_count`; once the score clamps to zero no
    /// further weight is considered. Passed and Inconclusive never deduct.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutcomeShortfall`] when fewer outcomes are supplied
    /// than the policy promises; that is an operational error, not grading.
    pub fn apply_outcomes(
        self,
        tests: &TestPolicy,
        outcomes: &[ClassifiedOutcome],
    ) -> Result<Self> {
        if tests.expected_count == 0 {
            return Ok(self);
        }
        if outcomes.len() < tests.expected_count {
            return Err(Error::OutcomeShortfall {
                expected: tests.expected_count,
                actual: outcomes.len(),
            });
        }
        let weight = tests.per_test_weight();
        let mut score = self.score;
        for classified in outcomes {
            if !classified.outcome.counts_against_grade() {
                continue;
            }
            if score > weight {
                score -= weight;
            } else {
                score = 0.0;
                break;
            }
        }
        Ok(Self { score, ..self })
    }
}
