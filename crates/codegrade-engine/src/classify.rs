//! Outcome classification.
//!
//! Turns the raw facts of a supervised run into one of the five outcomes.
//! Precedence: deadline miss, then signal death, then the harness verdict
//! line. Anything else is inconclusive and never graded.

use crate::supervise::RunRecord;
use codegrade_spec::{ClassifiedOutcome, Outcome};

/// Verdict-line prefix for a pass
const PASS_PREFIX: &str = "PASSED -";
/// Verdict-line prefix for a fail
const FAIL_PREFIX: &str = "FAILED -";

/// Classify one run record
#[must_use]
pub fn classify(record: &RunRecord) -> ClassifiedOutcome {
    if record.timed_out {
        return ClassifiedOutcome::new(
            Outcome::TimedOut,
            format!("killed after {:.3}s", record.duration.as_secs_f64()),
        );
    }
    if let Some(signal) = record.signal {
        return ClassifiedOutcome::new(
            Outcome::Crashed,
            format!("terminated by signal {signal}"),
        );
    }

    let verdict = record.output.lines().next().unwrap_or("");
    let diagnostic = record.output.trim_end().to_string();
    if verdict.starts_with(PASS_PREFIX) {
        ClassifiedOutcome::new(Outcome::Passed, diagnostic)
    } else if verdict.starts_with(FAIL_PREFIX) {
        ClassifiedOutcome::new(Outcome::Failed, diagnostic)
    } else {
        log::warn!("unrecognized harness verdict: {verdict:?}");
        ClassifiedOutcome::new(Outcome::Inconclusive, diagnostic)
    }
}
