//! Codegrade Report
//!
//! Grade accumulation and report generation: the immutable grade value that
//! moves through deduction phases, and the evaluation report persisted as
//! YAML alongside the submission.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod error;
pub mod grade;
pub mod report;

pub use error::{Error, Result};
pub use grade::{Grade, GradeValue};
pub use report::{submission_digest, CheckStatus, GradeReport, PhaseStatus};
