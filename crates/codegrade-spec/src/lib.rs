//! Codegrade Specification
//!
//! Data model for automated single-function grading: the function contract a
//! submission must match, the grading policy, the test cases, and the outcome
//! vocabulary shared by the engine and the grade computer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod contract;
pub mod error;
pub mod loader;
pub mod outcome;
pub mod policy;
pub mod value;

pub use contract::{FunctionContract, Parameter};
pub use error::{Error, Result};
pub use loader::{Specification, TestCase};
pub use outcome::{ClassifiedOutcome, Outcome};
pub use policy::{EvaluationPolicy, TestPolicy, WellnessRule};
pub use value::ValueType;
