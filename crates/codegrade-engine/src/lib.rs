//! Codegrade Engine
//!
//! The evaluation machinery: signature verification, per-language runtime
//! strategies, harness synthesis, supervised out-of-process execution,
//! outcome classification, wellness analysis, and the pipeline that drives
//! one submission through all of it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod classify;
pub mod error;
pub mod harness;
pub mod pipeline;
pub mod process;
pub mod runtime;
pub mod signature;
pub mod supervise;
pub mod wellness;

pub use classify::classify;
pub use error::{Error, Result};
pub use harness::{HarnessGenerator, HarnessPayload, TypedLiteral};
pub use pipeline::{Evaluation, EvaluationPipeline, Phase};
pub use process::ProcessGuard;
pub use runtime::{runtime_for, LanguageRuntime, PythonRuntime, StubRuntime, HARNESS_VERSION};
pub use signature::{verify_signature, SignatureFailure};
pub use supervise::{run_supervised, RunRecord};
pub use wellness::{FixedAnalyzer, PylintAnalyzer, WellnessAnalyzer, WellnessFindings};
