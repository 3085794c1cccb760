//! Codegrade CLI
//!
//! Library side of the command line: loads the specification, drives the
//! pipeline, persists the report, and maps the outcome to an exit code.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::doc_markdown)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use codegrade_engine::{Evaluation, EvaluationPipeline, Result};
use codegrade_spec::Specification;
use std::path::{Path, PathBuf};

/// Exit code for a completed, graded run
pub const EXIT_GRADED: i32 = 0;
/// Exit code for an operational failure (grade indeterminate)
pub const EXIT_OPERATIONAL: i32 = 1;

/// Load and validate a specification file.
///
/// # Errors
///
/// Returns the underlying specification error.
pub fn load_specification(path: &Path) -> Result<Specification> {
    Ok(Specification::from_path(path)?)
}

/// Evaluate one submission and persist the report.
///
/// The report lands in `report_dir` when given, otherwise next to the
/// submission.
///
/// # Errors
///
/// Returns an error when the submission cannot be read or the report cannot
/// be written.
pub fn run_evaluation(
    pipeline: &EvaluationPipeline<'_>,
    submission: &Path,
    report_dir: Option<&Path>,
) -> Result<Evaluation> {
    let evaluation = pipeline.evaluate(submission)?;
    let dir = report_dir.map_or_else(
        || {
            submission
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        },
        Path::to_path_buf,
    );
    evaluation.report.save_yaml(&dir).map_err(codegrade_engine::Error::Report)?;
    Ok(evaluation)
}

/// Exit code for a finished evaluation
#[must_use]
pub fn exit_code(evaluation: &Evaluation) -> i32 {
    if evaluation.is_graded() {
        EXIT_GRADED
    } else {
        EXIT_OPERATIONAL
    }
}

/// Initialize logging; each `-v` raises the level by one step.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegrade_engine::{FixedAnalyzer, StubRuntime};
    use std::fs;

    const SPEC_YAML: &str = r#"
codespec:
  language: 'python'
  function: 'double'
  argcount: 1
  argnames: [n]
  argtypes: [integer]
  returntype: [integer]
evalspec:
  grademax: 100
  testcases:
    maxhit: 100
    count: 2
    timeout: 5
    input:
      - [1]
      - [2]
    output:
      - 2
      - 4
"#;

    const PASS_SCRIPT: &str = "echo 'PASSED - Expected : 2 - Received : 2'\n";

    fn stub_pipeline(spec: &Specification) -> EvaluationPipeline<'_> {
        EvaluationPipeline::with_runtime(spec, Box::new(StubRuntime::new(PASS_SCRIPT)))
            .with_analyzer(Box::new(FixedAnalyzer::clean()))
    }

    #[test]
    fn test_load_specification() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("spec.yaml");
        fs::write(&path, SPEC_YAML).expect("write spec");
        let spec = load_specification(&path).expect("load");
        assert_eq!(spec.contract.name, "double");
    }

    #[test]
    fn test_load_specification_missing_file() {
        assert!(load_specification(Path::new("/nonexistent/spec.yaml")).is_err());
    }

    #[test]
    fn test_run_evaluation_writes_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("sub.py");
        fs::write(&sub, "def double(n):\n    return n * 2\n").expect("write submission");
        let spec = Specification::from_yaml(SPEC_YAML).expect("valid spec");

        let evaluation =
            run_evaluation(&stub_pipeline(&spec), &sub, None).expect("evaluation");
        assert_eq!(exit_code(&evaluation), EXIT_GRADED);
        assert_eq!(evaluation.report.grade, "100.00/100.00");
        assert!(dir.path().join("grade_report_sub.yaml").exists());
    }

    #[test]
    fn test_run_evaluation_honors_report_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reports = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("sub.py");
        fs::write(&sub, "def double(n):\n    return n * 2\n").expect("write submission");
        let spec = Specification::from_yaml(SPEC_YAML).expect("valid spec");

        run_evaluation(&stub_pipeline(&spec), &sub, Some(reports.path())).expect("evaluation");
        assert!(reports.path().join("grade_report_sub.yaml").exists());
        assert!(!dir.path().join("grade_report_sub.yaml").exists());
    }

    #[test]
    fn test_unreadable_verdicts_still_grade() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("sub.py");
        fs::write(&sub, "def double(n):\n    return n * 2\n").expect("write submission");
        let spec = Specification::from_yaml(SPEC_YAML).expect("valid spec");
        let pipeline =
            EvaluationPipeline::with_runtime(&spec, Box::new(StubRuntime::new("echo noise\n")))
                .with_analyzer(Box::new(FixedAnalyzer::clean()));

        let evaluation = run_evaluation(&pipeline, &sub, None).expect("evaluation");
        assert_eq!(exit_code(&evaluation), EXIT_GRADED);
        assert_eq!(evaluation.report.grade, "100.00/100.00");
    }

    #[test]
    fn test_operational_run_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("sub.py");
        fs::write(&sub, "def double(n):\n    return n * 2\n").expect("write submission");
        let mut spec = Specification::from_yaml(SPEC_YAML).expect("valid spec");
        spec.file_size_limit_mb = 0;
        let pipeline = stub_pipeline(&spec);

        let evaluation = run_evaluation(&pipeline, &sub, None).expect("evaluation");
        assert_eq!(exit_code(&evaluation), EXIT_OPERATIONAL);
        assert_eq!(evaluation.report.grade, "None");
    }
}
