//! Evaluation pipeline.
//!
//! Drives one submission through the gate phases in order: signature,
//! compile, wellness, tests. A failed gate grades the run at zero; an
//! operational fault (a collaborator that would not run, a harness that
//! could not be generated or spawned) leaves the grade indeterminate
//! instead of pretending the submission earned a score.

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::harness::HarnessGenerator;
use crate::runtime::{runtime_for, LanguageRuntime};
use crate::signature::verify_signature;
use crate::supervise::run_supervised;
use crate::wellness::{PylintAnalyzer, WellnessAnalyzer};
use codegrade_report::{Grade, GradeReport, GradeValue, PhaseStatus};
use codegrade_spec::{ClassifiedOutcome, Specification, TestCase};
use std::fs;
use std::path::Path;

/// Where the pipeline stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Submission accepted, nothing checked yet
    Start,
    /// Signature verified
    SignatureChecked,
    /// Compile gate passed
    CompileChecked,
    /// Wellness deductions applied
    WellnessApplied,
    /// Test outcomes applied
    TestsApplied,
    /// Terminal: a grade was produced
    Graded,
    /// Terminal: an operational fault left the grade indeterminate
    Error,
}

/// Result of one pipeline run
#[derive(Debug)]
pub struct Evaluation {
    /// The complete report
    pub report: GradeReport,
    /// Terminal phase, [`Phase::Graded`] or [`Phase::Error`]
    pub phase: Phase,
    /// Final grade value
    pub grade: GradeValue,
}

impl Evaluation {
    /// Whether the run produced a grade
    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.phase == Phase::Graded
    }
}

/// One-submission evaluation driver
pub struct EvaluationPipeline<'a> {
    spec: &'a Specification,
    runtime: Box<dyn LanguageRuntime>,
    analyzer: Box<dyn WellnessAnalyzer>,
    jobs: usize,
}

impl<'a> EvaluationPipeline<'a> {
    /// Build a pipeline with the stock runtime and analyzer for the
    /// specification's language.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedLanguage`] for an unknown language tag.
    pub fn new(spec: &'a Specification) -> Result<Self> {
        let runtime = runtime_for(&spec.language)?;
        Ok(Self::with_runtime(spec, runtime))
    }

    /// Build a pipeline around an explicit runtime strategy
    #[must_use]
    pub fn with_runtime(spec: &'a Specification, runtime: Box<dyn LanguageRuntime>) -> Self {
        Self {
            spec,
            runtime,
            analyzer: Box::new(PylintAnalyzer),
            jobs: 1,
        }
    }

    /// Replace the wellness analyzer
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Box<dyn WellnessAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Run test cases on up to `jobs` worker threads
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Evaluate one submission.
    ///
    /// Gate failures and operational faults are reported inside the
    /// returned [`Evaluation`].
    ///
    /// # Errors
    ///
    /// Returns an error only when the submission itself cannot be read.
    pub fn evaluate(&self, submission: &Path) -> Result<Evaluation> {
        let mut report =
            GradeReport::begin(&self.spec.contract.name, submission, &self.spec.language)?;
        let grade = Grade::new(self.spec.policy.grade_max);

        if let Err(err) = self.spec.check_submission_size(submission) {
            return Ok(self.operational(report, err.to_string()));
        }
        let source = fs::read_to_string(submission)?;
        log::info!(
            "evaluating {} against '{}'",
            submission.display(),
            self.spec.contract.name
        );

        // Signature gate
        if let Err(failure) = verify_signature(&source, &self.spec.contract) {
            report.parse_check = Some(PhaseStatus::fail(failure.to_string()));
            return Ok(self.graded(report, grade.zeroed()));
        }
        report.parse_check = Some(PhaseStatus::pass(String::new()));
        log::debug!("phase complete: signature");

        // Compile gate
        match self.runtime.compile_command(submission).output() {
            Err(err) => {
                return Ok(self.operational(report, format!("compiler did not run: {err}")));
            }
            Ok(output) if !output.status.success() => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                report.compile = Some(PhaseStatus::fail(text.trim_end().to_string()));
                return Ok(self.graded(report, grade.zeroed()));
            }
            Ok(_) => {
                report.compile = Some(PhaseStatus::pass(String::new()));
            }
        }
        log::debug!("phase complete: compile");

        // Wellness deductions
        let findings = match self.analyzer.analyze(submission) {
            Ok(findings) => findings,
            Err(err) => return Ok(self.operational(report, err.to_string())),
        };
        report.wellness = findings.by_category.clone();
        if !findings.fatal.is_empty() {
            // Recorded for the reader; fatal findings never deduct
            report
                .wellness
                .insert("fatal".to_string(), findings.fatal.clone());
        }
        let grade = grade.apply_wellness(&self.spec.policy, &findings.counts());
        log::debug!("phase complete: wellness, score {:.2}", grade.points());

        // Test cases
        let outcomes = match self.run_tests(submission) {
            Ok(outcomes) => outcomes,
            Err(err) => return Ok(self.operational(report, err.to_string())),
        };
        report.testrun = outcomes.clone();
        let grade = match grade.apply_outcomes(&self.spec.policy.tests, &outcomes) {
            Ok(grade) => grade,
            Err(err) => return Ok(self.operational(report, err.to_string())),
        };
        log::debug!("phase complete: tests, score {:.2}", grade.points());

        Ok(self.graded(report, grade))
    }

    fn run_tests(&self, submission: &Path) -> Result<Vec<ClassifiedOutcome>> {
        if self.spec.cases.is_empty() {
            return Ok(Vec::new());
        }
        let generator = HarnessGenerator::new(self.runtime.as_ref(), submission)?;
        if self.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|err| Error::Collaborator(format!("worker pool: {err}")))?;
            pool.install(|| {
                use rayon::prelude::*;
                self.spec
                    .cases
                    .par_iter()
                    .enumerate()
                    .map(|(index, case)| self.run_one(&generator, index, case))
                    .collect()
            })
        } else {
            self.spec
                .cases
                .iter()
                .enumerate()
                .map(|(index, case)| self.run_one(&generator, index, case))
                .collect()
        }
    }

    fn run_one(
        &self,
        generator: &HarnessGenerator<'_>,
        index: usize,
        case: &TestCase,
    ) -> Result<ClassifiedOutcome> {
        let harness = generator.write_harness(index)?;
        let payload = generator.payload(&self.spec.contract, case)?;
        let json = HarnessGenerator::payload_json(&payload)?;
        let record = run_supervised(
            self.runtime.run_command(&harness),
            &json,
            self.spec.policy.tests.timeout(),
        )?;
        let classified = classify(&record);
        log::debug!("test {index}: {:?}", classified.outcome);
        Ok(classified)
    }

    fn graded(&self, mut report: GradeReport, grade: Grade) -> Evaluation {
        let value = grade.value();
        report.grade = value.render(grade.ceiling());
        log::info!("graded: {}", report.grade);
        Evaluation {
            report,
            phase: Phase::Graded,
            grade: value,
        }
    }

    fn operational(&self, mut report: GradeReport, detail: String) -> Evaluation {
        report.grade = GradeValue::Indeterminate.render(self.spec.policy.grade_max);
        log::error!("evaluation not gradable: {detail}");
        Evaluation {
            report,
            phase: Phase::Error,
            grade: GradeValue::Indeterminate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::StubRuntime;
    use crate::wellness::FixedAnalyzer;
    use codegrade_spec::Outcome;

    const SPEC_YAML: &str = r#"
codespec:
  language: 'python'
  function: 'add_one'
  argcount: 1
  argnames: [n]
  argtypes: [integer]
  returntype: [integer]
evalspec:
  grademax: 100
  wellness:
    convention:
      maxhit: 10
      error: 1
  testcases:
    maxhit: 100
    count: 3
    timeout: 5
    input:
      - [0]
      - [1]
      - [2]
    output:
      - 1
      - 2
      - 3
"#;

    const PASS_SCRIPT: &str = "echo 'PASSED - Expected : 1 - Received : 1'\n";
    const FAIL_SCRIPT: &str = "echo 'FAILED - Expected : 1 - Received : 0'\nexit 1\n";

    fn spec() -> Specification {
        Specification::from_yaml(SPEC_YAML).expect("valid spec")
    }

    fn submission(dir: &Path, text: &str) -> std::path::PathBuf {
        let path = dir.join("sub.py");
        fs::write(&path, text).expect("write submission");
        path
    }

    fn pipeline<'a>(spec: &'a Specification, script: &str) -> EvaluationPipeline<'a> {
        EvaluationPipeline::with_runtime(spec, Box::new(StubRuntime::new(script)))
            .with_analyzer(Box::new(FixedAnalyzer::clean()))
    }

    #[test]
    fn test_all_pass_full_marks() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def add_one(n):\n    return n + 1\n");
        let eval = pipeline(&spec, PASS_SCRIPT).evaluate(&sub).expect("run");
        assert!(eval.is_graded());
        assert_eq!(eval.report.grade, "100.00/100.00");
        assert_eq!(eval.report.testrun.len(), 3);
    }

    #[test]
    fn test_all_fail_zero() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def add_one(n):\n    return n\n");
        let eval = pipeline(&spec, FAIL_SCRIPT).evaluate(&sub).expect("run");
        assert!(eval.is_graded());
        assert_eq!(eval.report.grade, "0.00/100.00");
    }

    #[test]
    fn test_signature_failure_grades_zero_without_running_tests() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def wrong_name(n):\n    return n + 1\n");
        let eval = pipeline(&spec, PASS_SCRIPT).evaluate(&sub).expect("run");
        assert!(eval.is_graded());
        assert_eq!(eval.report.grade, "0.00/100.00");
        assert!(eval.report.testrun.is_empty());
        assert!(eval.report.compile.is_none());
    }

    #[test]
    fn test_compile_failure_grades_zero() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def add_one(n):\n    return n + 1\n");
        let runtime = StubRuntime::new(PASS_SCRIPT).failing_compile();
        let eval = EvaluationPipeline::with_runtime(&spec, Box::new(runtime))
            .with_analyzer(Box::new(FixedAnalyzer::clean()))
            .evaluate(&sub)
            .expect("run");
        assert!(eval.is_graded());
        assert_eq!(eval.report.grade, "0.00/100.00");
        assert!(eval.report.testrun.is_empty());
    }

    #[test]
    fn test_wellness_deduction_capped() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def add_one(n):\n    return n + 1\n");
        let eval = EvaluationPipeline::with_runtime(&spec, Box::new(StubRuntime::new(PASS_SCRIPT)))
            .with_analyzer(Box::new(FixedAnalyzer::clean().with_findings("convention", 25)))
            .evaluate(&sub)
            .expect("run");
        // 25 findings at 1 point each, capped at 10
        assert_eq!(eval.report.grade, "90.00/100.00");
    }

    #[test]
    fn test_fatal_finding_recorded_and_grading_continues() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def add_one(n):\n    return n + 1\n");
        let eval = EvaluationPipeline::with_runtime(&spec, Box::new(StubRuntime::new(PASS_SCRIPT)))
            .with_analyzer(Box::new(FixedAnalyzer::clean().with_fatal("cannot parse")))
            .evaluate(&sub)
            .expect("run");
        assert!(eval.is_graded());
        assert_eq!(eval.report.grade, "100.00/100.00");
        assert_eq!(
            eval.report.wellness.get("fatal"),
            Some(&vec!["cannot parse".to_string()])
        );
    }

    #[test]
    fn test_unreadable_verdict_never_deducts() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def add_one(n):\n    return n + 1\n");
        let eval = pipeline(&spec, "echo gibberish\n").evaluate(&sub).expect("run");
        assert!(eval.is_graded());
        assert_eq!(eval.report.grade, "100.00/100.00");
        assert_eq!(eval.report.testrun.len(), 3);
        assert!(eval
            .report
            .testrun
            .iter()
            .all(|o| o.outcome == Outcome::Inconclusive));
    }

    #[test]
    fn test_missing_submission_is_err() {
        let spec = spec();
        let result = pipeline(&spec, PASS_SCRIPT).evaluate(Path::new("/nonexistent/sub.py"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let spec = spec();
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = submission(dir.path(), "def add_one(n):\n    return n + 1\n");
        // Pass only when the first argument is 1
        let script = "if grep -q '\"value\":\"1\",' ; then\n\
                      echo 'PASSED - Expected : 2 - Received : 2'\n\
                      else\n\
                      echo 'FAILED - Expected : x - Received : y'\nexit 1\n\
                      fi\n";
        let sequential = pipeline(&spec, script).evaluate(&sub).expect("run");
        let parallel = pipeline(&spec, script)
            .with_jobs(3)
            .evaluate(&sub)
            .expect("run");
        assert_eq!(sequential.report.grade, parallel.report.grade);
        let seq: Vec<_> = sequential.report.testrun.iter().map(|o| o.outcome).collect();
        let par: Vec<_> = parallel.report.testrun.iter().map(|o| o.outcome).collect();
        assert_eq!(seq, par);
    }
}
