//! Grade report: incremental per-phase record, persisted as YAML and
//! rendered to the console.

use crate::error::Result;
use chrono::{DateTime, Utc};
use codegrade_spec::ClassifiedOutcome;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Pass/fail marker for a gate phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The gate passed
    Pass,
    /// The gate failed
    Fail,
}

impl CheckStatus {
    /// Lowercase display form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Status and diagnostic text for one gate phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStatus {
    /// Pass or fail
    pub status: CheckStatus,
    /// Diagnostic output for the phase
    pub output: String,
}

impl PhaseStatus {
    /// A passing phase
    #[must_use]
    pub fn pass(output: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            output: output.into(),
        }
    }

    /// A failing phase
    #[must_use]
    pub fn fail(output: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            output: output.into(),
        }
    }
}

/// The complete record of one evaluation run.
///
/// Built incrementally across phases; never mutated after the pipeline
/// terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Target function name from the contract
    pub function: String,
    /// Submission file path
    pub filename: String,
    /// Submission language tag
    pub language: String,
    /// SHA-256 digest of the submission, for reproducibility
    pub submission_sha256: String,
    /// When this report was produced
    pub generated_at: DateTime<Utc>,
    /// Signature verification phase
    #[serde(rename = "parsecheck", skip_serializing_if = "Option::is_none")]
    pub parse_check: Option<PhaseStatus>,
    /// Compile gate phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile: Option<PhaseStatus>,
    /// Wellness findings per category, as supplied by the collaborator
    #[serde(default)]
    pub wellness: BTreeMap<String, Vec<String>>,
    /// Per-test outcome and diagnostic
    #[serde(default)]
    pub testrun: Vec<ClassifiedOutcome>,
    /// Formatted final grade: `<score>/<ceiling>` or `None`
    pub grade: String,
}

impl GradeReport {
    /// Start a report for one submission.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the submission cannot be read for digesting.
    pub fn begin(function: &str, submission: &Path, language: &str) -> Result<Self> {
        Ok(Self {
            function: function.to_string(),
            filename: submission.display().to_string(),
            language: language.to_string(),
            submission_sha256: submission_digest(submission)?,
            generated_at: Utc::now(),
            parse_check: None,
            compile: None,
            wellness: BTreeMap::new(),
            testrun: Vec::new(),
            grade: String::new(),
        })
    }

    /// Save the report as `grade_report_<stem>.yaml` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save_yaml(&self, dir: &Path) -> Result<PathBuf> {
        let stem = Path::new(&self.filename)
            .file_stem()
            .map_or_else(|| "submission".to_string(), |s| s.to_string_lossy().to_string());
        let path = dir.join(format!("grade_report_{stem}.yaml"));
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&path, yaml)?;
        log::info!("grade report written to {}", path.display());
        Ok(path)
    }

    /// Render the framed console report: header, then one section per
    /// recorded phase.
    #[must_use]
    pub fn render_console(&self) -> String {
        let line = "-".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "{line}");
        let _ = writeln!(out, "Report");
        let _ = writeln!(out, "{line}");
        let _ = writeln!(out, "Filename : {}", self.filename);
        let _ = writeln!(out, "Language : {}", self.language);
        let _ = writeln!(out, "Function : {}", self.function);
        let _ = writeln!(out, "Grade    : {}", self.grade);
        let _ = writeln!(out, "{line}");
        if let Some(status) = &self.parse_check {
            let _ = writeln!(out, "Parse Check    : {}", status.status.as_str());
            let _ = writeln!(out, "\tOutput : {}", status.output);
            let _ = writeln!(out, "{line}");
        }
        if let Some(status) = &self.compile {
            let _ = writeln!(out, "Compile Check  : {}", status.status.as_str());
            let _ = writeln!(out, "\tOutput : {}", status.output);
            let _ = writeln!(out, "{line}");
        }
        if !self.wellness.is_empty() {
            let _ = writeln!(out, "Wellness");
            for (category, messages) in &self.wellness {
                let _ = writeln!(out, "\t{category}  :");
                for message in messages {
                    let _ = writeln!(out, "\t\t{message}");
                }
            }
            let _ = writeln!(out, "{line}");
        }
        if !self.testrun.is_empty() {
            let _ = writeln!(out, "Test Report");
            for (index, entry) in self.testrun.iter().enumerate() {
                let _ = writeln!(out, "\t{}", "-".repeat(42));
                let _ = writeln!(out, "\tTest [{}], {}", index + 1, entry.diagnostic);
            }
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

/// SHA-256 digest of a file, hex encoded.
///
/// # Errors
///
/// Returns an IO error when the file cannot be read.
pub fn submission_digest(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}
