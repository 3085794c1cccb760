//! Code wellness analysis.
//!
//! A [`WellnessAnalyzer`] inspects the submission and reports findings
//! bucketed by category. The stock implementation shells out to pylint;
//! [`FixedAnalyzer`] is a deterministic double for tests.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

/// Findings from one analysis pass
#[derive(Debug, Clone, Default)]
pub struct WellnessFindings {
    /// Finding messages keyed by category name
    pub by_category: BTreeMap<String, Vec<String>>,
    /// Messages meaning the analyzer could not fully process the file;
    /// recorded in the report but never a deduction
    pub fatal: Vec<String>,
}

impl WellnessFindings {
    /// Finding counts per category, as the grade computer consumes them
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.by_category
            .iter()
            .map(|(category, messages)| (category.clone(), messages.len()))
            .collect()
    }

    fn push(&mut self, category: &str, message: String) {
        if category == "fatal" {
            self.fatal.push(message);
        } else {
            self.by_category
                .entry(category.to_string())
                .or_default()
                .push(message);
        }
    }
}

/// Strategy for producing wellness findings over a submission
pub trait WellnessAnalyzer: Send + Sync {
    /// Analyze one submission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Collaborator`] when the analyzer tool cannot be run
    /// at all.
    fn analyze(&self, submission: &Path) -> Result<WellnessFindings>;
}

/// Pylint-backed analyzer using its parseable one-line-per-finding format
#[derive(Debug, Clone, Copy, Default)]
pub struct PylintAnalyzer;

impl PylintAnalyzer {
    /// Map a pylint message-id letter to its category name
    fn category_of(letter: char) -> Option<&'static str> {
        match letter {
            'C' => Some("convention"),
            'R' => Some("refactor"),
            'W' => Some("warning"),
            'E' => Some("error"),
            'F' => Some("fatal"),
            _ => None,
        }
    }

    /// Parse parseable-format output: `file:line: [X0000(...), ...] message`
    fn parse(output: &str) -> WellnessFindings {
        let mut findings = WellnessFindings::default();
        for line in output.lines() {
            let Some(bracket) = line.find(": [") else {
                continue;
            };
            let Some(letter) = line[bracket + 3..].chars().next() else {
                continue;
            };
            if let Some(category) = Self::category_of(letter) {
                findings.push(category, line.trim().to_string());
            }
        }
        findings
    }
}

impl WellnessAnalyzer for PylintAnalyzer {
    fn analyze(&self, submission: &Path) -> Result<WellnessFindings> {
        // Exit status is a findings bitmask, not a health signal; only a
        // spawn failure is operational
        let output = Command::new("pylint")
            .arg("-f")
            .arg("parseable")
            .arg("-r")
            .arg("n")
            .arg(submission)
            .output()
            .map_err(|err| Error::Collaborator(format!("pylint did not run: {err}")))?;
        let text = String::from_utf8_lossy(&output.stdout);
        let findings = Self::parse(&text);
        log::debug!(
            "pylint reported {} categories for {}",
            findings.by_category.len(),
            submission.display()
        );
        Ok(findings)
    }
}

/// Analyzer double that returns preset findings
#[derive(Debug, Clone, Default)]
pub struct FixedAnalyzer {
    findings: WellnessFindings,
}

impl FixedAnalyzer {
    /// An analyzer that reports nothing
    #[must_use]
    pub fn clean() -> Self {
        Self::default()
    }

    /// Add `count` findings in `category`
    #[must_use]
    pub fn with_findings(mut self, category: &str, count: usize) -> Self {
        for n in 0..count {
            self.findings
                .push(category, format!("{category} finding {n}"));
        }
        self
    }

    /// Add a fatal message
    #[must_use]
    pub fn with_fatal(mut self, message: &str) -> Self {
        self.findings.fatal.push(message.to_string());
        self
    }
}

impl WellnessAnalyzer for FixedAnalyzer {
    fn analyze(&self, _submission: &Path) -> Result<WellnessFindings> {
        Ok(self.findings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYLINT_OUTPUT: &str = "\
sub.py:1: [C0114(missing-module-docstring), ] Missing module docstring
sub.py:3: [C0103(invalid-name), f] Constant name \"x\" doesn't conform to UPPER_CASE naming style
sub.py:7: [W0612(unused-variable), f] Unused variable 'y'
sub.py:9: [E1101(no-member), f] Instance of 'int' has no 'append' member
";

    #[test]
    fn test_parse_buckets_by_category() {
        let findings = PylintAnalyzer::parse(PYLINT_OUTPUT);
        assert_eq!(findings.counts().get("convention"), Some(&2));
        assert_eq!(findings.counts().get("warning"), Some(&1));
        assert_eq!(findings.counts().get("error"), Some(&1));
        assert!(findings.fatal.is_empty());
    }

    #[test]
    fn test_parse_fatal_goes_to_fatal_bucket() {
        let findings =
            PylintAnalyzer::parse("sub.py:1: [F0001(fatal), ] error while code parsing\n");
        assert!(findings.by_category.is_empty());
        assert_eq!(findings.fatal.len(), 1);
    }

    #[test]
    fn test_parse_ignores_noise_lines() {
        let findings = PylintAnalyzer::parse("************* Module sub\n\nYour code has been rated\n");
        assert!(findings.by_category.is_empty());
        assert!(findings.fatal.is_empty());
    }

    #[test]
    fn test_fixed_analyzer() {
        let analyzer = FixedAnalyzer::clean().with_findings("convention", 3);
        let findings = analyzer.analyze(Path::new("unused.py")).expect("analyze");
        assert_eq!(findings.counts().get("convention"), Some(&3));
    }

    #[test]
    fn test_fixed_analyzer_fatal() {
        let analyzer = FixedAnalyzer::clean().with_fatal("cannot parse");
        let findings = analyzer.analyze(Path::new("unused.py")).expect("analyze");
        assert_eq!(findings.fatal, vec!["cannot parse"]);
    }
}
