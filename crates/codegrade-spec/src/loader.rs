//! YAML specification loader.
//!
//! Parses the `codespec`/`evalspec` schema and normalizes it into a
//! validated [`Specification`].

use crate::contract::{FunctionContract, Parameter};
use crate::error::{Error, Result};
use crate::policy::{EvaluationPolicy, TestPolicy, WellnessRule};
use crate::value::ValueType;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default submission size limit in megabytes
const DEFAULT_FILE_SIZE_LIMIT_MB: u64 = 10;
/// Default grade ceiling when `grademax` is absent
const DEFAULT_GRADE_MAX: f64 = 100.0;
/// Default test-phase deduction cap when `maxhit` is absent
const DEFAULT_TEST_MAX_DEDUCTION: f64 = 100.0;
/// Default per-test budget in seconds when `timeout` is absent
const DEFAULT_TEST_TIMEOUT_SECS: f64 = 1.0;

/// One test case: literal argument texts plus the expected literal output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Ordered argument literals, cast per the contract at harness time
    pub args: Vec<String>,
    /// Expected return literal, cast per the contract's return type
    pub expected: String,
}

/// A fully validated evaluation specification
#[derive(Debug, Clone)]
pub struct Specification {
    /// Submission language tag (selects the runtime strategy)
    pub language: String,
    /// Submission size limit in megabytes
    pub file_size_limit_mb: u64,
    /// Required function shape
    pub contract: FunctionContract,
    /// Grading policy
    pub policy: EvaluationPolicy,
    /// Test cases, exactly `policy.tests.expected_count` of them
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct RawSpec {
    codespec: RawCodeSpec,
    evalspec: RawEvalSpec,
}

#[derive(Debug, Deserialize)]
struct RawCodeSpec {
    filesizelimit: Option<u64>,
    language: String,
    function: String,
    #[serde(default)]
    argcount: usize,
    #[serde(default)]
    argnames: Vec<String>,
    #[serde(default)]
    argtypes: Vec<String>,
    returntype: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvalSpec {
    grademax: Option<f64>,
    #[serde(default)]
    wellness: BTreeMap<String, RawWellnessRule>,
    testcases: Option<RawTestCases>,
}

#[derive(Debug, Deserialize)]
struct RawWellnessRule {
    maxhit: f64,
    error: f64,
}

#[derive(Debug, Deserialize)]
struct RawTestCases {
    maxhit: Option<f64>,
    #[serde(default)]
    count: usize,
    timeout: Option<f64>,
    #[serde(default)]
    input: Vec<serde_yaml::Value>,
    #[serde(default)]
    output: Vec<serde_yaml::Value>,
}

impl Specification {
    /// Load and validate a specification from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a YAML error on malformed input or [`Error::Validation`] when
    /// a schema invariant does not hold.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let raw: RawSpec = serde_yaml::from_str(text)?;
        Self::from_raw(raw)
    }

    /// Load and validate a specification from a file.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file cannot be read, otherwise as
    /// [`Self::from_yaml`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        log::debug!("loaded specification from {}", path.display());
        Self::from_yaml(&text)
    }

    fn from_raw(raw: RawSpec) -> Result<Self> {
        let code = raw.codespec;
        if code.argnames.len() != code.argcount || code.argtypes.len() != code.argcount {
            return Err(Error::Validation(format!(
                "argcount is {} but {} names and {} types were given",
                code.argcount,
                code.argnames.len(),
                code.argtypes.len()
            )));
        }
        let return_tag = code
            .returntype
            .first()
            .ok_or_else(|| Error::Validation("returntype is empty".to_string()))?;
        let return_type = ValueType::parse_tag(return_tag)?;

        let params = code
            .argnames
            .iter()
            .zip(&code.argtypes)
            .map(|(name, tag)| {
                Ok(Parameter {
                    name: name.clone(),
                    ty: ValueType::parse_tag(tag)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let contract = FunctionContract::new(code.function, params, return_type)?;

        let eval = raw.evalspec;
        let wellness = eval
            .wellness
            .into_iter()
            .map(|(category, rule)| {
                (
                    category,
                    WellnessRule {
                        max_deduction: rule.maxhit,
                        per_issue_penalty: rule.error,
                    },
                )
            })
            .collect();

        let (tests, cases) = match eval.testcases {
            Some(tc) => {
                if tc.input.len() != tc.count || tc.output.len() != tc.count {
                    return Err(Error::Validation(format!(
                        "testcase count is {} but {} inputs and {} outputs were given",
                        tc.count,
                        tc.input.len(),
                        tc.output.len()
                    )));
                }
                let cases = tc
                    .input
                    .iter()
                    .zip(&tc.output)
                    .map(|(row, expected)| parse_case(row, expected, &contract))
                    .collect::<Result<Vec<_>>>()?;
                let tests = TestPolicy {
                    max_deduction: tc.maxhit.unwrap_or(DEFAULT_TEST_MAX_DEDUCTION),
                    expected_count: tc.count,
                    timeout_secs: tc.timeout.unwrap_or(DEFAULT_TEST_TIMEOUT_SECS),
                };
                (tests, cases)
            }
            None => (
                TestPolicy {
                    max_deduction: DEFAULT_TEST_MAX_DEDUCTION,
                    expected_count: 0,
                    timeout_secs: DEFAULT_TEST_TIMEOUT_SECS,
                },
                Vec::new(),
            ),
        };

        let spec = Self {
            language: code.language,
            file_size_limit_mb: code.filesizelimit.unwrap_or(DEFAULT_FILE_SIZE_LIMIT_MB),
            contract,
            policy: EvaluationPolicy {
                grade_max: eval.grademax.unwrap_or(DEFAULT_GRADE_MAX),
                wellness,
                tests,
            },
            cases,
        };
        spec.validate_literals()?;
        Ok(spec)
    }

    /// Check every test-case literal casts to its declared type.
    fn validate_literals(&self) -> Result<()> {
        for case in &self.cases {
            for (literal, param) in case.args.iter().zip(&self.contract.params) {
                param.ty.validate_literal(literal)?;
            }
            self.contract.return_type.validate_literal(&case.expected)?;
        }
        Ok(())
    }

    /// Check the submission does not exceed the configured size limit.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file cannot be inspected, or
    /// [`Error::SubmissionTooLarge`] when it exceeds the limit.
    pub fn check_submission_size(&self, submission: &Path) -> Result<()> {
        let size = fs::metadata(submission)?.len();
        let limit = self.file_size_limit_mb * 1024 * 1024;
        if size > limit {
            return Err(Error::SubmissionTooLarge { size, limit });
        }
        Ok(())
    }
}

fn parse_case(
    row: &serde_yaml::Value,
    expected: &serde_yaml::Value,
    contract: &FunctionContract,
) -> Result<TestCase> {
    let args = match row {
        serde_yaml::Value::Null => Vec::new(),
        serde_yaml::Value::Sequence(items) => {
            items.iter().map(literal_of).collect::<Result<Vec<_>>>()?
        }
        other => {
            return Err(Error::Validation(format!(
                "testcase input row must be a sequence, got {other:?}"
            )));
        }
    };
    if args.len() != contract.arity() {
        return Err(Error::Validation(format!(
            "testcase has {} arguments, contract requires {}",
            args.len(),
            contract.arity()
        )));
    }
    Ok(TestCase {
        args,
        expected: literal_of(expected)?,
    })
}

/// Render a YAML scalar to the literal text the harness will cast.
fn literal_of(value: &serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(Error::Validation(format!(
            "testcase literal must be a scalar, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SPEC_YAML: &str = r#"
codespec:
  filesizelimit: 1
  language: 'python'
  function: 'abbreviate_name'
  argcount: 1
  argnames:
    - full_name
  argtypes:
    - string
  returntype:
    - string
evalspec:
  grademax: 100
  wellness:
    convention:
      maxhit: 10
      error: 1
    refactor:
      maxhit: 20
      error: 2
  testcases:
    maxhit: 100
    count: 3
    timeout: 0.5
    input:
      - [ 'John Smith' ]
      - [ 'Anna Maria Simpson' ]
      - [ 'Bob Alan Faria Stewart' ]
    output:
      - 'J. Smith'
      - 'A. M. Simpson'
      - 'B. A. F. Stewart'
"#;

    #[test]
    fn test_load_full_spec() {
        let spec = Specification::from_yaml(SPEC_YAML).expect("valid spec");
        assert_eq!(spec.language, "python");
        assert_eq!(spec.contract.name, "abbreviate_name");
        assert_eq!(spec.contract.param_names(), vec!["full_name"]);
        assert_eq!(spec.contract.return_type, ValueType::Str);
        assert_eq!(spec.cases.len(), 3);
        assert_eq!(spec.cases[0].args, vec!["John Smith"]);
        assert_eq!(spec.cases[0].expected, "J. Smith");
        assert_eq!(spec.policy.tests.expected_count, 3);
        assert!((spec.policy.tests.timeout_secs - 0.5).abs() < f64::EPSILON);
        assert_eq!(spec.policy.wellness.len(), 2);
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
codespec:
  language: 'python'
  function: 'get_answer'
  argcount: 0
  returntype: [integer]
evalspec: {}
"#;
        let spec = Specification::from_yaml(yaml).expect("valid spec");
        assert_eq!(spec.file_size_limit_mb, 10);
        assert!((spec.policy.grade_max - 100.0).abs() < f64::EPSILON);
        assert_eq!(spec.policy.tests.expected_count, 0);
        assert!(spec.cases.is_empty());
    }

    #[test]
    fn test_argcount_mismatch_rejected() {
        let yaml = r#"
codespec:
  language: 'python'
  function: 'f'
  argcount: 2
  argnames: [a]
  argtypes: [integer]
  returntype: [integer]
evalspec: {}
"#;
        let err = Specification::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_testcase_count_mismatch_rejected() {
        let yaml = r#"
codespec:
  language: 'python'
  function: 'f'
  argcount: 1
  argnames: [a]
  argtypes: [integer]
  returntype: [integer]
evalspec:
  testcases:
    count: 2
    input:
      - [1]
    output:
      - 1
"#;
        let err = Specification::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("testcase count"));
    }

    #[test]
    fn test_bad_literal_rejected() {
        let yaml = r#"
codespec:
  language: 'python'
  function: 'f'
  argcount: 1
  argnames: [a]
  argtypes: [integer]
  returntype: [integer]
evalspec:
  testcases:
    count: 1
    input:
      - [ 'not a number' ]
    output:
      - 1
"#;
        let err = Specification::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::BadLiteral { .. }));
    }

    #[test]
    fn test_numeric_literals_stringified() {
        let yaml = r#"
codespec:
  language: 'python'
  function: 'add_one'
  argcount: 1
  argnames: [n]
  argtypes: [integer]
  returntype: [integer]
evalspec:
  testcases:
    count: 1
    input:
      - [ 41 ]
    output:
      - 42
"#;
        let spec = Specification::from_yaml(yaml).expect("valid spec");
        assert_eq!(spec.cases[0].args, vec!["41"]);
        assert_eq!(spec.cases[0].expected, "42");
    }

    #[test]
    fn test_null_input_row_for_zero_arity() {
        let yaml = r#"
codespec:
  language: 'python'
  function: 'get_answer'
  argcount: 0
  returntype: [integer]
evalspec:
  testcases:
    count: 1
    input:
      - ~
    output:
      - 42
"#;
        let spec = Specification::from_yaml(yaml).expect("valid spec");
        assert!(spec.cases[0].args.is_empty());
    }

    #[test]
    fn test_unknown_returntype_rejected() {
        let yaml = r#"
codespec:
  language: 'python'
  function: 'f'
  argcount: 0
  returntype: [matrix]
evalspec: {}
"#;
        let err = Specification::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::UnknownType(_)));
    }

    #[test]
    fn test_check_submission_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sub.py");
        let mut f = fs::File::create(&path).expect("create");
        f.write_all(b"def f():\n    return 1\n").expect("write");
        drop(f);

        let spec = Specification::from_yaml(SPEC_YAML).expect("valid spec");
        assert!(spec.check_submission_size(&path).is_ok());
    }

    #[test]
    fn test_check_submission_size_exceeded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("big.py");
        let mut spec = Specification::from_yaml(SPEC_YAML).expect("valid spec");
        spec.file_size_limit_mb = 0;
        fs::write(&path, "x").expect("write");
        let err = spec.check_submission_size(&path).unwrap_err();
        assert!(matches!(err, Error::SubmissionTooLarge { .. }));
    }
}
