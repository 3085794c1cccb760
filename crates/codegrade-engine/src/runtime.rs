//! Language runtime strategies.
//!
//! Each supported language contributes one [`LanguageRuntime`]: how to run
//! the compile gate, what harness skeleton to write, and how to launch it.
//! The pipeline is generic over the trait, so adding a language never touches
//! the evaluation logic.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Harness protocol version, embedded in every generated harness
pub const HARNESS_VERSION: u32 = 1;

/// Python harness skeleton. Constant for every evaluation: the per-test data
/// arrives as a JSON payload on stdin, so submission text never reaches the
/// harness source.
const PYTHON_SKELETON: &str = r#"# codegrade harness v1
import json
import sys
import traceback


def _cast(item):
    value = item["value"]
    kind = item["type"]
    if kind == "integer":
        return int(value)
    if kind == "float":
        return float(value)
    if kind == "bool":
        return value.strip().lower() in ("true", "1")
    if kind == "none":
        return None
    return value


def main():
    payload = json.load(sys.stdin)
    sys.path.insert(0, payload["module_dir"])
    module = __import__(payload["module"])
    func = getattr(module, payload["function"])
    args = [_cast(item) for item in payload["args"]]
    expected = _cast(payload["expected"])
    try:
        received = func(*args)
    except Exception:
        print("FAILED - STACKTRACE:")
        traceback.print_exc(file=sys.stdout)
        sys.exit(2)
    if type(received) is type(expected) and received == expected:
        print("PASSED - Expected : {0} - Received : {1}".format(expected, received))
        sys.exit(0)
    print("FAILED - Expected : {0} - Received : {1}".format(expected, received))
    sys.exit(1)


if __name__ == "__main__":
    main()
"#;

/// Per-language strategy: compile gate, harness skeleton, launch commands
pub trait LanguageRuntime: Send + Sync + std::fmt::Debug {
    /// Language tag this runtime serves
    fn language(&self) -> &str;

    /// Command for the compile gate over the submission
    fn compile_command(&self, submission: &Path) -> Command;

    /// Complete harness program text; identical for every test case
    fn harness_skeleton(&self) -> &str;

    /// File name for the harness of test `index`
    fn harness_file_name(&self, index: usize) -> String;

    /// Command that runs a written harness; the payload goes to its stdin
    fn run_command(&self, harness: &Path) -> Command;
}

/// CPython runtime: `py_compile` gate, stdin-payload harness
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonRuntime;

impl LanguageRuntime for PythonRuntime {
    fn language(&self) -> &str {
        "python"
    }

    fn compile_command(&self, submission: &Path) -> Command {
        let mut cmd = Command::new("python3");
        cmd.arg("-m").arg("py_compile").arg(submission);
        cmd
    }

    fn harness_skeleton(&self) -> &str {
        PYTHON_SKELETON
    }

    fn harness_file_name(&self, index: usize) -> String {
        format!("harness_{index}.py")
    }

    fn run_command(&self, harness: &Path) -> Command {
        let mut cmd = Command::new("python3");
        cmd.arg(harness);
        cmd
    }
}

/// Look up the runtime for a language tag.
///
/// # Errors
///
/// Returns [`Error::UnsupportedLanguage`] for unknown tags.
pub fn runtime_for(language: &str) -> Result<Box<dyn LanguageRuntime>> {
    match language {
        "python" => Ok(Box::new(PythonRuntime)),
        other => Err(Error::UnsupportedLanguage(other.to_string())),
    }
}

/// Shell-backed runtime for hermetic tests.
///
/// The "harness" is a fixed `sh` script; the payload still arrives on stdin,
/// so a script can branch on its content. No interpreter beyond `sh` is
/// needed to exercise the full pipeline.
#[derive(Debug, Clone)]
pub struct StubRuntime {
    script: String,
    compile_ok: bool,
}

impl StubRuntime {
    /// A stub whose harness runs `script` under `sh`
    #[must_use]
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            compile_ok: true,
        }
    }

    /// Make the compile gate fail
    #[must_use]
    pub fn failing_compile(mut self) -> Self {
        self.compile_ok = false;
        self
    }
}

impl LanguageRuntime for StubRuntime {
    fn language(&self) -> &str {
        "stub"
    }

    fn compile_command(&self, _submission: &Path) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(if self.compile_ok { "exit 0" } else { "echo compile failed; exit 1" });
        cmd
    }

    fn harness_skeleton(&self) -> &str {
        &self.script
    }

    fn harness_file_name(&self, index: usize) -> String {
        format!("harness_{index}.sh")
    }

    fn run_command(&self, harness: &Path) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg(harness);
        cmd
    }
}
