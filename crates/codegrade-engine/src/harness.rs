//! Harness synthesis.
//!
//! The harness program is a fixed skeleton per language; everything that
//! varies per test travels as a JSON payload on the child's stdin. Test
//! literals are validated against their declared types here, at generation
//! time, so a bad cast is a specification defect rather than a test failure.

use crate::error::Result;
use crate::runtime::LanguageRuntime;
use codegrade_spec::{Error as SpecError, FunctionContract, TestCase, ValueType};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A literal plus the type the harness must cast it to
#[derive(Debug, Clone, Serialize)]
pub struct TypedLiteral {
    /// Literal text
    pub value: String,
    /// Target type tag
    #[serde(rename = "type")]
    pub ty: ValueType,
}

/// The per-test payload written to the harness child's stdin
#[derive(Debug, Clone, Serialize)]
pub struct HarnessPayload {
    /// Directory holding the submission module
    pub module_dir: String,
    /// Module name to import (submission file stem)
    pub module: String,
    /// Function under test
    pub function: String,
    /// Ordered typed arguments
    pub args: Vec<TypedLiteral>,
    /// Expected typed return value
    pub expected: TypedLiteral,
}

/// Writes harness files into a private scratch directory and builds the
/// per-test payloads. The scratch directory is removed on drop.
pub struct HarnessGenerator<'a> {
    runtime: &'a dyn LanguageRuntime,
    scratch: TempDir,
    module_dir: String,
    module: String,
}

impl<'a> HarnessGenerator<'a> {
    /// Prepare a generator for one submission.
    ///
    /// # Errors
    ///
    /// Returns an error when the scratch directory cannot be created or the
    /// submission path has no usable module name.
    pub fn new(runtime: &'a dyn LanguageRuntime, submission: &Path) -> Result<Self> {
        let scratch = TempDir::new()?;
        let canonical = fs::canonicalize(submission)?;
        let module = canonical
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| {
                SpecError::Validation(format!(
                    "submission path has no module name: {}",
                    submission.display()
                ))
            })?;
        let module_dir = canonical
            .parent()
            .map_or_else(|| ".".to_string(), |p| p.display().to_string());
        log::debug!("harness scratch at {}", scratch.path().display());
        Ok(Self {
            runtime,
            scratch,
            module_dir,
            module,
        })
    }

    /// Write the harness file for test `index` and return its path.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the write fails.
    pub fn write_harness(&self, index: usize) -> Result<PathBuf> {
        let path = self.scratch.path().join(self.runtime.harness_file_name(index));
        fs::write(&path, self.runtime.harness_skeleton())?;
        Ok(path)
    }

    /// Build the payload for one test case, re-checking every literal
    /// against its declared type.
    ///
    /// # Errors
    ///
    /// Returns a literal-cast error when a test literal does not fit its
    /// declared type.
    pub fn payload(&self, contract: &FunctionContract, case: &TestCase) -> Result<HarnessPayload> {
        let args = case
            .args
            .iter()
            .zip(&contract.params)
            .map(|(literal, param)| {
                param.ty.validate_literal(literal)?;
                Ok(TypedLiteral {
                    value: literal.clone(),
                    ty: param.ty,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        contract.return_type.validate_literal(&case.expected)?;
        Ok(HarnessPayload {
            module_dir: self.module_dir.clone(),
            module: self.module.clone(),
            function: contract.name.clone(),
            args,
            expected: TypedLiteral {
                value: case.expected.clone(),
                ty: contract.return_type,
            },
        })
    }

    /// Serialize a payload for the wire.
    ///
    /// # Errors
    ///
    /// Returns a serialization error; payloads are plain scalars so this
    /// does not occur in practice.
    pub fn payload_json(payload: &HarnessPayload) -> Result<String> {
        Ok(serde_json::to_string(payload)?)
    }
}
