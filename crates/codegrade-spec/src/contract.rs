//! Function contract: the shape a submission must declare.

use crate::error::{Error, Result};
use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One required parameter: name plus declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name the submission must use
    pub name: String,
    /// Declared argument type
    pub ty: ValueType,
}

/// The required function name, ordered parameter list and return type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionContract {
    /// Required function name
    pub name: String,
    /// Ordered parameter list
    pub params: Vec<Parameter>,
    /// Declared return type
    pub return_type: ValueType,
}

impl FunctionContract {
    /// Build a contract, checking its own invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on an empty function name or duplicate
    /// parameter names.
    pub fn new(
        name: impl Into<String>,
        params: Vec<Parameter>,
        return_type: ValueType,
    ) -> Result<Self> {
        let contract = Self {
            name: name.into(),
            params,
            return_type,
        };
        contract.validate()?;
        Ok(contract)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("function name is empty".to_string()));
        }
        let mut seen = BTreeSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate parameter name: {}",
                    param.name
                )));
            }
        }
        Ok(())
    }

    /// Ordered parameter names
    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of declared parameters
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
