//! Value type tags shared between the contract, the test cases and the
//! harness wire payload.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag for function arguments and return values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Text value
    #[serde(rename = "string")]
    Str,
    /// Signed integer value
    #[serde(rename = "integer")]
    Int,
    /// Floating point value
    Float,
    /// Boolean value
    Bool,
    /// The unit/absent value
    None,
}

impl ValueType {
    /// Parse a schema type tag. `double` is accepted as an alias for
    /// `float`, matching the legacy cast table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for unrecognized tags.
    pub fn parse_tag(tag: &str) -> Result<Self> {
        match tag {
            "string" => Ok(Self::Str),
            "integer" => Ok(Self::Int),
            "float" | "double" => Ok(Self::Float),
            "bool" => Ok(Self::Bool),
            "none" => Ok(Self::None),
            other => Err(Error::UnknownType(other.to_string())),
        }
    }

    /// Canonical tag used in the harness payload
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::None => "none",
        }
    }

    /// Check that a literal casts cleanly to this type.
    ///
    /// This backs the generation-time cast check: a literal that fails here
    /// is a specification defect, not a test failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadLiteral`] when the literal does not parse.
    pub fn validate_literal(&self, literal: &str) -> Result<()> {
        let ok = match self {
            Self::Str | Self::None => true,
            Self::Int => literal.trim().parse::<i64>().is_ok(),
            Self::Float => literal.trim().parse::<f64>().is_ok(),
            Self::Bool => matches!(
                literal.trim().to_ascii_lowercase().as_str(),
                "true" | "false" | "1" | "0"
            ),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::BadLiteral {
                literal: literal.to_string(),
                ty: self.tag(),
            })
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
