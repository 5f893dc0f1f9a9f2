//! Output variables (the columns of an exported domain).
//!
//! A domain declares its variables as a closed enum implementing [`Variable`].
//! Each member maps to a [`VariableSpec`] holding the literal column name and
//! the metadata written into Dataset-JSON item definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Data type of an output variable, using the Dataset-JSON type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

impl VariableType {
    /// Returns the type name as written in Dataset-JSON item definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::Integer => "integer",
            VariableType::Float => "float",
            VariableType::Boolean => "boolean",
            VariableType::Date => "date",
            VariableType::DateTime => "datetime",
        }
    }

    /// Returns true for types rendered as JSON numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, VariableType::Integer | VariableType::Float)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = String;

    /// Accepts Dataset-JSON names plus the SAS-style `Char`/`Num`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" | "char" => Ok(VariableType::String),
            "integer" | "int" => Ok(VariableType::Integer),
            "float" | "double" | "decimal" | "num" => Ok(VariableType::Float),
            "boolean" | "bool" => Ok(VariableType::Boolean),
            "date" => Ok(VariableType::Date),
            "datetime" => Ok(VariableType::DateTime),
            _ => Err(format!("Unknown variable type: {s}")),
        }
    }
}

/// Static metadata of one output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSpec {
    /// Literal column name (e.g. `CMTRT`).
    pub name: &'static str,
    pub label: &'static str,
    pub data_type: VariableType,
    pub length: Option<u32>,
}

impl VariableSpec {
    pub const fn new(name: &'static str, label: &'static str, data_type: VariableType) -> Self {
        Self {
            name,
            label,
            data_type,
            length: None,
        }
    }

    #[must_use]
    pub const fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Item OID used by Dataset-JSON (`IT.<name>`).
    pub fn oid(&self) -> String {
        format!("IT.{}", self.name)
    }
}

/// A closed set of output variables for one export definition.
///
/// Implemented by a fieldless enum. `ALL` lists every member in output column
/// order; `spec` binds each member to its column name and metadata.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// enum Dm { Studyid, Usubjid }
///
/// impl Variable for Dm {
///     const ALL: &'static [Self] = &[Dm::Studyid, Dm::Usubjid];
///
///     fn spec(self) -> VariableSpec {
///         match self {
///             Dm::Studyid => VariableSpec::new("STUDYID", "Study Identifier", VariableType::String),
///             Dm::Usubjid => VariableSpec::new("USUBJID", "Unique Subject Identifier", VariableType::String),
///         }
///     }
/// }
/// ```
pub trait Variable: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn spec(self) -> VariableSpec;

    fn name(self) -> &'static str {
        self.spec().name
    }

    fn label(self) -> &'static str {
        self.spec().label
    }

    fn data_type(self) -> VariableType {
        self.spec().data_type
    }

    /// Zero-based column position.
    fn position(self) -> Option<usize> {
        Self::ALL.iter().position(|member| *member == self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_names() {
        assert_eq!("Char".parse::<VariableType>().unwrap(), VariableType::String);
        assert_eq!("integer".parse::<VariableType>().unwrap(), VariableType::Integer);
        assert_eq!("DateTime".parse::<VariableType>().unwrap(), VariableType::DateTime);
        assert!("blob".parse::<VariableType>().is_err());
    }

    #[test]
    fn item_oid_prefixes_name() {
        let spec = VariableSpec::new("CMTRT", "Reported Name of Drug", VariableType::String)
            .with_length(200);
        assert_eq!(spec.oid(), "IT.CMTRT");
        assert_eq!(spec.length, Some(200));
    }
}
