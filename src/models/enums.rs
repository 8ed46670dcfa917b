//! Enums for table definitions
//!
//! `TypeTag` is serialized as the engine type name it renders to, so a
//! table spec stored as JSON reads the same as the generated DDL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column type of a target field
///
/// The fixed variants cover what type inference can produce. `Other`
/// carries an operator-supplied engine type expression verbatim, e.g.
/// `LowCardinality(String)` or `DateTime64(3, 'UTC')`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    #[default]
    String,
    Int64,
    Float64,
    DateTime,
    Date,
    Boolean,
    Other(String),
}

impl TypeTag {
    /// Whether this is a date or date/time type
    pub fn is_temporal(&self) -> bool {
        matches!(self, TypeTag::DateTime | TypeTag::Date)
    }

    /// Whether a field of this type may be selected as partition key.
    ///
    /// Custom types are accepted; their suitability is the operator's call.
    pub fn allows_partition(&self) -> bool {
        self.is_temporal() || matches!(self, TypeTag::Other(_))
    }

    /// Whether values of this type render as bare numeric literals
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeTag::Int64 | TypeTag::Float64)
    }

    /// The engine type name
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::String => "String",
            TypeTag::Int64 => "Int64",
            TypeTag::Float64 => "Float64",
            TypeTag::DateTime => "DateTime",
            TypeTag::Date => "Date",
            TypeTag::Boolean => "Boolean",
            TypeTag::Other(custom) => custom,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_lowercase().as_str() {
            "string" => TypeTag::String,
            "int64" => TypeTag::Int64,
            "float64" => TypeTag::Float64,
            "datetime" => TypeTag::DateTime,
            "date" => TypeTag::Date,
            "boolean" | "bool" => TypeTag::Boolean,
            _ => TypeTag::Other(trimmed.to_string()),
        })
    }
}

impl From<String> for TypeTag {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(tag) => tag,
            Err(never) => match never {},
        }
    }
}

impl From<TypeTag> for String {
    fn from(value: TypeTag) -> Self {
        value.as_str().to_string()
    }
}
