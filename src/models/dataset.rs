//! Parsed file contents
//!
//! Cells are a tagged union so downstream code matches on the value kind
//! instead of coercing at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single raw cell value as decoded from the source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value (JSON `null`, missing key, padded CSV cell)
    Null,
    /// Boolean (JSON only)
    Bool(bool),
    /// Number as written in the source (JSON only)
    Number(serde_json::Number),
    /// Text; every CSV cell is text
    Text(String),
}

impl CellValue {
    /// Null or empty text; skipped by inference and inserted as `NULL`
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Bool(_) | CellValue::Number(_) => false,
        }
    }

    /// Build a cell from a JSON scalar. Arrays and objects become their
    /// compact JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => CellValue::Number(n.clone()),
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Number(n) => serde_json::Value::Number(n.clone()),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Borrow the text of a `Text` cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// One parsed row, aligned with the dataset headers
pub type RawRow = Vec<CellValue>;

/// Headers and rows decoded from one source file.
///
/// Every row holds exactly `headers.len()` cells. The dataset is immutable
/// once built; a new file produces a new dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDataset {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl ParsedDataset {
    /// Create a dataset, padding short rows with `Null` and truncating long
    /// ones so that every row matches the header width.
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `limit` rows, used as the inference sample
    pub fn sample(&self, limit: usize) -> &[RawRow] {
        &self.rows[..self.rows.len().min(limit)]
    }

    /// Position of a header by name
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}
