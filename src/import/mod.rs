//! Import functionality
//!
//! Decodes uploaded file content into a [`ParsedDataset`]:
//! - CSV (configurable delimiter, quote, escape and header skip)
//! - JSON (array of records or a single record, optional flattening or
//!   dotted-path extraction)
//! - JSON Lines (one record per line)

pub mod csv;
pub mod json;
pub mod source;

use serde::{Deserialize, Serialize};

use crate::models::ParsedDataset;

pub use self::csv::{CsvImporter, CsvOptions};
pub use self::json::{JsonImporter, JsonOptions, extract_path, flatten_object};
pub use self::source::SourceFile;

/// Error during import
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    #[error("Row at line {line} has {found} columns, expected {expected}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Source file format together with its decoding options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ImportFormat {
    Csv(CsvOptions),
    Json(JsonOptions),
    #[serde(rename = "jsonl")]
    JsonLines(JsonOptions),
}

impl ImportFormat {
    /// Short format name, as used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            ImportFormat::Csv(_) => "csv",
            ImportFormat::Json(_) => "json",
            ImportFormat::JsonLines(_) => "jsonl",
        }
    }
}

/// Parse file content in the given format
pub fn parse(content: &str, format: &ImportFormat) -> ImportResult<ParsedDataset> {
    match format {
        ImportFormat::Csv(options) => CsvImporter::new(options.clone()).parse(content),
        ImportFormat::Json(options) => JsonImporter::new(options.clone()).parse(content),
        ImportFormat::JsonLines(options) => {
            JsonImporter::new(options.clone()).parse_lines(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatches_by_format() {
        let csv = parse("a,b\n1,2\n", &ImportFormat::Csv(CsvOptions::default())).unwrap();
        assert_eq!(csv.headers(), &["a", "b"]);

        let json = parse(r#"[{"a": 1}]"#, &ImportFormat::Json(JsonOptions::default())).unwrap();
        assert_eq!(json.headers(), &["a"]);

        let lines = parse(
            "{\"a\": 1}\n{\"a\": 2}\n",
            &ImportFormat::JsonLines(JsonOptions::default()),
        )
        .unwrap();
        assert_eq!(lines.row_count(), 2);
    }
}
