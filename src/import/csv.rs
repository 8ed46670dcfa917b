//! CSV importer
//!
//! Decodes delimited text into a [`ParsedDataset`]. The first non-empty
//! record is the header row; every cell is kept as text and typed later by
//! inference.

use ::csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ImportError, ImportResult};
use crate::models::{CellValue, ParsedDataset, RawRow};

/// CSV decoding options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CsvOptions {
    /// Field delimiter (default: `,`)
    pub delimiter: char,
    /// Quote character (default: `"`)
    pub quote: char,
    /// Escape character inside quoted fields. When unset, quotes are escaped
    /// by doubling them.
    pub escape: Option<char>,
    /// Records to drop after the header row
    pub skip_rows: usize,
    /// Trim surrounding whitespace from every cell
    pub trim: bool,
    /// Reject rows whose width differs from the header instead of padding or
    /// truncating them
    pub strict_columns: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            escape: None,
            skip_rows: 0,
            trim: false,
            strict_columns: false,
        }
    }
}

impl CsvOptions {
    /// Tab-separated defaults
    pub fn tsv() -> Self {
        Self {
            delimiter: '\t',
            ..Self::default()
        }
    }
}

/// CSV importer
pub struct CsvImporter {
    options: CsvOptions,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new(CsvOptions::default())
    }
}

impl CsvImporter {
    /// Create a new CSV importer
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Parse CSV content
    ///
    /// # Example
    ///
    /// ```rust
    /// use table_upload_sdk::import::CsvImporter;
    ///
    /// let dataset = CsvImporter::default().parse("name,age\nAlice,30\n").unwrap();
    /// assert_eq!(dataset.headers(), &["name", "age"]);
    /// assert_eq!(dataset.row_count(), 1);
    /// ```
    pub fn parse(&self, content: &str) -> ImportResult<ParsedDataset> {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(ascii_byte("delimiter", self.options.delimiter)?)
            .quote(ascii_byte("quote", self.options.quote)?);
        if let Some(escape) = self.options.escape {
            builder
                .escape(Some(ascii_byte("escape", escape)?))
                .double_quote(false);
        }
        if self.options.trim {
            builder.trim(Trim::All);
        }
        let mut reader = builder.from_reader(content.as_bytes());

        let mut headers: Option<Vec<String>> = None;
        let mut to_skip = self.options.skip_rows;
        let mut rows: Vec<RawRow> = Vec::new();
        let mut padded = 0usize;
        let mut truncated = 0usize;

        for result in reader.records() {
            let record = result.map_err(|e| ImportError::ParseError(e.to_string()))?;
            if is_blank(&record, content) {
                continue;
            }

            if headers.is_none() {
                headers = Some(header_names(&record));
                continue;
            }

            if to_skip > 0 {
                to_skip -= 1;
                continue;
            }

            let expected = headers.as_ref().map_or(0, Vec::len);
            let found = record.len();
            if found != expected {
                if self.options.strict_columns {
                    return Err(ImportError::RaggedRow {
                        line: record.position().map(|p| p.line()).unwrap_or(0),
                        expected,
                        found,
                    });
                }
                if found < expected {
                    padded += 1;
                } else {
                    truncated += 1;
                }
            }

            rows.push(record.iter().map(CellValue::from).collect());
        }

        let headers = headers
            .ok_or_else(|| ImportError::ParseError("CSV content has no header row".to_string()))?;

        if padded > 0 || truncated > 0 {
            warn!(
                "CSV rows did not match the {} header columns: {} padded, {} truncated",
                headers.len(),
                padded,
                truncated
            );
        }
        debug!("Parsed CSV: {} columns, {} rows", headers.len(), rows.len());

        Ok(ParsedDataset::new(headers, rows))
    }
}

fn ascii_byte(option: &str, c: char) -> ImportResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ImportError::InvalidOption(format!(
            "CSV {} must be a single ASCII character, got '{}'",
            option, c
        )))
    }
}

/// A whitespace-only source line. A quoted empty field is a value, not a
/// blank line, so the raw text is checked rather than the decoded cell.
fn is_blank(record: &StringRecord, content: &str) -> bool {
    if record.is_empty() {
        return true;
    }
    if record.len() != 1 || !record[0].trim().is_empty() {
        return false;
    }
    let start = record.position().map_or(0, |p| p.byte() as usize);
    content
        .get(start..)
        .and_then(|rest| rest.lines().next())
        .is_none_or(|line| line.trim().is_empty())
}

fn header_names(record: &StringRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            if name.is_empty() {
                format!("column_{}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(dataset: &ParsedDataset, row: usize) -> Vec<String> {
        dataset.rows()[row].iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_parse_basic() {
        let dataset = CsvImporter::default()
            .parse("name,age\nAlice,30\nBob,40\n")
            .unwrap();
        assert_eq!(dataset.headers(), &["name", "age"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(texts(&dataset, 1), vec!["Bob", "40"]);
        assert_eq!(dataset.rows()[0][1], CellValue::Text("30".to_string()));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let content = "id,note\n1,\"hello, world\"\n2,\"say \"\"hi\"\"\"\n";
        let dataset = CsvImporter::default().parse(content).unwrap();
        assert_eq!(texts(&dataset, 0)[1], "hello, world");
        assert_eq!(texts(&dataset, 1)[1], "say \"hi\"");
    }

    #[test]
    fn test_parse_custom_delimiter_and_skip_rows() {
        let options = CsvOptions {
            delimiter: ';',
            skip_rows: 1,
            ..Default::default()
        };
        let dataset = CsvImporter::new(options)
            .parse("a;b\nunits;units\n1;2\n")
            .unwrap();
        assert_eq!(dataset.headers(), &["a", "b"]);
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(texts(&dataset, 0), vec!["1", "2"]);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_names_empty_headers() {
        let dataset = CsvImporter::default()
            .parse("\nid,,name\n\n1,x,a\n")
            .unwrap();
        assert_eq!(dataset.headers(), &["id", "column_2", "name"]);
        assert_eq!(dataset.row_count(), 1);
    }

    #[test]
    fn test_quoted_empty_value_is_a_row() {
        let dataset = CsvImporter::default()
            .parse("note\n\"\"\n   \nhello\n")
            .unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows()[0][0], CellValue::from(""));
        assert_eq!(texts(&dataset, 1), vec!["hello"]);
    }

    #[test]
    fn test_ragged_rows_are_padded_and_truncated() {
        let dataset = CsvImporter::default()
            .parse("a,b,c\n1\n1,2,3,4\n")
            .unwrap();
        assert_eq!(dataset.rows()[0].len(), 3);
        assert_eq!(dataset.rows()[0][2], CellValue::Null);
        assert_eq!(texts(&dataset, 1), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_strict_columns_rejects_ragged_row() {
        let options = CsvOptions {
            strict_columns: true,
            ..Default::default()
        };
        let err = CsvImporter::new(options)
            .parse("a,b\n1,2\n3\n")
            .unwrap_err();
        match err {
            ImportError::RaggedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_ascii_delimiter_is_rejected() {
        let options = CsvOptions {
            delimiter: '§',
            ..Default::default()
        };
        assert!(matches!(
            CsvImporter::new(options).parse("a§b"),
            Err(ImportError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_empty_content_is_parse_error() {
        assert!(matches!(
            CsvImporter::default().parse("\n\n"),
            Err(ImportError::ParseError(_))
        ));
    }

    #[test]
    fn test_trim_and_escape() {
        let options = CsvOptions {
            trim: true,
            escape: Some('\\'),
            ..Default::default()
        };
        let dataset = CsvImporter::new(options)
            .parse("a , b\n\"x\\\"y\", 2 \n")
            .unwrap();
        assert_eq!(dataset.headers(), &["a", "b"]);
        assert_eq!(texts(&dataset, 0), vec!["x\"y", "2"]);
    }
}
