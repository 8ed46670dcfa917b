//! JSON importer
//!
//! Accepts an array of records, a single record, or JSON Lines. Nested
//! objects can be flattened into dotted column names, or specific dotted
//! paths can be extracted as columns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{ImportError, ImportResult};
use crate::models::{CellValue, ParsedDataset, RawRow};

/// JSON decoding options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Flatten nested objects into `parent.child` columns
    pub flatten: bool,
    /// Extract these dotted paths as the columns. Takes precedence over
    /// `flatten`.
    pub paths: Option<Vec<String>>,
}

/// JSON / JSON Lines importer
pub struct JsonImporter {
    options: JsonOptions,
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new(JsonOptions::default())
    }
}

impl JsonImporter {
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    /// Parse a JSON document holding an array of objects or a single object
    ///
    /// # Example
    ///
    /// ```rust
    /// use table_upload_sdk::import::{JsonImporter, JsonOptions};
    ///
    /// let importer = JsonImporter::new(JsonOptions { flatten: true, paths: None });
    /// let dataset = importer.parse(r#"[{"id": 1, "user": {"name": "ann"}}]"#).unwrap();
    /// assert_eq!(dataset.headers(), &["id", "user.name"]);
    /// ```
    pub fn parse(&self, content: &str) -> ImportResult<ParsedDataset> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ImportError::ParseError(format!("Invalid JSON: {}", e)))?;

        let records = match value {
            Value::Array(items) => items,
            Value::Object(_) => vec![value],
            other => {
                return Err(ImportError::ParseError(format!(
                    "Expected an array of objects or an object, found {}",
                    json_kind(&other)
                )));
            }
        };
        if records.is_empty() {
            return Err(ImportError::ParseError("JSON array is empty".to_string()));
        }

        let objects = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| match record {
                Value::Object(map) => Ok(map),
                other => Err(ImportError::ParseError(format!(
                    "Element {} is {}, expected an object",
                    i,
                    json_kind(&other)
                ))),
            })
            .collect::<ImportResult<Vec<_>>>()?;

        Ok(self.build(objects))
    }

    /// Parse JSON Lines: one object per non-blank line
    pub fn parse_lines(&self, content: &str) -> ImportResult<ParsedDataset> {
        let mut objects = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                ImportError::ParseError(format!("Invalid JSON on line {}: {}", index + 1, e))
            })?;
            match value {
                Value::Object(map) => objects.push(map),
                other => {
                    return Err(ImportError::ParseError(format!(
                        "Line {} is {}, expected an object",
                        index + 1,
                        json_kind(&other)
                    )));
                }
            }
        }
        if objects.is_empty() {
            return Err(ImportError::ParseError(
                "JSON Lines content has no records".to_string(),
            ));
        }
        Ok(self.build(objects))
    }

    fn build(&self, objects: Vec<Map<String, Value>>) -> ParsedDataset {
        if let Some(paths) = &self.options.paths {
            let rows = objects
                .iter()
                .map(|object| {
                    paths
                        .iter()
                        .map(|path| {
                            extract_path(object, path)
                                .map(CellValue::from_json)
                                .unwrap_or(CellValue::Null)
                        })
                        .collect()
                })
                .collect();
            return ParsedDataset::new(paths.clone(), rows);
        }

        let records: Vec<Map<String, Value>> = if self.options.flatten {
            objects.iter().map(flatten_object).collect()
        } else {
            objects
        };

        let headers: Vec<String> = records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();

        let mut ignored_keys = 0usize;
        let rows: Vec<RawRow> = records
            .iter()
            .map(|record| {
                ignored_keys += record
                    .keys()
                    .filter(|k| !headers.contains(*k))
                    .count();
                headers
                    .iter()
                    .map(|h| record.get(h).map(CellValue::from_json).unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();

        if ignored_keys > 0 {
            warn!(
                "Ignored {} JSON values whose keys are not in the first record",
                ignored_keys
            );
        }
        debug!("Parsed JSON: {} columns, {} rows", headers.len(), rows.len());

        ParsedDataset::new(headers, rows)
    }
}

/// Resolve a dotted path against an object.
///
/// An exact key match wins over walking the segments, so keys that contain
/// dots stay addressable.
pub fn extract_path<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = object.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = object.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Flatten nested objects into dotted keys. Arrays are kept as leaves and
/// empty nested objects contribute no keys.
pub fn flatten_object(object: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, None, object);
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, Some(&name), nested),
            other => {
                out.insert(name, other.clone());
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_array_of_objects() {
        let dataset = JsonImporter::default()
            .parse(r#"[{"name": "Alice", "age": 30, "active": true}, {"name": "Bob", "age": 40}]"#)
            .unwrap();
        assert_eq!(dataset.headers(), &["name", "age", "active"]);
        assert_eq!(dataset.rows()[0][1], CellValue::Number(30.into()));
        assert_eq!(dataset.rows()[0][2], CellValue::Bool(true));
        assert_eq!(dataset.rows()[1][2], CellValue::Null);
    }

    #[test]
    fn test_single_object_is_wrapped() {
        let dataset = JsonImporter::default().parse(r#"{"a": "x"}"#).unwrap();
        assert_eq!(dataset.row_count(), 1);
    }

    #[test]
    fn test_rejects_non_tabular_json() {
        let importer = JsonImporter::default();
        assert!(matches!(importer.parse("42"), Err(ImportError::ParseError(_))));
        assert!(matches!(importer.parse("[]"), Err(ImportError::ParseError(_))));
        assert!(matches!(importer.parse("[1, 2]"), Err(ImportError::ParseError(_))));
        assert!(matches!(importer.parse("{not json"), Err(ImportError::ParseError(_))));
    }

    #[test]
    fn test_flatten_nested_objects() {
        let object = json!({"a": {"b": {"c": 1}, "d": [1, 2]}, "e": {}, "f": "x"});
        let flat = flatten_object(object.as_object().unwrap());
        let keys: Vec<&str> = flat.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a.b.c", "a.d", "f"]);
        assert_eq!(flat["a.d"], json!([1, 2]));
    }

    #[test]
    fn test_nested_values_without_flatten_become_text() {
        let dataset = JsonImporter::default()
            .parse(r#"[{"id": 1, "tags": ["a", "b"], "meta": {"k": "v"}}]"#)
            .unwrap();
        assert_eq!(dataset.rows()[0][1], CellValue::Text(r#"["a","b"]"#.to_string()));
        assert_eq!(dataset.rows()[0][2], CellValue::Text(r#"{"k":"v"}"#.to_string()));
    }

    #[test]
    fn test_paths_take_precedence_and_misses_are_null() {
        let options = JsonOptions {
            flatten: true,
            paths: Some(vec!["user.name".to_string(), "user.email".to_string()]),
        };
        let dataset = JsonImporter::new(options)
            .parse(r#"[{"user": {"name": "ann"}}, {"user": "plain"}]"#)
            .unwrap();
        assert_eq!(dataset.headers(), &["user.name", "user.email"]);
        assert_eq!(dataset.rows()[0][0], CellValue::from("ann"));
        assert_eq!(dataset.rows()[0][1], CellValue::Null);
        assert_eq!(dataset.rows()[1][0], CellValue::Null);
    }

    #[test]
    fn test_extract_path_prefers_exact_key() {
        let object = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(extract_path(object.as_object().unwrap(), "a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let dataset = JsonImporter::default()
            .parse(r#"[{"a": 1}, {"a": 2, "b": 3}]"#)
            .unwrap();
        assert_eq!(dataset.headers(), &["a"]);
        assert_eq!(dataset.rows()[1].len(), 1);
    }

    #[test]
    fn test_parse_lines() {
        let dataset = JsonImporter::default()
            .parse_lines("{\"a\": 1}\n\n{\"a\": 2}\n")
            .unwrap();
        assert_eq!(dataset.row_count(), 2);

        let err = JsonImporter::default()
            .parse_lines("{\"a\": 1}\n[1]\n")
            .unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }
}
