//! CLI command implementations
//!
//! `preview` and `upload` share the file loading and schema editing options
//! defined here.

pub mod init_config;
pub mod preview;
pub mod upload;

use std::path::{Path, PathBuf};

use crate::cli::error::CliError;
use crate::database::UploadConfig;
use crate::import::{CsvOptions, ImportFormat, JsonOptions, SourceFile};
use crate::models::{TableSpec, TypeTag};
use crate::session::{UploadSession, default_table_name};

/// Input file and parse options
#[derive(Debug, Clone, Default)]
pub struct SourceArgs {
    /// File to upload
    pub file: PathBuf,
    /// Explicit format (`csv`, `tsv`, `json`, `jsonl`); detected when absent
    pub format: Option<String>,
    /// Target database, overriding the configured one
    pub namespace: Option<String>,
    /// Target table, defaulting to the file name
    pub table: Option<String>,
    /// CSV delimiter
    pub delimiter: Option<char>,
    /// CSV rows to skip after the header
    pub skip_rows: Option<usize>,
    /// Flatten nested JSON objects into dotted columns
    pub flatten: bool,
    /// JSON paths to extract as columns
    pub paths: Vec<String>,
    /// Rows sampled for type inference
    pub sample_size: Option<usize>,
    /// Explicit config file
    pub config: Option<PathBuf>,
}

/// Operator edits applied on top of the inferred schema
#[derive(Debug, Clone, Default)]
pub struct SchemaArgs {
    /// `name=Type` overrides
    pub types: Vec<String>,
    /// Fields that must not be NULL
    pub not_null: Vec<String>,
    pub order_by: Vec<String>,
    pub primary_key: Vec<String>,
    pub partition_by: Option<String>,
    pub engine: Option<String>,
    pub comment: Option<String>,
    pub if_not_exists: bool,
}

/// Load the config file given on the command line, or the one in the
/// current directory
pub fn load_config(path: Option<&Path>) -> Result<UploadConfig, CliError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.to_path_buf()));
            }
            UploadConfig::load_file(path)?
        }
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| CliError::IoError(format!("Failed to get current directory: {}", e)))?;
            UploadConfig::load(&cwd)?
        }
    };
    Ok(config)
}

/// Import format for a file: the explicit `--format`, else the detected one,
/// with the command line parse options layered over the configured CSV
/// defaults.
pub fn resolve_format(
    args: &SourceArgs,
    config: &UploadConfig,
    source: &SourceFile,
) -> Result<ImportFormat, CliError> {
    let format = match args.format.as_deref() {
        Some(name) => match name.to_lowercase().as_str() {
            "csv" => ImportFormat::Csv(config.csv.clone()),
            "tsv" => ImportFormat::Csv(CsvOptions {
                delimiter: '\t',
                ..config.csv.clone()
            }),
            "json" => ImportFormat::Json(JsonOptions::default()),
            "jsonl" | "ndjson" => ImportFormat::JsonLines(JsonOptions::default()),
            other => {
                return Err(CliError::InvalidArgument(format!(
                    "Unknown format: {} (expected csv, tsv, json or jsonl)",
                    other
                )));
            }
        },
        None => match source.detect_format() {
            ImportFormat::Csv(detected) if detected.delimiter == '\t' => {
                ImportFormat::Csv(CsvOptions {
                    delimiter: '\t',
                    ..config.csv.clone()
                })
            }
            ImportFormat::Csv(_) => ImportFormat::Csv(config.csv.clone()),
            json => json,
        },
    };

    let json_options = JsonOptions {
        flatten: args.flatten,
        paths: (!args.paths.is_empty()).then(|| args.paths.clone()),
    };
    Ok(match format {
        ImportFormat::Csv(mut options) => {
            if let Some(delimiter) = args.delimiter {
                options.delimiter = delimiter;
            }
            if let Some(skip_rows) = args.skip_rows {
                options.skip_rows = skip_rows;
            }
            ImportFormat::Csv(options)
        }
        ImportFormat::Json(_) => ImportFormat::Json(json_options),
        ImportFormat::JsonLines(_) => ImportFormat::JsonLines(json_options),
    })
}

/// Read and parse the input file into a session with an inferred spec
pub fn open_session(args: &SourceArgs, config: &UploadConfig) -> Result<UploadSession, CliError> {
    if !args.file.exists() {
        return Err(CliError::FileNotFound(args.file.clone()));
    }

    let mut config = config.clone();
    if let Some(namespace) = &args.namespace {
        config.engine.database = namespace.clone();
    }
    let mut session = UploadSession::from_config(&config);
    if let Some(sample_size) = args.sample_size {
        if sample_size == 0 {
            return Err(CliError::InvalidArgument(
                "--sample-size must be greater than zero".to_string(),
            ));
        }
        session = session.with_sample_size(sample_size);
    }

    let source = SourceFile::read(&args.file)?;
    let format = resolve_format(args, &config, &source)?;
    let table = args
        .table
        .clone()
        .unwrap_or_else(|| default_table_name(&args.file));
    session.load_source(source, &format, table)?;
    Ok(session)
}

/// Apply the schema options to the inferred spec
pub fn apply_schema_args(spec: &mut TableSpec, args: &SchemaArgs) -> Result<(), CliError> {
    for entry in &args.types {
        let (name, type_name) = entry
            .split_once('=')
            .filter(|(_, t)| !t.trim().is_empty())
            .ok_or_else(|| {
                CliError::InvalidArgument(format!("Expected name=Type, got '{}'", entry))
            })?;
        let type_tag = TypeTag::from(type_name.to_string());
        spec.set_field_type(name.trim(), type_tag)?;
    }

    for name in &args.not_null {
        spec.set_nullable(name, false)?;
    }
    if !args.order_by.is_empty() {
        let names: Vec<&str> = args.order_by.iter().map(String::as_str).collect();
        spec.set_order_by_columns(&names)?;
    }
    if !args.primary_key.is_empty() {
        let names: Vec<&str> = args.primary_key.iter().map(String::as_str).collect();
        spec.set_primary_key_columns(&names)?;
    }
    if let Some(name) = &args.partition_by {
        spec.set_partition_by(name, true)?;
    }

    if let Some(engine) = &args.engine {
        spec.engine = engine.clone();
    }
    if let Some(comment) = &args.comment {
        spec.comment = comment.clone();
    }
    if args.if_not_exists {
        spec.if_not_exists = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_resolve_format_layers_options() {
        let mut config = UploadConfig::new();
        config.csv.trim = true;
        let source = SourceFile::from_string("a;b\n1;2\n");
        let args = SourceArgs {
            delimiter: Some(';'),
            skip_rows: Some(1),
            ..Default::default()
        };
        match resolve_format(&args, &config, &source).unwrap() {
            ImportFormat::Csv(options) => {
                assert_eq!(options.delimiter, ';');
                assert_eq!(options.skip_rows, 1);
                assert!(options.trim);
            }
            other => panic!("expected csv, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_format_json_paths() {
        let source = SourceFile::from_string("[{\"a\": {\"b\": 1}}]");
        let args = SourceArgs {
            paths: vec!["a.b".to_string()],
            ..Default::default()
        };
        match resolve_format(&args, &UploadConfig::new(), &source).unwrap() {
            ImportFormat::Json(options) => {
                assert_eq!(options.paths, Some(vec!["a.b".to_string()]));
            }
            other => panic!("expected json, got {:?}", other),
        }

        let bad = SourceArgs {
            format: Some("xml".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_format(&bad, &UploadConfig::new(), &source),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_open_session_and_apply_schema() {
        let file = csv_file("id,created,name\n1,2024-01-01,a\n2,2024-02-01,b\n");
        let args = SourceArgs {
            file: file.path().to_path_buf(),
            namespace: Some("staging".to_string()),
            table: Some("events".to_string()),
            ..Default::default()
        };
        let mut session = open_session(&args, &UploadConfig::new()).unwrap();
        let spec = session.spec_mut().unwrap();
        assert_eq!(spec.namespace, "staging");
        assert_eq!(spec.table_name, "events");

        let schema = SchemaArgs {
            types: vec!["name=LowCardinality(String)".to_string()],
            not_null: vec!["id".to_string()],
            order_by: vec!["id".to_string()],
            partition_by: Some("created".to_string()),
            ..Default::default()
        };
        apply_schema_args(spec, &schema).unwrap();
        assert_eq!(
            spec.field("name").unwrap().type_tag,
            TypeTag::Other("LowCardinality(String)".to_string())
        );
        assert!(!spec.field("id").unwrap().nullable);
        assert_eq!(spec.partition_field().unwrap().name, "created");
    }

    #[test]
    fn test_apply_schema_rejects_bad_input() {
        let id = crate::models::Field::new("id", TypeTag::Int64);
        let mut spec = TableSpec::new("db", "t", vec![id]);
        let bad_type = SchemaArgs {
            types: vec!["id".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            apply_schema_args(&mut spec, &bad_type),
            Err(CliError::InvalidArgument(_))
        ));

        let bad_partition = SchemaArgs {
            partition_by: Some("id".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            apply_schema_args(&mut spec, &bad_partition),
            Err(CliError::SchemaEdit(_))
        ));
    }

    #[test]
    fn test_open_session_missing_file() {
        let args = SourceArgs {
            file: PathBuf::from("/nonexistent/data.csv"),
            ..Default::default()
        };
        assert!(matches!(
            open_session(&args, &UploadConfig::new()),
            Err(CliError::FileNotFound(_))
        ));
    }
}
