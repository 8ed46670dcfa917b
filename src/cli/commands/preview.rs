//! Preview CLI command
//!
//! Parses a file and prints the inferred schema, sample rows, validation
//! findings and the SQL an upload would run, without touching the database.

use serde_json::json;

use super::{SchemaArgs, SourceArgs, apply_schema_args, load_config, open_session};
use crate::cli::error::CliError;
use crate::cli::output::{OutputFormat, render};
use crate::database::QueryResult;
use crate::export::InsertBuilder;
use crate::models::{ParsedDataset, TableSpec};

/// Preview command arguments
#[derive(Debug, Clone)]
pub struct PreviewArgs {
    pub source: SourceArgs,
    pub schema: SchemaArgs,
    /// Sample rows to show and include in the INSERT preview
    pub rows: usize,
    /// Output format for the schema and sample tables
    pub output: OutputFormat,
}

/// Handle the preview command
pub fn handle_preview(args: &PreviewArgs) -> Result<(), CliError> {
    let config = load_config(args.source.config.as_deref())?;
    let mut session = open_session(&args.source, &config)?;
    if let Some(spec) = session.spec_mut() {
        apply_schema_args(spec, &args.schema)?;
    }
    let (Some(spec), Some(dataset)) = (session.spec(), session.dataset()) else {
        return Err(CliError::InvalidArgument("No file loaded".to_string()));
    };

    if let Some(source) = session.source() {
        println!(
            "File: {} ({} bytes, sha256 {})",
            source.path.display(),
            source.size,
            source.content_hash
        );
    }
    println!(
        "Rows: {}  Columns: {}",
        dataset.row_count(),
        dataset.column_count()
    );

    println!("\nSchema:");
    println!("{}", render(&schema_result(spec), args.output)?);

    println!("\nSample:");
    println!("{}", render(&sample_result(dataset, args.rows), args.output)?);

    if let Some(report) = session.validate(None) {
        for warning in &report.warnings {
            println!("warning: {}", warning);
        }
        for error in &report.errors {
            println!("error: {}", error);
        }
    }

    if let Some(ddl) = session.preview_ddl() {
        println!("\n{};", ddl);
    }
    if !dataset.is_empty() && args.rows > 0 {
        let insert = InsertBuilder::default().build(spec, dataset.sample(args.rows));
        println!("\n{};", insert);
    }

    Ok(())
}

/// One row per field: name, type and key flags
pub fn schema_result(spec: &TableSpec) -> QueryResult {
    let columns = ["name", "type", "nullable", "order_by", "primary_key", "partition_by"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let rows = spec
        .fields
        .iter()
        .map(|f| {
            json!({
                "name": f.name,
                "type": f.type_tag.as_str(),
                "nullable": f.nullable,
                "order_by": f.is_order_by,
                "primary_key": f.is_primary_key,
                "partition_by": f.is_partition_by,
            })
        })
        .collect();
    QueryResult::new(columns, rows)
}

/// The first `limit` rows keyed by header
pub fn sample_result(dataset: &ParsedDataset, limit: usize) -> QueryResult {
    let headers = dataset.headers();
    let rows = dataset
        .sample(limit)
        .iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = headers
                .iter()
                .zip(row.iter())
                .map(|(h, cell)| (h.clone(), cell.to_json()))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    QueryResult::new(headers.to_vec(), rows)
}
