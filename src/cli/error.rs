//! CLI-specific error types

use std::path::PathBuf;

use thiserror::Error;

use crate::database::DatabaseError;
use crate::import::ImportError;
use crate::ingest::IngestError;
use crate::models::SchemaEditError;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),

    #[error("Schema edit rejected: {0}")]
    SchemaEdit(#[from] SchemaEditError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("{0}")]
    IngestError(#[from] IngestError),

    #[error("Table spec is invalid: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}
