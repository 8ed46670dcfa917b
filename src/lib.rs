//! Table Upload SDK - turn CSV/JSON files into analytical database tables
//!
//! Provides unified interfaces for:
//! - File parsing (CSV, JSON, JSON Lines)
//! - Column type inference
//! - Table spec editing and validation
//! - `CREATE TABLE` / `INSERT` generation with safe escaping
//! - Batched, sequential ingestion with progress and partial-failure state
//!
//! # Example
//!
//! ```rust
//! use table_upload_sdk::import::{CsvOptions, ImportFormat};
//! use table_upload_sdk::session::UploadSession;
//!
//! let mut session = UploadSession::new("analytics");
//! let format = ImportFormat::Csv(CsvOptions::default());
//! session
//!     .load_str("name,age\nAlice,30\nBob,40\n", &format, "people")
//!     .unwrap();
//! println!("{}", session.preview_ddl().unwrap());
//! ```

pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod database;
pub mod export;
pub mod import;
pub mod inference;
pub mod ingest;
pub mod models;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use batch::{BATCH_SIZE, Batch, PlanError};
pub use database::{
    CatalogSnapshot, DatabaseError, DatabaseResult, QueryEngine, QueryResult, SchemaCatalog,
    UploadConfig,
};
#[cfg(feature = "http-backend")]
pub use database::HttpQueryEngine;
pub use export::{DdlBuilder, InsertBuilder, SqlDialect};
pub use import::{CsvOptions, ImportError, ImportFormat, ImportResult, JsonOptions, SourceFile};
pub use inference::{infer, infer_fields};
pub use ingest::{
    CancellationFlag, IngestError, IngestionExecutor, IngestionRun, Phase, Progress,
    ProgressReporter,
};
pub use session::UploadSession;
pub use validation::{TableValidator, ValidationReport};

// Re-export models
pub use models::{CellValue, Field, ParsedDataset, RawRow, TableSpec, TypeTag};
