//! Models module for the SDK
//!
//! Defines the parsed-file representation and the target table definition
//! shared by inference, validation, SQL generation and ingestion.

pub mod dataset;
pub mod enums;
pub mod field;
pub mod table;

pub use dataset::{CellValue, ParsedDataset, RawRow};
pub use enums::TypeTag;
pub use field::{Field, select_partition_key};
pub use table::{DEFAULT_ENGINE, SchemaEditError, TableSpec};
