//! Query engine abstraction
//!
//! The ingestion pipeline never opens a connection itself. It talks to two
//! collaborators supplied by the host:
//! - [`QueryEngine`]: executes a SQL string and returns rows or an error
//! - [`SchemaCatalog`]: answers whether a table already exists
//!
//! An HTTP engine for ClickHouse-compatible endpoints is available behind the
//! `http-backend` feature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod config;
#[cfg(feature = "http-backend")]
pub mod http;

pub use catalog::CatalogSnapshot;
pub use config::UploadConfig;
#[cfg(feature = "http-backend")]
pub use http::HttpQueryEngine;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to reach the engine
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The engine rejected the statement. The message is the engine's own
    /// text, shown verbatim.
    #[error("{0}")]
    QueryFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Query result row as a JSON value
pub type QueryRow = serde_json::Value;

/// Query result set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Rows of data
    pub rows: Vec<QueryRow>,
    /// Number of rows affected (for INSERT)
    pub rows_affected: Option<u64>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Create a new query result
    pub fn new(columns: Vec<String>, rows: Vec<QueryRow>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: None,
            execution_time_ms: 0,
        }
    }

    /// Create an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Executes SQL statements against the target analytical database.
///
/// Implementations must be safe to share behind an `Arc`; the executor
/// issues one statement at a time and awaits each before the next.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Execute a SQL statement and return its result set
    async fn execute(&self, sql: &str) -> DatabaseResult<QueryResult>;

    /// Check if the engine is reachable
    async fn health_check(&self) -> DatabaseResult<bool> {
        self.execute("SELECT 1").await.map(|_| true)
    }

    /// Engine type name
    fn engine_type(&self) -> &'static str {
        "custom"
    }
}

/// Read-only lookup of existing tables
pub trait SchemaCatalog: Send + Sync {
    fn table_exists(&self, namespace: &str, name: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failed_displays_engine_message() {
        let err = DatabaseError::QueryFailed("timeout".to_string());
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn test_query_result_counts() {
        let result = QueryResult::new(
            vec!["name".to_string()],
            vec![serde_json::json!({"name": "events"})],
        );
        assert_eq!(result.row_count(), 1);
        assert!(!result.is_empty());
        assert!(QueryResult::empty().is_empty());
    }
}
