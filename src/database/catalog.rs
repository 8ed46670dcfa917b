//! In-memory schema catalog

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use super::{DatabaseResult, QueryEngine, SchemaCatalog};
use crate::export::escape_str;

/// Snapshot of the tables known in one or more namespaces.
///
/// Built in memory with [`CatalogSnapshot::with_table`], or loaded from the
/// engine's `system.tables`. The snapshot is not refreshed; load a new one
/// before each upload attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, builder style
    pub fn with_table(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.insert(namespace, name);
        self
    }

    pub fn insert(&mut self, namespace: impl Into<String>, name: impl Into<String>) {
        self.tables
            .entry(namespace.into())
            .or_default()
            .insert(name.into());
    }

    /// Table names in a namespace, sorted
    pub fn tables(&self, namespace: &str) -> Vec<&str> {
        self.tables
            .get(namespace)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of tables across namespaces
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the table list of one namespace from the engine
    pub async fn load(engine: &dyn QueryEngine, namespace: &str) -> DatabaseResult<Self> {
        let sql = format!(
            "SELECT name FROM system.tables WHERE database = {}",
            escape_str(namespace)
        );
        let result = engine.execute(&sql).await?;

        let mut snapshot = Self::new();
        snapshot.tables.entry(namespace.to_string()).or_default();
        for row in &result.rows {
            if let Some(name) = row.get("name").and_then(|v| v.as_str()) {
                snapshot.insert(namespace, name);
            }
        }
        info!(
            "Loaded catalog for {}: {} tables",
            namespace,
            snapshot.tables(namespace).len()
        );
        Ok(snapshot)
    }
}

impl SchemaCatalog for CatalogSnapshot {
    fn table_exists(&self, namespace: &str, name: &str) -> bool {
        self.tables
            .get(namespace)
            .is_some_and(|names| names.contains(name))
    }
}
