//! `CREATE TABLE` generation

use super::escape::SqlDialect;
use crate::models::{Field, TableSpec};
use crate::validation::input::sanitize_comment;

/// Builds the table definition statement for a [`TableSpec`].
///
/// The spec is expected to have passed
/// [`TableValidator`](crate::validation::TableValidator); the builder does
/// not re-check it.
///
/// # Example
///
/// ```rust
/// use table_upload_sdk::export::DdlBuilder;
/// use table_upload_sdk::models::{Field, TableSpec, TypeTag};
///
/// let id = Field::new("id", TypeTag::Int64).not_null().order_by();
/// let spec = TableSpec::new("db", "t", vec![id]);
/// assert_eq!(
///     DdlBuilder::default().build(&spec),
///     "CREATE TABLE db.t (\n    id Int64 NOT NULL\n) ENGINE = MergeTree\nORDER BY (id)"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DdlBuilder {
    dialect: SqlDialect,
}

impl DdlBuilder {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Compose the full `CREATE TABLE` statement
    pub fn build(&self, spec: &TableSpec) -> String {
        let mut sql = String::from("CREATE TABLE ");
        if spec.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&self.dialect.qualified(&spec.namespace, &spec.table_name));

        let columns: Vec<String> = spec.fields.iter().map(|f| self.column_def(f)).collect();
        sql.push_str(" (\n    ");
        sql.push_str(&columns.join(",\n    "));
        sql.push_str("\n) ENGINE = ");
        sql.push_str(spec.engine.trim());

        let order_by = spec.order_by_columns();
        if !order_by.is_empty() {
            sql.push_str(&format!("\nORDER BY ({})", self.column_list(&order_by)));
        }

        if let Some(partition) = spec.partition_field() {
            sql.push_str(&format!("\nPARTITION BY {}", self.partition_expr(partition)));
        }

        let primary_key = spec.primary_key_columns();
        if !primary_key.is_empty() {
            sql.push_str(&format!("\nPRIMARY KEY ({})", self.column_list(&primary_key)));
        }

        let comment = sanitize_comment(&spec.comment);
        if !comment.is_empty() {
            sql.push_str(&format!("\nCOMMENT {}", self.dialect.escape_str(&comment)));
        }

        sql
    }

    /// `<identifier> <type> <NULL|NOT NULL>`
    pub fn column_def(&self, field: &Field) -> String {
        format!(
            "{} {} {}",
            self.dialect.identifier(&field.name),
            field.type_tag,
            if field.nullable { "NULL" } else { "NOT NULL" }
        )
    }

    /// Temporal partition columns are bucketed by month; any other eligible
    /// type partitions on the raw column.
    fn partition_expr(&self, field: &Field) -> String {
        let column = self.dialect.identifier(&field.name);
        if field.type_tag.is_temporal() {
            format!("toYYYYMM({})", column)
        } else {
            column
        }
    }

    fn column_list(&self, names: &[&str]) -> String {
        names
            .iter()
            .map(|n| self.dialect.identifier(n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
