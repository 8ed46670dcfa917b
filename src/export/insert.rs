//! `INSERT ... VALUES` generation
//!
//! One statement per batch. Cells are rendered against the target column's
//! type: numeric text lands in numeric columns unquoted and recognized dates
//! are rewritten to the engine's `YYYY-MM-DD[ hh:mm:ss]` input layout.

use super::escape::SqlDialect;
use crate::inference::{parse_integer, parse_number, parse_temporal};
use crate::models::{CellValue, Field, RawRow, TableSpec, TypeTag};

/// Builds the insert statement for a slice of dataset rows
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertBuilder {
    dialect: SqlDialect,
}

impl InsertBuilder {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Compose `INSERT INTO <table> (<columns>) VALUES (<row>), ...`.
    ///
    /// Each field reads its `source_column` from the row; fields without a
    /// source, or whose source lies outside the row, insert `NULL`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use table_upload_sdk::export::InsertBuilder;
    /// use table_upload_sdk::models::{CellValue, Field, TableSpec, TypeTag};
    ///
    /// let spec = TableSpec::new("db", "people", vec![
    ///     Field::new("name", TypeTag::String).with_source(0),
    ///     Field::new("age", TypeTag::Int64).with_source(1),
    /// ]);
    /// let rows = vec![vec![CellValue::from("Alice"), CellValue::from("30")]];
    /// assert_eq!(
    ///     InsertBuilder::default().build(&spec, &rows),
    ///     "INSERT INTO db.people (name, age) VALUES ('Alice', 30)"
    /// );
    /// ```
    pub fn build(&self, spec: &TableSpec, rows: &[RawRow]) -> String {
        let columns = spec
            .fields
            .iter()
            .map(|f| self.dialect.identifier(&f.name))
            .collect::<Vec<_>>()
            .join(", ");

        let tuples = rows
            .iter()
            .map(|row| self.row_tuple(&spec.fields, row))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.dialect.qualified(&spec.namespace, &spec.table_name),
            columns,
            tuples
        )
    }

    fn row_tuple(&self, fields: &[Field], row: &RawRow) -> String {
        let values = fields
            .iter()
            .map(|field| match field.source_column.and_then(|i| row.get(i)) {
                Some(cell) => self.render_cell(&field.type_tag, cell),
                None => "NULL".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("({})", values)
    }

    /// Render one cell for a column of the given type. Text that does not
    /// parse for the column type is quoted verbatim.
    pub fn render_cell(&self, type_tag: &TypeTag, cell: &CellValue) -> String {
        let rendered = match (type_tag, cell) {
            (TypeTag::Int64, CellValue::Text(text)) => parse_integer(text).map(|v| v.to_string()),
            (TypeTag::Float64, CellValue::Text(text)) => parse_number(text).map(|v| v.to_string()),
            (TypeTag::Boolean, CellValue::Text(text)) => {
                parse_bool(text).map(|v| self.dialect.bool_literal(v).to_string())
            }
            (TypeTag::DateTime, CellValue::Text(text)) => parse_temporal(text).map(|t| {
                let value = t.date_time().format("%Y-%m-%d %H:%M:%S").to_string();
                self.dialect.escape_str(&value)
            }),
            (TypeTag::Date, CellValue::Text(text)) => parse_temporal(text)
                .map(|t| self.dialect.escape_str(&t.date().format("%Y-%m-%d").to_string())),
            (TypeTag::String, CellValue::Number(n)) => {
                Some(self.dialect.escape_str(&n.to_string()))
            }
            (TypeTag::String, CellValue::Bool(b)) => {
                Some(self.dialect.escape_str(&b.to_string()))
            }
            _ => None,
        };
        rendered.unwrap_or_else(|| self.dialect.escape_literal(cell))
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> TableSpec {
        TableSpec::new(
            "db",
            "t",
            vec![
                Field::new("name", TypeTag::String).with_source(0),
                Field::new("score", TypeTag::Float64).with_source(1),
                Field::new("active", TypeTag::Boolean).with_source(2),
                Field::new("loaded_at", TypeTag::DateTime),
            ],
        )
    }

    #[test]
    fn test_build_multi_row_statement() {
        let rows = vec![
            vec!["O'Brien".into(), " 1.5 ".into(), "Yes".into()],
            vec![CellValue::Null, "".into(), "0".into()],
        ];
        assert_eq!(
            InsertBuilder::default().build(&spec(), &rows),
            "INSERT INTO db.t (name, score, active, loaded_at) VALUES \
             ('O''Brien', 1.5, true, NULL), (NULL, NULL, false, NULL)"
        );
    }

    #[test]
    fn test_unparseable_text_is_quoted() {
        let builder = InsertBuilder::default();
        assert_eq!(builder.render_cell(&TypeTag::Int64, &"12a".into()), "'12a'");
        assert_eq!(builder.render_cell(&TypeTag::DateTime, &"soon".into()), "'soon'");
        assert_eq!(builder.render_cell(&TypeTag::Int64, &"1.5".into()), "'1.5'");
        assert_eq!(builder.render_cell(&TypeTag::Boolean, &"maybe".into()), "'maybe'");
        assert_eq!(builder.render_cell(&TypeTag::Float64, &"NaN".into()), "'NaN'");
    }

    #[test]
    fn test_numbers_are_normalized() {
        let builder = InsertBuilder::default();
        assert_eq!(builder.render_cell(&TypeTag::Int64, &" 007 ".into()), "7");
        assert_eq!(builder.render_cell(&TypeTag::Float64, &"1e3".into()), "1000");
        assert_eq!(builder.render_cell(&TypeTag::Float64, &"2.0".into()), "2");
        assert_eq!(
            builder.render_cell(&TypeTag::Float64, &"99999999999999999999".into()),
            "100000000000000000000"
        );
    }

    #[test]
    fn test_dates_use_engine_layout() {
        let builder = InsertBuilder::default();
        let cases = [
            ("01/31/2024", "'2024-01-31 00:00:00'"),
            ("31.01.2024", "'2024-01-31 00:00:00'"),
            ("2024-01-31T10:00:00Z", "'2024-01-31 10:00:00'"),
            ("2024-01-31T12:00:00+02:00", "'2024-01-31 10:00:00'"),
            ("2024-01-31 10:00:00.250", "'2024-01-31 10:00:00'"),
        ];
        for (text, expected) in cases {
            assert_eq!(builder.render_cell(&TypeTag::DateTime, &text.into()), expected, "{text}");
        }
        assert_eq!(
            builder.render_cell(&TypeTag::Date, &"2024-01-31T10:00:00Z".into()),
            "'2024-01-31'"
        );
        assert_eq!(builder.render_cell(&TypeTag::Date, &"2024/01/31".into()), "'2024-01-31'");
    }

    #[test]
    fn test_json_scalars_render_by_column_type() {
        let builder = InsertBuilder::default();
        assert_eq!(builder.render_cell(&TypeTag::Int64, &CellValue::Number(7.into())), "7");
        assert_eq!(builder.render_cell(&TypeTag::String, &CellValue::Number(7.into())), "'7'");
        assert_eq!(builder.render_cell(&TypeTag::String, &CellValue::Bool(true)), "'true'");
        assert_eq!(builder.render_cell(&TypeTag::Boolean, &CellValue::Bool(false)), "false");
    }

    #[test]
    fn test_source_outside_row_is_null() {
        let spec = TableSpec::new("db", "t", vec![Field::new("x", TypeTag::String).with_source(5)]);
        let rows = vec![vec![CellValue::from("a")]];
        assert_eq!(
            InsertBuilder::default().build(&spec, &rows),
            "INSERT INTO db.t (x) VALUES (NULL)"
        );
    }
}
