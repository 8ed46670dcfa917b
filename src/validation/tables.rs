//! Table validation functionality
//!
//! Checks a [`TableSpec`] before any SQL is generated: names, field
//! uniqueness, partition rules, raw SQL fragments and the existing-table
//! check against a [`SchemaCatalog`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::input::{
    validate_comment, validate_field_name, validate_namespace, validate_sql_fragment,
    validate_table_name,
};
use crate::database::SchemaCatalog;
use crate::models::{TableSpec, TypeTag};

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// What the finding is about: `namespace`, `table`, `engine`, `comment`
    /// or `field '<name>'`
    pub subject: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }

    fn field(name: &str, message: impl Into<String>) -> Self {
        Self::new(format!("field '{}'", name), message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Result of table validation.
///
/// Errors block DDL generation; warnings are advisory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[must_use = "validation results should be checked for errors"]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", errors.join("; "))
    }
}

/// Table validator
#[derive(Default)]
pub struct TableValidator;

impl TableValidator {
    /// Create a new table validator
    ///
    /// # Example
    ///
    /// ```rust
    /// use table_upload_sdk::models::{Field, TableSpec, TypeTag};
    /// use table_upload_sdk::validation::TableValidator;
    ///
    /// let spec = TableSpec::new("db", "t", vec![Field::new("id", TypeTag::Int64).order_by()]);
    /// let report = TableValidator::new().validate(&spec, None);
    /// assert!(report.is_valid());
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Validate a table spec.
    ///
    /// The existing-table check runs only when a catalog is supplied and the
    /// spec does not ask for `IF NOT EXISTS`.
    pub fn validate(
        &self,
        spec: &TableSpec,
        catalog: Option<&dyn SchemaCatalog>,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        if let Err(e) = validate_namespace(&spec.namespace) {
            report.errors.push(ValidationIssue::new("namespace", e.to_string()));
        }
        if let Err(e) = validate_table_name(&spec.table_name) {
            report.errors.push(ValidationIssue::new("table", e.to_string()));
        }
        if !spec.if_not_exists
            && !spec.namespace.is_empty()
            && !spec.table_name.is_empty()
            && let Some(catalog) = catalog
            && catalog.table_exists(&spec.namespace, &spec.table_name)
        {
            report.errors.push(ValidationIssue::new(
                "table",
                format!(
                    "{}.{} already exists",
                    spec.namespace, spec.table_name
                ),
            ));
        }

        if let Err(e) = validate_sql_fragment("engine", &spec.engine) {
            report.errors.push(ValidationIssue::new("engine", e.to_string()));
        }
        if let Err(e) = validate_comment(&spec.comment) {
            report.errors.push(ValidationIssue::new("comment", e.to_string()));
        }

        self.validate_fields(spec, &mut report);
        self.collect_warnings(spec, &mut report);

        report
    }

    fn validate_fields(&self, spec: &TableSpec, report: &mut ValidationReport) {
        if spec.fields.is_empty() {
            report
                .errors
                .push(ValidationIssue::new("table", "must have at least one field"));
            return;
        }

        let mut seen = HashSet::new();
        let mut duplicates = HashSet::new();
        for field in &spec.fields {
            if let Err(e) = validate_field_name(&field.name) {
                report.errors.push(ValidationIssue::field(&field.name, e.to_string()));
            }
            if !seen.insert(field.name.as_str()) && duplicates.insert(field.name.as_str()) {
                report
                    .errors
                    .push(ValidationIssue::field(&field.name, "duplicate field name"));
            }
            if let TypeTag::Other(expr) = &field.type_tag
                && let Err(e) = validate_sql_fragment("data type", expr)
            {
                report.errors.push(ValidationIssue::field(&field.name, e.to_string()));
            }
        }

        let partitions: Vec<_> = spec.fields.iter().filter(|f| f.is_partition_by).collect();
        if partitions.len() > 1 {
            let names: Vec<&str> = partitions.iter().map(|f| f.name.as_str()).collect();
            report.errors.push(ValidationIssue::new(
                "table",
                format!("only one partition field allowed, found {}", names.join(", ")),
            ));
        }
        for field in partitions {
            if !field.type_tag.allows_partition() {
                report.errors.push(ValidationIssue::field(
                    &field.name,
                    format!("type {} cannot be used as partition key", field.type_tag),
                ));
            }
        }
    }

    fn collect_warnings(&self, spec: &TableSpec, report: &mut ValidationReport) {
        let order_by = spec.order_by_columns();
        let primary_key = spec.primary_key_columns();

        if spec.engine.contains("MergeTree") && order_by.is_empty() {
            report.warnings.push(ValidationIssue::new(
                "engine",
                format!("{} table has no ORDER BY key", spec.engine.trim()),
            ));
        }

        for field in spec.fields.iter().filter(|f| f.is_key() && f.nullable) {
            report
                .warnings
                .push(ValidationIssue::field(&field.name, "key column is nullable"));
        }

        if !primary_key.is_empty() && !order_by.is_empty() && !order_by.starts_with(&primary_key) {
            report.warnings.push(ValidationIssue::new(
                "table",
                "PRIMARY KEY is not a prefix of ORDER BY",
            ));
        }
    }
}
