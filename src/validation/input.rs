//! Input validation and sanitization utilities.
//!
//! Checks applied to operator-supplied names, type expressions and comments
//! before they are spliced into generated SQL.
//!
//! # Security
//!
//! Input validation prevents:
//! - SQL injection via custom type expressions or engine clauses
//! - Oversized identifiers and comments
//! - Control characters leaking into table comments

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for table names
pub const MAX_TABLE_NAME_LENGTH: usize = 255;

/// Maximum length for field names
pub const MAX_FIELD_NAME_LENGTH: usize = 255;

/// Maximum length for namespaces, type expressions and engine clauses
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Maximum length for table comments
pub const MAX_COMMENT_LENGTH: usize = 10000;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_length(field: &'static str, value: &str, max: usize) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn reject_control_characters(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidCharacters {
            field,
            reason: "contains control characters".to_string(),
        });
    }
    Ok(())
}

/// Validate a namespace (target database).
///
/// # Examples
///
/// ```
/// use table_upload_sdk::validation::input::validate_namespace;
///
/// assert!(validate_namespace("analytics").is_ok());
/// assert!(validate_namespace("").is_err());
/// ```
pub fn validate_namespace(namespace: &str) -> ValidationResult<()> {
    check_length("namespace", namespace, MAX_IDENTIFIER_LENGTH)?;
    reject_control_characters("namespace", namespace)
}

/// Validate a table name.
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 255 characters
/// - Must not contain control characters
///
/// Any other character is allowed; generated SQL quotes names that are not
/// plain identifiers.
pub fn validate_table_name(name: &str) -> ValidationResult<()> {
    check_length("table name", name, MAX_TABLE_NAME_LENGTH)?;
    reject_control_characters("table name", name)
}

/// Validate a field name.
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 255 characters
/// - Must not contain whitespace
///
/// # Examples
///
/// ```
/// use table_upload_sdk::validation::input::validate_field_name;
///
/// assert!(validate_field_name("user_id").is_ok());
/// assert!(validate_field_name("user.name").is_ok());
/// assert!(validate_field_name("user id").is_err());
/// ```
pub fn validate_field_name(name: &str) -> ValidationResult<()> {
    check_length("field name", name, MAX_FIELD_NAME_LENGTH)?;
    if name.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidCharacters {
            field: "field name",
            reason: "contains whitespace".to_string(),
        });
    }
    reject_control_characters("field name", name)
}

/// Validate a raw SQL fragment spliced into DDL verbatim: a custom type
/// expression or an engine clause.
///
/// # Examples
///
/// ```
/// use table_upload_sdk::validation::input::validate_sql_fragment;
///
/// assert!(validate_sql_fragment("data type", "Decimal(18, 4)").is_ok());
/// assert!(validate_sql_fragment("data type", "Enum8('a' = 1)").is_ok());
/// assert!(validate_sql_fragment("engine", "ReplacingMergeTree(version)").is_ok());
/// assert!(validate_sql_fragment("data type", "String; DROP TABLE users").is_err());
/// ```
pub fn validate_sql_fragment(field: &'static str, fragment: &str) -> ValidationResult<()> {
    check_length(field, fragment.trim(), MAX_IDENTIFIER_LENGTH)?;

    if fragment.contains(';') || fragment.contains("--") || fragment.contains("/*") {
        return Err(ValidationError::InvalidCharacters {
            field,
            reason: "contains SQL comment or statement separator".to_string(),
        });
    }
    if fragment.contains('`') || fragment.contains('\\') {
        return Err(ValidationError::InvalidCharacters {
            field,
            reason: "contains backtick or backslash".to_string(),
        });
    }
    if fragment.matches('\'').count() % 2 != 0 {
        return Err(ValidationError::InvalidFormat(
            field,
            "unbalanced single quotes".to_string(),
        ));
    }
    reject_control_characters(field, fragment)
}

/// Validate a table comment length.
pub fn validate_comment(comment: &str) -> ValidationResult<()> {
    let actual = comment.chars().count();
    if actual > MAX_COMMENT_LENGTH {
        return Err(ValidationError::TooLong {
            field: "comment",
            max: MAX_COMMENT_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// Sanitize a comment for use in a `COMMENT` clause.
///
/// Removes control characters except newlines, carriage returns and tabs,
/// and trims surrounding whitespace.
pub fn sanitize_comment(comment: &str) -> String {
    comment
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Check if a word is a SQL reserved word.
///
/// Covers common reserved words across SQL dialects plus the clause keywords
/// of table DDL. Reserved words are quoted when used as identifiers.
pub fn is_sql_reserved_word(word: &str) -> bool {
    const RESERVED_WORDS: &[&str] = &[
        "select",
        "from",
        "where",
        "prewhere",
        "insert",
        "update",
        "delete",
        "create",
        "drop",
        "alter",
        "table",
        "index",
        "view",
        "database",
        "schema",
        "engine",
        "partition",
        "sample",
        "settings",
        "format",
        "final",
        "ttl",
        "primary",
        "key",
        "references",
        "constraint",
        "unique",
        "check",
        "default",
        "not",
        "null",
        "and",
        "or",
        "in",
        "between",
        "like",
        "is",
        "if",
        "exists",
        "case",
        "when",
        "then",
        "else",
        "as",
        "on",
        "join",
        "array",
        "with",
        "using",
        "group",
        "by",
        "having",
        "order",
        "asc",
        "desc",
        "limit",
        "offset",
        "union",
        "all",
        "distinct",
        "values",
        "set",
        "into",
        "comment",
        "true",
        "false",
        "date",
        "time",
        "timestamp",
    ];

    let lower = word.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}
