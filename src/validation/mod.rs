//! Validation functionality
//!
//! Provides validation logic for:
//! - Table validation (names, fields, partition rules, existing tables)
//! - Input validation and sanitization (security)

pub mod input;
pub mod tables;

pub use input::{
    ValidationError, ValidationResult, is_sql_reserved_word, sanitize_comment, validate_comment,
    validate_field_name, validate_namespace, validate_sql_fragment, validate_table_name,
};
pub use tables::{TableValidator, ValidationIssue, ValidationReport};
