//! Field model for target table columns

use serde::{Deserialize, Serialize};

use super::enums::TypeTag;

/// A column of the table being created
///
/// Fields are created one per detected header when a file is parsed, or by
/// hand when the operator adds a column. `source_column` links the field to
/// the dataset column it is filled from; manually added fields have none and
/// are inserted as `NULL`.
///
/// # Example
///
/// ```rust
/// use table_upload_sdk::models::{Field, TypeTag};
///
/// let field = Field::new("id", TypeTag::Int64).not_null();
/// assert!(!field.nullable);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Column name (non-empty, no whitespace, unique within the table)
    pub name: String,
    /// Column type
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Whether the column allows NULL values (default: true)
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Part of the `PRIMARY KEY` clause
    #[serde(default)]
    pub is_primary_key: bool,
    /// Part of the `ORDER BY` clause
    #[serde(default)]
    pub is_order_by: bool,
    /// The partition column (at most one per table)
    #[serde(default)]
    pub is_partition_by: bool,
    /// Index of the dataset column this field is filled from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<usize>,
    /// Free-text description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

fn default_true() -> bool {
    true
}

impl Field {
    /// Create a nullable field with no key flags and no source column
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            nullable: true,
            is_primary_key: false,
            is_order_by: false,
            is_partition_by: false,
            source_column: None,
            description: String::new(),
        }
    }

    /// Link the field to a dataset column
    pub fn with_source(mut self, column: usize) -> Self {
        self.source_column = Some(column);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn order_by(mut self) -> Self {
        self.is_order_by = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark as partition key. Exclusivity across a field list is enforced by
    /// [`select_partition_key`] and table validation, not here.
    pub fn partition_by(mut self) -> Self {
        self.is_partition_by = true;
        self
    }

    /// Whether this field takes part in any table-level key
    pub fn is_key(&self) -> bool {
        self.is_primary_key || self.is_order_by || self.is_partition_by
    }
}

/// Make `fields[index]` the only partition key in the list.
///
/// Every other field loses its partition flag. Returns `false` and leaves
/// the list untouched when the index is out of range.
pub fn select_partition_key(fields: &mut [Field], index: usize) -> bool {
    if index >= fields.len() {
        return false;
    }
    for (i, field) in fields.iter_mut().enumerate() {
        field.is_partition_by = i == index;
    }
    true
}
