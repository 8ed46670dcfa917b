//! Table specification model

use serde::{Deserialize, Serialize};

use super::enums::TypeTag;
use super::field::{Field, select_partition_key};

/// Default table engine
pub const DEFAULT_ENGINE: &str = "MergeTree";

/// Error raised by a field edit that would break a table invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaEditError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Field name already in use: {0}")]
    NameTaken(String),
    #[error("Field '{field}' of type {type_tag} cannot be the partition key")]
    PartitionNotAllowed { field: String, type_tag: TypeTag },
}

/// Target table: namespace, name, engine, fields and comment
///
/// The edit methods mirror what an operator can do in the upload form and
/// keep the partition-key invariants intact. Fields stay public so callers
/// may build specs directly; [`crate::validation::TableValidator`] checks the
/// same invariants before any SQL is generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    /// Target database / namespace
    pub namespace: String,
    /// Table name
    pub table_name: String,
    /// Table engine (default: `MergeTree`)
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Target columns, in DDL order
    pub fields: Vec<Field>,
    /// Table comment
    #[serde(default)]
    pub comment: String,
    /// Emit `IF NOT EXISTS` and skip the existing-table check
    #[serde(default)]
    pub if_not_exists: bool,
}

fn default_engine() -> String {
    DEFAULT_ENGINE.to_string()
}

impl TableSpec {
    /// Create a spec with the default engine and no comment
    pub fn new(
        namespace: impl Into<String>,
        table_name: impl Into<String>,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            table_name: table_name.into(),
            engine: default_engine(),
            fields,
            comment: String::new(),
            if_not_exists: false,
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn if_not_exists(mut self, value: bool) -> Self {
        self.if_not_exists = value;
        self
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn position(&self, name: &str) -> Result<usize, SchemaEditError> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| SchemaEditError::UnknownField(name.to_string()))
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut Field, SchemaEditError> {
        let index = self.position(name)?;
        Ok(&mut self.fields[index])
    }

    /// Append a field. Names must be unique.
    pub fn add_field(&mut self, field: Field) -> Result<(), SchemaEditError> {
        if self.field(&field.name).is_some() {
            return Err(SchemaEditError::NameTaken(field.name));
        }
        let partition = field.is_partition_by;
        self.fields.push(field);
        if partition {
            let last = self.fields.len() - 1;
            if let Err(e) = self.check_partition_type(last) {
                self.fields[last].is_partition_by = false;
                return Err(e);
            }
            select_partition_key(&mut self.fields, last);
        }
        Ok(())
    }

    /// Remove a field and return it
    pub fn remove_field(&mut self, name: &str) -> Result<Field, SchemaEditError> {
        let index = self.position(name)?;
        Ok(self.fields.remove(index))
    }

    pub fn rename_field(
        &mut self,
        from: &str,
        to: impl Into<String>,
    ) -> Result<(), SchemaEditError> {
        let to = to.into();
        if from != to && self.field(&to).is_some() {
            return Err(SchemaEditError::NameTaken(to));
        }
        self.field_mut(from)?.name = to;
        Ok(())
    }

    /// Change a field's type. A partition flag the new type cannot carry is
    /// cleared.
    pub fn set_field_type(&mut self, name: &str, type_tag: TypeTag) -> Result<(), SchemaEditError> {
        let field = self.field_mut(name)?;
        if field.is_partition_by && !type_tag.allows_partition() {
            field.is_partition_by = false;
        }
        field.type_tag = type_tag;
        Ok(())
    }

    pub fn set_nullable(&mut self, name: &str, nullable: bool) -> Result<(), SchemaEditError> {
        self.field_mut(name)?.nullable = nullable;
        Ok(())
    }

    pub fn set_primary_key(&mut self, name: &str, enabled: bool) -> Result<(), SchemaEditError> {
        self.field_mut(name)?.is_primary_key = enabled;
        Ok(())
    }

    pub fn set_order_by(&mut self, name: &str, enabled: bool) -> Result<(), SchemaEditError> {
        self.field_mut(name)?.is_order_by = enabled;
        Ok(())
    }

    /// Select or clear the partition key.
    ///
    /// Enabling it on one field clears it on every other field. Fields whose
    /// type cannot partition are refused.
    pub fn set_partition_by(&mut self, name: &str, enabled: bool) -> Result<(), SchemaEditError> {
        let index = self.position(name)?;
        if !enabled {
            self.fields[index].is_partition_by = false;
            return Ok(());
        }
        self.check_partition_type(index)?;
        select_partition_key(&mut self.fields, index);
        Ok(())
    }

    fn check_partition_type(&self, index: usize) -> Result<(), SchemaEditError> {
        let field = &self.fields[index];
        if field.type_tag.allows_partition() {
            Ok(())
        } else {
            Err(SchemaEditError::PartitionNotAllowed {
                field: field.name.clone(),
                type_tag: field.type_tag.clone(),
            })
        }
    }

    /// Replace the order key with the given columns, in field order
    pub fn set_order_by_columns(&mut self, names: &[&str]) -> Result<(), SchemaEditError> {
        for name in names {
            self.position(name)?;
        }
        for field in &mut self.fields {
            field.is_order_by = names.contains(&field.name.as_str());
        }
        Ok(())
    }

    /// Replace the primary key with the given columns, in field order
    pub fn set_primary_key_columns(&mut self, names: &[&str]) -> Result<(), SchemaEditError> {
        for name in names {
            self.position(name)?;
        }
        for field in &mut self.fields {
            field.is_primary_key = names.contains(&field.name.as_str());
        }
        Ok(())
    }

    /// Names of the `ORDER BY` columns, in field order
    pub fn order_by_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_order_by)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Names of the `PRIMARY KEY` columns, in field order
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_primary_key)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// The partition field, if one is selected
    pub fn partition_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_partition_by)
    }
}
