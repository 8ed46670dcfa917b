//! Export functionality
//!
//! Generates the SQL sent to the query engine:
//! - `CREATE TABLE` statements from a [`TableSpec`](crate::models::TableSpec)
//! - `INSERT ... VALUES` statements, one per batch
//! - identifier and literal escaping shared by both

pub mod ddl;
pub mod escape;
pub mod insert;

pub use ddl::DdlBuilder;
pub use escape::{
    SqlDialect, escape_identifier, escape_literal, escape_str, is_plain_identifier,
    unescape_literal,
};
pub use insert::InsertBuilder;
