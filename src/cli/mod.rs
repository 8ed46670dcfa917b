//! Command-line interface for table-upload

pub mod commands;
pub mod error;
pub mod output;
