//! FILENAME: core/table-engine/src/error.rs

use thiserror::Error;
use crate::value::Value;

/// Malformed or missing table definition. Fatal for the affected table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Table '{table}' declares no key columns")]
    NoKeys { table: String },

    #[error("Table '{table}': column '{column}' missing in row {row}")]
    MissingColumn { table: String, column: String, row: usize },

    #[error("Table '{table}': numerical key '{column}' holds a {found} in row {row}")]
    InvalidKeyType {
        table: String,
        column: String,
        row: usize,
        found: &'static str,
    },

    #[error("Table '{table}': column '{column}' declared more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("Duplicate table name: {0}")]
    DuplicateTable(String),
}

/// A lookup that could not be answered. Recoverable by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("No row in table '{table}' for keys {}", format_keys(.attempted))]
    NotFound {
        table: String,
        /// The last key tuple tried, after discretization and fallback.
        attempted: Vec<(String, Value)>,
    },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Table '{table}' has no value column '{column}'")]
    UnknownValueColumn { table: String, column: String },
}

fn format_keys(keys: &[(String, Value)]) -> String {
    let parts: Vec<String> = keys.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{{{}}}", parts.join(", "))
}
