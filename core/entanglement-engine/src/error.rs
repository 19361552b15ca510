//! FILENAME: core/entanglement-engine/src/error.rs

use thiserror::Error;
use table_engine::Value;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntanglementError {
    #[error("Usage '{usage}' refers to unknown table '{table}'")]
    UnknownTable { usage: String, table: String },

    #[error("Usage '{usage}' maps '{column}', which is not a key column of table '{table}'")]
    UnknownColumn {
        usage: String,
        table: String,
        column: String,
    },

    #[error("Usage '{usage}' maps more than one column onto field '{field}'")]
    DuplicateField { usage: String, field: String },

    #[error("Usage id '{0}' is declared more than once")]
    DuplicateUsage(String),

    /// A usage in an entangled group shares no column with what has been
    /// merged so far, so the join would degrade into a cross product.
    #[error(
        "Incompatible schema in group {usages:?}: none of {pending:?} shares a column with {accumulated:?}"
    )]
    IncompatibleSchema {
        usages: Vec<String>,
        accumulated: Vec<String>,
        pending: Vec<String>,
    },

    #[error("Field '{field}' has both categorical and numeric domains across tables")]
    DomainKindMismatch { field: String },
}

/// One problem found while validating caller input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("{field} = {value} is not an allowed value")]
    NotInDomain { field: String, value: Value },

    #[error("{field} = {value} is not a number")]
    NotNumeric { field: String, value: Value },

    #[error("{group}: no valid combination matches {values:?}")]
    InvalidCombination {
        group: String,
        values: Vec<(String, Value)>,
    },
}

/// Every issue found in one input, in field order then group order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} invalid input value(s): {}", .0.len(), join_issues(.0))]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
