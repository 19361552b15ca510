//! FILENAME: core/table-engine/src/record.rs
//! PURPOSE: The value columns of one decision-table row.
//! CONTEXT: Every record of a table shares the same column list, so the
//! names are held once behind an `Arc` and each record stores only values.

use std::collections::BTreeMap;
use std::sync::Arc;
use crate::value::Value;

/// Retained value columns of a single row, in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Record { columns, values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Numeric value of a column, `None` if absent or not a number.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }

    /// Value of the first declared value column.
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }
}
