//! FILENAME: core/entanglement-engine/src/usage.rs
//! PURPOSE: A named consumer of a decision table and its column -> field mapping.
//! CONTEXT: Domain calculators declare one usage per table they query. The
//! mapping renames the table's key columns into schema field names.

use std::collections::BTreeMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use table_engine::{KeyInput, LookupError, Record, TableSet, Value};

use crate::error::EntanglementError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Unique identifier among the usages handed to one model.
    pub id: String,
    /// Name of the decision table in the `TableSet`.
    pub table: String,
    /// Table key column -> schema field.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

impl Usage {
    pub fn new(id: impl Into<String>, table: impl Into<String>) -> Self {
        Usage {
            id: id.into(),
            table: table.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Maps a table key column to a schema field.
    pub fn map(mut self, column: impl Into<String>, field: impl Into<String>) -> Self {
        self.columns.insert(column.into(), field.into());
        self
    }

    /// Maps a column to the schema field of the same name.
    pub fn same(self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.map(column.clone(), column)
    }

    /// Schema field a table column is exposed as. Unmapped columns keep
    /// their table name.
    pub fn field_for<'a>(&'a self, column: &'a str) -> &'a str {
        self.columns.get(column).map(String::as_str).unwrap_or(column)
    }

    /// Table column exposed as `field`, if any.
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, f)| f.as_str() == field)
            .map(|(c, _)| c.as_str())
    }

    /// Schema fields this usage touches.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }

    /// Translates schema-field input into the table's key columns.
    /// Fields the caller did not supply come out as `Value::Null`.
    pub fn keys_from<I: KeyInput + ?Sized>(&self, input: &I) -> Vec<(String, Value)> {
        self.columns
            .iter()
            .map(|(column, field)| {
                let value = input.key(field).cloned().unwrap_or(Value::Null);
                (column.clone(), value)
            })
            .collect()
    }

    /// Looks up this usage's table with schema-field input.
    pub fn lookup<'t, I: KeyInput + ?Sized>(
        &self,
        tables: &'t TableSet,
        input: &I,
    ) -> Result<&'t Record, LookupError> {
        tables.lookup(&self.table, &self.keys_from(input))
    }

    /// Checks the table exists, every mapped column is one of its keys and
    /// no two columns target the same field.
    pub fn check_against(&self, tables: &TableSet) -> Result<(), EntanglementError> {
        let table = tables.get(&self.table).ok_or_else(|| EntanglementError::UnknownTable {
            usage: self.id.clone(),
            table: self.table.clone(),
        })?;
        let mut targeted: FxHashSet<&str> = FxHashSet::default();
        for field in self.fields() {
            if !targeted.insert(field) {
                return Err(EntanglementError::DuplicateField {
                    usage: self.id.clone(),
                    field: field.to_string(),
                });
            }
        }
        for column in self.columns.keys() {
            if table.key_spec(column).is_none() {
                return Err(EntanglementError::UnknownColumn {
                    usage: self.id.clone(),
                    table: self.table.clone(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}
