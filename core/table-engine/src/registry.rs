//! FILENAME: core/table-engine/src/registry.rs
//! PURPOSE: Named collection of decision tables, built once at startup.
//! CONTEXT: Domain calculators address tables by identifier. After `build`
//! returns, the set is read-only and can be shared across threads behind an `Arc`.

use log::debug;
use rustc_hash::FxHashMap;

use crate::definition::TableDefinition;
use crate::domain::Domain;
use crate::error::{ConfigError, LookupError};
use crate::input::KeyInput;
use crate::record::Record;
use crate::table::DecisionTable;
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: FxHashMap<String, DecisionTable>,
    /// Table names in insertion order.
    order: Vec<String>,
}

impl TableSet {
    /// Builds every table. The first failing definition aborts the whole set.
    pub fn build<I>(definitions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = TableDefinition>,
    {
        let mut set = TableSet::default();
        for definition in definitions {
            set.insert(DecisionTable::build(definition)?)?;
        }
        debug!("built table set with {} tables", set.len());
        Ok(set)
    }

    /// Adds an already-built table. Only used while assembling the set.
    pub fn insert(&mut self, table: DecisionTable) -> Result<(), ConfigError> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(ConfigError::DuplicateTable(name));
        }
        self.order.push(name.clone());
        self.tables.insert(name, table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DecisionTable> {
        self.tables.get(name)
    }

    pub fn table(&self, name: &str) -> Result<&DecisionTable, LookupError> {
        self.get(name)
            .ok_or_else(|| LookupError::UnknownTable(name.to_string()))
    }

    pub fn lookup<I: KeyInput + ?Sized>(
        &self,
        table: &str,
        input: &I,
    ) -> Result<&Record, LookupError> {
        self.table(table)?.lookup(input)
    }

    pub fn value<I: KeyInput + ?Sized>(
        &self,
        table: &str,
        input: &I,
        column: Option<&str>,
    ) -> Result<&Value, LookupError> {
        self.table(table)?.value(input, column)
    }

    pub fn domain_of(&self, table: &str, field: &str) -> Result<Option<&Domain>, LookupError> {
        Ok(self.table(table)?.domain_of(field))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
