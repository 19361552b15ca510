//! FILENAME: core/table-engine/src/definition.rs
//! Decision Table Definition - The serializable construction input.
//!
//! This module contains the types needed to DESCRIBE a decision table.
//! An external loader produces them (after renaming, mapping and filtering
//! the raw reference files) and hands them to `DecisionTable::build`.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::value::Value;

/// One raw table row: column name -> cell value.
pub type Row = HashMap<String, Value>;

// ============================================================================
// KEYS
// ============================================================================

/// How a key column is matched against caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Exact match on the value.
    #[serde(alias = "cat")]
    Categorical,
    /// Discretized on the distinct values observed in the column.
    #[serde(alias = "num")]
    Numerical,
}

/// Declares one key column of a decision table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpec {
    #[serde(alias = "key_name")]
    pub name: String,
    #[serde(alias = "key_type")]
    pub kind: KeyKind,
}

impl KeySpec {
    pub fn categorical(name: impl Into<String>) -> Self {
        KeySpec { name: name.into(), kind: KeyKind::Categorical }
    }

    pub fn numerical(name: impl Into<String>) -> Self {
        KeySpec { name: name.into(), kind: KeyKind::Numerical }
    }

    pub fn is_categorical(&self) -> bool {
        self.kind == KeyKind::Categorical
    }
}

// ============================================================================
// FALLBACK
// ============================================================================

/// Strategy used when the discretized key tuple has no exact row.
///
/// Reference tables disagree on the rule to apply, so it is chosen per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// First stored combination whose every numeric key is >= the input,
    /// else the table-wide maximum of each numeric key.
    Ceiling,
    /// Last stored combination whose every numeric key is <= the input,
    /// else the table-wide minimum of each numeric key.
    Floor,
}

impl Default for FallbackStrategy {
    fn default() -> Self {
        FallbackStrategy::Ceiling
    }
}

// ============================================================================
// TABLE DEFINITION
// ============================================================================

/// Everything needed to build one `DecisionTable`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table identifier used by `TableSet` and in error messages.
    pub name: String,

    /// Key columns, in tuple order.
    pub keys: Vec<KeySpec>,

    /// Value columns retained in each `Record`.
    pub values: Vec<String>,

    /// Raw rows, already transformed by the loader.
    #[serde(default)]
    pub rows: Vec<Row>,

    #[serde(default)]
    pub fallback: FallbackStrategy,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, keys: Vec<KeySpec>, values: Vec<String>) -> Self {
        TableDefinition {
            name: name.into(),
            keys,
            values,
            rows: Vec::new(),
            fallback: FallbackStrategy::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Appends a row given as `(column, value)` pairs.
    pub fn with_row<K, V, I>(mut self, cells: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.rows.push(cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_key_format() {
        let json = r#"{
            "name": "rendement_distribution",
            "keys": [
                {"key_name": "type_distribution", "key_type": "cat"},
                {"key_name": "annee", "key_type": "num"}
            ],
            "values": ["rd"],
            "rows": [{"type_distribution": "Réseau collectif", "annee": 2000, "rd": 0.85}]
        }"#;
        let def: TableDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.keys[0], KeySpec::categorical("type_distribution"));
        assert_eq!(def.keys[1], KeySpec::numerical("annee"));
        assert_eq!(def.fallback, FallbackStrategy::Ceiling);
        assert_eq!(def.rows[0]["rd"], Value::number(0.85));
    }

    #[test]
    fn test_deserialize_explicit_fallback() {
        let json = r#"{
            "name": "t",
            "keys": [{"name": "year", "kind": "numerical"}],
            "values": [],
            "fallback": "floor"
        }"#;
        let def: TableDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.fallback, FallbackStrategy::Floor);
        assert!(def.rows.is_empty());
    }

    #[test]
    fn test_builder_rows() {
        let def = TableDefinition::new("t", vec![KeySpec::categorical("type")], vec!["coef".into()])
            .with_row([("type", Value::from("A")), ("coef", Value::from(0.5))]);
        assert_eq!(def.rows.len(), 1);
        assert_eq!(def.rows[0]["type"], Value::text("A"));
    }
}
