//! FILENAME: core/entanglement-engine/src/field_index.rs
//! PURPOSE: Which usages consume which schema fields.
//! CONTEXT: Categorical fields shared by several usages drive entanglement
//! grouping; numerical ones only matter for domain aggregation, so every
//! entry carries the field's schema kind.

use rustc_hash::FxHashMap;

use crate::schema::{FieldKind, Schema};
use crate::usage::Usage;

/// Usages of one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUsage {
    pub kind: FieldKind,
    /// Usage ids, in usage order, each listed once.
    pub usages: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FieldUsageIndex {
    /// Used schema fields, in schema order.
    entries: Vec<(String, FieldUsage)>,
    positions: FxHashMap<String, usize>,
}

impl FieldUsageIndex {
    /// Scans every usage's mapping. Fields outside the schema are ignored.
    pub fn build(schema: &Schema, usages: &[Usage]) -> Self {
        let mut index = FieldUsageIndex::default();
        for field in schema.iter() {
            let users: Vec<String> = usages
                .iter()
                .filter(|u| u.fields().any(|f| f == field.name))
                .map(|u| u.id.clone())
                .collect();
            if users.is_empty() {
                continue;
            }
            index.positions.insert(field.name.clone(), index.entries.len());
            index.entries.push((
                field.name.clone(),
                FieldUsage { kind: field.kind, usages: users },
            ));
        }
        index
    }

    pub fn get(&self, field: &str) -> Option<&FieldUsage> {
        self.positions.get(field).map(|&i| &self.entries[i].1)
    }

    /// Ids of the usages touching `field`; empty when unused.
    pub fn usages_of(&self, field: &str) -> &[String] {
        self.get(field).map(|u| u.usages.as_slice()).unwrap_or(&[])
    }

    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.get(field).map(|u| u.kind)
    }

    pub fn is_used(&self, field: &str) -> bool {
        self.positions.contains_key(field)
    }

    /// Used categorical fields with their usages.
    pub fn categorical(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter()
            .filter(|(_, u)| u.kind == FieldKind::Categorical)
            .map(|(f, u)| (f, u.usages.as_slice()))
    }

    /// Categorical fields consumed by more than one usage.
    pub fn entangled_fields(&self) -> impl Iterator<Item = &str> {
        self.categorical()
            .filter(|(_, users)| users.len() > 1)
            .map(|(f, _)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldUsage)> {
        self.entries.iter().map(|(f, u)| (f.as_str(), u))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
