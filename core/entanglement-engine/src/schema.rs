//! FILENAME: core/entanglement-engine/src/schema.rs
//! PURPOSE: Caller-facing input schema: field names and how each is typed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[serde(alias = "cat")]
    Categorical,
    #[serde(alias = "num")]
    Numerical,
    /// Identifiers and other fields never constrained by tables.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
}

/// Ordered list of input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<SchemaField>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(SchemaField { name: name.into(), kind });
        self
    }

    pub fn categorical(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Categorical)
    }

    pub fn numerical(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Numerical)
    }

    pub fn other(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Other)
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.field(name).map(|f| f.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter()
    }
}
