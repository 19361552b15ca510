//! FILENAME: core/entanglement-engine/src/lib.rs
//! Field entanglement subsystem.
//!
//! Many decision tables share input fields. This crate works out, for a
//! caller-facing schema, which tables use which fields, which fields are
//! jointly constrained, what combinations of their values are valid and
//! what domain each field may take. It depends on `table-engine` for
//! `Value`, `Domain` and the tables themselves.
//!
//! Layers:
//! - `schema`, `usage`: Serializable configuration (what the caller declares)
//! - `field_index`: Field -> usages map
//! - `grouper`: Entanglement groups and merged combinations
//! - `domains`: Per-field domain aggregation
//! - `validation`, `model`: Input checks and the frozen façade

pub mod domains;
pub mod error;
pub mod field_index;
pub mod grouper;
pub mod model;
pub mod schema;
pub mod union_find;
pub mod usage;
pub mod validation;

pub use domains::DomainAggregator;
pub use error::{EntanglementError, ValidationErrors, ValidationIssue};
pub use field_index::{FieldUsage, FieldUsageIndex};
pub use grouper::{CombinationRecord, EntanglementGroup, EntanglementGrouper};
pub use model::FieldModel;
pub use schema::{FieldKind, Schema, SchemaField};
pub use union_find::DisjointSet;
pub use usage::Usage;
pub use validation::InputValidator;
