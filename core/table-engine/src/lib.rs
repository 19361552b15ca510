//! FILENAME: core/table-engine/src/lib.rs
//! Decision table subsystem.
//!
//! Reference tables map a mix of categorical and numeric conditions to
//! coefficient values. This crate turns their rows into immutable, indexed
//! `DecisionTable`s and answers lookups against inexact or missing inputs.
//!
//! Layers:
//! - `definition`: Serializable construction input (what a table IS)
//! - `table`: Indexed, frozen representation and lookup (HOW we resolve)
//! - `registry`: Named set of tables shared by the domain calculators

pub mod definition;
pub mod domain;
pub mod error;
pub mod input;
pub mod record;
pub mod registry;
pub mod table;
pub mod value;

pub use definition::{FallbackStrategy, KeyKind, KeySpec, Row, TableDefinition};
pub use domain::Domain;
pub use error::{ConfigError, LookupError};
pub use input::KeyInput;
pub use record::Record;
pub use registry::TableSet;
pub use table::{DecisionTable, KeyTuple};
pub use value::{OrderedFloat, Value, NULL_SENTINEL, UNKNOWN_OR_EMPTY};
