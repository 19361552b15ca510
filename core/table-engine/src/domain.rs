//! FILENAME: core/table-engine/src/domain.rs
//! PURPOSE: Allowed-value domain of a key column or schema field.

use serde::{Deserialize, Serialize};
use crate::value::Value;

/// The set of values a field may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Domain {
    /// Anything goes (field not constrained by any table).
    FreeForm,
    /// Any number (numeric field not constrained by any table).
    UnconstrainedNumeric,
    /// Numbers observed between `min` and `max`, inclusive.
    Bounded { min: f64, max: f64 },
    /// Explicit enumeration of allowed values.
    Categorical { values: Vec<Value> },
}

impl Domain {
    pub fn categorical<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Domain::Categorical { values: values.into_iter().map(Into::into).collect() }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Domain::UnconstrainedNumeric | Domain::Bounded { .. })
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Domain::Categorical { .. })
    }

    /// Enumerated values, if this is a categorical domain.
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Domain::Categorical { values } => Some(values),
            _ => None,
        }
    }

    /// Membership test. Categorical values compare by normalized string so
    /// that a number and its textual form from another table still match.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Domain::FreeForm => true,
            Domain::UnconstrainedNumeric => value.as_number().is_some(),
            Domain::Bounded { min, max } => value
                .as_number()
                .map(|n| n >= *min && n <= *max)
                .unwrap_or(false),
            Domain::Categorical { values } => {
                let needle = value.normalized();
                values.iter().any(|v| v.normalized() == needle)
            }
        }
    }
}
