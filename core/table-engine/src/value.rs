//! FILENAME: core/table-engine/src/value.rs
//! PURPOSE: Scalar values stored in decision tables and supplied as lookup keys.
//! CONTEXT: Values key hash indices and are totally sorted before row
//! deduplication, so floats are wrapped in `OrderedFloat` to get Eq/Ord/Hash.

use std::cmp::Ordering;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Placeholder for absent or null key values during lookup.
pub const NULL_SENTINEL: &str = "NULL";

/// Placeholder filling fields a usage does not define when combinations are merged.
pub const UNKNOWN_OR_EMPTY: &str = "Unknown or Empty";

// ============================================================================
// ORDERED FLOAT
// ============================================================================

/// Wrapper around f64 that implements Eq, Ord and Hash.
/// `-0.0` is folded into `0.0` and every NaN into one canonical NaN on
/// construction, so equality, hashing and ordering agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct OrderedFloat(f64);

impl OrderedFloat {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            OrderedFloat(f64::NAN)
        } else if value == 0.0 {
            OrderedFloat(0.0)
        } else {
            OrderedFloat(value)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for OrderedFloat {
    fn from(value: f64) -> Self {
        OrderedFloat::new(value)
    }
}

impl From<OrderedFloat> for f64 {
    fn from(value: OrderedFloat) -> Self {
        value.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// A single table cell or lookup input.
///
/// Deserializes untagged from plain JSON scalars: `null`, `true`, `1.5`, `"text"`.
/// The derived ordering sorts `Null < Boolean < Number < Text`, which is the
/// total order used for key tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(OrderedFloat),
    Text(String),
}

impl Value {
    pub fn number(value: f64) -> Self {
        Value::Number(OrderedFloat::new(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// The `"NULL"` sentinel used for absent keys.
    pub fn null_sentinel() -> Self {
        Value::Text(NULL_SENTINEL.to_string())
    }

    /// The `"Unknown or Empty"` sentinel used to fill merged combinations.
    pub fn unknown_or_empty() -> Self {
        Value::Text(UNKNOWN_OR_EMPTY.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Null` and for either sentinel string.
    pub fn is_placeholder(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s == NULL_SENTINEL || s == UNKNOWN_OR_EMPTY,
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.get()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
        }
    }

    /// String form used to compare values coming from different tables.
    /// Integral numbers drop their fractional part so `2000` and `2000.0` agree.
    pub fn normalized(&self) -> String {
        match self {
            Value::Null => NULL_SENTINEL.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(n.get()),
            Value::Text(s) => s.clone(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{:?}", s),
            other => f.write_str(&other.normalized()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
