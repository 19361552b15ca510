//! FILENAME: core/table-engine/src/input.rs
//! PURPOSE: Abstraction over the caller-side key maps accepted by `lookup`.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use crate::value::Value;

/// Anything that can answer "what value was supplied for this key column?".
/// A missing key and an explicit `Value::Null` are treated alike by lookups.
pub trait KeyInput {
    fn key(&self, name: &str) -> Option<&Value>;
}

impl<S: BuildHasher> KeyInput for HashMap<String, Value, S> {
    fn key(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl KeyInput for BTreeMap<String, Value> {
    fn key(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<K: AsRef<str>> KeyInput for [(K, Value)] {
    fn key(&self, name: &str) -> Option<&Value> {
        self.iter().find(|(k, _)| k.as_ref() == name).map(|(_, v)| v)
    }
}

impl<K: AsRef<str>, const N: usize> KeyInput for [(K, Value); N] {
    fn key(&self, name: &str) -> Option<&Value> {
        self.as_slice().key(name)
    }
}

impl<K: AsRef<str>> KeyInput for Vec<(K, Value)> {
    fn key(&self, name: &str) -> Option<&Value> {
        self.as_slice().key(name)
    }
}
