//! FILENAME: core/table-engine/src/table.rs
//! Decision Table - Immutable, indexed reference table.
//!
//! Build (once, from a `TableDefinition`):
//! 1. Validate and extract each row's key tuple and value record
//! 2. Stable-sort by key tuple and drop duplicates (first occurrence wins)
//! 3. Derive numeric thresholds, per-column domains, the exact-match index,
//!    the fallback index (categorical sub-tuple -> numeric combinations) and
//!    the distinct categorical combinations
//!
//! Lookup:
//! 1. Absent or null keys become the "NULL" sentinel; a numerical key
//!    whose input is not a number fails with `LookupError::NotFound`
//! 2. Numeric keys are floored onto the column's thresholds
//! 3. Exact match on the processed tuple
//! 4. On a miss, resolve the numeric keys through the table's fallback
//!    strategy and retry the exact match
//! 5. Otherwise fail with `LookupError::NotFound`

use std::collections::BTreeMap;
use std::sync::Arc;
use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::definition::{FallbackStrategy, KeyKind, KeySpec, TableDefinition};
use crate::domain::Domain;
use crate::error::{ConfigError, LookupError};
use crate::input::KeyInput;
use crate::record::Record;
use crate::value::Value;

/// Key values of one row, in `keys` order.
pub type KeyTuple = SmallVec<[Value; 4]>;

/// Numeric key values of one row, in numerical-key order.
type NumericCombo = SmallVec<[f64; 4]>;

// ============================================================================
// DECISION TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct DecisionTable {
    name: String,
    keys: Vec<KeySpec>,
    value_columns: Arc<[String]>,
    fallback: FallbackStrategy,

    /// Deduplicated rows sorted by key tuple.
    rows: Vec<(KeyTuple, Record)>,

    /// Exact-match index: key tuple -> position in `rows`.
    index: FxHashMap<KeyTuple, usize>,

    /// Positions in `keys` of the categorical and numerical columns.
    categorical: Vec<usize>,
    numerical: Vec<usize>,

    /// Sorted distinct observed values, one entry per numerical key.
    thresholds: Vec<Vec<f64>>,

    /// Per key column domain.
    domains: FxHashMap<String, Domain>,

    /// Categorical sub-tuple -> numeric combinations filed under it, in row order.
    /// Tables without categorical keys file everything under the empty tuple.
    fallback_index: FxHashMap<KeyTuple, Vec<NumericCombo>>,

    /// Distinct categorical sub-tuples, in row order.
    cat_combinations: Vec<KeyTuple>,
}

impl DecisionTable {
    /// Builds and freezes a table. Fails on missing or mistyped columns.
    pub fn build(definition: TableDefinition) -> Result<Self, ConfigError> {
        let TableDefinition { name, keys, values, rows: raw_rows, fallback } = definition;

        if keys.is_empty() {
            return Err(ConfigError::NoKeys { table: name });
        }
        check_duplicate_columns(&name, &keys, &values)?;

        let categorical: Vec<usize> = positions_of(&keys, KeyKind::Categorical);
        let numerical: Vec<usize> = positions_of(&keys, KeyKind::Numerical);

        let value_columns: Arc<[String]> = values.into();
        let mut rows: Vec<(KeyTuple, Record)> = Vec::with_capacity(raw_rows.len());
        let mut seen_per_key: Vec<FxHashSet<Value>> = vec![FxHashSet::default(); keys.len()];
        let mut observed: Vec<Vec<Value>> = vec![Vec::new(); keys.len()];

        for (row_index, raw) in raw_rows.iter().enumerate() {
            let mut tuple = KeyTuple::with_capacity(keys.len());
            for (position, spec) in keys.iter().enumerate() {
                let cell = raw.get(&spec.name).ok_or_else(|| ConfigError::MissingColumn {
                    table: name.clone(),
                    column: spec.name.clone(),
                    row: row_index,
                })?;
                let key_value = match spec.kind {
                    KeyKind::Categorical if cell.is_null() => Value::null_sentinel(),
                    KeyKind::Categorical => cell.clone(),
                    KeyKind::Numerical => match cell {
                        Value::Number(_) => cell.clone(),
                        other => {
                            return Err(ConfigError::InvalidKeyType {
                                table: name.clone(),
                                column: spec.name.clone(),
                                row: row_index,
                                found: other.type_name(),
                            })
                        }
                    },
                };
                if seen_per_key[position].insert(key_value.clone()) {
                    observed[position].push(key_value.clone());
                }
                tuple.push(key_value);
            }

            let record_values = value_columns
                .iter()
                .map(|column| {
                    raw.get(column).cloned().ok_or_else(|| ConfigError::MissingColumn {
                        table: name.clone(),
                        column: column.clone(),
                        row: row_index,
                    })
                })
                .collect::<Result<Vec<Value>, ConfigError>>()?;
            rows.push((tuple, Record::new(value_columns.clone(), record_values)));
        }

        // Stable sort keeps the original order among equal tuples, so
        // dedup_by retains the first occurrence.
        let raw_count = rows.len();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows.dedup_by(|later, earlier| later.0 == earlier.0);
        if rows.len() < raw_count {
            debug!(
                "table '{}': dropped {} duplicate key rows",
                name,
                raw_count - rows.len()
            );
        }

        let index: FxHashMap<KeyTuple, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, (tuple, _))| (tuple.clone(), i))
            .collect();

        let thresholds: Vec<Vec<f64>> = numerical
            .iter()
            .map(|&position| {
                let mut values: Vec<f64> =
                    observed[position].iter().filter_map(Value::as_number).collect();
                values.sort_by(|a, b| a.total_cmp(b));
                values.dedup();
                values
            })
            .collect();

        let mut domains = FxHashMap::default();
        for (position, spec) in keys.iter().enumerate() {
            let domain = match spec.kind {
                KeyKind::Categorical => Domain::Categorical {
                    values: std::mem::take(&mut observed[position]),
                },
                KeyKind::Numerical => {
                    let slot = numerical.iter().position(|&p| p == position).unwrap_or(0);
                    match (thresholds[slot].first(), thresholds[slot].last()) {
                        (Some(&min), Some(&max)) => Domain::Bounded { min, max },
                        _ => Domain::UnconstrainedNumeric,
                    }
                }
            };
            domains.insert(spec.name.clone(), domain);
        }

        let mut fallback_index: FxHashMap<KeyTuple, Vec<NumericCombo>> = FxHashMap::default();
        let mut cat_combinations: Vec<KeyTuple> = Vec::new();
        for (tuple, _) in &rows {
            let cat: KeyTuple = categorical.iter().map(|&p| tuple[p].clone()).collect();
            let combo: NumericCombo = numerical
                .iter()
                .filter_map(|&p| tuple[p].as_number())
                .collect();
            let entry = fallback_index.entry(cat.clone()).or_insert_with(|| {
                cat_combinations.push(cat);
                Vec::new()
            });
            if !numerical.is_empty() {
                entry.push(combo);
            }
        }

        debug!(
            "built table '{}': {} rows, {} categorical and {} numerical keys, {} categorical combinations",
            name,
            rows.len(),
            categorical.len(),
            numerical.len(),
            cat_combinations.len()
        );

        Ok(DecisionTable {
            name,
            keys,
            value_columns,
            fallback,
            rows,
            index,
            categorical,
            numerical,
            thresholds,
            domains,
            fallback_index,
            cat_combinations,
        })
    }

    // ------------------------------------------------------------------------
    // LOOKUP
    // ------------------------------------------------------------------------

    /// Resolves the row matching `input`. See the module docs for the steps.
    pub fn lookup<I: KeyInput + ?Sized>(&self, input: &I) -> Result<&Record, LookupError> {
        let raw: KeyTuple = self
            .keys
            .iter()
            .map(|spec| match input.key(&spec.name) {
                Some(value) if !value.is_null() => value.clone(),
                _ => Value::null_sentinel(),
            })
            .collect();

        // A numerical key only resolves from a number.
        if self.numerical.iter().any(|&p| raw[p].as_number().is_none()) {
            return Err(self.not_found(&raw));
        }

        let mut probe = raw.clone();
        for (slot, &position) in self.numerical.iter().enumerate() {
            let bucket = raw[position]
                .as_number()
                .and_then(|x| floor_threshold(&self.thresholds[slot], x));
            if let Some(bucket) = bucket {
                probe[position] = Value::number(bucket);
            }
        }

        if let Some(&row) = self.index.get(&probe) {
            return Ok(&self.rows[row].1);
        }
        if self.numerical.is_empty() || self.rows.is_empty() {
            return Err(self.not_found(&probe));
        }

        let resolved = self.resolve_numeric(&raw, probe);
        trace!("table '{}': fallback resolved keys to {:?}", self.name, resolved);
        match self.index.get(&resolved) {
            Some(&row) => Ok(&self.rows[row].1),
            None => Err(self.not_found(&resolved)),
        }
    }

    /// Single value column of the matching row. `None` selects the first
    /// declared value column.
    pub fn value<I: KeyInput + ?Sized>(
        &self,
        input: &I,
        column: Option<&str>,
    ) -> Result<&Value, LookupError> {
        let column = match column {
            Some(c) => c,
            None => self.value_columns.first().map(String::as_str).unwrap_or(""),
        };
        if !self.value_columns.iter().any(|c| c == column) {
            return Err(LookupError::UnknownValueColumn {
                table: self.name.clone(),
                column: column.to_string(),
            });
        }
        let record = self.lookup(input)?;
        record.get(column).ok_or_else(|| LookupError::UnknownValueColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Replaces the numeric positions of `probe` with the combination chosen
    /// by the fallback strategy, comparing against the raw input values.
    fn resolve_numeric(&self, raw: &KeyTuple, mut probe: KeyTuple) -> KeyTuple {
        let cat: KeyTuple = self.categorical.iter().map(|&p| raw[p].clone()).collect();
        let candidates: &[NumericCombo] = self
            .fallback_index
            .get(&cat)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let inputs: SmallVec<[Option<f64>; 4]> =
            self.numerical.iter().map(|&p| raw[p].as_number()).collect();

        let chosen = match self.fallback {
            FallbackStrategy::Ceiling => candidates
                .iter()
                .find(|combo| dominates(combo, &inputs, |c, x| c >= x)),
            FallbackStrategy::Floor => candidates
                .iter()
                .rev()
                .find(|combo| dominates(combo, &inputs, |c, x| c <= x)),
        };

        for (slot, &position) in self.numerical.iter().enumerate() {
            let resolved = match chosen {
                Some(combo) => combo[slot],
                None => {
                    let grid = &self.thresholds[slot];
                    let edge = match self.fallback {
                        FallbackStrategy::Ceiling => grid.last(),
                        FallbackStrategy::Floor => grid.first(),
                    };
                    match edge {
                        Some(&v) => v,
                        None => continue,
                    }
                }
            };
            probe[position] = Value::number(resolved);
        }
        probe
    }

    fn not_found(&self, tuple: &KeyTuple) -> LookupError {
        LookupError::NotFound {
            table: self.name.clone(),
            attempted: self
                .keys
                .iter()
                .zip(tuple.iter())
                .map(|(spec, v)| (spec.name.clone(), v.clone()))
                .collect(),
        }
    }

    // ------------------------------------------------------------------------
    // ACCESSORS
    // ------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[KeySpec] {
        &self.keys
    }

    pub fn key_spec(&self, column: &str) -> Option<&KeySpec> {
        self.keys.iter().find(|k| k.name == column)
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    pub fn fallback(&self) -> FallbackStrategy {
        self.fallback
    }

    /// Number of rows after deduplication.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Domain of a key column: observed values for categorical keys,
    /// `{min, max}` for numerical keys.
    pub fn domain_of(&self, column: &str) -> Option<&Domain> {
        self.domains.get(column)
    }

    /// Discretization grid of a numerical key column.
    pub fn thresholds(&self, column: &str) -> Option<&[f64]> {
        let position = self.keys.iter().position(|k| k.name == column)?;
        let slot = self.numerical.iter().position(|&p| p == position)?;
        Some(&self.thresholds[slot])
    }

    /// Names of the categorical key columns, in key order.
    pub fn categorical_columns(&self) -> impl Iterator<Item = &str> {
        self.categorical.iter().map(|&p| self.keys[p].name.as_str())
    }

    /// Distinct combinations of categorical key values, keyed by column name.
    pub fn cat_combinations(&self) -> Vec<BTreeMap<String, Value>> {
        self.cat_combinations
            .iter()
            .map(|tuple| {
                self.categorical
                    .iter()
                    .zip(tuple.iter())
                    .map(|(&p, v)| (self.keys[p].name.clone(), v.clone()))
                    .collect()
            })
            .collect()
    }

    /// Rows as (key tuple, record) pairs in sorted key order.
    pub fn rows(&self) -> impl Iterator<Item = (&[Value], &Record)> {
        self.rows.iter().map(|(k, r)| (k.as_slice(), r))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn positions_of(keys: &[KeySpec], kind: KeyKind) -> Vec<usize> {
    keys.iter()
        .enumerate()
        .filter(|(_, k)| k.kind == kind)
        .map(|(i, _)| i)
        .collect()
}

fn check_duplicate_columns(
    table: &str,
    keys: &[KeySpec],
    values: &[String],
) -> Result<(), ConfigError> {
    let mut seen = FxHashSet::default();
    for column in keys.iter().map(|k| k.name.as_str()).chain(values.iter().map(String::as_str)) {
        if !seen.insert(column) {
            return Err(ConfigError::DuplicateColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Largest threshold <= `x`; the smallest threshold when `x` is below all of them.
pub(crate) fn floor_threshold(thresholds: &[f64], x: f64) -> Option<f64> {
    if thresholds.is_empty() {
        return None;
    }
    let above = thresholds.partition_point(|&t| t <= x);
    Some(thresholds[above.saturating_sub(1)])
}

/// True when every numeric input is present and `cmp(candidate, input)` holds
/// for each column.
fn dominates(combo: &[f64], inputs: &[Option<f64>], cmp: impl Fn(f64, f64) -> bool) -> bool {
    combo
        .iter()
        .zip(inputs.iter())
        .all(|(&c, x)| matches!(x, Some(x) if cmp(c, *x)))
}
