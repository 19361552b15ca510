//! FILENAME: core/entanglement-engine/src/grouper.rs
//! Entanglement Grouper - Joint validity of categorical fields across tables.
//!
//! Usages that share a categorical schema field constrain each other: the
//! values a caller may pick for one table depend on what the other tables
//! define. This module partitions usages into such groups and merges each
//! group's distinct categorical combinations into one valid set.
//!
//! Algorithm:
//! 1. Union every pair of usages sharing a categorical field (disjoint set)
//! 2. Read the groups off the forest, ordered by first usage
//! 3. Single usage: its table's distinct categorical tuples, projected onto
//!    the columns mapped to categorical schema fields and renamed
//! 4. Several usages: outer-join the renamed tuples one usage at a time on
//!    the columns already merged, filling gaps with "Unknown or Empty"

use std::collections::BTreeMap;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use table_engine::{TableSet, Value};

use crate::error::EntanglementError;
use crate::field_index::FieldUsageIndex;
use crate::schema::FieldKind;
use crate::union_find::DisjointSet;
use crate::usage::Usage;

/// One jointly valid assignment: schema field -> value.
pub type CombinationRecord = BTreeMap<String, Value>;

/// A connected set of usages and their merged valid combinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntanglementGroup {
    /// "group_<n>", by output position.
    pub name: String,
    /// Member usage ids, in input order.
    pub usages: Vec<String>,
    /// Every schema field spanned by the combinations, in first-seen order.
    pub keys: Vec<String>,
    /// Fully populated, deduplicated, sorted by `keys`.
    pub combinations: Vec<CombinationRecord>,
}

impl EntanglementGroup {
    pub fn is_entangled(&self) -> bool {
        self.usages.len() > 1
    }
}

/// Renamed categorical combinations of one usage.
struct Renamed<'u> {
    usage: &'u Usage,
    columns: Vec<String>,
    rows: Vec<CombinationRecord>,
}

// ============================================================================
// GROUPER
// ============================================================================

pub struct EntanglementGrouper<'a> {
    tables: &'a TableSet,
}

impl<'a> EntanglementGrouper<'a> {
    pub fn new(tables: &'a TableSet) -> Self {
        EntanglementGrouper { tables }
    }

    /// Partitions usage positions into connected components of the
    /// "shares a categorical field" relation. Every position appears in
    /// exactly one group; isolated usages form singletons.
    pub fn partition(usages: &[Usage], index: &FieldUsageIndex) -> Vec<Vec<usize>> {
        let position_of: FxHashMap<&str, usize> = usages
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id.as_str(), i))
            .collect();

        let mut forest = DisjointSet::new(usages.len());
        for (_, users) in index.categorical() {
            let mut members = users.iter().filter_map(|id| position_of.get(id.as_str()).copied());
            if let Some(first) = members.next() {
                for other in members {
                    forest.union(first, other);
                }
            }
        }
        forest.groups()
    }

    /// Groups `usages` and computes each group's valid combinations.
    pub fn group(
        &self,
        usages: &[Usage],
        index: &FieldUsageIndex,
    ) -> Result<Vec<EntanglementGroup>, EntanglementError> {
        check_unique_ids(usages)?;

        let mut groups = Vec::new();
        for (n, members) in Self::partition(usages, index).into_iter().enumerate() {
            let members: Vec<&Usage> = members.iter().map(|&i| &usages[i]).collect();
            let (keys, combinations) = if members.len() == 1 {
                let renamed = self.renamed(members[0], index)?;
                (renamed.columns, renamed.rows)
            } else {
                self.merge(&members, index)?
            };
            let combinations = if keys.is_empty() {
                Vec::new()
            } else {
                normalize(combinations, &keys)
            };
            groups.push(EntanglementGroup {
                name: format!("group_{}", n),
                usages: members.iter().map(|u| u.id.clone()).collect(),
                keys,
                combinations,
            });
        }

        debug!(
            "grouped {} usages into {} groups ({} entangled)",
            usages.len(),
            groups.len(),
            groups.iter().filter(|g| g.is_entangled()).count()
        );
        Ok(groups)
    }

    /// The usage's table's distinct categorical tuples, keyed by schema field.
    /// Only columns mapped onto a categorical schema field are kept.
    fn renamed<'u>(
        &self,
        usage: &'u Usage,
        index: &FieldUsageIndex,
    ) -> Result<Renamed<'u>, EntanglementError> {
        usage.check_against(self.tables)?;
        let table = self.tables.get(&usage.table).ok_or_else(|| EntanglementError::UnknownTable {
            usage: usage.id.clone(),
            table: usage.table.clone(),
        })?;

        let projected: Vec<(&str, &str)> = table
            .categorical_columns()
            .filter_map(|column| {
                let field = usage.columns.get(column)?;
                (index.kind_of(field) == Some(FieldKind::Categorical))
                    .then_some((column, field.as_str()))
            })
            .collect();
        let columns: Vec<String> = projected.iter().map(|(_, f)| f.to_string()).collect();

        let mut rows: Vec<CombinationRecord> = Vec::new();
        if !projected.is_empty() {
            let mut seen: FxHashSet<CombinationRecord> = FxHashSet::default();
            for combo in table.cat_combinations() {
                let row: CombinationRecord = projected
                    .iter()
                    .filter_map(|(column, field)| {
                        combo.get(*column).map(|v| (field.to_string(), v.clone()))
                    })
                    .collect();
                if seen.insert(row.clone()) {
                    rows.push(row);
                }
            }
        }
        Ok(Renamed { usage, columns, rows })
    }

    /// Iterative outer join of every member's renamed combinations.
    fn merge(
        &self,
        members: &[&Usage],
        index: &FieldUsageIndex,
    ) -> Result<(Vec<String>, Vec<CombinationRecord>), EntanglementError> {
        let mut pending: Vec<Renamed> = members
            .iter()
            .map(|u| self.renamed(u, index))
            .collect::<Result<_, _>>()?;

        let first = pending.remove(0);
        let mut keys = first.columns;
        let mut merged = first.rows;

        while !pending.is_empty() {
            let next = pending
                .iter()
                .position(|r| r.columns.iter().any(|c| keys.contains(c)));
            let next = match next {
                Some(i) => pending.remove(i),
                None => {
                    return Err(EntanglementError::IncompatibleSchema {
                        usages: members.iter().map(|u| u.id.clone()).collect(),
                        accumulated: keys,
                        pending: pending.iter().map(|r| r.usage.id.clone()).collect(),
                    })
                }
            };

            let on: Vec<String> = next
                .columns
                .iter()
                .filter(|c| keys.contains(c))
                .cloned()
                .collect();
            merged = outer_join(&merged, &keys, &next.rows, &next.columns, &on);
            for column in next.columns {
                if !keys.contains(&column) {
                    keys.push(column);
                }
            }
        }
        Ok((keys, merged))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn check_unique_ids(usages: &[Usage]) -> Result<(), EntanglementError> {
    let mut seen = FxHashMap::default();
    for usage in usages {
        if seen.insert(usage.id.as_str(), ()).is_some() {
            return Err(EntanglementError::DuplicateUsage(usage.id.clone()));
        }
    }
    Ok(())
}

/// Outer join on `on`. Rows without a partner keep their own fields and get
/// the sentinel for every column of the other side.
pub(crate) fn outer_join(
    left: &[CombinationRecord],
    left_columns: &[String],
    right: &[CombinationRecord],
    right_columns: &[String],
    on: &[String],
) -> Vec<CombinationRecord> {
    let join_key = |row: &CombinationRecord| -> Vec<Value> {
        on.iter()
            .map(|c| row.get(c).cloned().unwrap_or_else(Value::unknown_or_empty))
            .collect()
    };

    let mut right_by_key: FxHashMap<Vec<Value>, Vec<usize>> = FxHashMap::default();
    for (i, row) in right.iter().enumerate() {
        right_by_key.entry(join_key(row)).or_default().push(i);
    }

    let mut matched = vec![false; right.len()];
    let mut out = Vec::with_capacity(left.len().max(right.len()));

    for row in left {
        match right_by_key.get(&join_key(row)) {
            Some(partners) => {
                for &j in partners {
                    matched[j] = true;
                    let mut combined = row.clone();
                    for (field, value) in &right[j] {
                        combined.entry(field.clone()).or_insert_with(|| value.clone());
                    }
                    out.push(combined);
                }
            }
            None => out.push(fill(row.clone(), right_columns)),
        }
    }
    for (j, row) in right.iter().enumerate() {
        if !matched[j] {
            out.push(fill(row.clone(), left_columns));
        }
    }
    out
}

fn fill(mut row: CombinationRecord, columns: &[String]) -> CombinationRecord {
    for column in columns {
        row.entry(column.clone()).or_insert_with(Value::unknown_or_empty);
    }
    row
}

/// Completes every row over `keys`, then sorts and deduplicates.
fn normalize(rows: Vec<CombinationRecord>, keys: &[String]) -> Vec<CombinationRecord> {
    let mut rows: Vec<CombinationRecord> = rows.into_iter().map(|r| fill(r, keys)).collect();
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|k| a.get(k))
            .cmp(keys.iter().map(|k| b.get(k)))
    });
    rows.dedup();
    rows
}
