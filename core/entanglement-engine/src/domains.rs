//! FILENAME: core/entanglement-engine/src/domains.rs
//! PURPOSE: Allowed-value domain of every schema field, merged across tables.
//! CONTEXT: Feeds input validation and dynamic form construction. Fields whose
//! true domain cannot be read from table contents (booleans, enumerations
//! handled outside the tables) are patched with manual overrides.

use std::collections::BTreeMap;
use rustc_hash::FxHashMap;
use table_engine::{Domain, TableSet, Value};

use crate::error::EntanglementError;
use crate::field_index::FieldUsageIndex;
use crate::schema::{FieldKind, Schema, SchemaField};
use crate::usage::Usage;

pub struct DomainAggregator;

impl DomainAggregator {
    /// Computes one domain per schema field, then applies `overrides`.
    ///
    /// - unused numerical field -> `UnconstrainedNumeric`, other unused -> `FreeForm`
    /// - read from one table column -> that column's domain verbatim
    /// - read from several -> categorical union or numeric envelope
    pub fn domains_for(
        schema: &Schema,
        index: &FieldUsageIndex,
        usages: &[Usage],
        tables: &TableSet,
        overrides: &BTreeMap<String, Domain>,
    ) -> Result<BTreeMap<String, Domain>, EntanglementError> {
        let usage_by_id: FxHashMap<&str, &Usage> =
            usages.iter().map(|u| (u.id.as_str(), u)).collect();

        let mut domains = BTreeMap::new();
        for field in schema.iter() {
            let domain = Self::domain_of_field(field, index, &usage_by_id, tables)?;
            domains.insert(field.name.clone(), domain);
        }
        for (field, domain) in overrides {
            domains.insert(field.clone(), domain.clone());
        }
        Ok(domains)
    }

    fn domain_of_field(
        field: &SchemaField,
        index: &FieldUsageIndex,
        usage_by_id: &FxHashMap<&str, &Usage>,
        tables: &TableSet,
    ) -> Result<Domain, EntanglementError> {
        let users = index.usages_of(&field.name);
        if users.is_empty() {
            return Ok(match field.kind {
                FieldKind::Numerical => Domain::UnconstrainedNumeric,
                _ => Domain::FreeForm,
            });
        }

        // One candidate per distinct (table, column) source.
        let mut sources: Vec<(&str, &str)> = Vec::with_capacity(users.len());
        let mut candidates: Vec<&Domain> = Vec::with_capacity(users.len());
        for id in users {
            let Some(usage) = usage_by_id.get(id.as_str()) else {
                continue;
            };
            let column = usage.column_for(&field.name).unwrap_or(&field.name);
            if sources.contains(&(usage.table.as_str(), column)) {
                continue;
            }
            sources.push((usage.table.as_str(), column));
            let table = tables.get(&usage.table).ok_or_else(|| EntanglementError::UnknownTable {
                usage: usage.id.clone(),
                table: usage.table.clone(),
            })?;
            let domain = table.domain_of(column).ok_or_else(|| EntanglementError::UnknownColumn {
                usage: usage.id.clone(),
                table: usage.table.clone(),
                column: column.to_string(),
            })?;
            candidates.push(domain);
        }

        match candidates.as_slice() {
            [] => Ok(Domain::FreeForm),
            [single] => Ok((*single).clone()),
            _ if field.kind == FieldKind::Other => Ok(Domain::FreeForm),
            _ => merge_domains(&field.name, &candidates),
        }
    }
}

/// Union of categorical domains, or the numeric envelope of bounded ones.
pub(crate) fn merge_domains(field: &str, candidates: &[&Domain]) -> Result<Domain, EntanglementError> {
    if candidates.iter().any(|d| matches!(d, Domain::FreeForm)) {
        return Ok(Domain::FreeForm);
    }

    if candidates.iter().all(|d| d.is_categorical()) {
        let mut by_form: BTreeMap<String, Value> = BTreeMap::new();
        for value in candidates.iter().filter_map(|d| d.values()).flatten() {
            by_form.entry(value.normalized()).or_insert_with(|| value.clone());
        }
        return Ok(Domain::Categorical {
            values: by_form.into_values().collect(),
        });
    }

    if candidates.iter().all(|d| d.is_numeric()) {
        let mut envelope: Option<(f64, f64)> = None;
        for domain in candidates {
            match domain {
                Domain::Bounded { min, max } => {
                    envelope = Some(match envelope {
                        Some((lo, hi)) => (lo.min(*min), hi.max(*max)),
                        None => (*min, *max),
                    });
                }
                _ => return Ok(Domain::UnconstrainedNumeric),
            }
        }
        return Ok(match envelope {
            Some((min, max)) => Domain::Bounded { min, max },
            None => Domain::UnconstrainedNumeric,
        });
    }

    Err(EntanglementError::DomainKindMismatch {
        field: field.to_string(),
    })
}
