//! FILENAME: core/entanglement-engine/src/validation.rs
//! PURPOSE: Checks caller input against field domains and group combinations.
//! CONTEXT: Runs before any lookup so that users get every problem at once
//! instead of a `NotFound` from the first table that cannot resolve.

use std::collections::BTreeMap;
use table_engine::{Domain, KeyInput, Value};

use crate::error::{ValidationErrors, ValidationIssue};
use crate::grouper::EntanglementGroup;

pub struct InputValidator<'a> {
    domains: &'a BTreeMap<String, Domain>,
    groups: &'a [EntanglementGroup],
}

impl<'a> InputValidator<'a> {
    pub fn new(domains: &'a BTreeMap<String, Domain>, groups: &'a [EntanglementGroup]) -> Self {
        InputValidator { domains, groups }
    }

    /// Null and absent fields are never reported: lookups map them to the
    /// "NULL" sentinel themselves.
    pub fn validate<I: KeyInput + ?Sized>(&self, input: &I) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();

        for (field, domain) in self.domains {
            let Some(value) = supplied(input, field) else {
                continue;
            };
            match domain {
                Domain::Categorical { .. } if !domain.contains(value) => {
                    issues.push(ValidationIssue::NotInDomain {
                        field: field.clone(),
                        value: value.clone(),
                    });
                }
                Domain::UnconstrainedNumeric | Domain::Bounded { .. } if value.as_number().is_none() => {
                    issues.push(ValidationIssue::NotNumeric {
                        field: field.clone(),
                        value: value.clone(),
                    });
                }
                _ => {}
            }
        }

        for group in self.groups.iter().filter(|g| g.keys.len() > 1) {
            let given: Vec<(String, Value)> = group
                .keys
                .iter()
                .filter_map(|k| supplied(input, k).map(|v| (k.clone(), v.clone())))
                .collect();
            if given.len() < 2 {
                continue;
            }
            let found = group.combinations.iter().any(|combo| {
                given.iter().all(|(k, v)| {
                    combo
                        .get(k)
                        .map(|c| c.normalized() == v.normalized())
                        .unwrap_or(false)
                })
            });
            if !found {
                issues.push(ValidationIssue::InvalidCombination {
                    group: group.name.clone(),
                    values: given,
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(issues))
        }
    }
}

fn supplied<'v, I: KeyInput + ?Sized>(input: &'v I, field: &str) -> Option<&'v Value> {
    input.key(field).filter(|v| !v.is_null())
}
