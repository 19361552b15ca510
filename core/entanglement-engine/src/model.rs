//! FILENAME: core/entanglement-engine/src/model.rs
//! PURPOSE: Frozen field model of one domain calculator.
//! CONTEXT: Bundles the schema, its table usages and everything derived from
//! them. Built once next to the `TableSet`, then only read.

use std::collections::BTreeMap;
use log::debug;
use table_engine::{Domain, KeyInput, TableSet};

use crate::domains::DomainAggregator;
use crate::error::{EntanglementError, ValidationErrors};
use crate::field_index::FieldUsageIndex;
use crate::grouper::{EntanglementGroup, EntanglementGrouper};
use crate::schema::Schema;
use crate::usage::Usage;
use crate::validation::InputValidator;

#[derive(Debug, Clone)]
pub struct FieldModel {
    schema: Schema,
    usages: Vec<Usage>,
    field_usage: FieldUsageIndex,
    groups: Vec<EntanglementGroup>,
    domains: BTreeMap<String, Domain>,
}

impl FieldModel {
    /// Indexes field usage, groups entangled usages and aggregates domains.
    /// Every usage is checked against `tables` first.
    pub fn build(
        schema: Schema,
        usages: Vec<Usage>,
        tables: &TableSet,
        overrides: &BTreeMap<String, Domain>,
    ) -> Result<Self, EntanglementError> {
        for usage in &usages {
            usage.check_against(tables)?;
        }

        let field_usage = FieldUsageIndex::build(&schema, &usages);
        let groups = EntanglementGrouper::new(tables).group(&usages, &field_usage)?;
        let domains =
            DomainAggregator::domains_for(&schema, &field_usage, &usages, tables, overrides)?;

        debug!(
            "field model: {} fields, {} usages, {} groups, {} overrides",
            schema.fields.len(),
            usages.len(),
            groups.len(),
            overrides.len()
        );

        Ok(FieldModel {
            schema,
            usages,
            field_usage,
            groups,
            domains,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    pub fn field_usage(&self) -> &FieldUsageIndex {
        &self.field_usage
    }

    pub fn groups(&self) -> &[EntanglementGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&EntanglementGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Group containing the given usage.
    pub fn group_of_usage(&self, usage_id: &str) -> Option<&EntanglementGroup> {
        self.groups.iter().find(|g| g.usages.iter().any(|u| u == usage_id))
    }

    pub fn domains(&self) -> &BTreeMap<String, Domain> {
        &self.domains
    }

    pub fn domain(&self, field: &str) -> Option<&Domain> {
        self.domains.get(field)
    }

    pub fn validator(&self) -> InputValidator<'_> {
        InputValidator::new(&self.domains, &self.groups)
    }

    pub fn validate<I: KeyInput + ?Sized>(&self, input: &I) -> Result<(), ValidationErrors> {
        self.validator().validate(input)
    }
}
