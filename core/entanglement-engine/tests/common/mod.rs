//! FILENAME: core/entanglement-engine/tests/common/mod.rs
//! PURPOSE: Shared fixtures: a small heating-system table set, its schema and usages.

#![allow(dead_code)]

use std::collections::BTreeMap;
use entanglement_engine::{Schema, Usage};
use table_engine::{Domain, KeySpec, TableDefinition, TableSet, Value};

pub const HEATING_TABLES: &str = r#"[
    {
        "name": "rendement_generation",
        "keys": [
            {"key_name": "type_generateur", "key_type": "cat"},
            {"key_name": "annee", "key_type": "num"}
        ],
        "values": ["rg"],
        "rows": [
            {"type_generateur": "Chaudière gaz", "annee": 1948, "rg": 0.7},
            {"type_generateur": "Chaudière gaz", "annee": 2001, "rg": 0.85},
            {"type_generateur": "PAC air/eau", "annee": 1948, "rg": 2.2},
            {"type_generateur": "Poêle bois", "annee": 1948, "rg": 0.6}
        ]
    },
    {
        "name": "conversion_energie",
        "keys": [
            {"key_name": "type_generateur", "key_type": "cat"},
            {"key_name": "type_energie", "key_type": "cat"}
        ],
        "values": ["coef_ep"],
        "rows": [
            {"type_generateur": "Chaudière gaz", "type_energie": "Gaz", "coef_ep": 1.0},
            {"type_generateur": "PAC air/eau", "type_energie": "Électricité", "coef_ep": 2.3},
            {"type_generateur": "Chaudière gaz", "type_energie": "Propane", "coef_ep": 1.0}
        ]
    },
    {
        "name": "rendement_distribution",
        "keys": [
            {"key_name": "type_distribution", "key_type": "cat"},
            {"key_name": "isole", "key_type": "cat"}
        ],
        "values": ["rd"],
        "rows": [
            {"type_distribution": "Réseau collectif", "isole": true, "rd": 0.85},
            {"type_distribution": "Réseau collectif", "isole": false, "rd": 0.75},
            {"type_distribution": "Pas de réseau", "isole": null, "rd": 1.0}
        ]
    },
    {
        "name": "rendement_emission",
        "keys": [
            {"key_name": "type_emetteur", "key_type": "cat"},
            {"key_name": "type_distribution", "key_type": "cat"}
        ],
        "values": ["re"],
        "rows": [
            {"type_emetteur": "Radiateur", "type_distribution": "Réseau collectif", "re": 0.95},
            {"type_emetteur": "Convecteur électrique", "type_distribution": "Pas de réseau", "re": 1.0},
            {"type_emetteur": "Plancher chauffant", "type_distribution": "Réseau collectif", "re": 0.97}
        ]
    }
]"#;

pub fn heating_tables() -> TableSet {
    let definitions: Vec<TableDefinition> =
        serde_json::from_str(HEATING_TABLES).expect("fixture tables parse");
    TableSet::build(definitions).expect("fixture tables build")
}

pub fn heating_schema() -> Schema {
    Schema::new()
        .other("identifiant")
        .numerical("surface_chauffee")
        .numerical("annee_installation")
        .categorical("type_generateur")
        .categorical("type_energie")
        .categorical("type_distribution")
        .categorical("isolation_distribution")
        .categorical("type_emetteur")
        .categorical("usage")
}

pub fn heating_usages() -> Vec<Usage> {
    vec![
        Usage::new("generation", "rendement_generation")
            .same("type_generateur")
            .map("annee", "annee_installation"),
        Usage::new("conversion", "conversion_energie")
            .same("type_generateur")
            .same("type_energie"),
        Usage::new("distribution", "rendement_distribution")
            .same("type_distribution")
            .map("isole", "isolation_distribution"),
        Usage::new("emission", "rendement_emission")
            .same("type_emetteur")
            .same("type_distribution"),
    ]
}

pub fn heating_overrides() -> BTreeMap<String, Domain> {
    let mut overrides = BTreeMap::new();
    overrides.insert(
        "usage".to_string(),
        Domain::categorical(["Conventionnel", "Dépensier"]),
    );
    overrides
}

/// A table keyed on categorical columns only, one row per combination.
pub fn categorical_table(name: &str, columns: &[&str], rows: &[&[&str]]) -> TableDefinition {
    let keys = columns.iter().map(|c| KeySpec::categorical(*c)).collect();
    let mut def = TableDefinition::new(name, keys, vec!["coef".to_string()]);
    for (i, row) in rows.iter().enumerate() {
        let mut cells: Vec<(String, Value)> = columns
            .iter()
            .zip(row.iter())
            .map(|(c, v)| (c.to_string(), Value::from(*v)))
            .collect();
        cells.push(("coef".to_string(), Value::from(i as f64)));
        def = def.with_row(cells);
    }
    def
}

pub fn text(value: &str) -> Value {
    Value::text(value)
}
