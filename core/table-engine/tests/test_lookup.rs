//! FILENAME: core/table-engine/tests/test_lookup.rs
//! PURPOSE: Lookup resolution tests: discretization, exact-match precedence
//! and both fallback strategies.

use std::collections::HashMap;
use table_engine::{
    DecisionTable, FallbackStrategy, KeySpec, LookupError, TableDefinition, TableSet, Value,
};

fn year_table(fallback: FallbackStrategy) -> DecisionTable {
    let def = TableDefinition::new(
        "coef_by_year",
        vec![KeySpec::categorical("type"), KeySpec::numerical("year")],
        vec!["coef".to_string()],
    )
    .with_fallback(fallback)
    .with_row([("type", Value::from("A")), ("year", 1990.into()), ("coef", 0.5.into())])
    .with_row([("type", Value::from("A")), ("year", 2000.into()), ("coef", 0.3.into())])
    .with_row([("type", Value::from("A")), ("year", 2010.into()), ("coef", 0.9.into())])
    .with_row([("type", Value::from("B")), ("year", 1990.into()), ("coef", 0.8.into())]);
    DecisionTable::build(def).unwrap()
}

/// Two numeric keys whose combinations do not form a full grid, so
/// discretization alone can miss.
fn sparse_grid(fallback: FallbackStrategy) -> DecisionTable {
    let def = TableDefinition::new(
        "sparse",
        vec![
            KeySpec::categorical("type"),
            KeySpec::numerical("year"),
            KeySpec::numerical("surface"),
        ],
        vec!["coef".to_string()],
    )
    .with_fallback(fallback)
    .with_row([
        ("type", Value::from("A")),
        ("year", 1990.into()),
        ("surface", 100.into()),
        ("coef", 1.into()),
    ])
    .with_row([
        ("type", Value::from("A")),
        ("year", 2000.into()),
        ("surface", 50.into()),
        ("coef", 2.into()),
    ]);
    DecisionTable::build(def).unwrap()
}

fn coef_of(table: &DecisionTable, kind: &str, year: f64) -> f64 {
    table
        .lookup(&[("type", Value::from(kind)), ("year", Value::from(year))])
        .unwrap()
        .number("coef")
        .unwrap()
}

fn sparse_coef(table: &DecisionTable, year: f64, surface: f64) -> Result<f64, LookupError> {
    let input = [
        ("type", Value::from("A")),
        ("year", Value::from(year)),
        ("surface", Value::from(surface)),
    ];
    table.lookup(&input).map(|r| r.number("coef").unwrap())
}

// ============================================================================
// DISCRETIZATION
// ============================================================================

#[test]
fn test_floor_discretization_on_thresholds() {
    let table = year_table(FallbackStrategy::Ceiling);
    assert_eq!(table.thresholds("year"), Some(&[1990.0, 2000.0, 2010.0][..]));

    assert_eq!(coef_of(&table, "A", 1995.0), 0.5);
    assert_eq!(coef_of(&table, "A", 1900.0), 0.5);
    assert_eq!(coef_of(&table, "A", 2000.0), 0.3);
    assert_eq!(coef_of(&table, "A", 2099.0), 0.9);
}

#[test]
fn test_lookup_is_deterministic() {
    let table = year_table(FallbackStrategy::Ceiling);
    let first = coef_of(&table, "A", 2005.0);
    for _ in 0..100 {
        assert_eq!(coef_of(&table, "A", 2005.0), first);
    }
}

// ============================================================================
// EXACT MATCH PRECEDENCE
// ============================================================================

#[test]
fn test_exact_match_wins_over_fallback() {
    // 2005 floors to 2000, which exists. A ceiling search on the raw value
    // would pick 2010 (coef 0.9) instead.
    let table = year_table(FallbackStrategy::Ceiling);
    assert_eq!(coef_of(&table, "A", 2005.0), 0.3);
}

// ============================================================================
// FALLBACK
// ============================================================================

#[test]
fn test_ceiling_fallback_picks_first_dominating_combination() {
    let table = sparse_grid(FallbackStrategy::Ceiling);
    // (1985, 60) floors to (1990, 50): absent. (1990, 100) dominates the raw input.
    assert_eq!(sparse_coef(&table, 1985.0, 60.0).unwrap(), 1.0);
}

#[test]
fn test_ceiling_fallback_uses_table_maximum_when_nothing_dominates() {
    let table = sparse_grid(FallbackStrategy::Ceiling);
    // No candidate dominates (1995, 60); the table maximum (2000, 100) has no row.
    let err = sparse_coef(&table, 1995.0, 60.0).unwrap_err();
    match err {
        LookupError::NotFound { attempted, .. } => {
            assert_eq!(attempted[1], ("year".to_string(), Value::number(2000.0)));
            assert_eq!(attempted[2], ("surface".to_string(), Value::number(100.0)));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_floor_fallback_picks_last_dominated_combination() {
    let table = sparse_grid(FallbackStrategy::Floor);
    // (2005, 110) floors to (2000, 100): absent. (2000, 50) is below the raw input.
    assert_eq!(sparse_coef(&table, 2005.0, 110.0).unwrap(), 2.0);

    let ceiling = sparse_grid(FallbackStrategy::Ceiling);
    assert!(sparse_coef(&ceiling, 2005.0, 110.0).is_err());
}

#[test]
fn test_floor_fallback_uses_table_minimum() {
    let table = sparse_grid(FallbackStrategy::Floor);
    // Nothing is below (1980, 40); the table minimum (1990, 50) has no row.
    assert!(matches!(
        sparse_coef(&table, 1980.0, 40.0),
        Err(LookupError::NotFound { .. })
    ));
}

#[test]
fn test_fallback_without_categorical_keys() {
    let def = TableDefinition::new(
        "numeric_only",
        vec![KeySpec::numerical("h"), KeySpec::numerical("w")],
        vec!["k".to_string()],
    )
    .with_row([("h", Value::from(1)), ("w", 10.into()), ("k", 0.1.into())])
    .with_row([("h", Value::from(2)), ("w", 5.into()), ("k", 0.2.into())]);
    let table = DecisionTable::build(def).unwrap();

    // (1.5, 8) floors to (1, 5): absent. (2, 5) is not >= 8 on w, (1, 10) is not
    // >= 1.5 on h; the maximum (2, 10) is absent too.
    assert!(table.lookup(&[("h", Value::from(1.5)), ("w", Value::from(8))]).is_err());
    // (0.5, 7) floors to (1, 5): absent. (1, 10) dominates.
    let record = table.lookup(&[("h", Value::from(0.5)), ("w", Value::from(7))]).unwrap();
    assert_eq!(record.number("k"), Some(0.1));
}

#[test]
fn test_numeric_key_requires_a_number() {
    let table = year_table(FallbackStrategy::Ceiling);
    // Neither an absent year nor a textual one can be placed on the grid.
    match table.lookup(&[("type", Value::from("A"))]).unwrap_err() {
        LookupError::NotFound { table, attempted } => {
            assert_eq!(table, "coef_by_year");
            assert_eq!(attempted[1], ("year".to_string(), Value::text("NULL")));
        }
        other => panic!("unexpected error {:?}", other),
    }
    let textual = [("type", Value::from("A")), ("year", Value::from("1995"))];
    assert!(matches!(
        table.lookup(&textual),
        Err(LookupError::NotFound { attempted, .. })
            if attempted[1] == ("year".to_string(), Value::text("1995"))
    ));

    let floor = year_table(FallbackStrategy::Floor);
    assert!(floor.lookup(&[("type", Value::from("A")), ("year", Value::Null)]).is_err());
}

// ============================================================================
// INPUT SHAPES
// ============================================================================

#[test]
fn test_lookup_accepts_hash_map_input() {
    let table = year_table(FallbackStrategy::Ceiling);
    let mut input: HashMap<String, Value> = HashMap::new();
    input.insert("type".into(), "B".into());
    input.insert("year".into(), 1999.into());
    input.insert("ignored".into(), "x".into());
    assert_eq!(table.lookup(&input).unwrap().number("coef"), Some(0.8));
}

#[test]
fn test_table_set_from_json_definitions() {
    let json = r#"[
        {
            "name": "rendement_generation",
            "keys": [
                {"key_name": "type_generateur", "key_type": "cat"},
                {"key_name": "annee_installation", "key_type": "num"}
            ],
            "values": ["rg", "rg_source"],
            "rows": [
                {"type_generateur": "Chaudière gaz", "annee_installation": 1948, "rg": 0.7, "rg_source": "table 4.2"},
                {"type_generateur": "Chaudière gaz", "annee_installation": 2001, "rg": 0.85, "rg_source": "table 4.2"},
                {"type_generateur": "PAC air/eau", "annee_installation": 1948, "rg": 2.2, "rg_source": null}
            ]
        }
    ]"#;
    let definitions: Vec<TableDefinition> = serde_json::from_str(json).unwrap();
    let set = TableSet::build(definitions).unwrap();

    let input = [
        ("type_generateur", Value::from("Chaudière gaz")),
        ("annee_installation", Value::from(2012)),
    ];
    assert_eq!(
        set.value("rendement_generation", &input, Some("rg")).unwrap(),
        &Value::number(0.85)
    );
    let record = set.lookup("rendement_generation", &input).unwrap();
    assert_eq!(record.columns(), &["rg".to_string(), "rg_source".to_string()]);
    assert_eq!(record.get("rg_source"), Some(&Value::text("table 4.2")));
}
