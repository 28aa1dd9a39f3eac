mod common;

use proptest::prelude::*;
use tabular_profiler::{
    config::ProfilerConfig,
    data::{Cell, Row, Table},
    profile::{ColumnStats, InferredType, compute_stats, infer_column_type, profile_table},
};

use common::text_table;

#[test]
fn worked_example_profiles_age_and_city() {
    let table = text_table(&[
        &[("age", "25"), ("city", "NY")],
        &[("age", "30"), ("city", "NY")],
        &[("age", ""), ("city", "LA")],
    ]);
    let profiles = profile_table(&table, &ProfilerConfig::default());

    assert_eq!(profiles[0].name, "age");
    assert_eq!(profiles[0].inferred_type, InferredType::Numeric);
    assert_eq!(profiles[0].missing_count, 1);
    assert_eq!(profiles[0].unique_count, 2);
    match &profiles[0].stats {
        Some(ColumnStats::Numeric(stats)) => {
            assert_eq!(stats.min, 25.0);
            assert_eq!(stats.max, 30.0);
            assert_eq!(stats.mean, 27.5);
            assert_eq!(stats.median, 30.0);
        }
        other => panic!("expected numeric stats, got {other:?}"),
    }

    assert_eq!(profiles[1].name, "city");
    assert_eq!(profiles[1].inferred_type, InferredType::Categorical);
    assert_eq!(profiles[1].missing_count, 0);
    assert_eq!(profiles[1].unique_count, 2);
    assert_eq!(
        profiles[1].stats,
        Some(ColumnStats::Categorical {
            mode: "NY".to_string()
        })
    );
}

#[test]
fn median_of_even_population_takes_upper_middle() {
    let cells = ["1", "2", "3", "4"].map(Cell::text);
    let values = cells.iter().map(Some).collect::<Vec<_>>();
    let stats = compute_stats("n", &values, InferredType::Numeric).expect("stats");
    let numeric = stats.numeric().expect("numeric stats");
    assert_eq!(numeric.mean, 2.5);
    assert_eq!(numeric.median, 3.0);
}

#[test]
fn mixed_json_cells_profile_like_their_text_forms() {
    let rows: Vec<Row> = serde_json::from_str(
        r#"[
            {"score": 10, "label": "a", "when": "2024-01-01"},
            {"score": "12", "label": "b", "when": "2024-02-01"},
            {"score": null, "label": "a", "when": "2024-03-01"},
            {"label": "c", "when": null}
        ]"#,
    )
    .expect("json rows");
    let table = Table::new(rows);
    let profiles = profile_table(&table, &ProfilerConfig::default());

    assert_eq!(profiles.len(), 3);
    assert_eq!(profiles[0].inferred_type, InferredType::Numeric);
    assert_eq!(profiles[0].missing_count, 2);
    assert_eq!(profiles[0].stats.as_ref().and_then(|s| s.numeric()).unwrap().mean, 11.0);
    assert_eq!(profiles[1].stats.as_ref().and_then(|s| s.mode()), Some("a"));
    assert_eq!(profiles[2].inferred_type, InferredType::Date);
    assert_eq!(profiles[2].stats, None);
}

#[test]
fn all_missing_column_is_categorical_without_stats() {
    let table = Table::new(vec![
        Row::new().with("id", "1").with("note", ""),
        Row::new().with("id", "2").with("note", Cell::Null),
        Row::new().with("id", "3"),
    ]);
    let profiles = profile_table(&table, &ProfilerConfig::default());
    let note = &profiles[1];
    assert_eq!(note.inferred_type, InferredType::Categorical);
    assert_eq!(note.missing_count, 3);
    assert_eq!(note.unique_count, 0);
    assert_eq!(note.stats, None);
}

#[test]
fn noisy_numeric_column_drops_garbage_from_stats_but_not_missing_count() {
    let mut rows = (1..=9)
        .map(|n| Row::new().with("v", n.to_string()))
        .collect::<Vec<_>>();
    rows.push(Row::new().with("v", "unknown"));
    let table = Table::new(rows);
    let profiles = profile_table(&table, &ProfilerConfig::default());
    assert_eq!(profiles[0].inferred_type, InferredType::Numeric);
    assert_eq!(profiles[0].missing_count, 0);
    assert_eq!(profiles[0].unique_count, 10);
    let stats = profiles[0].stats.as_ref().and_then(|s| s.numeric()).unwrap();
    assert_eq!(stats.mean, 5.0);
    assert_eq!(stats.max, 9.0);
}

fn cell_strategy() -> impl Strategy<Value = Option<Cell>> {
    prop_oneof![
        Just(None),
        Just(Some(Cell::Null)),
        Just(Some(Cell::text(""))),
        "[a-z]{1,6}".prop_map(|s| Some(Cell::text(s))),
        (-1000i32..1000).prop_map(|n| Some(Cell::text(n.to_string()))),
        (-1.0e6f64..1.0e6).prop_map(|f| Some(Cell::Number(f))),
    ]
}

fn table_strategy() -> impl Strategy<Value = Table> {
    (1usize..5, 0usize..30).prop_flat_map(|(columns, rows)| {
        proptest::collection::vec(
            proptest::collection::vec(cell_strategy(), columns),
            rows,
        )
        .prop_map(move |grid| {
            Table::new(
                grid.into_iter()
                    .enumerate()
                    .map(|(row_idx, cells)| {
                        let mut row = Row::new();
                        for (idx, cell) in cells.into_iter().enumerate() {
                            match cell {
                                Some(cell) => row.insert(format!("c{idx}"), cell),
                                // the first row defines the column set
                                None if row_idx == 0 => row.insert(format!("c{idx}"), Cell::Null),
                                None => {}
                            }
                        }
                        row
                    })
                    .collect(),
            )
        })
    })
}

proptest! {
    #[test]
    fn profiles_follow_first_row_columns(table in table_strategy()) {
        let profiles = profile_table(&table, &ProfilerConfig::default());
        let names = profiles.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        prop_assert_eq!(names, table.columns());
    }

    #[test]
    fn missing_plus_present_equals_row_count(table in table_strategy()) {
        for profile in profile_table(&table, &ProfilerConfig::default()) {
            let present = table
                .column_values(&profile.name)
                .into_iter()
                .flatten()
                .filter(|cell| !cell.is_missing())
                .count();
            prop_assert_eq!(profile.missing_count + present, table.row_count());
            prop_assert!(profile.unique_count <= present);
        }
    }

    #[test]
    fn profiling_is_idempotent(table in table_strategy()) {
        let config = ProfilerConfig::default();
        let first = profile_table(&table, &config);
        let second = profile_table(&table, &config);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn integer_columns_are_numeric(values in proptest::collection::vec(-10_000i64..10_000, 1..40)) {
        let cells = values.iter().map(|v| Cell::text(v.to_string())).collect::<Vec<_>>();
        let refs = cells.iter().map(Some).collect::<Vec<_>>();
        prop_assert_eq!(infer_column_type(&refs, &ProfilerConfig::default()), InferredType::Numeric);
    }

    #[test]
    fn word_columns_are_categorical(values in proptest::collection::vec("[a-z]{3,8}", 1..40)) {
        let cells = values.iter().map(|v| Cell::text(v.as_str())).collect::<Vec<_>>();
        let refs = cells.iter().map(Some).collect::<Vec<_>>();
        prop_assert_eq!(
            infer_column_type(&refs, &ProfilerConfig::default()),
            InferredType::Categorical
        );
    }
}
