use doe_core::{CellValue, DataTable};
use doe_space::{Objective, Target, TargetMode};

fn table(columns: &[&str], rows: Vec<Vec<f64>>) -> DataTable {
    DataTable::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.into_iter()
            .map(|row| row.into_iter().map(CellValue::Float).collect())
            .collect(),
    )
    .unwrap()
}

#[test]
fn match_mode_requires_bounds() {
    let err = Target::new("ratio", TargetMode::Match, None).unwrap_err();
    assert_eq!(err.info().code, "space-match-without-bounds");
}

#[test]
fn half_open_bounds_are_rejected() {
    let err = Target::new("yield", TargetMode::Max, Some((0.0, f64::INFINITY))).unwrap_err();
    assert_eq!(err.info().code, "space-nonfinite-target-bounds");
}

#[test]
fn duplicate_target_names_are_rejected() {
    let err = Objective::new(vec![
        Target::new("yield", TargetMode::Max, None).unwrap(),
        Target::new("yield", TargetMode::Min, None).unwrap(),
    ])
    .unwrap_err();
    assert_eq!(err.info().code, "space-duplicate-target");
}

#[test]
fn bounded_targets_scale_into_unit_interval() {
    let maximize = Target::new("yield", TargetMode::Max, Some((0.0, 100.0))).unwrap();
    assert_eq!(maximize.transform_value(0.0), 0.0);
    assert_eq!(maximize.transform_value(50.0), 0.5);
    assert_eq!(maximize.transform_value(150.0), 1.0);

    let minimize = Target::new("cost", TargetMode::Min, Some((0.0, 100.0))).unwrap();
    assert_eq!(minimize.transform_value(0.0), 1.0);
    assert_eq!(minimize.transform_value(100.0), 0.0);

    let matching = Target::new("ph", TargetMode::Match, Some((6.0, 8.0))).unwrap();
    assert_eq!(matching.transform_value(7.0), 1.0);
    assert_eq!(matching.transform_value(6.0), 0.0);
    assert_eq!(matching.transform_value(6.5), 0.5);
    assert_eq!(matching.transform_value(10.0), 0.0);
}

#[test]
fn unbounded_min_negates() {
    let minimize = Target::new("cost", TargetMode::Min, None).unwrap();
    assert_eq!(minimize.transform_value(3.5), -3.5);
    let maximize = Target::new("yield", TargetMode::Max, None).unwrap();
    assert_eq!(maximize.transform_value(3.5), 3.5);
}

#[test]
fn transform_emits_one_column_per_target() {
    let objective = Objective::new(vec![
        Target::new("yield", TargetMode::Max, Some((0.0, 10.0))).unwrap(),
        Target::new("cost", TargetMode::Min, None).unwrap(),
    ])
    .unwrap();
    let measured = table(&["cost", "yield"], vec![vec![2.0, 5.0], vec![4.0, 10.0]]);
    let signal = objective.transform(&measured).unwrap();
    assert_eq!(signal.columns(), ["yield".to_string(), "cost".to_string()]);
    assert_eq!(signal.cell(0, "yield").unwrap().as_f64(), Some(0.5));
    assert_eq!(signal.cell(0, "cost").unwrap().as_f64(), Some(-2.0));
    assert_eq!(signal.cell(1, "yield").unwrap().as_f64(), Some(1.0));
}

#[test]
fn transform_rejects_missing_or_textual_columns() {
    let objective = Objective::new(vec![Target::new("yield", TargetMode::Max, None).unwrap()]).unwrap();
    let missing = table(&["other"], vec![vec![1.0]]);
    assert_eq!(
        objective.transform(&missing).unwrap_err().info().code,
        "objective-missing-column"
    );
    let textual = DataTable::new(
        vec!["yield".into()],
        vec![vec![CellValue::Text("high".into())]],
    )
    .unwrap();
    assert_eq!(
        objective.transform(&textual).unwrap_err().info().code,
        "objective-non-numeric"
    );
}
