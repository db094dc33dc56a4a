//! End-to-end reconciliation tests: fixture CSVs through the loader and
//! engine, asserting on the structured result.

mod common;

use common::TestFixture;
use fundrec::cells::DiffKind;
use fundrec::{CompareConfig, CompareKind, DatasetLoader, Reconciler};

fn contract_config(tolerance: f64) -> CompareConfig {
    CompareConfig {
        float_tolerance: tolerance,
        key_columns: vec!["NumeroContrato".to_string()],
        ..CompareConfig::default()
    }
}

#[test]
fn identical_reports_reconcile_cleanly() {
    let fixture = TestFixture::new().unwrap();
    let report = fixture.create_fund_report("fund.csv").unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&report).unwrap();
    let right = loader.load_path(&report).unwrap();

    let config = contract_config(1e-10);
    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();

    assert!(result.is_clean());
    assert_eq!(result.summary.match_percentage, 100.0);
    assert_eq!(result.summary.coverage_percentage, 100.0);
    assert_eq!(result.summary.identical_rows, 3);
    assert!(result.differences.rows_only_in_left.is_empty());
    assert!(result.differences.rows_only_in_right.is_empty());
}

#[test]
fn near_equal_values_respect_tolerance() {
    let fixture = TestFixture::new().unwrap();
    let internal = fixture
        .create_csv(
            "internal.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["X1", "100.00"],
            ],
        )
        .unwrap();
    let fund = fixture
        .create_csv(
            "fund.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["X1", "100.0000001"],
            ],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&internal).unwrap();
    let right = loader.load_path(&fund).unwrap();

    // Loose tolerance: identical
    let loose = contract_config(1e-6);
    let result = Reconciler::new(&loose)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();
    assert!(result.is_clean());
    assert_eq!(result.summary.match_percentage, 100.0);

    // Tight tolerance: exactly one numeric difference on ValorFace
    let tight = contract_config(1e-10);
    let result = Reconciler::new(&tight)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();
    assert_eq!(result.summary.different_rows, 1);
    let diff = &result.differences.cell_diffs["X1"]["ValorFace"];
    match &diff.kind {
        DiffKind::NumericDifference { delta, .. } => {
            assert!((delta.abs() - 1e-7).abs() < 1e-9);
        }
        other => panic!("unexpected classification: {:?}", other),
    }
}

#[test]
fn missing_keys_partition_both_sides() {
    let fixture = TestFixture::new().unwrap();
    let left_path = fixture
        .create_csv(
            "left.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["K1", "1.0"],
                vec!["K2", "2.0"],
            ],
        )
        .unwrap();
    let right_path = fixture
        .create_csv(
            "right.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["K2", "2.0"],
                vec!["K3", "3.0"],
            ],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&left_path).unwrap();
    let right = loader.load_path(&right_path).unwrap();
    let config = contract_config(1e-10);

    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();
    assert!(result.differences.rows_only_in_left.contains("K1"));
    assert!(result.differences.rows_only_in_right.contains("K3"));
    assert_eq!(result.summary.common_rows, 1);

    // Reversed orientation swaps the two sets exactly
    let reversed = Reconciler::new(&config)
        .compare(&right, &left, CompareKind::Full)
        .unwrap();
    assert_eq!(
        reversed.differences.rows_only_in_left,
        result.differences.rows_only_in_right
    );
    assert_eq!(
        reversed.differences.rows_only_in_right,
        result.differences.rows_only_in_left
    );
}

#[test]
fn schema_drift_is_data_not_error() {
    let fixture = TestFixture::new().unwrap();
    let left_path = fixture
        .create_csv(
            "left.csv",
            &[
                vec!["NumeroContrato", "ValorFace", "Extra"],
                vec!["K1", "1.0", "x"],
            ],
        )
        .unwrap();
    let right_path = fixture
        .create_csv(
            "right.csv",
            &[
                vec!["NumeroContrato", "ValorFace", "Outro"],
                vec!["K1", "1.0", "y"],
            ],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&left_path).unwrap();
    let right = loader.load_path(&right_path).unwrap();
    let config = contract_config(1e-10);

    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();

    assert_eq!(result.differences.columns_only_in_left, vec!["Extra"]);
    assert_eq!(result.differences.columns_only_in_right, vec!["Outro"]);
    // The shared columns still reconcile
    assert_eq!(result.summary.identical_rows, 1);
}

#[test]
fn inferred_type_mismatch_reported_per_column() {
    let fixture = TestFixture::new().unwrap();
    // Flag infers BIGINT on the left, VARCHAR on the right
    let left_path = fixture
        .create_csv_raw("left.csv", "NumeroContrato,Flag\nK1,1\n")
        .unwrap();
    let right_path = fixture
        .create_csv_raw("right.csv", "NumeroContrato,Flag\nK1,ativo\n")
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&left_path).unwrap();
    let right = loader.load_path(&right_path).unwrap();
    let config = contract_config(1e-10);

    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();

    assert!(result.differences.type_mismatches.contains_key("Flag"));
    // And the cell pair classifies as a type difference
    let diff = &result.differences.cell_diffs["K1"]["Flag"];
    assert_eq!(diff.kind, DiffKind::TypeDifference);
}

#[test]
fn ignored_columns_never_surface() {
    let fixture = TestFixture::new().unwrap();
    let left_path = fixture
        .create_csv(
            "left.csv",
            &[
                vec!["NumeroContrato", "ValorFace", "DataProcessamento"],
                vec!["K1", "1.0", "2025-05-30"],
            ],
        )
        .unwrap();
    let right_path = fixture
        .create_csv(
            "right.csv",
            &[
                vec!["NumeroContrato", "ValorFace", "DataProcessamento"],
                vec!["K1", "1.0", "2025-06-30"],
            ],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&left_path).unwrap();
    let right = loader.load_path(&right_path).unwrap();

    let config = CompareConfig {
        ignore_columns: ["DataProcessamento".to_string()].into_iter().collect(),
        ..contract_config(1e-10)
    };

    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();
    assert!(result.is_clean());
    assert!(!result
        .differences
        .type_mismatches
        .contains_key("DataProcessamento"));
}

#[test]
fn duplicate_keys_surface_as_counts() {
    let fixture = TestFixture::new().unwrap();
    let left_path = fixture
        .create_csv(
            "left.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["K1", "1.0"],
                vec!["K1", "9.0"],
                vec!["K2", "2.0"],
            ],
        )
        .unwrap();
    let right_path = fixture
        .create_csv(
            "right.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["K1", "1.0"],
                vec!["K2", "2.0"],
            ],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&left_path).unwrap();
    let right = loader.load_path(&right_path).unwrap();
    let config = contract_config(1e-10);

    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();

    assert_eq!(result.summary.duplicate_keys_left, 1);
    assert_eq!(result.summary.duplicate_keys_right, 0);
    // First occurrence wins, so K1 compares equal
    assert_eq!(result.summary.identical_rows, 2);
}

#[test]
fn missing_key_column_fails_before_row_data() {
    let fixture = TestFixture::new().unwrap();
    let left_path = fixture
        .create_csv(
            "left.csv",
            &[vec!["NumeroContrato", "ValorFace"], vec!["K1", "1.0"]],
        )
        .unwrap();
    let right_path = fixture
        .create_csv(
            "right.csv",
            &[vec!["Contrato", "ValorFace"], vec!["K1", "1.0"]],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&left_path).unwrap();
    let right = loader.load_path(&right_path).unwrap();
    let config = contract_config(1e-10);

    let err = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap_err();
    assert!(err.to_string().contains("Key column"));
}

#[test]
fn config_file_round_trip_with_unknown_fields() {
    let fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .create_json(
            "fundrec.json",
            &serde_json::json!({
                "float_tolerance": 1e-6,
                "key_columns": ["NumeroContrato"],
                "ignore_columns": ["DataProcessamento"],
                "some_future_field": {"nested": true}
            }),
        )
        .unwrap();

    let config = CompareConfig::from_file(&config_path).unwrap();
    assert_eq!(config.float_tolerance, 1e-6);
    assert_eq!(config.key_columns, vec!["NumeroContrato"]);
    assert!(config.ignore_columns.contains("DataProcessamento"));
}

#[test]
fn warehouse_query_side_aligns_with_report() {
    let fixture = TestFixture::new().unwrap();
    let extract_path = fixture
        .create_csv(
            "extract.csv",
            &[
                vec!["contract_number", "face_value"],
                vec!["C-1001", "1500.00"],
                vec!["C-1002", "2750.50"],
                vec!["C-1003", "990.25"],
            ],
        )
        .unwrap();
    let report_path = fixture.create_fund_report("fund.csv").unwrap();

    let loader = DatasetLoader::new().unwrap();
    // The warehouse-side identifier is mapped onto the report-side names
    let sql = format!(
        "SELECT contract_number AS NumeroContrato, face_value AS ValorFace FROM '{}'",
        extract_path.display()
    );
    let left = loader.load_query(&sql, "cession_orders").unwrap();
    let right = loader.load_path(&report_path).unwrap();

    let config = contract_config(1e-10);
    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Full)
        .unwrap();

    // Cedente exists only on the report side; the shared columns reconcile
    assert_eq!(result.summary.common_rows, 3);
    assert_eq!(result.summary.different_rows, 0);
    assert_eq!(result.differences.columns_only_in_right, vec!["Cedente"]);
}

#[test]
fn statistical_mode_summarizes_both_sides() {
    let fixture = TestFixture::new().unwrap();
    let left_path = fixture
        .create_csv(
            "left.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["K1", "100.0"],
                vec!["K2", "300.0"],
            ],
        )
        .unwrap();
    let right_path = fixture
        .create_csv(
            "right.csv",
            &[vec!["NumeroContrato", "ValorFace"], vec!["K1", "100.0"]],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&left_path).unwrap();
    let right = loader.load_path(&right_path).unwrap();

    let result = Reconciler::new(&CompareConfig::default())
        .compare(&left, &right, CompareKind::Statistical)
        .unwrap();

    assert_eq!(result.statistics.left["ValorFace"].mean, Some(200.0));
    assert_eq!(result.statistics.left["ValorFace"].min, Some(100.0));
    assert_eq!(result.statistics.left["ValorFace"].max, Some(300.0));
    assert_eq!(result.statistics.right["ValorFace"].mean, Some(100.0));
    // Contract numbers are categorical
    assert_eq!(
        result.statistics.left["NumeroContrato"].distinct_count,
        Some(2)
    );
}

#[test]
fn subset_mode_detects_containment() {
    let fixture = TestFixture::new().unwrap();
    let small = fixture
        .create_csv(
            "small.csv",
            &[vec!["NumeroContrato", "ValorFace"], vec!["K1", "1.0"]],
        )
        .unwrap();
    let big = fixture
        .create_csv(
            "big.csv",
            &[
                vec!["NumeroContrato", "ValorFace"],
                vec!["K1", "1.0"],
                vec!["K2", "2.0"],
            ],
        )
        .unwrap();

    let loader = DatasetLoader::new().unwrap();
    let left = loader.load_path(&small).unwrap();
    let right = loader.load_path(&big).unwrap();
    let config = CompareConfig::default();

    let result = Reconciler::new(&config)
        .compare(&left, &right, CompareKind::Subset)
        .unwrap();
    assert!(result.summary.subset.as_ref().unwrap().is_subset);

    let reversed = Reconciler::new(&config)
        .compare(&right, &left, CompareKind::Subset)
        .unwrap();
    assert!(!reversed.summary.subset.as_ref().unwrap().is_subset);
}
