use super::{encode, EncodeError, EncodeMode, FeatureMatrix, FeatureSchema};

use anyhow::{anyhow, Result};

use crate::types::TransactionRecord;

fn create_record(amount: &str, location: &str, device: &str, time: &str) -> TransactionRecord {
    TransactionRecord::new()
        .with("amount", amount)
        .with("location", location)
        .with("device", device)
        .with("time", time)
}

fn training_records() -> Vec<TransactionRecord> {
    vec![
        create_record("10", "NY", "Web", "day").with("is_fraud", "0"),
        create_record("9000", "LA", "Mobile", "night").with("is_fraud", "1"),
    ]
}

#[test]
fn test_fit_produces_numeric_then_sorted_indicator_columns() -> Result<()> {
    let schema = FeatureSchema::default();
    let batch = encode(&training_records(), EncodeMode::Fit(&schema))?;

    let expected = vec![
        "amount",
        "location_LA", "location_NY",
        "device_Mobile", "device_Web",
        "time_day", "time_night",
    ];

    assert_eq!(batch.matrix.columns(), expected.as_slice());
    assert_eq!(batch.state.columns(), batch.matrix.columns());
    assert_eq!(batch.matrix.n_rows(), 2);
    assert_eq!(batch.row_indices, vec![0, 1]);

    Ok(())
}

#[test]
fn test_fit_column_order_is_independent_of_row_order() -> Result<()> {
    let schema = FeatureSchema::default();
    let mut reversed = training_records();
    reversed.reverse();

    let forward = encode(&training_records(), EncodeMode::Fit(&schema))?;
    let backward = encode(&reversed, EncodeMode::Fit(&schema))?;

    assert_eq!(forward.state.columns(), backward.state.columns());

    Ok(())
}

#[test]
fn test_fit_standardizes_numeric_columns() -> Result<()> {
    let schema = FeatureSchema::default();
    let batch = encode(&training_records(), EncodeMode::Fit(&schema))?;

    let amounts = batch.matrix.column("amount").ok_or_else(|| anyhow!("amount column missing"))?;

    assert!((amounts[0] + 1.0).abs() < 1e-12);
    assert!((amounts[1] - 1.0).abs() < 1e-12);
    assert_eq!(batch.state.scalers()[0].mean, 4505.0);
    assert_eq!(batch.state.scalers()[0].scale, 4495.0);

    Ok(())
}

#[test]
fn test_constant_numeric_column_encodes_as_zero() -> Result<()> {
    let schema = FeatureSchema::default();
    let records = vec![
        create_record("50", "NY", "Web", "day"),
        create_record("50", "LA", "Web", "day"),
    ];

    let batch = encode(&records, EncodeMode::Fit(&schema))?;

    assert_eq!(batch.state.scalers()[0].scale, 1.0);
    assert_eq!(batch.matrix.column("amount"), Some(vec![0.0, 0.0]));

    Ok(())
}

#[test]
fn test_reuse_maps_unseen_category_to_all_zero_indicators() -> Result<()> {
    let schema = FeatureSchema::default();
    let fitted = encode(&training_records(), EncodeMode::Fit(&schema))?;

    let batch = encode(&[create_record("12", "Tokyo", "Web", "day")], EncodeMode::Reuse(&fitted.state))?;

    assert_eq!(batch.matrix.columns(), fitted.state.columns());

    let row = batch.matrix.row(0).ok_or_else(|| anyhow!("encoded row missing"))?;
    let location_la = batch.matrix.column_index("location_LA").ok_or_else(|| anyhow!("location_LA missing"))?;
    let location_ny = batch.matrix.column_index("location_NY").ok_or_else(|| anyhow!("location_NY missing"))?;
    let device_web = batch.matrix.column_index("device_Web").ok_or_else(|| anyhow!("device_Web missing"))?;

    assert_eq!(row[location_la], 0.0);
    assert_eq!(row[location_ny], 0.0);
    assert_eq!(row[device_web], 1.0);
    assert!(batch.matrix.column_index("location_Tokyo").is_none());

    Ok(())
}

#[test]
fn test_reuse_materializes_fit_columns_absent_from_new_data() -> Result<()> {
    let schema = FeatureSchema::default();
    let fitted = encode(&training_records(), EncodeMode::Fit(&schema))?;

    let records = vec![
        create_record("100", "NY", "Web", "day"),
        create_record("200", "NY", "Web", "day"),
    ];
    let batch = encode(&records, EncodeMode::Reuse(&fitted.state))?;

    assert_eq!(batch.matrix.n_columns(), 7);
    assert_eq!(batch.matrix.column("location_LA"), Some(vec![0.0, 0.0]));
    assert_eq!(batch.matrix.column("device_Mobile"), Some(vec![0.0, 0.0]));
    assert_eq!(batch.matrix.column("time_night"), Some(vec![0.0, 0.0]));

    Ok(())
}

#[test]
fn test_reuse_applies_fitted_scaler_not_batch_statistics() -> Result<()> {
    let schema = FeatureSchema::default();
    let fitted = encode(&training_records(), EncodeMode::Fit(&schema))?;

    let batch = encode(&[create_record("4505", "NY", "Web", "day")], EncodeMode::Reuse(&fitted.state))?;

    assert_eq!(batch.matrix.column("amount"), Some(vec![0.0]));

    Ok(())
}

#[test]
fn test_rows_with_missing_values_are_dropped_not_imputed() -> Result<()> {
    let schema = FeatureSchema::default();
    let records = vec![
        create_record("10", "NY", "Web", "day"),
        create_record("", "LA", "Mobile", "night"),
        create_record("NaN", "LA", "Mobile", "night"),
        create_record("30", "LA", "null", "night"),
        create_record("9000", "LA", "Mobile", "night"),
    ];

    let batch = encode(&records, EncodeMode::Fit(&schema))?;

    assert_eq!(batch.matrix.n_rows(), 2);
    assert_eq!(batch.row_indices, vec![0, 4]);
    assert_eq!(batch.state.scalers()[0].mean, 4505.0);

    Ok(())
}

#[test]
fn test_label_column_is_never_encoded() -> Result<()> {
    let schema = FeatureSchema::default();
    let batch = encode(&training_records(), EncodeMode::Fit(&schema))?;

    assert!(batch.matrix.columns().iter().all(|column| !column.starts_with("is_fraud")));

    Ok(())
}

#[test]
fn test_missing_required_column_fails_with_schema_error() {
    let schema = FeatureSchema::default();
    let records = vec![
        TransactionRecord::new().with("amount", "10").with("location", "NY").with("time", "day"),
    ];

    let result = encode(&records, EncodeMode::Fit(&schema));

    assert_eq!(result.err(), Some(EncodeError::MissingColumn { column: "device".to_string() }));
}

#[test]
fn test_all_rows_dropped_fails_with_empty_input() {
    let schema = FeatureSchema::default();
    let records = vec![
        create_record("", "NY", "Web", "day"),
        create_record("10", "", "Web", "day"),
    ];

    let result = encode(&records, EncodeMode::Fit(&schema));

    assert_eq!(result.err(), Some(EncodeError::EmptyInput { total_rows: 2 }));
}

#[test]
fn test_empty_record_list_fails_with_empty_input() {
    let schema = FeatureSchema::default();

    assert!(matches!(encode(&[], EncodeMode::Fit(&schema)), Err(EncodeError::EmptyInput { total_rows: 0 })));
}

#[test]
fn test_non_numeric_amount_is_reported_with_context() {
    let schema = FeatureSchema::default();
    let records = vec![
        create_record("10", "NY", "Web", "day"),
        create_record("ten", "LA", "Mobile", "night"),
    ];

    let result = encode(&records, EncodeMode::Fit(&schema));

    assert_eq!(result.err(), Some(EncodeError::InvalidNumber {
        column: "amount".to_string(),
        row: 1,
        value: "ten".to_string()
    }));
}

#[test]
fn test_custom_schema_with_extra_numeric_column() -> Result<()> {
    let schema = FeatureSchema {
        numeric: vec!["amount".to_string(), "account_age".to_string()],
        categorical: vec!["device".to_string()],
        label: "is_fraud".to_string()
    };
    let records = vec![
        TransactionRecord::new().with("amount", "10").with("account_age", "5").with("device", "Web"),
        TransactionRecord::new().with("amount", "20").with("account_age", "15").with("device", "Mobile"),
    ];

    let batch = encode(&records, EncodeMode::Fit(&schema))?;

    assert_eq!(batch.matrix.columns(), ["amount", "account_age", "device_Mobile", "device_Web"].as_slice());
    assert_eq!(batch.matrix.column("account_age"), Some(vec![-1.0, 1.0]));

    Ok(())
}

#[test]
fn test_encoder_state_survives_serialization() -> Result<()> {
    let schema = FeatureSchema::default();
    let fitted = encode(&training_records(), EncodeMode::Fit(&schema))?;

    let json = serde_json::to_string(&fitted.state)?;
    let restored: super::EncoderState = serde_json::from_str(&json)?;

    assert_eq!(restored, fitted.state);
    assert!(restored.is_consistent());

    Ok(())
}

#[test]
fn test_colliding_indicator_names_are_rejected() {
    let schema = FeatureSchema {
        numeric: vec!["amount".to_string()],
        categorical: vec!["a".to_string(), "a_b".to_string()],
        label: "is_fraud".to_string()
    };
    let records = vec![TransactionRecord::new().with("amount", "10").with("a", "b_c").with("a_b", "c")];

    let result = encode(&records, EncodeMode::Fit(&schema));

    assert_eq!(result.err(), Some(EncodeError::DuplicateColumn { column: "a_b_c".to_string() }));
}

#[test]
fn test_select_rows_keeps_requested_order() {
    let matrix = FeatureMatrix::new(vec!["x".to_string()], vec![vec![1.0], vec![2.0], vec![3.0]]);

    let selected = matrix.select_rows(&[2, 0]);

    assert_eq!(selected.rows(), [vec![3.0], vec![1.0]].as_slice());
}

#[test]
#[should_panic]
fn test_select_rows_panics_on_out_of_range_index() {
    let matrix = FeatureMatrix::new(vec!["x".to_string()], vec![vec![1.0]]);

    matrix.select_rows(&[0, 1]);
}

#[test]
fn test_column_of_ragged_matrix_is_none() {
    let matrix = FeatureMatrix::new(vec!["x".to_string(), "y".to_string()], vec![vec![1.0, 2.0], vec![3.0]]);

    assert_eq!(matrix.column("x"), Some(vec![1.0, 3.0]));
    assert_eq!(matrix.column("y"), None);
}
