use super::{score, GroupRisk, Score, ScoreError, ScoredTable};

use anyhow::{anyhow, Result};

use crate::encoder::{encode, EncodeMode, FeatureMatrix, FeatureSchema};
use crate::models::{train, ForestConfig};
use crate::storage::ModelArtifact;
use crate::types::TransactionRecord;

fn create_record(amount: &str, location: &str, device: &str, time: &str) -> TransactionRecord {
    TransactionRecord::new()
        .with("amount", amount)
        .with("location", location)
        .with("device", device)
        .with("time", time)
}

fn create_artifact() -> Result<ModelArtifact> {
    let records = vec![
        create_record("10", "NY", "Web", "day"),
        create_record("9000", "LA", "Mobile", "night"),
    ];
    let batch = encode(&records, EncodeMode::Fit(&FeatureSchema::default()))?;
    let forest = train(&batch.matrix, &[0, 1], &ForestConfig::default())?;

    Ok(ModelArtifact::new(forest, batch.state)?)
}

fn score_records(artifact: &ModelArtifact, records: &[TransactionRecord]) -> Result<Vec<f64>> {
    let batch = encode(records, EncodeMode::Reuse(artifact.encoder()))?;
    Ok(score(artifact, &batch.matrix)?)
}

#[test]
fn test_artifact_records_expected_column_layout() -> Result<()> {
    let artifact = create_artifact()?;
    let columns = artifact.expected_columns();

    let count = |prefix: &str| columns.iter().filter(|column| column.starts_with(prefix)).count();

    assert_eq!(count("location_"), 2);
    assert_eq!(count("device_"), 2);
    assert_eq!(count("time_"), 2);
    assert_eq!(artifact.encoder().scalers().len(), 1);
    assert_eq!(columns.len(), 7);

    Ok(())
}

#[test]
fn test_fraud_like_row_scores_higher_than_legitimate_like_row() -> Result<()> {
    let artifact = create_artifact()?;

    let scores = score_records(&artifact, &[
        create_record("9500", "LA", "Mobile", "night"),
        create_record("12", "NY", "Web", "day"),
    ])?;

    assert!(scores[0] > scores[1]);
    assert!(scores.iter().all(|probability| (0.0..=1.0).contains(probability)));

    Ok(())
}

#[test]
fn test_unseen_location_scores_without_error() -> Result<()> {
    let artifact = create_artifact()?;
    let records = vec![create_record("12", "Tokyo", "Web", "day")];

    let batch = encode(&records, EncodeMode::Reuse(artifact.encoder()))?;
    let row = batch.matrix.row(0).ok_or_else(|| anyhow!("encoded row missing"))?;

    for (index, column) in batch.matrix.columns().iter().enumerate() {
        if column.starts_with("location_") {
            assert_eq!(row[index], 0.0);
        }
    }

    let scores = score(&artifact, &batch.matrix)?;

    assert_eq!(scores.len(), 1);
    assert!((0.0..=1.0).contains(&scores[0]));

    Ok(())
}

#[test]
fn test_scoring_is_idempotent() -> Result<()> {
    let artifact = create_artifact()?;
    let records = vec![
        create_record("500", "LA", "Web", "day"),
        create_record("7000", "NY", "Mobile", "night"),
    ];
    let batch = encode(&records, EncodeMode::Reuse(artifact.encoder()))?;

    assert_eq!(score(&artifact, &batch.matrix)?, score(&artifact, &batch.matrix)?);

    Ok(())
}

#[test]
fn test_retraining_with_same_seed_gives_identical_scores() -> Result<()> {
    let records = vec![create_record("500", "LA", "Web", "day")];

    let first = score_records(&create_artifact()?, &records)?;
    let second = score_records(&create_artifact()?, &records)?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_matrix_with_reordered_columns_is_rejected() -> Result<()> {
    let artifact = create_artifact()?;
    let mut columns = artifact.expected_columns().to_vec();
    columns.swap(1, 2);
    let matrix = FeatureMatrix::new(columns, vec![vec![0.0; 7]]);

    let result = score(&artifact, &matrix);

    assert!(matches!(result, Err(ScoreError::SchemaMismatch { expected: 7, found: 7, .. })));

    Ok(())
}

#[test]
fn test_matrix_from_independent_fit_is_rejected() -> Result<()> {
    let artifact = create_artifact()?;
    let batch = encode(&[create_record("12", "Tokyo", "Web", "day")], EncodeMode::Fit(&FeatureSchema::default()))?;

    let result = score(&artifact, &batch.matrix);

    assert!(matches!(result, Err(ScoreError::SchemaMismatch { expected: 7, found: 4, .. })));

    Ok(())
}

#[test]
fn test_ragged_matrix_is_rejected() -> Result<()> {
    let artifact = create_artifact()?;
    let matrix = FeatureMatrix::new(artifact.expected_columns().to_vec(), vec![vec![0.0; 7], vec![0.0; 3]]);

    assert_eq!(score(&artifact, &matrix).err(), Some(ScoreError::RowWidth { row: 1, expected: 7, found: 3 }));

    Ok(())
}

#[test]
fn test_score_flags_strictly_above_threshold() {
    assert!(Score::at_threshold(0.71, 0.7).flagged);
    assert!(!Score::at_threshold(0.7, 0.7).flagged);
    assert!(!Score::at_threshold(0.2, 0.7).flagged);
}

fn create_scored_table() -> ScoredTable {
    let records = vec![
        create_record("10", "NY", "Web", "day"),
        create_record("20", "NY", "Mobile", "day"),
        create_record("30", "NY", "Web", "night"),
        create_record("", "LA", "Web", "day"),
        create_record("40", "LA", "Mobile", "night"),
    ];
    let scores = vec![
        Some(Score::at_threshold(0.1, 0.7)),
        Some(Score::at_threshold(0.8, 0.7)),
        Some(Score::at_threshold(0.3, 0.7)),
        None,
        Some(Score::at_threshold(0.95, 0.7)),
    ];

    ScoredTable::new(vec!["amount".to_string(), "location".to_string(), "device".to_string(), "time".to_string()], records, scores)
}

#[test]
fn test_report_threshold_filters() {
    let table = create_scored_table();

    assert_eq!(table.len(), 5);
    assert_eq!(table.scored_count(), 4);
    assert_eq!(table.flagged_count(), 2);
    assert_eq!(table.high_risk_count(0.9), 1);

    let risky: Vec<f64> = table.above_threshold(0.5).into_iter().map(|(_, probability)| probability).collect();

    assert_eq!(risky, vec![0.8, 0.95]);
}

#[test]
fn test_report_mean_risk_by_location_and_device() {
    let table = create_scored_table();
    let groups = table.mean_risk_by(&["location".to_string(), "device".to_string()]);

    let key = |location: &str, device: &str| vec![location.to_string(), device.to_string()];

    assert_eq!(groups, vec![
        GroupRisk { key: key("LA", "Mobile"), mean_risk: 0.95, transactions: 1 },
        GroupRisk { key: key("NY", "Mobile"), mean_risk: 0.8, transactions: 1 },
        GroupRisk { key: key("NY", "Web"), mean_risk: 0.2, transactions: 2 },
    ]);
}
