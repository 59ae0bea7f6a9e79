use serde::Serialize;
use tracing::debug;

use crate::encoder::FeatureMatrix;
use crate::scoring::errors::ScoreError;
use crate::storage::ModelArtifact;

/// A fraud probability and the flag derived from it at a caller-chosen threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub probability: f64,
    pub flagged: bool
}

impl Score {
    /// Flags strictly above the threshold.
    pub fn at_threshold(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            flagged: probability > threshold
        }
    }
}

/// Scores every row of a matrix encoded with the artifact's own encoder state.
///
/// # Errors
/// Returns `ScoreError` if:
/// - The matrix columns differ from the model's expected columns in name or order.
/// - A row's width disagrees with the declared columns.
pub fn score(artifact: &ModelArtifact, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScoreError> {
    let expected = artifact.expected_columns();

    if matrix.columns() != expected {
        return Err(ScoreError::schema_mismatch(expected, matrix.columns()))
    }

    if let Some((row, values)) = matrix.rows().iter().enumerate().find(|(_, values)| values.len() != expected.len()) {
        return Err(ScoreError::RowWidth { row, expected: expected.len(), found: values.len() })
    }

    let forest = artifact.forest();
    let probabilities: Vec<f64> = matrix.rows().iter().map(|row| forest.predict_proba_one(row)).collect();

    debug!("Scored {} rows", probabilities.len());

    Ok(probabilities)
}
