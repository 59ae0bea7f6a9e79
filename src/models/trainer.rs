use tracing::info;

use crate::encoder::FeatureMatrix;
use crate::models::errors::TrainError;
use crate::models::random_forest::{ForestConfig, RandomForest};
use crate::types::Label;

/// Fits a random forest on an encoded matrix and parallel binary labels.
///
/// # Errors
/// Returns `TrainError` if:
/// - The matrix and label row counts differ.
/// - A label is neither 0 nor 1.
/// - Either class is absent from the labels.
/// - The configuration asks for zero trees.
pub fn train(matrix: &FeatureMatrix, labels: &[Label], config: &ForestConfig) -> Result<RandomForest, TrainError> {
    if matrix.n_rows() != labels.len() {
        return Err(TrainError::DimensionMismatch { rows: matrix.n_rows(), labels: labels.len() })
    }

    if let Some((row, value)) = labels.iter().enumerate().find(|(_, label)| **label > 1) {
        return Err(TrainError::InvalidLabel { row, value: value.to_string() })
    }

    let (legitimate, fraud) = require_both_classes(labels)?;

    if config.n_trees == 0 {
        return Err(TrainError::NoTrees)
    }

    let mut forest = RandomForest::new(config.clone());
    forest.fit(matrix, labels);

    info!("Trained {} trees on {} rows ({} fraud, {} legitimate)", forest.n_trees(), labels.len(), fraud, legitimate);

    Ok(forest)
}

/// Counts `(legitimate, fraud)` labels, failing unless both classes occur.
pub fn require_both_classes(labels: &[Label]) -> Result<(usize, usize), TrainError> {
    let fraud = labels.iter().filter(|&&label| label == 1).count();
    let legitimate = labels.len() - fraud;

    if fraud == 0 || legitimate == 0 {
        return Err(TrainError::InsufficientData { legitimate, fraud })
    }

    Ok((legitimate, fraud))
}
