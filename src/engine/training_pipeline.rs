use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::encoder::{encode, EncodeError, EncodeMode};
use crate::engine::csv_table::read_table;
use crate::models::{require_both_classes, train, ClassificationMetrics, TrainError};
use crate::storage::{ArtifactStore, ModelArtifact};
use crate::types::{parse_label, Label, TransactionRecord};

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub rows_read: usize,
    pub rows_labelled: usize,
    pub rows_encoded: usize,
    pub train_rows: usize,
    pub holdout_rows: usize,
    pub columns: usize,
    pub holdout: Option<ClassificationMetrics>,
    pub top_features: Vec<(String, f64)>
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "trained on {} of {} rows ({} columns)",
            self.train_rows, self.rows_read, self.columns
        )?;

        if let Some(metrics) = &self.holdout {
            write!(
                formatter,
                "; holdout {} rows: accuracy {:.4}, precision {:.4}, recall {:.4}",
                metrics.samples, metrics.accuracy, metrics.precision, metrics.recall
            )?;
        }

        Ok(())
    }
}

/// Reads a labelled CSV, fits encoder and forest, and persists the pair.
pub struct TrainingPipeline<S: ArtifactStore> {
    config: PipelineConfig,
    store: S
}

impl<S: ArtifactStore> TrainingPipeline<S> {
    pub fn new(config: PipelineConfig, store: S) -> Self {
        Self {
            config,
            store
        }
    }

    /// Runs training end to end and replaces the stored artifact.
    pub fn run(&self, path: &Path) -> Result<TrainingReport> {
        let table = read_table(path)?;
        info!("Read {} training rows from {}", table.records.len(), path.display());

        let (artifact, report) = self.train_records(&table.records)?;
        self.store.save(&artifact).context("Failed to persist trained model")?;

        info!("Training complete: {report}");

        Ok(report)
    }

    /// Fits a new artifact from in-memory records without persisting it.
    pub fn train_records(&self, records: &[TransactionRecord]) -> Result<(ModelArtifact, TrainingReport)> {
        let schema = &self.config.schema;
        let (labelled, labels) = split_labels(records, &schema.label)?;

        debug!("{} of {} rows carry a label", labelled.len(), records.len());

        let batch = encode(&labelled, EncodeMode::Fit(schema))?;
        let labels: Vec<Label> = batch.row_indices.iter().map(|&index| labels[index]).collect();

        require_both_classes(&labels)?;

        let (train_indices, holdout_indices) = holdout_split(&labels, self.config.training.test_fraction, self.config.forest.seed);

        let train_matrix = batch.matrix.select_rows(&train_indices);
        let train_labels: Vec<Label> = train_indices.iter().map(|&index| labels[index]).collect();

        let forest = train(&train_matrix, &train_labels, &self.config.forest)?;

        let holdout = if holdout_indices.is_empty() {
            None
        } else {
            let holdout_matrix = batch.matrix.select_rows(&holdout_indices);
            let holdout_labels: Vec<Label> = holdout_indices.iter().map(|&index| labels[index]).collect();
            Some(ClassificationMetrics::evaluate(&forest.predict(&holdout_matrix), &holdout_labels))
        };

        let top_features = forest.feature_importance_ranking().into_iter()
            .take(5)
            .map(|(name, importance)| (name.to_string(), importance))
            .collect();

        let report = TrainingReport {
            rows_read: records.len(),
            rows_labelled: labelled.len(),
            rows_encoded: batch.matrix.n_rows(),
            train_rows: train_indices.len(),
            holdout_rows: holdout_indices.len(),
            columns: batch.matrix.n_columns(),
            holdout,
            top_features
        };

        let artifact = ModelArtifact::new(forest, batch.state)?;

        Ok((artifact, report))
    }
}

/// Keeps only rows with a label and parses the labels, failing on any
/// non-binary value.
fn split_labels(records: &[TransactionRecord], label: &str) -> Result<(Vec<TransactionRecord>, Vec<Label>)> {
    if !records.iter().any(|record| record.has_field(label)) {
        return Err(EncodeError::missing_column(label).into())
    }

    let mut labelled = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        let Some(value) = record.value(label) else {
            continue;
        };

        let parsed = parse_label(value).ok_or_else(|| TrainError::InvalidLabel { row, value: value.to_string() })?;

        labelled.push(record.clone());
        labels.push(parsed);
    }

    Ok((labelled, labels))
}

/// Splits row positions into training and holdout sets, holding out
/// floor(n * fraction) rows stratified by class.
///
/// Each class keeps at least one row on the training side, so the holdout
/// shrinks when a class is too small to share.
fn holdout_split(labels: &[Label], fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let n = labels.len();
    let holdout = ((n as f64) * fraction).floor() as usize;

    if holdout == 0 {
        return ((0..n).collect(), Vec::new())
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut legitimate: Vec<usize> = (0..n).filter(|&index| labels[index] == 0).collect();
    let mut fraud: Vec<usize> = (0..n).filter(|&index| labels[index] != 0).collect();
    legitimate.shuffle(&mut rng);
    fraud.shuffle(&mut rng);

    let fraud_room = fraud.len().saturating_sub(1);
    let legitimate_room = legitimate.len().saturating_sub(1);

    let mut fraud_quota = (holdout * fraud.len() / n).min(fraud_room);
    let legitimate_quota = (holdout - fraud_quota).min(legitimate_room);
    fraud_quota = (holdout - legitimate_quota).min(fraud_room);

    let mut train = legitimate.split_off(legitimate_quota);
    train.append(&mut fraud.split_off(fraud_quota));
    train.sort_unstable();

    let mut held_out = legitimate;
    held_out.append(&mut fraud);
    held_out.sort_unstable();

    if held_out.len() < holdout {
        debug!("Holdout reduced from {holdout} to {} rows to keep both classes in training", held_out.len());
    }

    (train, held_out)
}
