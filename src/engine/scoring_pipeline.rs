use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::encoder::{encode, EncodeMode};
use crate::engine::csv_table::{read_table, RawTable};
use crate::scoring::{score, Score, ScoredTable};
use crate::storage::{ArtifactStore, ModelArtifact};

/// Scores an unlabelled CSV against the stored artifact.
pub struct ScoringPipeline<S: ArtifactStore> {
    config: PipelineConfig,
    store: S
}

impl<S: ArtifactStore> ScoringPipeline<S> {
    pub fn new(config: PipelineConfig, store: S) -> Self {
        Self {
            config,
            store
        }
    }

    pub fn run(&self, path: &Path) -> Result<ScoredTable> {
        let table = read_table(path)?;
        info!("Read {} rows to score from {}", table.records.len(), path.display());

        let artifact = self.store.load().context("Failed to load trained model")?;
        let scored = self.score_table(&artifact, table)?;

        self.log_summary(&scored);

        Ok(scored)
    }

    /// Scores an in-memory table. The label column, if present, is discarded
    /// before encoding and does not appear in the result.
    pub fn score_table(&self, artifact: &ModelArtifact, mut table: RawTable) -> Result<ScoredTable> {
        table.remove_column(&artifact.encoder().schema().label);

        let batch = encode(&table.records, EncodeMode::Reuse(artifact.encoder()))?;
        let probabilities = score(artifact, &batch.matrix)?;

        let threshold = self.config.scoring.threshold;
        let mut scores: Vec<Option<Score>> = vec![None; table.records.len()];

        for (&index, probability) in batch.row_indices.iter().zip(probabilities) {
            scores[index] = Some(Score::at_threshold(probability, threshold));
        }

        let dropped = table.records.len() - batch.row_indices.len();
        if dropped > 0 {
            debug!("{dropped} rows were not scored because of missing values");
        }

        Ok(ScoredTable::new(table.headers, table.records, scores))
    }

    fn log_summary(&self, scored: &ScoredTable) {
        let scoring = &self.config.scoring;
        let high_risk = scored.high_risk_count(scoring.high_risk_threshold);

        info!(
            "Scored {} of {} rows, {} above threshold {:.2}",
            scored.scored_count(),
            scored.len(),
            scored.flagged_count(),
            scoring.threshold
        );

        if high_risk > 0 {
            warn!("High-risk fraud detected: {high_risk} rows above {:.2}", scoring.high_risk_threshold);
        }

        if !scoring.group_by.is_empty() {
            for group in scored.mean_risk_by(&scoring.group_by) {
                info!("Mean risk [{}]: {:.4} over {} rows", group.key.join(" / "), group.mean_risk, group.transactions);
            }
        }
    }
}
