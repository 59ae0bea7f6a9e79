//! Pipeline configuration: defaults, optional TOML file, validation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use thiserror::Error;

use crate::encoder::FeatureSchema;
use crate::models::ForestConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Location of the single persisted model artifact
    pub artifact_path: PathBuf,
    pub schema: FeatureSchema,
    pub forest: ForestConfig,
    pub training: TrainingConfig,
    pub scoring: ScoringConfig
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Share of encoded rows held out for evaluation (floor(n * fraction) rows)
    pub test_fraction: f64
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Rows strictly above this probability are flagged
    pub threshold: f64,
    /// Rows strictly above this probability are reported as high risk
    pub high_risk_threshold: f64,
    /// Categorical fields used for the mean-risk breakdown
    pub group_by: Vec<String>
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("models/fraud_model.json"),
            schema: FeatureSchema::default(),
            forest: ForestConfig::default(),
            training: TrainingConfig::default(),
            scoring: ScoringConfig::default()
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            high_risk_threshold: 0.9,
            group_by: vec!["location".to_string(), "device".to_string()]
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidConfig {
    #[error("Invalid configuration: forest.n_trees must be at least 1")]
    NoTrees,
    #[error("Invalid configuration: training.test_fraction must be in [0, 1), got {0}")]
    TestFraction(f64),
    #[error("Invalid configuration: {name} must be in [0, 1], got {value}")]
    Threshold {
        name: &'static str,
        value: f64
    },
    #[error("Invalid configuration: schema declares no feature fields")]
    EmptySchema,
    #[error("Invalid configuration: field [{0}] is declared more than once in the schema")]
    DuplicateField(String)
}

impl PipelineConfig {
    /// Loads configuration from a TOML file; absent keys keep their defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.as_ref().display()))?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.forest.n_trees == 0 {
            return Err(InvalidConfig::NoTrees)
        }

        if !(0.0..1.0).contains(&self.training.test_fraction) {
            return Err(InvalidConfig::TestFraction(self.training.test_fraction))
        }

        for (name, value) in [
            ("scoring.threshold", self.scoring.threshold),
            ("scoring.high_risk_threshold", self.scoring.high_risk_threshold)
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidConfig::Threshold { name, value })
            }
        }

        if self.schema.numeric.is_empty() && self.schema.categorical.is_empty() {
            return Err(InvalidConfig::EmptySchema)
        }

        let mut seen: Vec<&str> = Vec::new();
        for field in self.schema.required_fields().chain([self.schema.label.as_str()]) {
            if seen.contains(&field) {
                return Err(InvalidConfig::DuplicateField(field.to_string()))
            }
            seen.push(field);
        }

        Ok(())
    }
}
