//! Tabular fraud scoring: a persisted feature encoder paired with a bagged
//! decision-tree ensemble, trained offline from CSV and served to any front
//! end through one scoring API.

pub mod config;
pub mod encoder;
pub mod engine;
pub mod models;
pub mod scoring;
pub mod storage;
pub mod types;

pub use crate::config::PipelineConfig;
pub use encoder::{encode, EncodeMode, EncodedBatch, EncoderState, FeatureMatrix, FeatureSchema};
pub use engine::{ScoringPipeline, TrainingPipeline};
pub use models::{train, ForestConfig, RandomForest};
pub use scoring::{score, Score, ScoredTable};
pub use storage::{ArtifactStore, FileArtifactStore, ModelArtifact};
pub use types::TransactionRecord;
