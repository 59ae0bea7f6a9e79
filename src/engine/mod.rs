mod csv_table;
mod scoring_pipeline;
mod training_pipeline;

pub use csv_table::{read_table, write_scored_csv, RawTable, FLAG_COLUMN, RISK_COLUMN};
pub use scoring_pipeline::ScoringPipeline;
pub use training_pipeline::{TrainingPipeline, TrainingReport};
