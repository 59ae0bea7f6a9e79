use thiserror::Error;

use crate::types::RowIndex;

#[derive(Debug, Error, PartialEq)]
pub enum TrainError {
    #[error("Feature matrix has {rows} rows but {labels} labels were supplied")]
    DimensionMismatch {
        rows: usize,
        labels: usize
    },
    #[error("Training data must contain both classes (found {legitimate} legitimate and {fraud} fraud rows)")]
    InsufficientData {
        legitimate: usize,
        fraud: usize
    },
    #[error("Label [{value}] in record [{row}] is not a binary fraud label")]
    InvalidLabel {
        row: RowIndex,
        value: String
    },
    #[error("Forest must contain at least one tree")]
    NoTrees
}
