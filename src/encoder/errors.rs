use thiserror::Error;

use crate::types::RowIndex;

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("Required column [{column}] is absent from every record")]
    MissingColumn {
        column: String
    },
    #[error("No usable rows remain after dropping records with missing values ({total_rows} rows read)")]
    EmptyInput {
        total_rows: usize
    },
    #[error("Encoded column [{column}] is produced by more than one field/value pair")]
    DuplicateColumn {
        column: String
    },
    #[error("Column [{column}] holds a non-numeric value [{value}] in record [{row}]")]
    InvalidNumber {
        column: String,
        row: RowIndex,
        value: String
    }
}

impl EncodeError {
    pub fn missing_column(column: &str) -> Self {
        Self::MissingColumn { column: column.to_string() }
    }

    pub fn invalid_number(column: &str, row: RowIndex, value: &str) -> Self {
        Self::InvalidNumber {
            column: column.to_string(),
            row,
            value: value.to_string()
        }
    }
}
