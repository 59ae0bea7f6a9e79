use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("Encoded columns do not match the trained model: expected {expected} columns, found {found} ({detail})")]
    SchemaMismatch {
        expected: usize,
        found: usize,
        detail: String
    },
    #[error("Encoded row [{row}] has {found} values but the matrix declares {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize
    }
}

impl ScoreError {
    pub fn schema_mismatch(expected: &[String], found: &[String]) -> Self {
        let detail = expected.iter().zip(found)
            .position(|(expected, found)| expected != found)
            .map(|position| format!("column {} is [{}], expected [{}]", position, found[position], expected[position]))
            .unwrap_or_else(|| "column lists differ in length".to_string());

        Self::SchemaMismatch {
            expected: expected.len(),
            found: found.len(),
            detail
        }
    }
}
