use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::encoder::errors::EncodeError;
use crate::encoder::state::{CategoryVocabulary, EncoderState, FeatureSchema, NumericScaler};
use crate::encoder::FeatureMatrix;
use crate::types::{parse_numeric, RowIndex, TransactionRecord};

/// Selects whether `encode` fits new state or reuses a previously fitted one.
#[derive(Debug, Clone, Copy)]
pub enum EncodeMode<'a> {
    /// Fit scalers and vocabularies from the records being encoded.
    Fit(&'a FeatureSchema),
    /// Reuse fitted state; the output columns are exactly `state.columns()`.
    Reuse(&'a EncoderState)
}

impl<'a> EncodeMode<'a> {
    fn schema(self) -> &'a FeatureSchema {
        match self {
            EncodeMode::Fit(schema) => schema,
            EncodeMode::Reuse(state) => state.schema()
        }
    }
}

/// Result of one encoder call.
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub matrix: FeatureMatrix,
    pub state: EncoderState,
    /// For every matrix row, the index of the input record it was built from.
    pub row_indices: Vec<RowIndex>
}

/// A record that survived null-dropping, with its numeric fields parsed.
struct RetainedRow<'a> {
    index: RowIndex,
    numeric: Vec<f64>,
    categories: Vec<&'a str>
}

/// Encodes transaction records into a fixed-width numeric matrix.
///
/// Records missing any required field are dropped. Categorical fields become
/// one indicator column per vocabulary value; numeric fields are standardized.
/// In [`EncodeMode::Reuse`] the column set and order come from the given state,
/// so unseen categories encode as all-zero indicators instead of new columns.
///
/// # Errors
/// Returns `EncodeError` if:
/// - A required field is absent from every record.
/// - Every record is dropped for missing values.
/// - A numeric field holds a value that cannot be parsed.
/// - Two field/value pairs map to the same indicator column name.
pub fn encode(records: &[TransactionRecord], mode: EncodeMode<'_>) -> Result<EncodedBatch, EncodeError> {
    let schema = mode.schema();

    if records.is_empty() {
        return Err(EncodeError::EmptyInput { total_rows: 0 })
    }

    for field in schema.required_fields() {
        if !records.iter().any(|record| record.has_field(field)) {
            return Err(EncodeError::missing_column(field))
        }
    }

    let retained = retain_complete_rows(records, schema)?;

    if retained.is_empty() {
        return Err(EncodeError::EmptyInput { total_rows: records.len() })
    }

    debug!("Encoder retained {} of {} records", retained.len(), records.len());

    let state = match mode {
        EncodeMode::Fit(schema) => fit_state(schema, &retained),
        EncodeMode::Reuse(state) => state.clone()
    };

    if let Some(column) = state.duplicate_column() {
        return Err(EncodeError::DuplicateColumn { column: column.to_string() })
    }

    let matrix = build_matrix(&state, &retained);
    let row_indices = retained.iter().map(|row| row.index).collect();

    Ok(EncodedBatch {
        matrix,
        state,
        row_indices
    })
}

fn retain_complete_rows<'a>(records: &'a [TransactionRecord], schema: &FeatureSchema) -> Result<Vec<RetainedRow<'a>>, EncodeError> {
    let mut retained = Vec::with_capacity(records.len());

    'records: for (index, record) in records.iter().enumerate() {
        let mut numeric = Vec::with_capacity(schema.numeric.len());

        for field in &schema.numeric {
            let Some(value) = record.value(field) else {
                continue 'records
            };

            numeric.push(parse_numeric(value).map_err(|_| EncodeError::invalid_number(field, index, value))?);
        }

        let mut categories = Vec::with_capacity(schema.categorical.len());

        for field in &schema.categorical {
            let Some(value) = record.value(field) else {
                continue 'records
            };

            categories.push(value);
        }

        retained.push(RetainedRow { index, numeric, categories });
    }

    Ok(retained)
}

fn fit_state(schema: &FeatureSchema, rows: &[RetainedRow<'_>]) -> EncoderState {
    let scalers = schema.numeric.iter().enumerate()
        .map(|(position, column)| {
            let values: Vec<f64> = rows.iter().map(|row| row.numeric[position]).collect();
            NumericScaler::fit(column, &values)
        })
        .collect();

    let vocabularies = schema.categorical.iter().enumerate()
        .map(|(position, field)| {
            let values = rows.iter().map(|row| row.categories[position].to_string()).collect();
            CategoryVocabulary::new(field, values)
        })
        .collect();

    EncoderState::new(schema.clone(), scalers, vocabularies)
}

fn build_matrix(state: &EncoderState, rows: &[RetainedRow<'_>]) -> FeatureMatrix {
    let width = state.columns().len();
    let mut unseen: BTreeMap<&str, usize> = BTreeMap::new();

    let encoded = rows.iter()
        .map(|row| {
            let mut vector = Vec::with_capacity(width);

            for (scaler, &value) in state.scalers().iter().zip(&row.numeric) {
                vector.push(scaler.apply(value));
            }

            for (vocabulary, &category) in state.vocabularies().iter().zip(&row.categories) {
                let offset = vector.len();
                vector.resize(offset + vocabulary.values.len(), 0.0);

                match vocabulary.position(category) {
                    Some(position) => vector[offset + position] = 1.0,
                    None => *unseen.entry(vocabulary.field.as_str()).or_default() += 1
                }
            }

            vector
        })
        .collect();

    for (field, count) in unseen {
        warn!("{count} record(s) carry a [{field}] value unseen during fitting; encoded as all-zero indicators");
    }

    FeatureMatrix::new(state.columns().to_vec(), encoded)
}
