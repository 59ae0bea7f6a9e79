use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Which raw fields feed the encoder and how each is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSchema {
    /// Fields standardized to zero mean / unit variance.
    pub numeric: Vec<String>,
    /// Fields expanded into one indicator column per category.
    pub categorical: Vec<String>,
    /// Binary training label. Never encoded as a feature.
    pub label: String
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            numeric: vec!["amount".to_string()],
            categorical: vec!["location".to_string(), "device".to_string(), "time".to_string()],
            label: "is_fraud".to_string()
        }
    }
}

impl FeatureSchema {
    /// Every field a record must carry to be encoded, numeric fields first.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.numeric.iter().chain(self.categorical.iter()).map(String::as_str)
    }
}

/// Standardization parameters of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    pub column: String,
    pub mean: f64,
    pub scale: f64
}

impl NumericScaler {
    /// Fits population mean and standard deviation. A constant column keeps a
    /// scale of 1.0 so it encodes to zeros.
    pub fn fit(column: &str, values: &[f64]) -> Self {
        let count = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
        let deviation = variance.sqrt();

        Self {
            column: column.to_string(),
            mean,
            scale: if deviation > f64::EPSILON { deviation } else { 1.0 }
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// Sorted set of category values observed for one field during fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub field: String,
    pub values: Vec<String>
}

impl CategoryVocabulary {
    pub fn new(field: &str, mut values: Vec<String>) -> Self {
        values.sort();
        values.dedup();

        Self {
            field: field.to_string(),
            values
        }
    }

    /// Position of a value inside this field's indicator block.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.binary_search_by(|candidate| candidate.as_str().cmp(value)).ok()
    }

    pub fn column_names(&self) -> impl Iterator<Item = String> + '_ {
        self.values.iter().map(|value| indicator_column(&self.field, value))
    }
}

pub fn indicator_column(field: &str, value: &str) -> String {
    format!("{field}_{value}")
}

/// Everything fitted by the encoder that must be reused verbatim at inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderState {
    schema: FeatureSchema,
    scalers: Vec<NumericScaler>,
    vocabularies: Vec<CategoryVocabulary>,
    columns: Vec<String>
}

impl EncoderState {
    pub fn new(schema: FeatureSchema, scalers: Vec<NumericScaler>, vocabularies: Vec<CategoryVocabulary>) -> Self {
        let columns = scalers.iter()
            .map(|scaler| scaler.column.clone())
            .chain(vocabularies.iter().flat_map(|vocabulary| vocabulary.column_names()))
            .collect();

        Self {
            schema,
            scalers,
            vocabularies,
            columns
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scalers(&self) -> &[NumericScaler] {
        &self.scalers
    }

    pub fn vocabularies(&self) -> &[CategoryVocabulary] {
        &self.vocabularies
    }

    pub fn vocabulary(&self, field: &str) -> Option<&CategoryVocabulary> {
        self.vocabularies.iter().find(|vocabulary| vocabulary.field == field)
    }

    /// The canonical encoded column list, in matrix order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Checks that the stored column list is the one derived from the scalers
    /// and vocabularies. Used when loading persisted state.
    pub fn is_consistent(&self) -> bool {
        let rebuilt = Self::new(self.schema.clone(), self.scalers.clone(), self.vocabularies.clone());
        rebuilt.columns == self.columns && self.duplicate_column().is_none()
    }

    /// First column name produced twice, e.g. field `a` value `b_c` and
    /// field `a_b` value `c` both naming `a_b_c`.
    pub fn duplicate_column(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.columns.len());

        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Some(column)
            }
        }

        None
    }
}
