mod errors;
mod feature_encoder;
mod matrix;
mod state;
#[cfg(test)]
mod tests;

pub use errors::EncodeError;
pub use feature_encoder::{encode, EncodeMode, EncodedBatch};
pub use matrix::FeatureMatrix;
pub use state::{indicator_column, CategoryVocabulary, EncoderState, FeatureSchema, NumericScaler};
