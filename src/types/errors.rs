use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NumericError {
    #[error("Numeric error: {0}")]
    InvalidFormat(String),
    #[error("Numeric error: Value [{0}] is not representable as a finite number")]
    OutOfRange(String)
}
