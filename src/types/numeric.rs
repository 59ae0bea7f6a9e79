use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::types::errors::NumericError;

/// Parses a raw numeric cell into an `f64`.
///
/// Cells are read as decimal amounts first so that values such as `"9000"`,
/// `"+12.50"` or `"1.5e3"` are accepted the same way regardless of how the
/// exporting tool formatted them.
pub fn parse_numeric(value: &str) -> Result<f64, NumericError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(NumericError::InvalidFormat("Value is an empty string".to_string()));
    }

    let decimal = Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|error| {
            NumericError::InvalidFormat(format!("Value [{value}] is not a number: {error}"))
        })?;

    decimal.to_f64()
        .filter(|number| number.is_finite())
        .ok_or_else(|| NumericError::OutOfRange(value.to_string()))
}

/// Parses a binary fraud label (`0`/`1`, `true`/`false`).
pub fn parse_label(value: &str) -> Option<u8> {
    match value.trim().to_lowercase().as_str() {
        "0" | "0.0" | "false" => Some(0),
        "1" | "1.0" | "true" => Some(1),
        _ => None
    }
}
