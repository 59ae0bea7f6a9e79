mod errors;
mod numeric;
mod record;

pub use errors::NumericError;
pub use numeric::{parse_label, parse_numeric};
pub use record::{is_missing_value, TransactionRecord};

/// Zero-based position of a record in its input table.
pub type RowIndex = usize;

/// Binary class label: 0 = legitimate, 1 = fraud.
pub type Label = u8;
