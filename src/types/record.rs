use std::collections::HashMap;

const MISSING_MARKERS: [&str; 4] = ["na", "nan", "null", "none"];

/// Returns true when a raw cell should be treated as a null.
pub fn is_missing_value(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || MISSING_MARKERS.iter().any(|marker| value.eq_ignore_ascii_case(marker))
}

/// A single transaction row as read from the input table.
///
/// Values are kept as raw text; interpretation (numeric, categorical, label)
/// is decided by the feature schema at encoding time. A field that is present
/// with a null marker is distinct from a field that is absent altogether.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    fields: HashMap<String, String>
}

impl TransactionRecord {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new()
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    /// Whether the record carries the field at all, null or not.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the trimmed value of a field, or `None` when it is absent or null.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
            .map(|value| value.trim())
            .filter(|value| !is_missing_value(value))
    }

    /// Returns the raw stored text of a field, including null markers.
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TransactionRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(field, value)| (field.into(), value.into())).collect()
        }
    }
}
