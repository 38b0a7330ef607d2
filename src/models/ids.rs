use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a record.
///
/// Wraps the store's integer primary key to keep it from being mixed up
/// with counts and indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Creates a new record ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_deserializes_from_raw_integer() {
        let id: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(id, RecordId::new(42));
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn record_id_displays_as_plain_number() {
        assert_eq!(RecordId::new(7).to_string(), "7");
    }
}
