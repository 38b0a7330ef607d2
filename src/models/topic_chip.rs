use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single raw topic row as returned by the store's topic listing.
///
/// One row per occurrence: the store does not deduplicate, so the same
/// logical topic can appear many times with different spellings. A row
/// whose topic is `null`, missing or not a string carries `None` and is
/// skipped when chips are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRow {
    #[serde(default, deserialize_with = "string_or_none")]
    topic: Option<String>,
}

impl TopicRow {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
        }
    }

    /// Returns the raw topic, if the row carried a usable one.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(topic) => Ok(Some(topic)),
        _ => Ok(None),
    }
}

/// A display-ready, deduplicated topic.
///
/// `value` is the normalized identity key (trimmed, lowercased) used for
/// selection and filtering; `label` is the title-cased spelling shown to
/// the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicChip {
    pub value: String,
    pub label: String,
}

impl TopicChip {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}
