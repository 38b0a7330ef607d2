use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use super::RecordId;

time::serde::format_description!(event_date_format, Date, "[year]-[month]-[day]");

/// A catalog entry (a "prasang") as returned by the record store.
///
/// Records are owned by the store and treated as immutable input: the
/// browser never edits them, it only filters and displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    text: String,
    #[serde(default)]
    notes: Option<String>,
    /// Raw topic spellings exactly as stored. A `null` or malformed column
    /// reads as empty; non-string elements are dropped.
    #[serde(default, deserialize_with = "lenient_topics")]
    topics: Vec<String>,
    #[serde(default, with = "event_date_format::option")]
    event_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// Topic data is never a reason to reject a record.
fn lenient_topics<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let topics = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(topic) => Some(topic),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(topics)
}

impl Record {
    /// Returns the record's unique identifier.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the primary text of the record.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the optional notes attached to the record.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the raw topic strings, in stored order and un-normalized.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Returns the date of the event the record describes, if known.
    pub fn event_date(&self) -> Option<Date> {
        self.event_date
    }

    /// Returns when the record was created in the store.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

/// Builder for constructing `Record` instances, mostly in tests and fakes.
///
/// # Examples
///
/// ```
/// use prasang::{RecordBuilder, RecordId};
///
/// let record = RecordBuilder::new(RecordId::new(1), "Bapa's visit to Sarangpur")
///     .topics(["Bapa", "sarangpur"])
///     .build();
///
/// assert_eq!(record.id(), RecordId::new(1));
/// assert_eq!(record.topics().len(), 2);
/// assert!(record.notes().is_none());
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    id: RecordId,
    text: String,
    notes: Option<String>,
    topics: Vec<String>,
    event_date: Option<Date>,
    created_at: Option<OffsetDateTime>,
}

impl RecordBuilder {
    /// Creates a builder with the two required fields.
    pub fn new(id: RecordId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            notes: None,
            topics: Vec::new(),
            event_date: None,
            created_at: None,
        }
    }

    /// Sets the notes.
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the raw topic strings.
    pub fn topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the event date.
    pub fn event_date(mut self, event_date: Date) -> Self {
        self.event_date = Some(event_date);
        self
    }

    /// Sets the creation timestamp.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the `Record`, stamping `created_at` with the current time if unset.
    pub fn build(self) -> Record {
        Record {
            id: self.id,
            text: self.text,
            notes: self.notes,
            topics: self.topics,
            event_date: self.event_date,
            created_at: self.created_at.unwrap_or_else(OffsetDateTime::now_utc),
        }
    }
}
