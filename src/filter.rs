//! Client-side topic filtering of fetched records.
//!
//! The store only does text search; topic matching happens here so that it
//! is case-insensitive regardless of how the store compares strings.

use std::fmt;

use clap::ValueEnum;

use crate::models::Record;
use crate::topics::TopicNormalizer;

/// How a multi-topic selection is matched against a record's topics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MatchMode {
    /// Record must carry at least one selected topic.
    #[default]
    Any,
    /// Record must carry every selected topic.
    All,
}

impl MatchMode {
    /// Returns the other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Any => Self::All,
            Self::All => Self::Any,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::All => write!(f, "all"),
        }
    }
}

/// The set of topic values the user has selected.
///
/// Values are normalized on the way in, so callers can pass raw spellings.
/// Insertion order is kept only for displaying the active chips; it never
/// affects filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicSelection {
    values: Vec<String>,
}

impl TopicSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a topic. Returns `false` if it was blank or already selected.
    pub fn insert(&mut self, topic: &str) -> bool {
        let value = TopicNormalizer::normalize_topic(topic);
        if value.is_empty() || self.values.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Removes a topic. Returns `false` if it was not selected.
    pub fn remove(&mut self, topic: &str) -> bool {
        let value = TopicNormalizer::normalize_topic(topic);
        let before = self.values.len();
        self.values.retain(|v| *v != value);
        self.values.len() != before
    }

    /// Selects the topic if absent, deselects it if present.
    ///
    /// Returns whether the topic is selected afterwards.
    pub fn toggle(&mut self, topic: &str) -> bool {
        if self.remove(topic) {
            false
        } else {
            self.insert(topic)
        }
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.values.contains(&TopicNormalizer::normalize_topic(topic))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates selected values in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TopicSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for topic in iter {
            selection.insert(topic.as_ref());
        }
        selection
    }
}

/// Returns whether a single record passes the topic filter.
///
/// An empty selection matches everything. Otherwise a record without any
/// topics never matches, whatever the mode.
#[must_use]
pub fn record_matches(record: &Record, selected: &TopicSelection, mode: MatchMode) -> bool {
    if selected.is_empty() {
        return true;
    }

    let record_topics = TopicNormalizer::topic_set(record.topics());
    if record_topics.is_empty() {
        return false;
    }

    match mode {
        MatchMode::All => selected.iter().all(|value| record_topics.contains(value)),
        MatchMode::Any => selected.iter().any(|value| record_topics.contains(value)),
    }
}

/// Filters records by topic selection, preserving input order.
///
/// # Examples
///
/// ```
/// use prasang::filter::{MatchMode, TopicSelection, filter_records};
/// use prasang::{RecordBuilder, RecordId};
///
/// let records = vec![
///     RecordBuilder::new(RecordId::new(1), "A").topics(["X", "y"]).build(),
///     RecordBuilder::new(RecordId::new(2), "B").topics(["Y"]).build(),
///     RecordBuilder::new(RecordId::new(3), "C").build(),
/// ];
/// let selected: TopicSelection = ["x", "y"].into_iter().collect();
///
/// let any = filter_records(&records, &selected, MatchMode::Any);
/// assert_eq!(any.len(), 2);
///
/// let all = filter_records(&records, &selected, MatchMode::All);
/// assert_eq!(all.len(), 1);
/// assert_eq!(all[0].text(), "A");
/// ```
#[must_use]
pub fn filter_records<'a>(
    records: &'a [Record],
    selected: &TopicSelection,
    mode: MatchMode,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| record_matches(record, selected, mode))
        .collect()
}
