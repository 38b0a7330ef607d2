//! Browsing state shared by the terminal UI and the tests.
//!
//! `Browser` owns everything the user can change (search text, topic
//! selection, match mode) and the latest snapshot of each fetched stream.
//! The filtered view is re-derived whenever the selection, the mode or the
//! record set changes.

mod fetch;

pub use fetch::{FetchOutcome, FetchTracker, Fetcher, Ticket};

use tracing::{debug, warn};

use crate::filter::{MatchMode, TopicSelection, record_matches};
use crate::models::{Record, TopicChip, TopicRow};
use crate::store::RecordQuery;
use crate::topics::TopicNormalizer;

/// Load status of one fetched stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The latest fetch succeeded.
    Loaded,
    /// The latest fetch failed; holds the message shown to the user.
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Controller state for browsing records.
#[derive(Debug, Default)]
pub struct Browser {
    search: String,
    selection: TopicSelection,
    match_mode: MatchMode,
    topic_rows: Vec<TopicRow>,
    chips: Vec<TopicChip>,
    records: Vec<Record>,
    /// Indexes into `records` that pass the topic filter.
    visible: Vec<usize>,
    topics_state: LoadState,
    records_state: LoadState,
    topics_fetches: FetchTracker,
    records_fetches: FetchTracker,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Replaces the search text. Takes effect on the next records fetch.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn selection(&self) -> &TopicSelection {
        &self.selection
    }

    /// Toggles a topic in the selection. Returns whether it is now selected.
    pub fn toggle_topic(&mut self, topic: &str) -> bool {
        let selected = self.selection.toggle(topic);
        self.refresh_view();
        selected
    }

    /// Adds a topic to the selection.
    pub fn select_topic(&mut self, topic: &str) {
        if self.selection.insert(topic) {
            self.refresh_view();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.refresh_view();
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) {
        self.match_mode = mode;
        self.refresh_view();
    }

    pub fn toggle_match_mode(&mut self) {
        self.set_match_mode(self.match_mode.toggled());
    }

    /// Returns the selectable topic chips, sorted by label.
    pub fn chips(&self) -> &[TopicChip] {
        &self.chips
    }

    /// Returns the raw topic rows from the last successful topics fetch.
    pub fn topic_rows(&self) -> &[TopicRow] {
        &self.topic_rows
    }

    /// Returns every record from the last successful records fetch.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the records that pass the current topic filter, in fetch order.
    pub fn visible_records(&self) -> Vec<&Record> {
        self.visible.iter().map(|&i| &self.records[i]).collect()
    }

    /// Returns the record at `index` in the visible list.
    pub fn visible_record(&self, index: usize) -> Option<&Record> {
        self.visible.get(index).map(|&i| &self.records[i])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Returns chips for the selected topics, in the order they were selected.
    ///
    /// Labels come from the chip list; a selected value that is not in the
    /// current list (e.g. after a topics refetch) gets a freshly derived label.
    pub fn active_chips(&self) -> Vec<TopicChip> {
        self.selection
            .iter()
            .map(|value| {
                self.chips
                    .iter()
                    .find(|chip| chip.value == value)
                    .cloned()
                    .unwrap_or_else(|| {
                        TopicChip::new(value, TopicNormalizer::pretty_label(value))
                    })
            })
            .collect()
    }

    pub fn topics_state(&self) -> &LoadState {
        &self.topics_state
    }

    pub fn records_state(&self) -> &LoadState {
        &self.records_state
    }

    /// Returns whether either stream has a fetch in flight.
    pub fn is_loading(&self) -> bool {
        self.topics_state.is_loading() || self.records_state.is_loading()
    }

    /// Marks the topics stream as loading and supersedes earlier topic fetches.
    pub fn begin_topics_fetch(&mut self) -> Ticket {
        self.topics_state = LoadState::Loading;
        self.topics_fetches.begin()
    }

    /// Marks the records stream as loading and returns the query to run.
    ///
    /// Supersedes earlier record fetches.
    pub fn begin_records_fetch(&mut self) -> (Ticket, RecordQuery) {
        self.records_state = LoadState::Loading;
        let ticket = self.records_fetches.begin();
        (ticket, RecordQuery::with_text(self.search.clone()))
    }

    /// Commits a finished fetch if it is still the latest for its stream.
    ///
    /// Returns `false` for superseded outcomes, which leave the state
    /// untouched. A failure only marks its own stream as failed and keeps
    /// that stream's previous data.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Topics { ticket, result } => {
                if !self.topics_fetches.is_current(ticket) {
                    debug!(?ticket, "discarding superseded topic fetch");
                    return false;
                }
                match result {
                    Ok(rows) => {
                        let raw = rows.iter().filter_map(TopicRow::topic);
                        self.chips = TopicNormalizer::build_chips(raw);
                        self.topic_rows = rows;
                        self.topics_state = LoadState::Loaded;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to load topics");
                        self.topics_state = LoadState::Failed(e.to_string());
                    }
                }
            }
            FetchOutcome::Records { ticket, result } => {
                if !self.records_fetches.is_current(ticket) {
                    debug!(?ticket, "discarding superseded record fetch");
                    return false;
                }
                match result {
                    Ok(records) => {
                        self.records = records;
                        self.records_state = LoadState::Loaded;
                        self.refresh_view();
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to load records");
                        self.records_state = LoadState::Failed(e.to_string());
                    }
                }
            }
        }
        true
    }

    fn refresh_view(&mut self) {
        self.visible = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record_matches(record, &self.selection, self.match_mode))
            .map(|(i, _)| i)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordBuilder, RecordId};
    use crate::store::StoreError;

    fn record(id: i64, topics: &[&str]) -> Record {
        RecordBuilder::new(RecordId::new(id), format!("record {id}"))
            .topics(topics.iter().copied())
            .build()
    }

    fn visible_ids(browser: &Browser) -> Vec<i64> {
        browser
            .visible_records()
            .iter()
            .map(|r| r.id().get())
            .collect()
    }

    fn load_records(browser: &mut Browser, records: Vec<Record>) {
        let (ticket, _) = browser.begin_records_fetch();
        assert!(browser.apply(FetchOutcome::Records {
            ticket,
            result: Ok(records),
        }));
    }

    fn load_topics(browser: &mut Browser, topics: &[&str]) {
        let ticket = browser.begin_topics_fetch();
        let rows = topics.iter().map(|t| TopicRow::new(*t)).collect();
        assert!(browser.apply(FetchOutcome::Topics {
            ticket,
            result: Ok(rows),
        }));
    }

    fn http_error() -> StoreError {
        StoreError::Http {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn unusable_topic_rows_are_skipped_for_chips() {
        let mut browser = Browser::new();
        let rows: Vec<TopicRow> =
            serde_json::from_str(r#"[{"topic": "Seva"}, {"topic": null}, {"topic": " seva"}]"#)
                .unwrap();

        let ticket = browser.begin_topics_fetch();
        assert!(browser.apply(FetchOutcome::Topics {
            ticket,
            result: Ok(rows),
        }));

        assert_eq!(*browser.topics_state(), LoadState::Loaded);
        assert_eq!(browser.chips(), &[TopicChip::new("seva", "Seva")]);
        assert_eq!(browser.topic_rows().len(), 3);
    }

    #[test]
    fn new_browser_is_idle_and_empty() {
        let browser = Browser::new();

        assert_eq!(*browser.topics_state(), LoadState::Idle);
        assert_eq!(*browser.records_state(), LoadState::Idle);
        assert!(browser.visible_records().is_empty());
        assert_eq!(browser.match_mode(), MatchMode::Any);
        assert!(!browser.is_loading());
    }

    #[test]
    fn begin_marks_stream_loading() {
        let mut browser = Browser::new();
        browser.begin_topics_fetch();

        assert!(browser.topics_state().is_loading());
        assert!(!browser.records_state().is_loading());
        assert!(browser.is_loading());
    }

    #[test]
    fn records_fetch_uses_current_search_text() {
        let mut browser = Browser::new();
        browser.set_search("  sarangpur ");

        let (_, query) = browser.begin_records_fetch();
        assert_eq!(query.search_text(), Some("sarangpur"));
    }

    #[test]
    fn view_rederived_on_selection_and_mode_change() {
        let mut browser = Browser::new();
        load_records(
            &mut browser,
            vec![record(1, &["X", "y"]), record(2, &["Y"]), record(3, &[])],
        );
        assert_eq!(visible_ids(&browser), vec![1, 2, 3]);

        browser.toggle_topic("x");
        browser.toggle_topic("y");
        assert_eq!(visible_ids(&browser), vec![1, 2]);

        browser.toggle_match_mode();
        assert_eq!(visible_ids(&browser), vec![1]);

        browser.clear_selection();
        assert_eq!(visible_ids(&browser), vec![1, 2, 3]);
    }

    #[test]
    fn selection_persists_across_record_refetch() {
        let mut browser = Browser::new();
        browser.select_topic("seva");
        load_records(&mut browser, vec![record(1, &["Seva"]), record(2, &["other"])]);
        assert_eq!(visible_ids(&browser), vec![1]);

        load_records(&mut browser, vec![record(3, &["other"]), record(4, &["SEVA "])]);
        assert!(browser.selection().contains("seva"));
        assert_eq!(visible_ids(&browser), vec![4]);
    }

    #[test]
    fn topics_replace_chips_on_refetch() {
        let mut browser = Browser::new();
        load_topics(&mut browser, &["Diwali", "diwali ", " DIWALI", "seva"]);
        assert_eq!(browser.chips().len(), 2);
        assert_eq!(browser.topic_rows().len(), 4);

        load_topics(&mut browser, &["Mandir"]);
        assert_eq!(browser.chips(), &[TopicChip::new("mandir", "Mandir")]);
    }

    #[test]
    fn superseded_records_fetch_is_ignored() {
        let mut browser = Browser::new();

        browser.set_search("a");
        let (ticket_a, _) = browser.begin_records_fetch();
        browser.set_search("ab");
        let (ticket_ab, _) = browser.begin_records_fetch();

        assert!(browser.apply(FetchOutcome::Records {
            ticket: ticket_ab,
            result: Ok(vec![record(2, &[])]),
        }));
        assert!(!browser.apply(FetchOutcome::Records {
            ticket: ticket_a,
            result: Ok(vec![record(1, &[])]),
        }));

        assert_eq!(visible_ids(&browser), vec![2]);
        assert_eq!(*browser.records_state(), LoadState::Loaded);
    }

    #[test]
    fn superseded_failure_does_not_mark_stream_failed() {
        let mut browser = Browser::new();
        let old = browser.begin_topics_fetch();
        let _new = browser.begin_topics_fetch();

        assert!(!browser.apply(FetchOutcome::Topics {
            ticket: old,
            result: Err(http_error()),
        }));
        assert!(browser.topics_state().is_loading());
    }

    #[test]
    fn topics_failure_keeps_records() {
        let mut browser = Browser::new();
        load_records(&mut browser, vec![record(1, &["seva"])]);

        let ticket = browser.begin_topics_fetch();
        browser.apply(FetchOutcome::Topics {
            ticket,
            result: Err(http_error()),
        });

        assert!(browser.topics_state().error().is_some());
        assert_eq!(*browser.records_state(), LoadState::Loaded);
        assert_eq!(visible_ids(&browser), vec![1]);
    }

    #[test]
    fn records_failure_keeps_topics_and_previous_records() {
        let mut browser = Browser::new();
        load_topics(&mut browser, &["seva"]);
        load_records(&mut browser, vec![record(1, &["seva"])]);

        let (ticket, _) = browser.begin_records_fetch();
        browser.apply(FetchOutcome::Records {
            ticket,
            result: Err(http_error()),
        });

        let message = browser.records_state().error().unwrap();
        assert!(message.contains("503"));
        assert_eq!(browser.chips().len(), 1);
        assert_eq!(visible_ids(&browser), vec![1]);
    }

    #[test]
    fn active_chips_follow_selection_order() {
        let mut browser = Browser::new();
        load_topics(&mut browser, &["Seva", "akshar"]);

        browser.toggle_topic("SEVA");
        browser.toggle_topic("akshar");
        browser.toggle_topic("guru-purnima");

        let labels: Vec<String> = browser
            .active_chips()
            .into_iter()
            .map(|chip| chip.label)
            .collect();
        assert_eq!(labels, vec!["Seva", "Akshar", "Guru-Purnima"]);
    }

    #[test]
    fn visible_record_indexes_filtered_view() {
        let mut browser = Browser::new();
        load_records(&mut browser, vec![record(1, &["a"]), record(2, &["b"])]);
        browser.select_topic("b");

        assert_eq!(browser.visible_count(), 1);
        assert_eq!(browser.visible_record(0).map(|r| r.id().get()), Some(2));
        assert!(browser.visible_record(1).is_none());
    }
}
