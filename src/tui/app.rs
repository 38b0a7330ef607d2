use std::time::Instant;

use crate::browser::Browser;
use crate::models::{Record, RecordId, TopicChip};

/// Application state for the TUI.
///
/// Wraps the [`Browser`] with purely visual state: which panel has focus,
/// the cursor in each list, the uncommitted search buffer and detail scroll.
#[derive(Debug)]
pub struct App {
    browser: Browser,
    /// Search input buffer (committed to the browser after debounce)
    search_input: String,
    /// When the search input was last changed (for debouncing search)
    search_changed_at: Option<Instant>,
    /// Whether we need to run a search (input changed but not yet fetched)
    search_pending: bool,
    /// Whether the user asked for both streams to be refetched
    refresh_requested: bool,
    /// Currently focused panel
    focus: Focus,
    /// Cursor position in the topic chip list
    chip_cursor: usize,
    /// Currently selected index in the visible records (None if no selection)
    selected_index: Option<usize>,
    /// Record under `selected_index`, used to follow it across refetches
    selected_id: Option<RecordId>,
    /// Scroll offset for detail view
    detail_scroll: u16,
}

/// Panel focus state for keyboard navigation.
///
/// Determines which panel receives keyboard input and how keys are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Search bar is focused (typing edits the search text)
    SearchInput,
    /// Topic chip panel is focused (j/k move, Space toggles)
    TopicList,
    /// Record list panel is focused (j/k navigation)
    RecordList,
    /// Detail view panel is focused (j/k scrolling)
    DetailView,
}

impl App {
    /// Creates a new App with default state.
    ///
    /// # Examples
    ///
    /// ```
    /// use prasang::tui::{App, Focus};
    ///
    /// let app = App::new();
    /// assert_eq!(app.focus(), Focus::SearchInput);
    /// assert_eq!(app.selected_index(), None);
    /// ```
    pub fn new() -> Self {
        Self {
            browser: Browser::new(),
            search_input: String::new(),
            search_changed_at: None,
            search_pending: false,
            refresh_requested: false,
            focus: Focus::SearchInput,
            chip_cursor: 0,
            selected_index: None,
            selected_id: None,
            detail_scroll: 0,
        }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }

    /// Returns the search input buffer.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Returns the current focus state.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Cycles focus: Search -> Topics -> Records -> Detail -> Search.
    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::SearchInput => Focus::TopicList,
            Focus::TopicList => Focus::RecordList,
            Focus::RecordList => Focus::DetailView,
            Focus::DetailView => Focus::SearchInput,
        };
        self.auto_select_on_record_list_focus();
    }

    /// Cycles focus in reverse Tab order.
    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            Focus::SearchInput => Focus::DetailView,
            Focus::TopicList => Focus::SearchInput,
            Focus::RecordList => Focus::TopicList,
            Focus::DetailView => Focus::RecordList,
        };
        self.auto_select_on_record_list_focus();
    }

    /// Returns focus to `SearchInput` (Esc key behavior).
    pub fn reset_focus(&mut self) {
        self.focus = Focus::SearchInput;
    }

    /// Auto-selects first record when entering RecordList focus with no selection.
    fn auto_select_on_record_list_focus(&mut self) {
        if self.focus == Focus::RecordList
            && self.selected_index.is_none()
            && self.browser.visible_count() > 0
        {
            self.select_index(Some(0));
        }
    }

    // --- Search ---

    /// Adds a character to the search buffer and marks search as pending.
    pub fn push_search_char(&mut self, c: char) {
        self.search_input.push(c);
        self.mark_search_changed();
    }

    /// Removes the last character from the search buffer and marks search as pending.
    pub fn pop_search_char(&mut self) {
        if self.search_input.pop().is_some() {
            self.mark_search_changed();
        }
    }

    fn mark_search_changed(&mut self) {
        self.search_changed_at = Some(Instant::now());
        self.search_pending = true;
    }

    /// Returns whether a search is pending and enough time has passed (debounce).
    pub fn should_search(&self, debounce_ms: u64) -> bool {
        if !self.search_pending {
            return false;
        }
        match self.search_changed_at {
            Some(changed_at) => changed_at.elapsed().as_millis() >= u128::from(debounce_ms),
            None => false,
        }
    }

    /// Commits the search buffer to the browser and clears the pending flag.
    pub fn commit_search(&mut self) {
        self.browser.set_search(self.search_input.clone());
        self.search_pending = false;
    }

    // --- Refresh ---

    /// Asks the event loop to refetch topics and records.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Returns and clears the refresh request.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    // --- Topics ---

    /// Returns the cursor position in the chip list.
    pub fn chip_cursor(&self) -> usize {
        self.chip_cursor
    }

    /// Returns the chip under the cursor, if any.
    pub fn chip_at_cursor(&self) -> Option<&TopicChip> {
        self.browser.chips().get(self.chip_cursor)
    }

    /// Moves the chip cursor down, wrapping at the end.
    pub fn chip_next(&mut self) {
        let len = self.browser.chips().len();
        if len > 0 {
            self.chip_cursor = (self.chip_cursor + 1) % len;
        }
    }

    /// Moves the chip cursor up, wrapping at the start.
    pub fn chip_previous(&mut self) {
        let len = self.browser.chips().len();
        if len > 0 {
            self.chip_cursor = (self.chip_cursor + len - 1) % len;
        }
    }

    /// Toggles the chip under the cursor and resets the record selection.
    pub fn toggle_chip_at_cursor(&mut self) {
        if let Some(value) = self.chip_at_cursor().map(|chip| chip.value.clone()) {
            self.browser.toggle_topic(&value);
            self.view_changed();
        }
    }

    /// Flips between match-any and match-all.
    pub fn toggle_match_mode(&mut self) {
        self.browser.toggle_match_mode();
        self.view_changed();
    }

    /// Deselects every topic.
    pub fn clear_topics(&mut self) {
        self.browser.clear_selection();
        self.view_changed();
    }

    fn view_changed(&mut self) {
        self.select_index(None);
        self.detail_scroll = 0;
    }

    /// Keeps cursors valid after new data arrived.
    ///
    /// The record selection follows the selected record by id; it is dropped
    /// when that record is no longer visible.
    pub fn clamp_cursors(&mut self) {
        let chips = self.browser.chips().len();
        if self.chip_cursor >= chips {
            self.chip_cursor = chips.saturating_sub(1);
        }

        let Some(id) = self.selected_id else {
            self.selected_index = None;
            return;
        };
        let position = self
            .browser
            .visible_records()
            .iter()
            .position(|record| record.id() == id);
        if position.is_none() {
            self.detail_scroll = 0;
        }
        self.select_index(position);
    }

    // --- Records ---

    /// Returns the currently selected index in the visible records.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Returns the currently selected record, if any.
    pub fn selected_record(&self) -> Option<&Record> {
        self.selected_index
            .and_then(|i| self.browser.visible_record(i))
    }

    /// Moves selection down in the record list (j key navigation).
    ///
    /// If no selection, selects first record. Wraps at the end.
    pub fn select_next(&mut self) {
        let len = self.browser.visible_count();
        if len == 0 {
            self.select_index(None);
            return;
        }

        self.select_index(Some(match self.selected_index {
            None => 0,
            Some(i) if i + 1 >= len => 0,
            Some(i) => i + 1,
        }));
        self.detail_scroll = 0;
    }

    /// Moves selection up in the record list (k key navigation).
    ///
    /// If no selection, selects last record. Wraps at the beginning.
    pub fn select_previous(&mut self) {
        let len = self.browser.visible_count();
        if len == 0 {
            self.select_index(None);
            return;
        }

        self.select_index(Some(match self.selected_index {
            None | Some(0) => len - 1,
            Some(i) => i - 1,
        }));
        self.detail_scroll = 0;
    }

    /// Clears the record selection (Esc key behavior).
    pub fn clear_selection(&mut self) {
        self.select_index(None);
        self.detail_scroll = 0;
    }

    fn select_index(&mut self, index: Option<usize>) {
        self.selected_index = index;
        self.selected_id = index
            .and_then(|i| self.browser.visible_record(i))
            .map(Record::id);
    }

    // --- Detail ---

    /// Returns the current detail view scroll offset.
    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }

    pub fn scroll_detail_down(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_add(amount);
    }

    pub fn scroll_detail_up(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_sub(amount);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
