//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes.
//! Key behavior depends on which panel has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Ctrl+C`: Quit from anywhere
/// - `q`: Quit (outside the search box, where it is a normal character)
/// - `Tab` / `Shift+Tab`: Cycle focus between panels
/// - `Esc`: Return to search input focus
/// - `r`: Refetch topics and records (outside the search box)
/// - When `TopicList` focused: j/k move, Space/Enter toggle, `m` match mode, `c` clear
/// - When `RecordList` focused: j/k navigation
/// - When `DetailView` focused: j/k scrolling
///
/// # Examples
///
/// ```
/// use prasang::tui::{App, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new();
/// let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
/// assert!(handle_key_event(&mut app, key));
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if key.code == KeyCode::Tab {
        app.next_focus();
        return false;
    }
    if key.code == KeyCode::BackTab {
        app.prev_focus();
        return false;
    }

    if key.code == KeyCode::Esc {
        app.reset_focus();
        app.clear_selection();
        return false;
    }

    if app.focus() == Focus::SearchInput {
        handle_search_input(app, key);
        return false;
    }

    if key.modifiers.is_empty() {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => {
                app.request_refresh();
                return false;
            }
            _ => {}
        }
    }

    match app.focus() {
        Focus::SearchInput => {}
        Focus::TopicList => handle_topic_list(app, key),
        Focus::RecordList => handle_record_list(app, key),
        Focus::DetailView => handle_detail_view(app, key),
    }

    false
}

/// Handles keyboard input when search input is focused.
///
/// Accepts character input and backspace. Changes mark the search as
/// pending (debounced in event loop).
fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_search_char(c);
        }
        KeyCode::Backspace => {
            app.pop_search_char();
        }
        _ => {}
    }
}

/// Handles keyboard input when the topic chip panel is focused.
fn handle_topic_list(app: &mut App, key: KeyEvent) {
    if !key.modifiers.is_empty() {
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.chip_next(),
        KeyCode::Char('k') | KeyCode::Up => app.chip_previous(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_chip_at_cursor(),
        KeyCode::Char('m') => app.toggle_match_mode(),
        KeyCode::Char('c') => app.clear_topics(),
        _ => {}
    }
}

/// Handles keyboard input when record list is focused.
///
/// Supports Vim-style navigation (j/k) and arrow keys.
fn handle_record_list(app: &mut App, key: KeyEvent) {
    if !key.modifiers.is_empty() {
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        _ => {}
    }
}

/// Handles keyboard input when detail view is focused.
fn handle_detail_view(app: &mut App, key: KeyEvent) {
    if !key.modifiers.is_empty() {
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_detail_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_detail_up(1),
        _ => {}
    }
}
