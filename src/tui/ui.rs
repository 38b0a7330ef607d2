//! UI rendering functions for the TUI.
//!
//! Lays out the search bar, topic chips, record list and card detail with
//! ratatui widgets, plus a status line and a shortcut bar.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, Focus};
use crate::browser::LoadState;
use crate::models::Record;
use crate::utils::{format_event_date, preview, record_topic_labels};

const PREVIEW_CHARS: usize = 40;

/// Main rendering function for the TUI.
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search input
            Constraint::Min(0),    // Content area
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Shortcut bar
        ])
        .split(size);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22), // Topics
            Constraint::Percentage(38), // Records
            Constraint::Percentage(40), // Detail
        ])
        .split(main_chunks[1]);

    render_search_input(frame, app, main_chunks[0]);
    render_topic_list(frame, app, content_chunks[0]);
    render_record_list(frame, app, content_chunks[1]);
    render_detail_view(frame, app, content_chunks[2]);
    render_status_line(frame, app, main_chunks[2]);
    render_shortcut_bar(frame, app, main_chunks[3]);
}

fn panel_block(title: String, is_focused: bool) -> Block<'static> {
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::SearchInput);

    let mut content = app.search_input().to_string();
    if is_focused {
        content.push('█');
    }

    let block = panel_block("Search".to_string(), is_focused);
    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

/// Renders the chip list with a checkbox per topic and the match mode in the title.
fn render_topic_list(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::TopicList);
    let browser = app.browser();
    let title = format!("Topics (match {})", browser.match_mode());
    let block = panel_block(title, is_focused);

    if browser.chips().is_empty() {
        let message = match browser.topics_state() {
            LoadState::Loading | LoadState::Idle => "Loading topics...",
            LoadState::Failed(_) => "Topics unavailable",
            LoadState::Loaded => "No topics",
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = browser
        .chips()
        .iter()
        .map(|chip| {
            let selected = browser.selection().contains(&chip.value);
            let (mark, style) = if selected {
                ("[x] ", Style::default().fg(Color::Cyan))
            } else {
                ("[ ] ", Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, style),
                Span::styled(chip.label.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
    );

    let mut list_state = ListState::default();
    if is_focused {
        list_state.select(Some(app.chip_cursor()));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// One list line: text preview, then event date and topic count in grey.
fn record_list_line(record: &Record) -> Line<'static> {
    let date = record
        .event_date()
        .map(format_event_date)
        .unwrap_or_else(|| "undated".to_string());
    let topic_count = record_topic_labels(record).len();

    Line::from(vec![
        Span::raw(preview(record.text(), PREVIEW_CHARS)),
        Span::raw(" "),
        Span::styled(
            format!("[{date} | {topic_count} topics]"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

fn render_record_list(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::RecordList);
    let browser = app.browser();
    let block = panel_block("Prasangs".to_string(), is_focused);

    if browser.visible_count() == 0 {
        let message = match browser.records_state() {
            LoadState::Loading | LoadState::Idle if browser.records().is_empty() => {
                "Loading prasangs..."
            }
            _ => "No prasangs found",
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = browser
        .visible_records()
        .into_iter()
        .map(|record| ListItem::new(record_list_line(record)))
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
    );

    let mut list_state = ListState::default();
    list_state.select(app.selected_index());

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Builds the card text for the detail panel.
fn detail_text(record: &Record) -> Text<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let mut text = Text::default();

    for line in record.text().lines() {
        text.lines.push(Line::from(line.to_string()));
    }

    if let Some(notes) = record.notes().filter(|n| !n.trim().is_empty()) {
        text.lines.push(Line::from(""));
        text.lines.push(Line::from(Span::styled("Notes:", bold)));
        for line in notes.lines() {
            text.lines.push(Line::from(line.to_string()));
        }
    }

    let labels = record_topic_labels(record);
    if !labels.is_empty() {
        text.lines.push(Line::from(""));
        let mut spans = vec![Span::styled("Topics:", bold)];
        for label in labels {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(label, Style::default().fg(Color::Cyan)));
        }
        text.lines.push(Line::from(spans));
    }

    text.lines.push(Line::from(""));
    if let Some(date) = record.event_date() {
        text.lines.push(Line::from(vec![
            Span::styled("Date:", bold),
            Span::raw(" "),
            Span::styled(format_event_date(date), dim),
        ]));
    }
    text.lines.push(Line::from(vec![
        Span::styled("Added:", bold),
        Span::raw(" "),
        Span::styled(format_event_date(record.created_at().date()), dim),
    ]));

    text
}

fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::DetailView);

    let (title, content) = match app.selected_record() {
        Some(record) => (format!("Prasang #{}", record.id()), detail_text(record)),
        None => ("Detail".to_string(), Text::from("No prasang selected")),
    };

    let paragraph = Paragraph::new(content)
        .block(panel_block(title, is_focused))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll(), 0));

    frame.render_widget(paragraph, area);
}

fn stream_span(name: &str, state: &LoadState) -> Span<'static> {
    let (text, color) = match state {
        LoadState::Idle => (format!("{name}: idle"), Color::DarkGray),
        LoadState::Loading => (format!("{name}: loading"), Color::Yellow),
        LoadState::Loaded => (format!("{name}: ok"), Color::Green),
        LoadState::Failed(message) => (format!("{name}: {message}"), Color::Red),
    };
    Span::styled(text, Style::default().fg(color))
}

/// Renders per-stream load state and the shown/fetched counts.
fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let browser = app.browser();
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        stream_span("topics", browser.topics_state()),
        Span::styled(" | ", sep_style),
        stream_span("prasangs", browser.records_state()),
        Span::styled(" | ", sep_style),
        Span::raw(format!(
            "{}/{} shown",
            browser.visible_count(),
            browser.records().len()
        )),
    ];

    let active = browser.active_chips();
    if !active.is_empty() {
        let labels: Vec<String> = active.into_iter().map(|chip| chip.label).collect();
        spans.push(Span::styled(" | ", sep_style));
        spans.push(Span::styled(
            format!("{}: {}", browser.match_mode(), labels.join(", ")),
            Style::default().fg(Color::Cyan),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders context-aware keyboard shortcuts for the focused panel.
fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut shortcuts: Vec<(&str, &str)> = vec![
        ("Tab", "next panel"),
        ("Shift+Tab", "prev panel"),
        ("Esc", "search"),
    ];

    match app.focus() {
        Focus::SearchInput => shortcuts.push(("Ctrl+C", "quit")),
        Focus::TopicList => shortcuts.extend([
            ("j/k", "move"),
            ("Space", "toggle"),
            ("m", "match any/all"),
            ("c", "clear"),
            ("r", "refresh"),
            ("q", "quit"),
        ]),
        Focus::RecordList => {
            shortcuts.extend([("j/k", "navigate"), ("r", "refresh"), ("q", "quit")]);
        }
        Focus::DetailView => {
            shortcuts.extend([("j/k", "scroll"), ("r", "refresh"), ("q", "quit")]);
        }
    }

    let mut spans = Vec::new();
    for (i, (key, action)) in shortcuts.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", sep_style));
        }
        spans.push(Span::styled(key, key_style));
        spans.push(Span::raw(format!(": {action}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
