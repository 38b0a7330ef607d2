//! Shared helpers for paths, logging and card formatting.
//!
//! These functions are reused across the CLI and TUI interfaces.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use tracing_subscriber::EnvFilter;

use crate::models::Record;
use crate::topics::TopicNormalizer;

const EVENT_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day] [month repr:short] [year]");

/// Gets the cross-platform log file path.
///
/// Returns the path as `{data_dir}/prasang/prasang.log` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_log_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("prasang").join("prasang.log"))
}

/// Ensures the parent directory of a file exists.
///
/// Creates the directory structure if it doesn't exist using `create_dir_all`.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create directory: {}", parent.display())
        })?;
    }
    Ok(())
}

/// Builds the log filter: `RUST_LOG` wins, otherwise the verbosity flag decides.
pub fn log_filter(verbosity: u8) -> EnvFilter {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs a tracing subscriber that writes to stderr.
pub fn init_stderr_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbosity))
        .with_writer(std::io::stderr)
        .init();
}

/// Installs a tracing subscriber that appends to `path`.
///
/// Used by the TUI, where anything written to the terminal would corrupt
/// the alternate screen.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created.
pub fn init_file_logging(path: &Path, verbosity: u8) -> Result<()> {
    ensure_parent_directory(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbosity))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Formats an event date the way cards show it, e.g. "10 Apr 1998".
pub fn format_event_date(date: Date) -> String {
    date.format(EVENT_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Truncates text to `max_chars` characters, appending "..." when cut.
///
/// Counts characters rather than bytes so multi-byte scripts never split.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Returns the display labels of a record's topics, deduplicated.
pub fn record_topic_labels(record: &Record) -> Vec<String> {
    TopicNormalizer::record_chips(record.topics())
        .into_iter()
        .map(|chip| chip.label)
        .collect()
}

/// Renders a record as a plain-text card.
///
/// Layout: header line with id and event date, the text, optional notes
/// indented, and a topics line when the record has any.
pub fn format_card(record: &Record) -> String {
    let mut card = format!("#{}", record.id());
    if let Some(date) = record.event_date() {
        card.push_str(&format!("  {}", format_event_date(date)));
    }
    card.push('\n');
    card.push_str(record.text());
    card.push('\n');

    if let Some(notes) = record.notes().filter(|n| !n.trim().is_empty()) {
        for line in notes.lines() {
            card.push_str("  ");
            card.push_str(line);
            card.push('\n');
        }
    }

    let labels = record_topic_labels(record);
    if !labels.is_empty() {
        card.push_str(&format!("  Topics: {}\n", labels.join(", ")));
    }
    card
}
