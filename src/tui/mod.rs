//! Terminal User Interface module for prasang.
//!
//! Provides a four-panel TUI with search input, topic chips, record list
//! and card detail, using ratatui for rendering and crossterm for terminal
//! management. Store reads run on worker threads through a [`Fetcher`].

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::browser::Fetcher;
use crate::store::RecordStore;

mod app;
pub mod event;
mod ui;

pub use app::{App, Focus};

/// Quiet period after the last keystroke before a search is sent.
const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This should always be called before exiting the TUI, even in error cases.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for the panic hook.
///
/// Ignores errors since we're likely already in a bad state.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal before the original hook runs.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Starts fetches that are due: a debounced search or an explicit refresh.
fn dispatch_fetches(app: &mut App, fetcher: &Fetcher) {
    if app.take_refresh_request() {
        info!("refreshing topics and records");
        fetcher.fetch_topics(app.browser_mut());
        fetcher.fetch_records(app.browser_mut());
    }

    if app.should_search(SEARCH_DEBOUNCE_MS) {
        app.commit_search();
        info!(search = app.browser().search(), "searching records");
        fetcher.fetch_records(app.browser_mut());
    }
}

/// Runs the main event loop for the TUI.
///
/// Polls for keyboard events, applies finished fetches, and re-renders.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App, fetcher: &Fetcher) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, fetcher, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal(
    app: &mut App,
    fetcher: &Fetcher,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        if fetcher.drain_into(app.browser_mut()) > 0 {
            app.clamp_cursors();
        }

        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        if crossterm_event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
            && key.kind == KeyEventKind::Press
            && event::handle_key_event(app, key)
        {
            break;
        }

        dispatch_fetches(app, fetcher);
    }

    Ok(())
}

/// Entry point for the TUI application.
///
/// Starts the initial topic and record fetches and runs the event loop
/// until the user quits.
///
/// # Errors
///
/// Returns an error if terminal initialization or the event loop fails.
/// Store failures are shown in the UI instead.
pub fn run(store: Arc<dyn RecordStore>) -> Result<()> {
    init_panic_hook();

    let fetcher = Fetcher::new(store);
    let mut app = App::new();
    fetcher.fetch_topics(app.browser_mut());
    fetcher.fetch_records(app.browser_mut());

    run_event_loop(&mut app, &fetcher).context("TUI event loop failed")?;

    Ok(())
}
