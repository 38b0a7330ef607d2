//! Background fetching with superseded-result suppression.
//!
//! Every fetch is stamped with a [`Ticket`] from its stream's
//! [`FetchTracker`]. Starting a new fetch supersedes all earlier tickets for
//! that stream; when an earlier fetch finishes late its outcome is dropped
//! instead of overwriting newer data. The request itself is never cancelled.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::Browser;
use crate::models::{Record, TopicRow};
use crate::store::{RecordQuery, RecordStore, StoreError};

/// Identifies one fetch within a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Hands out tickets for one stream and remembers the latest one.
#[derive(Debug, Default)]
pub struct FetchTracker {
    latest: u64,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new fetch, superseding every ticket issued before it.
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// Returns whether `ticket` belongs to the most recently started fetch.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// A finished fetch, ready to be applied to a [`Browser`].
#[derive(Debug)]
pub enum FetchOutcome {
    Topics {
        ticket: Ticket,
        result: Result<Vec<TopicRow>, StoreError>,
    },
    Records {
        ticket: Ticket,
        result: Result<Vec<Record>, StoreError>,
    },
}

/// Runs store reads on worker threads and funnels results back over a channel.
///
/// The browser itself is only touched on the caller's thread, in
/// [`Fetcher::drain_into`] and [`Fetcher::wait_into`].
pub struct Fetcher {
    store: Arc<dyn RecordStore>,
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
}

impl Fetcher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            store,
            sender,
            receiver,
        }
    }

    /// Starts a topic listing and returns its ticket.
    pub fn fetch_topics(&self, browser: &mut Browser) -> Ticket {
        let ticket = browser.begin_topics_fetch();
        let store = Arc::clone(&self.store);
        let sender = self.sender.clone();

        thread::spawn(move || {
            let result = store.list_topics();
            debug!(?ticket, ok = result.is_ok(), "topic fetch finished");
            if sender.send(FetchOutcome::Topics { ticket, result }).is_err() {
                debug!(?ticket, "browser gone, dropping topic fetch");
            }
        });

        ticket
    }

    /// Starts a record listing for the browser's current search text.
    pub fn fetch_records(&self, browser: &mut Browser) -> Ticket {
        let (ticket, query) = browser.begin_records_fetch();
        self.spawn_records(ticket, query);
        ticket
    }

    fn spawn_records(&self, ticket: Ticket, query: RecordQuery) {
        let store = Arc::clone(&self.store);
        let sender = self.sender.clone();

        thread::spawn(move || {
            let result = store.list_records(&query);
            debug!(?ticket, ok = result.is_ok(), "record fetch finished");
            if sender.send(FetchOutcome::Records { ticket, result }).is_err() {
                debug!(?ticket, "browser gone, dropping record fetch");
            }
        });
    }

    /// Applies every outcome that has already arrived, without blocking.
    ///
    /// Returns how many outcomes were committed (superseded ones don't count).
    pub fn drain_into(&self, browser: &mut Browser) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.receiver.try_recv() {
            if browser.apply(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks for the next outcome and applies it.
    ///
    /// Returns `None` if nothing arrived within `timeout`, otherwise whether
    /// the outcome was committed.
    pub fn wait_into(&self, browser: &mut Browser, timeout: Duration) -> Option<bool> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(browser.apply(outcome)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
