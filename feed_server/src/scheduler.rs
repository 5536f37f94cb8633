//! Periodic fetch feeds.
//!
//! Each `Feed` runs on its own thread: wait the initial delay, fetch, deliver the
//! payload to the category's subject, wait the interval, repeat. Waiting is done
//! on the stop channel with `recv_timeout`, so a stop request ends the feed at once
//! instead of after the current interval. A failed fetch is logged and the cycle
//! skipped; nothing reaches the subject.
use crate::gateway::QuoteSource;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use feed_common::{Category, Delivery, Result, Subject};
use log::{debug, error, info};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What to fetch for one category and how often.
#[derive(Debug, Clone)]
pub struct Feed {
    /// Category delivered to.
    pub category: Category,
    /// Peer symbol requested from the source.
    pub symbol: String,
    /// Delay before the first fetch.
    pub initial_delay: Duration,
    /// Delay between fetches.
    pub interval: Duration,
}

impl Feed {
    /// Feed for `category` with its staggered default start.
    pub fn new(category: Category, symbol: impl Into<String>, interval: Duration) -> Self {
        Self {
            category,
            symbol: symbol.into(),
            initial_delay: category.initial_delay(),
            interval,
        }
    }
}

/// Running feed. Stops when stopped or dropped.
pub struct FeedHandle {
    category: Category,
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Category of the feed.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Signal the feed to stop and wait for its thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("{} feed thread panicked", self.category);
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Entry point for spawning feeds.
pub struct Scheduler;

impl Scheduler {
    /// Start `feed` on its own thread, delivering into `subject`.
    pub fn start(source: Arc<dyn QuoteSource>, subject: Arc<Subject>, feed: Feed) -> Result<FeedHandle> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let category = feed.category;
        let thread = thread::Builder::new()
            .name(format!("feed-{}", category))
            .spawn(move || feed_loop(source, subject, feed, stop_rx))?;
        info!("{} feed started", category);
        Ok(FeedHandle {
            category,
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

fn feed_loop(source: Arc<dyn QuoteSource>, subject: Arc<Subject>, feed: Feed, stop_rx: Receiver<()>) {
    let mut wait = feed.initial_delay;
    loop {
        match stop_rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        poll_once(source.as_ref(), &subject, &feed);
        wait = feed.interval;
    }
    info!("{} feed stopped", feed.category);
}

/// Fetch once and deliver the result. Returns `None` when nothing was delivered.
pub fn poll_once(source: &dyn QuoteSource, subject: &Subject, feed: &Feed) -> Option<Delivery> {
    info!("Updating {} data from the API ({})", feed.category.title(), feed.symbol);
    let payload = match source.fetch(feed.category, &feed.symbol) {
        Ok(payload) => payload,
        Err(e) => {
            error!("{} fetch failed, skipping this cycle: {}", feed.category, e);
            return None;
        }
    };
    match subject.set_data(&payload) {
        Ok(delivery) => {
            debug!("{} delivery: {:?}", feed.category, delivery);
            Some(delivery)
        }
        Err(e) => {
            error!("{} subject unavailable: {}", feed.category, e);
            None
        }
    }
}
