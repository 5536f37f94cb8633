//! The subject: current payload of one category plus its observers.
//!
//! `Subject::set_data` is the single entry point for new data. The network
//! scheduler and the change watcher both call it, from their own threads. The
//! whole compare / update / notify / persist sequence runs under one mutex:
//!
//! 1. compare the payload with the last notified one, return `Unchanged` if equal;
//! 2. store it as the current payload;
//! 3. call `on_update` on every observer in subscription order;
//! 4. overwrite the data file;
//! 5. record the payload as last notified.
//!
//! The dedup in step 1 is what stops the watcher from re-delivering the file the
//! subject has just written itself.
//!
//! The data file is overwritten in place, never replaced, so an external writer
//! caught mid-write keeps writing into the same file and its next change event
//! delivers the complete content.
//!
//! Observer callbacks run on the producer's thread while the lock is held. A
//! panicking callback is contained and counted as a failure. Callbacks must stay
//! short: decode plus a hand-off to a sink. Sinks that do heavy work
//! should receive batches over a channel (`ChannelSink`) and render elsewhere.
use std::path::{Path, PathBuf};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error, info, warn};

use crate::category::Category;
use crate::observer::ObserverHandle;
use crate::persistence::{read_payload, write_payload};
use crate::result::Result;

/// Outcome of one `set_data` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Payload equals the last notified one; nothing was notified or written.
    Unchanged,
    /// A notification round completed.
    Notified {
        /// Observers called.
        observers: usize,
        /// Observers that rejected the payload.
        failures: usize,
        /// Whether the data file was written.
        persisted: bool,
    },
}

struct SubjectState {
    current: String,
    last_notified: String,
    observers: Vec<ObserverHandle>,
}

/// Owner of the current data for one category.
pub struct Subject {
    category: Category,
    persist_path: PathBuf,
    state: Mutex<SubjectState>,
}

impl Subject {
    /// Create an empty subject persisting to `persist_path`.
    pub fn new(category: Category, persist_path: impl Into<PathBuf>) -> Self {
        Self {
            category,
            persist_path: persist_path.into(),
            state: Mutex::new(SubjectState {
                current: String::new(),
                last_notified: String::new(),
                observers: Vec::new(),
            }),
        }
    }

    /// Convenience constructor returning the subject ready to share between threads.
    pub fn shared(category: Category, persist_path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self::new(category, persist_path))
    }

    /// Seed the current and last notified payload from the data file, if present.
    ///
    /// Nothing is notified or written, so observers subscribed later only hear about
    /// payloads that differ from what is already on disk. Returns `true` when a
    /// non-empty payload was loaded.
    pub fn restore(&self) -> Result<bool> {
        if !self.persist_path.is_file() {
            return Ok(false);
        }
        let payload = read_payload(&self.persist_path)?;
        if payload.is_empty() {
            return Ok(false);
        }
        let mut state = self.state.lock()?;
        state.current = payload.clone();
        state.last_notified = payload;
        info!("{} restored from {}", self.category.title(), self.persist_path.display());
        Ok(true)
    }

    /// Register an observer. Returns `false` if this handle is already registered.
    pub fn subscribe(&self, observer: ObserverHandle) -> Result<bool> {
        let mut state = self.state.lock()?;
        if state.observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            warn!("{} observer already subscribed, ignoring", self.category.title());
            return Ok(false);
        }
        state.observers.push(observer);
        debug!("{} observers: {}", self.category.title(), state.observers.len());
        Ok(true)
    }

    /// Remove an observer by identity. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, observer: &ObserverHandle) -> Result<bool> {
        let mut state = self.state.lock()?;
        let before = state.observers.len();
        state.observers.retain(|o| !Arc::ptr_eq(o, observer));
        Ok(state.observers.len() != before)
    }

    /// Deliver a new payload. See the module docs for the exact sequence.
    ///
    /// Decode and persistence failures are logged and reflected in the returned
    /// `Delivery`; the only error is a poisoned subject lock.
    pub fn set_data(&self, payload: &str) -> Result<Delivery> {
        let mut state = self.state.lock()?;
        Ok(self.deliver(&mut state, payload))
    }

    /// Read `path` and deliver its content through the same path as `set_data`.
    ///
    /// The file is read while the subject lock is held, so a reload can never
    /// deliver content older than what the subject itself last wrote. Blank
    /// content is treated as a file caught mid-rewrite and skipped. A read error
    /// leaves the subject untouched.
    pub fn reload_from(&self, path: &Path) -> Result<Delivery> {
        let mut state = self.state.lock()?;
        let payload = read_payload(path)?;
        if payload.trim().is_empty() {
            // Deliberate: a blank file is a writer caught between truncate and write,
            // never a payload worth fanning out.
            debug!("{} ignoring blank {}", self.category.title(), path.display());
            return Ok(Delivery::Unchanged);
        }
        Ok(self.deliver(&mut state, &payload))
    }

    fn deliver(&self, state: &mut SubjectState, payload: &str) -> Delivery {
        if state.last_notified == payload {
            debug!("{} payload unchanged, skipping", self.category.title());
            return Delivery::Unchanged;
        }

        state.current = payload.to_string();

        let mut failures = 0;
        for observer in &state.observers {
            // A panicking observer or sink must not poison the subject lock.
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut observer = observer.lock().unwrap_or_else(PoisonError::into_inner);
                observer.on_update(payload).is_ok()
            }));
            match outcome {
                Ok(true) => {}
                Ok(false) => failures += 1,
                Err(_) => {
                    error!("{} observer panicked while handling an update", self.category.title());
                    failures += 1;
                }
            }
        }

        let persisted = match write_payload(&self.persist_path, payload) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "{} could not persist to {}: {}",
                    self.category.title(),
                    self.persist_path.display(),
                    e
                );
                false
            }
        };

        state.last_notified = payload.to_string();
        let observers = state.observers.len();
        info!(
            "{} notified {} observers ({} failed), persisted: {}",
            self.category.title(),
            observers,
            failures,
            persisted
        );
        Delivery::Notified {
            observers,
            failures,
            persisted,
        }
    }

    /// Category this subject serves.
    pub fn category(&self) -> Category {
        self.category
    }

    /// File the subject persists to.
    pub fn persist_path(&self) -> &Path {
        &self.persist_path
    }

    /// Payload most recently accepted by `set_data`.
    pub fn current_payload(&self) -> Result<String> {
        Ok(self.state.lock()?.current.clone())
    }

    /// Payload of the most recent completed notification round.
    pub fn last_notified(&self) -> Result<String> {
        Ok(self.state.lock()?.last_notified.clone())
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> Result<usize> {
        Ok(self.state.lock()?.observers.len())
    }

    /// Handles of the registered observers, in subscription order.
    pub fn observers(&self) -> Result<Vec<ObserverHandle>> {
        Ok(self.state.lock()?.observers.clone())
    }
}
