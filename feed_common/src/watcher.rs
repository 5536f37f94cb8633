//! Filesystem change watcher feeding a subject.
//!
//! A `ChangeWatcher` registers the parent directory of one data file with the OS
//! notification backend (`notify`), then blocks on a dedicated thread until events
//! arrive. Events whose path list contains the data file trigger a reload through
//! `Subject::reload_from`, i.e. the same dedup / notify / persist path used by the
//! network feed. Writes made by the subject itself come back as events too; the
//! dedup turns them into no-ops.
//!
//! Lifecycle:
//! - `start` canonicalizes the directory and registers the watch before returning,
//!   so registration failures surface to the caller and events are never missed
//!   after `start` succeeds;
//! - the loop multiplexes backend events and a stop signal with `select!`;
//! - read failures are logged and the loop keeps waiting;
//! - `WatcherHandle::stop` (or dropping the handle) ends the loop and joins the
//!   thread. The backend registration is released when the loop returns.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};
use log::{debug, error, info, warn};
use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::QuoteError;
use crate::result::Result;
use crate::subject::{Delivery, Subject};

/// Entry point for spawning watchers.
pub struct ChangeWatcher;

impl ChangeWatcher {
    /// Watch `path` and feed its content into `subject` on every change.
    ///
    /// The directory containing `path` must exist; the file itself may not exist yet.
    pub fn start(path: impl AsRef<Path>, subject: Arc<Subject>) -> Result<WatcherHandle> {
        let target = resolve_target(path.as_ref())?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| QuoteError::Format(format!("{} has no parent directory", target.display())))?;

        let (event_tx, event_rx) = unbounded::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Err(e) = event_tx.send(res) {
                debug!("Dropping watch event after the loop exited: {:?}", e.into_inner());
            }
        })
        .map_err(|e| registration_error(&dir, e))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| registration_error(&dir, e))?;
        info!("Watching directory {} for {}", dir.display(), target.display());

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let loop_target = target.clone();
        let thread = thread::Builder::new()
            .name(format!("watch-{}", subject.category()))
            .spawn(move || watch_loop(watcher, loop_target, subject, event_rx, stop_rx))?;

        Ok(WatcherHandle {
            path: target,
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

/// Running watcher. Stops the watch loop when stopped or dropped.
pub struct WatcherHandle {
    path: PathBuf,
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl WatcherHandle {
    /// Absolute path of the watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` once the watch loop has exited.
    pub fn is_stopped(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Signal the loop to stop and wait for it to release the watch.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Watcher thread for {} panicked", self.path.display());
            }
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn registration_error(dir: &Path, err: notify::Error) -> QuoteError {
    QuoteError::WatchRegistration {
        path: dir.display().to_string(),
        reason: err.to_string(),
    }
}

/// Absolute form of `path`, built from the canonical parent directory so it
/// compares equal to the paths reported by the backend.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| QuoteError::Format(format!("{} does not name a file", path.display())))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = parent.canonicalize().map_err(|e| QuoteError::WatchRegistration {
        path: parent.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(dir.join(file_name))
}

/// Whether `event` reports a change to `target` worth reloading.
fn touches(event: &Event, target: &Path) -> bool {
    let kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Access(AccessKind::Close(AccessMode::Write))
    );
    kind && event.paths.iter().any(|p| p == target)
}

fn watch_loop(
    watcher: RecommendedWatcher,
    target: PathBuf,
    subject: Arc<Subject>,
    events: Receiver<notify::Result<Event>>,
    stop_rx: Receiver<()>,
) {
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(events) -> msg => match msg {
                Ok(Ok(event)) => {
                    if touches(&event, &target) {
                        debug!("{:?} on {}", event.kind, target.display());
                        reload(&target, &subject);
                    }
                }
                Ok(Err(e)) => warn!("Watch backend error for {}: {}", target.display(), e),
                Err(e) => {
                    error!("Watch event channel for {} closed: {}", target.display(), e);
                    break;
                }
            }
        }
    }
    drop(watcher);
    info!("Stopped watching {}", target.display());
}

fn reload(target: &Path, subject: &Subject) {
    match subject.reload_from(target) {
        Ok(Delivery::Unchanged) => debug!("{} unchanged", target.display()),
        Ok(Delivery::Notified { observers, .. }) => {
            info!("{} changed on disk, notified {} observers", target.display(), observers)
        }
        Err(e) => warn!("Could not reload {}: {}", target.display(), e),
    }
}
