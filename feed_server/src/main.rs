//! Quote feed server.
//!
//! This binary keeps one `Subject` per asset category and wires two independent
//! producers into each of them:
//!
//! - a `Scheduler` feed that periodically fetches the category's peers list from the
//!   fundamentals API through the `ProfitGateway`;
//! - a `ChangeWatcher` that reloads the category's data file whenever it changes on
//!   disk (for example when edited by hand or dropped in by another tool).
//!
//! Subscribers are given on the command line (`--subscribe NAME=CATEGORY`) or in a
//! subscribers file; each one becomes a `QuoteObserver` presenting through the log.
//!
//! Concurrency and shutdown:
//! - every feed and every watcher runs on its own thread and only meets the others
//!   inside `Subject::set_data`, which serializes them;
//! - a watcher that cannot register is reported and skipped, the rest keep running;
//! - Ctrl+C stops all feeds and watchers, then prints what each observer holds.
#![warn(missing_docs)]
mod args;
mod gateway;
mod scheduler;

use crate::args::Args;
use crate::gateway::{ProfitGateway, QuoteSource};
use crate::scheduler::{Feed, FeedHandle, Scheduler};
use clap::Parser;
use crossbeam_channel::bounded;
use feed_common::sink::LogSink;
use feed_common::subscription::{SubscriptionParser, SubscriptionRequest};
use feed_common::{Category, ChangeWatcher, QuoteError, Result, Subject, WatcherHandle};
use log::{error, info, warn};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();
    if !args.no_fetch && args.token.trim().is_empty() {
        return Err(QuoteError::Format(
            "no API token: pass --token, set PROFIT_API_TOKEN or use --no-fetch".to_string(),
        ));
    }

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down...");
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| QuoteError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    fs::create_dir_all(&args.data_dir)?;
    let subjects = build_subjects(&args.data_dir, &args.active_categories());

    if args.restore {
        for subject in &subjects {
            if let Err(e) = subject.restore() {
                warn!("Could not restore {}: {}", subject.persist_path().display(), e);
            }
        }
    }

    let mut requests = args.subscriptions.clone();
    if let Some(path) = &args.subscribers_file {
        let file = File::open(path)?;
        requests.extend(SubscriptionRequest::parse_from_file(BufReader::new(file))?);
    }
    let subscribed = subscribe_all(&subjects, requests)?;
    info!("{} subscriptions registered", subscribed);

    let mut watchers: Vec<WatcherHandle> = Vec::new();
    for subject in &subjects {
        match ChangeWatcher::start(subject.persist_path(), Arc::clone(subject)) {
            Ok(handle) => watchers.push(handle),
            Err(e) => error!("{} watcher disabled: {}", subject.category(), e),
        }
    }

    let mut feeds: Vec<FeedHandle> = Vec::new();
    if args.no_fetch {
        info!("Fetching disabled, watching data files only");
    } else {
        let source: Arc<dyn QuoteSource> = Arc::new(ProfitGateway::new(&args.api_base, &args.token)?);
        let interval = Duration::from_secs(args.interval_secs);
        for subject in &subjects {
            let category = subject.category();
            let feed = Feed::new(category, args.symbol_for(category), interval);
            feeds.push(Scheduler::start(Arc::clone(&source), Arc::clone(subject), feed)?);
        }
    }

    info!("Running. Press Ctrl+C to exit.");
    let _ = shutdown_rx.recv();

    for feed in feeds {
        info!("Stopping {} feed", feed.category());
        feed.stop();
    }
    for watcher in watchers {
        watcher.stop();
    }
    for subject in &subjects {
        for observer in subject.observers()? {
            info!("{}", observer.lock()?.display());
        }
    }
    Ok(())
}

/// One subject per category, persisting into `data_dir`.
fn build_subjects(data_dir: &Path, categories: &[Category]) -> Vec<Arc<Subject>> {
    categories
        .iter()
        .map(|category| Subject::shared(*category, data_dir.join(category.data_file())))
        .collect()
}

/// Subscribe a log-presenting observer for every request whose category is served.
///
/// Returns the number of observers registered.
fn subscribe_all(subjects: &[Arc<Subject>], requests: Vec<SubscriptionRequest>) -> Result<usize> {
    let mut registered = 0;
    for request in requests {
        let Some(subject) = subjects.iter().find(|s| s.category() == request.category) else {
            warn!(
                "{} asked for {}, which is not being served",
                request.subscriber, request.category
            );
            continue;
        };
        info!("{} subscribed to {}", request.subscriber, request.category.title());
        let observer = request.into_observer(Box::new(LogSink)).into_handle();
        if subject.subscribe(observer)? {
            registered += 1;
        }
    }
    Ok(registered)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
