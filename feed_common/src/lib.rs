//!
//! Notification core for categorized financial quotes.
//!
//! This crate aggregates:
//! - `category`: the closed set of asset categories and their constants.
//! - `value`: immutable quote values decoded by observers.
//! - `observer`: per-category observers that decode raw payloads.
//! - `sink`: presentation sinks observers forward decoded batches to.
//! - `subject`: the shared, lock-guarded owner of one category's payload.
//! - `watcher`: filesystem change watcher feeding a subject.
//! - `persistence`: whole-file in-place writes and reads of payloads.
//! - `subscription`: `NAME=CATEGORY` subscription requests.
//! - `error` / `result`: unified error type `QuoteError` and `Result` alias.
#![warn(missing_docs)]
pub mod category;
pub mod error;
pub mod observer;
pub mod persistence;
pub mod result;
pub mod sink;
pub mod subject;
pub mod subscription;
pub mod value;
pub mod watcher;

pub use category::Category;
pub use error::QuoteError;
pub use observer::{ObserverHandle, QuoteObserver};
pub use result::Result;
pub use subject::{Delivery, Subject};
pub use value::Value;
pub use watcher::{ChangeWatcher, WatcherHandle};
