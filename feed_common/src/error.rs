//! Error type shared by the notification core and the feed server.
//!
//! `QuoteError` covers every failure class the system distinguishes: transport
//! failures in the gateway, payload decoding inside observers, persistence and
//! read failures around the data files, filesystem watch registration, and the
//! plumbing errors (channels, poisoned locks) of the threaded runtime.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

use crate::category::Category;

/// Unified error type shared by the library and the server binary.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error while reading or writing a data file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Payload could not be decoded into values for the given category.
    #[error("Decode error for {category}: {source}")]
    Decode {
        /// Category of the observer that rejected the payload.
        category: Category,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Remote fetch failed or returned a non-success status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The filesystem watch on a data directory could not be set up.
    #[error("Watch registration failed for {path}: {reason}")]
    WatchRegistration {
        /// Directory that was being registered.
        path: String,
        /// Backend error message.
        reason: String,
    },

    /// Channel send failed (receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// A `NAME=CATEGORY` subscription request could not be parsed.
    #[error("Invalid subscription '{0}', expected NAME=CATEGORY")]
    InvalidSubscription(String),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),
}

impl<T> From<PoisonError<T>> for QuoteError {
    fn from(err: PoisonError<T>) -> Self {
        QuoteError::MutexLock(err.to_string())
    }
}
