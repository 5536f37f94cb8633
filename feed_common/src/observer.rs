//! Category observers.
//!
//! A `QuoteObserver` belongs to one subscriber and one `Category`. On every
//! notification it decodes the raw payload itself (the subject never parses it),
//! replaces the values it holds and forwards them to its presentation sink.
//!
//! Decoding is chosen by an exhaustive match on the category:
//! - commodities and forex peers carry `name`, `last_price`, `change_percentage`;
//! - equity peers may carry the symbol as `ticker` instead of (or besides) `name`.
//!
//! A payload that does not decode leaves the held values untouched; the error is
//! logged and returned to the subject, which keeps notifying the other observers.
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use serde::de::Error as _;

use crate::category::Category;
use crate::error::QuoteError;
use crate::result::Result;
use crate::sink::{LogSink, QuoteBatch, QuoteSink};
use crate::value::Value;

/// Shared handle to an observer. Subscription identity is the `Arc` pointer.
pub type ObserverHandle = Arc<Mutex<QuoteObserver>>;

#[derive(Debug, Deserialize)]
struct PeerRecord {
    name: String,
    last_price: f64,
    change_percentage: f64,
}

#[derive(Debug, Deserialize)]
struct EquityPeerRecord {
    name: Option<String>,
    ticker: Option<String>,
    last_price: f64,
    change_percentage: f64,
}

/// Decode a raw payload into the values of `category`, in payload order.
pub fn decode(category: Category, payload: &str) -> Result<Vec<Value>> {
    let decoded: std::result::Result<Vec<Value>, serde_json::Error> = match category {
        Category::Commodity | Category::Forex => serde_json::from_str::<Vec<PeerRecord>>(payload).map(|records| {
            records
                .into_iter()
                .map(|r| Value::new(category, r.name, r.last_price, r.change_percentage))
                .collect()
        }),
        Category::Equity => serde_json::from_str::<Vec<EquityPeerRecord>>(payload).and_then(|records| {
            records
                .into_iter()
                .map(|r| {
                    let name = r
                        .name
                        .or(r.ticker)
                        .ok_or_else(|| serde_json::Error::custom("equity record without name or ticker"))?;
                    Ok(Value::new(category, name, r.last_price, r.change_percentage))
                })
                .collect()
        }),
    };
    decoded.map_err(|source| QuoteError::Decode { category, source })
}

/// Subscriber-owned view of one category.
pub struct QuoteObserver {
    subscriber: String,
    category: Category,
    values: Vec<Value>,
    updated_at: Option<DateTime<Utc>>,
    sink: Box<dyn QuoteSink>,
}

impl QuoteObserver {
    /// Create an observer that forwards its batches to `sink`.
    pub fn new(subscriber: impl Into<String>, category: Category, sink: Box<dyn QuoteSink>) -> Self {
        Self {
            subscriber: subscriber.into(),
            category,
            values: Vec::new(),
            updated_at: None,
            sink,
        }
    }

    /// Create an observer presenting through the log.
    pub fn with_log_sink(subscriber: impl Into<String>, category: Category) -> Self {
        Self::new(subscriber, category, Box::new(LogSink))
    }

    /// Wrap the observer into a shareable handle for `Subject::subscribe`.
    pub fn into_handle(self) -> ObserverHandle {
        Arc::new(Mutex::new(self))
    }

    /// Handle a notification: decode, replace the held values, forward to the sink.
    ///
    /// Returns the number of decoded values. On a decode error the previous values
    /// are kept. A failing sink is logged but does not undo the update.
    pub fn on_update(&mut self, payload: &str) -> Result<usize> {
        let values = match decode(self.category, payload) {
            Ok(values) => values,
            Err(e) => {
                warn!("Observer {} kept its {} data: {}", self.subscriber, self.category.title(), e);
                return Err(e);
            }
        };

        let received_at = Utc::now();
        self.values = values;
        self.updated_at = Some(received_at);
        info!(
            "Observer {} updated its {} data ({} values)",
            self.subscriber,
            self.category.title(),
            self.values.len()
        );

        let batch = QuoteBatch {
            subscriber: self.subscriber.clone(),
            category: self.category,
            values: self.values.clone(),
            received_at,
        };
        if let Err(e) = self.sink.render(&batch) {
            warn!("Observer {} could not present its update: {}", self.subscriber, e);
        }
        Ok(self.values.len())
    }

    /// Render the held values as text, one line per value.
    pub fn display(&self) -> String {
        let mut out = format!("{} ({}):", self.category.title(), self.subscriber);
        for value in &self.values {
            out.push('\n');
            out.push_str(&value.to_string());
        }
        out
    }

    /// Values from the most recent successful decode.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Subscriber name.
    pub fn subscriber(&self) -> &str {
        &self.subscriber
    }

    /// Category this observer decodes.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Time of the most recent successful decode.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
