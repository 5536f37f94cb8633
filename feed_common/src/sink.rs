//! Presentation sinks.
//!
//! Observers hand every freshly decoded batch of values to a `QuoteSink`. What the
//! sink does with it (log lines, a terminal table, a GUI window fed from a channel)
//! is outside the notification core.
use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;
use log::info;

use crate::category::Category;
use crate::error::QuoteError;
use crate::result::Result;
use crate::value::Value;

/// Decoded values delivered to a sink after one update.
#[derive(Debug, Clone)]
pub struct QuoteBatch {
    /// Name of the subscriber whose observer produced the batch.
    pub subscriber: String,
    /// Category of the values.
    pub category: Category,
    /// Values in payload order.
    pub values: Vec<Value>,
    /// When the observer decoded the payload.
    pub received_at: DateTime<Utc>,
}

/// Consumer of decoded batches.
pub trait QuoteSink: Send {
    /// Present a batch. Errors are reported by the caller and never roll back the
    /// observer's values.
    fn render(&mut self, batch: &QuoteBatch) -> Result<()>;
}

/// Writes every value of a batch to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl QuoteSink for LogSink {
    fn render(&mut self, batch: &QuoteBatch) -> Result<()> {
        info!(
            "[{}] {} update at {}",
            batch.subscriber,
            batch.category.title(),
            batch.received_at.format("%Y-%m-%d %H:%M:%S")
        );
        for value in &batch.values {
            info!("[{}]   {}", batch.subscriber, value);
        }
        Ok(())
    }
}

/// Forwards batches over a crossbeam channel to a front-end running elsewhere.
pub struct ChannelSink {
    tx: Sender<QuoteBatch>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel.
    pub fn new(tx: Sender<QuoteBatch>) -> Self {
        Self { tx }
    }
}

impl QuoteSink for ChannelSink {
    fn render(&mut self, batch: &QuoteBatch) -> Result<()> {
        self.tx
            .send(batch.clone())
            .map_err(|e| QuoteError::ChannelSend(format!("{} batch for {}: {}", batch.category, batch.subscriber, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn batch() -> QuoteBatch {
        QuoteBatch {
            subscriber: "ana".to_string(),
            category: Category::Forex,
            values: vec![Value::new(Category::Forex, "EURUSD", 1.08, 0.3)],
            received_at: Utc::now(),
        }
    }

    #[test]
    fn channel_sink_forwards_batch() {
        let (tx, rx) = unbounded();
        let mut sink = ChannelSink::new(tx);
        sink.render(&batch()).unwrap();
        let got = rx.try_recv().unwrap();
        assert_eq!(got.subscriber, "ana");
        assert_eq!(got.values.len(), 1);
    }

    #[test]
    fn channel_sink_reports_dropped_receiver() {
        let (tx, rx) = unbounded();
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        assert!(matches!(sink.render(&batch()), Err(QuoteError::ChannelSend(_))));
    }
}
