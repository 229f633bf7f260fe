use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One logical log line, immutable once created.
///
/// Ownership moves from the producer into the shipper's buffer on
/// enqueue; the transport only ever borrows records for the duration
/// of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Raw message payload.
    pub message: String,
    /// Event time as Unix epoch milliseconds.
    pub timestamp: u64,
    /// Source metadata, e.g. the stream the line was read from
    /// ("stdout"/"stderr").
    pub source: String,
}

impl EventRecord {
    /// Creates a record stamped with the current wall-clock time.
    #[must_use]
    pub fn new(message: impl Into<String>, source: impl Into<String>) -> Self {
        EventRecord {
            message: message.into(),
            timestamp: epoch_millis(),
            source: source.into(),
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
