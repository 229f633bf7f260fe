//! Buffer management: the flush cycle and the overflow policy.
//!
//! One flush cycle slices the buffered events into consecutive windows
//! of the configured batch size and drives the transport strictly in
//! order: the next window is never attempted before the previous
//! outcome is known, which keeps the buffer's FIFO semantics and makes
//! the overflow boundary well-defined.
//!
//! On the first failed window the cycle stops and one of three things
//! happens to the remaining events:
//! - backlog still under capacity: keep everything, retry next cycle;
//! - backlog at/over capacity: report the oldest portion through the
//!   [`SpillSink`] and keep at most one capacity's worth of the most
//!   recent events;
//! - last-chance flush (shutdown): report everything remaining, keep
//!   nothing.
//!
//! Dropping the oldest portion is deliberate: under sustained overflow
//! the most recent events are the ones most likely to still be
//! operationally relevant. `flush` itself never returns an error;
//! failure shows up in what got kept versus dropped.

use crate::config::EndpointConfig;
use crate::event::EventRecord;
use crate::transport::{DeliveryOutcome, Transport};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Receives events the flusher is about to drop.
///
/// Each spilled event is reported individually so an external
/// collaborator can persist it elsewhere (typically the process log).
pub trait SpillSink: Send + Sync {
    fn spill(&self, event: &EventRecord);
}

/// Default sink: serializes each undeliverable event and emits it at
/// error level so an operator can recover it from the process log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpillSink;

impl SpillSink for LogSpillSink {
    fn spill(&self, event: &EventRecord) {
        match serde_json::to_string(event) {
            Ok(json) => error!("Failed to send event '{json}'"),
            Err(e) => error!("Failed to send event: {e}"),
        }
    }
}

/// Drives flush cycles over a caller-owned buffer of undelivered
/// events.
///
/// The flusher holds no buffer state itself: the buffer is handed in
/// by value and the residual handed back, so a single logical owner
/// (normally the [`crate::shipper::Shipper`] task) stays in control of
/// ordering between cycles.
pub struct Flusher {
    transport: Arc<dyn Transport>,
    config: Arc<EndpointConfig>,
    spill_sink: Arc<dyn SpillSink>,
}

impl Flusher {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: Arc<EndpointConfig>) -> Self {
        Self::with_spill_sink(transport, config, Arc::new(LogSpillSink))
    }

    #[must_use]
    pub fn with_spill_sink(
        transport: Arc<dyn Transport>,
        config: Arc<EndpointConfig>,
        spill_sink: Arc<dyn SpillSink>,
    ) -> Self {
        Flusher {
            transport,
            config,
            spill_sink,
        }
    }

    /// Runs one flush cycle and returns the residual buffer.
    ///
    /// Windows of `batch_size` events are delivered in order until all
    /// succeed (empty residual) or one fails. On failure the overflow
    /// policy decides what survives:
    ///
    /// - `remaining < buffer_capacity` and not `last_chance`: the
    ///   untouched remaining slice is returned for the next cycle.
    /// - otherwise: events older than the final `buffer_capacity`
    ///   remaining ones (all of them when `last_chance`) are reported
    ///   to the spill sink and dropped; the kept tail is returned.
    ///
    /// A batch either fully succeeds or is treated as fully failed;
    /// there is no per-event accounting inside a window.
    pub async fn flush(&self, mut buffer: Vec<EventRecord>, last_chance: bool) -> Vec<EventRecord> {
        let total = buffer.len();
        debug!("Flushing {total} buffered events");

        let mut i = 0;
        while i < total {
            let upper = usize::min(i + self.config.batch_size, total);
            match self.transport.deliver(&buffer[i..upper]).await {
                DeliveryOutcome::Delivered => {
                    i = upper;
                }
                DeliveryOutcome::TransientFailure(e) | DeliveryOutcome::FatalFailure(e) => {
                    error!("{e}");
                    let remaining = total - i;

                    if remaining >= self.config.buffer_capacity || last_chance {
                        // Keep at most one capacity's worth of the most
                        // recent events; report and drop everything older.
                        // On a last-chance flush there is no next cycle,
                        // so nothing is kept.
                        let keep_from = if last_chance {
                            total
                        } else {
                            total - self.config.buffer_capacity
                        };
                        for event in &buffer[i..keep_from] {
                            self.spill_sink.spill(event);
                        }
                        warn!("Dropped {} undeliverable events", keep_from - i);
                        return buffer.split_off(keep_from);
                    }

                    debug!("{remaining} events failed to send, keeping for retry");
                    buffer.drain(..i);
                    return buffer;
                }
            }
        }

        debug!("{total} events were sent successfully");
        buffer.clear();
        buffer
    }
}
