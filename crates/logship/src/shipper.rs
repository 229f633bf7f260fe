//! Service loop that owns the event buffer and schedules flushes.
//!
//! Producers hand events to a cloneable [`ShipperHandle`]; a single
//! [`Shipper`] task owns the buffer and is the only caller of
//! [`Flusher::flush`], so no two flush cycles can ever run
//! concurrently over the same buffer. Flushes are triggered by the
//! configured interval or by the buffer reaching one batch size.
//! Cancellation drains whatever is still queued in the channel and
//! runs one last-chance flush before the task exits.

use crate::config::EndpointConfig;
use crate::event::EventRecord;
use crate::flusher::Flusher;
use crate::transport::Transport;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cloneable producer-side handle for enqueueing events.
#[derive(Clone, Debug)]
pub struct ShipperHandle {
    tx: mpsc::UnboundedSender<EventRecord>,
}

impl ShipperHandle {
    /// Hands an event to the shipper task.
    ///
    /// # Errors
    ///
    /// Returns the event back if the shipper task has shut down.
    pub fn send(&self, event: EventRecord) -> Result<(), mpsc::error::SendError<EventRecord>> {
        self.tx.send(event)
    }
}

/// The shipping task: buffers incoming events and drives flush cycles.
pub struct Shipper {
    rx: mpsc::UnboundedReceiver<EventRecord>,
    flusher: Flusher,
    transport: Arc<dyn Transport>,
    config: Arc<EndpointConfig>,
    cancel_token: CancellationToken,
    buffer: Vec<EventRecord>,
}

impl Shipper {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        config: Arc<EndpointConfig>,
        cancel_token: CancellationToken,
    ) -> (Self, ShipperHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let flusher = Flusher::new(Arc::clone(&transport), Arc::clone(&config));
        (
            Shipper {
                rx,
                flusher,
                transport,
                config,
                cancel_token,
                buffer: Vec::new(),
            },
            ShipperHandle { tx },
        )
    }

    /// Runs until cancelled or until every handle has been dropped.
    ///
    /// The startup health probe is advisory: a failing endpoint is
    /// logged and shipping proceeds anyway, since the endpoint may
    /// come up later and events buffer in the meantime.
    pub async fn run(mut self) {
        if let Err(e) = self.transport.check_connection().await {
            warn!("Endpoint health check failed, shipping anyway: {e}");
        }

        // First tick one full interval from now; there is nothing to
        // flush at startup.
        let mut ticker = interval_at(
            Instant::now() + self.config.flush_interval,
            self.config.flush_interval,
        );

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    debug!("Shutting down, flushing remaining events");
                    // Producers may have handed over events that are
                    // still queued in the channel. Pull them all into
                    // the buffer so the last-chance flush covers them.
                    self.rx.close();
                    while let Ok(event) = self.rx.try_recv() {
                        self.buffer.push(event);
                    }
                    self.flush(true).await;
                    break;
                }
                _ = ticker.tick() => {
                    self.flush(false).await;
                }
                event = self.rx.recv() => {
                    match event {
                        Some(event) => {
                            self.buffer.push(event);
                            if self.buffer.len() >= self.config.batch_size {
                                self.flush(false).await;
                            }
                        }
                        None => {
                            debug!("All producers gone, flushing remaining events");
                            self.flush(true).await;
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn flush(&mut self, last_chance: bool) {
        let buffer = std::mem::take(&mut self.buffer);
        self.buffer = self.flusher.flush(buffer, last_chance).await;
    }
}
