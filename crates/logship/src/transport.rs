//! Event encoding, HTTP delivery, and the health probe.
//!
//! One delivery attempt covers exactly one batch:
//!
//! ```text
//!   ┌───────────┐    ┌────────────┐    ┌────────────┐
//!   │ Serialize │ →  │  Compress  │ →  │ HTTP POST  │
//!   │ (JSON)    │    │ (gzip opt) │    │            │
//!   └───────────┘    └────────────┘    └────────────┘
//! ```
//!
//! The transport is stateless per call: it never retains references to
//! event records past the return of [`Transport::deliver`], and the
//! only shared state is the pooled HTTP client.

use crate::config::EndpointConfig;
use crate::event::EventRecord;
use crate::http::get_client;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::StatusCode;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Errors raised while encoding or delivering a batch.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// An event record could not be serialized. Fails the whole batch;
    /// there is no partial-batch delivery.
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// The compression stream could not be written or finalized.
    #[error("Failed to compress batch: {0}")]
    Compress(#[from] std::io::Error),

    /// The request never produced a response (connection refused, DNS,
    /// timeout).
    #[error("Failed to send batch: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-200 status. The response body
    /// is kept for diagnostics.
    #[error("Endpoint rejected batch - {status} - {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Result of one delivery attempt for one batch.
///
/// The flusher treats both failure arms uniformly (stop the cycle,
/// apply the overflow policy); the split exists so callers can log
/// fatal encode failures differently from transient network ones.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The endpoint accepted the batch.
    Delivered,
    /// Delivery failed but a later attempt may succeed.
    TransientFailure(DeliveryError),
    /// The batch itself is bad; retrying will not help.
    FatalFailure(DeliveryError),
}

impl DeliveryOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }

    /// The underlying error, if the attempt failed.
    #[must_use]
    pub fn err(&self) -> Option<&DeliveryError> {
        match self {
            DeliveryOutcome::Delivered => None,
            DeliveryOutcome::TransientFailure(e) | DeliveryOutcome::FatalFailure(e) => Some(e),
        }
    }
}

/// Delivery seam between the flusher and the wire.
///
/// The flusher is written against this trait so tests can substitute
/// an in-memory transport and script outcomes per batch.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempts to deliver one batch. Must not retain references to
    /// the records past return.
    async fn deliver(&self, batch: &[EventRecord]) -> DeliveryOutcome;

    /// Advisory probe of the endpoint's health-check URL. Does not
    /// affect buffer or delivery state.
    async fn check_connection(&self) -> Result<(), DeliveryError>;
}

/// HTTP transport backed by the shared, pooled client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Arc<EndpointConfig>,
}

impl HttpTransport {
    #[must_use]
    pub fn new(config: Arc<EndpointConfig>) -> Self {
        let client = get_client(&config);
        HttpTransport { client, config }
    }

    /// Serializes the batch into one request body: each record encoded
    /// independently and concatenated in order. When compression is
    /// enabled the concatenation goes through a single gzip stream.
    ///
    /// The encoder must be finished before the output is used; an
    /// unfinished gzip stream is silently truncated.
    fn encode_body(&self, batch: &[EventRecord]) -> Result<Vec<u8>, DeliveryError> {
        if !self.config.gzip {
            let mut body = Vec::new();
            for event in batch {
                serde_json::to_writer(&mut body, event)?;
            }
            return Ok(body);
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.config.gzip_level));
        for event in batch {
            let json = serde_json::to_vec(event)?;
            encoder.write_all(&json)?;
        }
        Ok(encoder.finish()?)
    }

    async fn try_post(&self, batch: &[EventRecord]) -> Result<(), DeliveryError> {
        let body = self.encode_body(batch)?;

        let mut req = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .header("Authorization", self.config.token.as_str());
        if self.config.gzip {
            req = req.header("Content-Encoding", "gzip");
        }

        let resp = req.body(body).send().await?;
        let status = resp.status();
        if status == StatusCode::OK {
            // Drain the body so the connection can return to the pool.
            let _ = resp.bytes().await;
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, batch: &[EventRecord]) -> DeliveryOutcome {
        if batch.is_empty() {
            debug!("No events to post");
            return DeliveryOutcome::Delivered;
        }

        debug!("Posting {} events", batch.len());
        match self.try_post(batch).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e @ (DeliveryError::Encode(_) | DeliveryError::Compress(_))) => {
                DeliveryOutcome::FatalFailure(e)
            }
            Err(e) => DeliveryOutcome::TransientFailure(e),
        }
    }

    async fn check_connection(&self) -> Result<(), DeliveryError> {
        let resp = self.client.get(&self.config.health_url).send().await?;
        let status = resp.status();
        if status == StatusCode::OK {
            let _ = resp.bytes().await;
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected { status, body })
    }
}
