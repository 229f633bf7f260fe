//! # Logship
//!
//! A log-forwarding shipper: accumulates application log events and
//! delivers them, batched and optionally gzip-compressed, to a remote
//! log-collection endpoint over HTTP.
//!
//! ## Overview
//!
//! The shipper is built around two components:
//! - **[`transport`]**: serializes a batch of events into one request
//!   body, issues the HTTP POST, and classifies the response.
//! - **[`flusher`]**: owns the flush cycle. It slices the buffered
//!   events into batches, drives the transport in order, and applies
//!   the overflow policy when delivery fails.
//!
//! On top of those, [`shipper`] provides a ready-made service loop that
//! owns the buffer, flushes on an interval or when the buffer fills,
//! and performs a final last-chance flush on shutdown.
//!
//! ## Backpressure
//!
//! The buffer is bounded: when delivery keeps failing and the backlog
//! reaches the configured capacity, the oldest portion is reported
//! through a [`flusher::SpillSink`] and dropped, keeping at most one
//! capacity's worth of the most recent events for the next cycle.
//! Data loss under sustained overflow is explicit and bounded rather
//! than an unbounded memory growth or a crash.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

/// Endpoint configuration - environment variables, validation, defaults
pub mod config;

/// Default limits for batching and flushing
mod constants;

/// Error types shared across the crate
pub mod error;

/// The event record wire type
pub mod event;

/// Buffer management - batching, flush cycle, overflow policy
pub mod flusher;

/// Shared HTTP client construction
pub mod http;

/// Service loop that owns the buffer and schedules flushes
pub mod shipper;

/// Encoding, HTTP delivery, and the health probe
pub mod transport;

pub use config::EndpointConfig;
pub use error::ConfigError;
pub use event::EventRecord;
pub use flusher::{Flusher, LogSpillSink, SpillSink};
pub use shipper::{Shipper, ShipperHandle};
pub use transport::{DeliveryError, DeliveryOutcome, HttpTransport, Transport};
