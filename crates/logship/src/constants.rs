//! Default limits for batching and flushing.

/// Default number of events per delivery batch.
pub(crate) const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Default maximum number of undelivered events kept across flush
/// cycles. Once a failing backlog reaches this size, the oldest
/// portion is spilled.
pub(crate) const DEFAULT_BUFFER_CAPACITY: usize = 10_000;

/// Default interval between scheduled flush cycles, in seconds.
pub(crate) const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 5;

/// Default per-request timeout, in seconds.
pub(crate) const DEFAULT_FLUSH_TIMEOUT_SECS: u64 = 30;

/// Default gzip compression level (0-9).
pub(crate) const DEFAULT_GZIP_LEVEL: u32 = 6;
