//! Logger metrics for observability
//!
//! Counters for the best-effort paths that never surface errors to the
//! caller: appender failures, dump writes, conversion failures and
//! invalid severities.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use context_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dump_written();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dumps_written(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries at least one appender failed to write
    dropped_count: AtomicU64,

    /// Entries written by every appender
    total_logged: AtomicU64,

    /// Oversized values written to the blob store
    dumps_written: AtomicU64,

    /// Blob store writes that failed (token was still logged)
    dump_failures: AtomicU64,

    /// Payloads that could not be converted to context data
    conversion_failures: AtomicU64,

    /// Log calls with an unrecognized severity
    invalid_levels: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
            dumps_written: AtomicU64::new(0),
            dump_failures: AtomicU64::new(0),
            conversion_failures: AtomicU64::new(0),
            invalid_levels: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dumps_written(&self) -> u64 {
        self.dumps_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dump_failures(&self) -> u64 {
        self.dump_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn conversion_failures(&self) -> u64 {
        self.conversion_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn invalid_levels(&self) -> u64 {
        self.invalid_levels.load(Ordering::Relaxed)
    }

    /// Record a dropped log; returns the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dump_written(&self) -> u64 {
        self.dumps_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dump_failure(&self) -> u64 {
        self.dump_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_conversion_failure(&self) -> u64 {
        self.conversion_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_invalid_level(&self) -> u64 {
        self.invalid_levels.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no logs have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_logged.store(0, Ordering::Relaxed);
        self.dumps_written.store(0, Ordering::Relaxed);
        self.dump_failures.store(0, Ordering::Relaxed);
        self.conversion_failures.store(0, Ordering::Relaxed);
        self.invalid_levels.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
            dumps_written: AtomicU64::new(self.dumps_written()),
            dump_failures: AtomicU64::new(self.dump_failures()),
            conversion_failures: AtomicU64::new(self.conversion_failures()),
            invalid_levels: AtomicU64::new(self.invalid_levels()),
        }
    }
}
