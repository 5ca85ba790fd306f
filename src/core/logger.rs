//! Concrete log backend fanning out to appenders

use super::{
    appender::Appender, backend::LogBackend, context_data::ContextMap, error::Result,
    log_entry::LogEntry, log_level::LogLevel, metrics::LoggerMetrics,
};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct Logger {
    min_level: RwLock<LogLevel>,
    appenders: RwLock<Vec<Box<dyn Appender>>>,
    /// Metrics for observability (dropped count, total logged, etc.)
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(LoggerMetrics::new()))
    }

    /// Logger that records into shared metrics
    #[must_use]
    pub fn with_metrics(metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            min_level: RwLock::new(LogLevel::Info),
            appenders: RwLock::new(Vec::new()),
            metrics,
        }
    }

    /// Write an entry to every appender with per-appender panic isolation
    ///
    /// One failing appender doesn't prevent the others from receiving the
    /// entry. Returns `true` if any appender failed.
    fn process_sync(
        appenders: &mut [Box<dyn Appender>],
        entry: &LogEntry,
        metrics: &LoggerMetrics,
    ) -> bool {
        let mut has_error = false;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(entry)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }

        has_error
    }

    pub fn add_appender(&mut self, appender: Box<dyn Appender>) {
        self.appenders.write().push(appender);
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub fn appender_count(&self) -> usize {
        self.appenders.read().len()
    }

    /// Deliver a prepared entry, subject to the minimum level
    pub fn log_entry(&self, entry: LogEntry) {
        if entry.level < self.min_level() {
            return;
        }

        let mut appenders = self.appenders.write();
        Self::process_sync(&mut appenders, &entry, &self.metrics);
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.log_entry(LogEntry::new(level, message));
    }

    /// Get the number of dropped logs
    ///
    /// Counts entries that at least one appender failed to write.
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use context_logger::Logger;
    ///
    /// let logger = Logger::new();
    /// logger.log(context_logger::LogLevel::Info, "ready");
    ///
    /// let metrics = logger.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Total logged: {}", metrics.total_logged());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

impl LogBackend for Logger {
    fn write(&self, level: LogLevel, message: &str, fields: &ContextMap) {
        self.log_entry(LogEntry::new(level, message).with_fields(fields.clone()));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use context_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Warning)
///     .appender(ConsoleAppender::new())
///     .build();
/// assert_eq!(logger.min_level(), LogLevel::Warning);
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    appenders: Vec<Box<dyn Appender>>,
    metrics: Option<Arc<LoggerMetrics>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            appenders: Vec::new(),
            metrics: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Record into existing metrics instead of a fresh set
    #[must_use = "builder methods return a new value"]
    pub fn metrics(mut self, metrics: Arc<LoggerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Logger {
        let mut logger = match self.metrics {
            Some(metrics) => Logger::with_metrics(metrics),
            None => Logger::new(),
        };

        logger.set_min_level(self.min_level);
        for appender in self.appenders {
            logger.add_appender(appender);
        }

        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
