//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};

/// Destination for entries dispatched by [`Logger`](super::logger::Logger)
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
