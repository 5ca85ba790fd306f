//! Log backend seam
//!
//! The emitter hands every statement to a [`LogBackend`]. [`Logger`] is the
//! concrete backend; [`MemoryBackend`] captures entries for inspection.
//!
//! [`Logger`]: super::logger::Logger

use parking_lot::Mutex;

use super::context_data::ContextMap;
use super::log_level::LogLevel;

/// Receives fully assembled log statements
///
/// Implementations must not panic across this call; the emitter isolates
/// panics anyway, but a panicking backend loses the entry.
pub trait LogBackend: Send + Sync {
    fn write(&self, level: LogLevel, message: &str, fields: &ContextMap);
}

/// One entry recorded by [`MemoryBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEntry {
    pub level: LogLevel,
    pub message: String,
    pub fields: ContextMap,
}

impl CapturedEntry {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Backend that keeps every entry in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<CapturedEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<CapturedEntry> {
        self.entries.lock().clone()
    }

    /// Take all entries, leaving the backend empty
    pub fn drain(&self) -> Vec<CapturedEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn last(&self) -> Option<CapturedEntry> {
        self.entries.lock().last().cloned()
    }

    /// First entry with the given message
    pub fn find(&self, message: &str) -> Option<CapturedEntry> {
        self.entries
            .lock()
            .iter()
            .find(|entry| entry.message == message)
            .cloned()
    }
}

impl LogBackend for MemoryBackend {
    fn write(&self, level: LogLevel, message: &str, fields: &ContextMap) {
        self.entries.lock().push(CapturedEntry {
            level,
            message: message.to_string(),
            fields: fields.clone(),
        });
    }
}
