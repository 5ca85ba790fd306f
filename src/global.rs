//! Process-wide logger
//!
//! The free functions here and the `log_*!` macros log through a single
//! shared [`ContextLogger`]. Install one with [`set_global_logger`]; if none
//! is installed, the first use builds a default from the environment
//! (console output, dumps under `storage_root`).
//!
//! The free functions record the call site as `file:line`. For a
//! `Type::method` call site and a key prefix use [`log_info!`](macro@crate::log_info),
//! [`log_warning!`](macro@crate::log_warning) and [`log_error!`](macro@crate::log_error).
//!
//! Only the logger is global. Subcontext stacks stay per thread, or per task
//! inside a `tokio` scope.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::call_site::CallSite;
use crate::core::config::ContextLoggerConfig;
use crate::core::context_data::ContextMap;
use crate::core::context_logger::ContextLogger;
use crate::core::context_stack::SubContextGuard;
use crate::core::log_level::LogLevel;
use crate::core::payload::LogPayload;

static GLOBAL_LOGGER: RwLock<Option<Arc<ContextLogger>>> = parking_lot::const_rwlock(None);

/// Install `logger` for the whole process, returning the previous one
///
/// # Examples
///
/// ```
/// use context_logger::prelude::*;
/// use std::sync::Arc;
///
/// let backend = Arc::new(MemoryBackend::new());
/// let logger = ContextLogger::builder()
///     .backend(Arc::clone(&backend))
///     .blob_store(Arc::new(MemoryBlobStore::new()))
///     .build()
///     .unwrap();
/// set_global_logger(logger);
///
/// log_info("started", ());
/// assert_eq!(backend.last().unwrap().message, "started");
/// ```
pub fn set_global_logger(logger: ContextLogger) -> Option<Arc<ContextLogger>> {
    GLOBAL_LOGGER.write().replace(Arc::new(logger))
}

/// The installed logger, building the default on first use
pub fn global_logger() -> Arc<ContextLogger> {
    if let Some(logger) = GLOBAL_LOGGER.read().as_ref() {
        return Arc::clone(logger);
    }

    let mut slot = GLOBAL_LOGGER.write();
    Arc::clone(slot.get_or_insert_with(|| Arc::new(default_logger())))
}

fn default_logger() -> ContextLogger {
    let config = ContextLoggerConfig::from_env().unwrap_or_else(|e| {
        eprintln!(
            "[LOGGER WARNING] Ignoring logger configuration from environment: {}",
            e
        );
        ContextLoggerConfig::default()
    });

    ContextLogger::builder().config(config).build_unvalidated()
}

#[track_caller]
pub fn push_sub_context<'a>(name: &str, payload: impl Into<LogPayload<'a>>) {
    global_logger().push_sub_context_at(name, payload, CallSite::caller());
}

#[track_caller]
pub fn scoped_sub_context<'a>(name: &str, payload: impl Into<LogPayload<'a>>) -> SubContextGuard {
    global_logger().scoped_sub_context(name, payload)
}

pub fn pop_sub_context(name: &str) {
    global_logger().pop_sub_context(name);
}

pub fn current_context() -> ContextMap {
    global_logger().current_context()
}

/// Log at info level; `m` is `file:line`, see [`log_info!`](macro@crate::log_info)
#[track_caller]
pub fn log_info<'a>(message: &str, payload: impl Into<LogPayload<'a>>) {
    global_logger().log_at(LogLevel::Info, message, payload, None, CallSite::caller());
}

/// Log at warning level; `m` is `file:line`, see [`log_warning!`](macro@crate::log_warning)
#[track_caller]
pub fn log_warning<'a>(message: &str, payload: impl Into<LogPayload<'a>>) {
    global_logger().log_at(LogLevel::Warning, message, payload, None, CallSite::caller());
}

/// Log at error level; `m` is `file:line`, see [`log_error!`](macro@crate::log_error)
#[track_caller]
pub fn log_error<'a>(message: &str, payload: impl Into<LogPayload<'a>>) {
    global_logger().log_at(LogLevel::Error, message, payload, None, CallSite::caller());
}

#[track_caller]
pub fn log_str<'a>(
    level: &str,
    message: &str,
    payload: impl Into<LogPayload<'a>>,
    prefix: Option<&str>,
) {
    global_logger().log_str(level, message, payload, prefix);
}
