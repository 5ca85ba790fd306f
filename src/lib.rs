//! # Context Logger
//!
//! Request-scoped logging context for Rust services.
//!
//! Push named *subcontexts* once and their fields are merged into every log
//! statement that follows, until they are popped again.
//!
//! ## Features
//!
//! - **Subcontext stack**: one stack per thread, or per task inside a
//!   `tokio` scope (`tokio` feature)
//! - **Flat output**: every value reaches the backend as a string, keys are
//!   prefixed with the subcontext name
//! - **Dumps**: values longer than the dump threshold are written to a blob
//!   store and replaced by a `dump/<crc32>` token
//! - **Errors as context**: `err_msg`, `trace` and one level of
//!   `inner_err_msg`/`inner_trace`
//! - **Call sites**: every entry carries an `m` field naming the caller
//!
//! ## Example
//!
//! ```
//! use context_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let logger = ContextLogger::builder()
//!     .backend(Arc::clone(&backend))
//!     .blob_store(Arc::new(MemoryBlobStore::new()))
//!     .build()
//!     .unwrap();
//!
//! logger.push_sub_context("req", [("id", "42")]);
//! logger.info("hello", [("status", "ok")]);
//!
//! let entry = backend.last().unwrap();
//! assert_eq!(entry.field("req_id"), Some("42"));
//! assert_eq!(entry.field("status"), Some("ok"));
//! assert!(entry.field("t").is_some());
//! assert!(entry.field("m").is_some());
//! ```

pub mod appenders;
pub mod core;
pub mod global;
pub mod macros;

#[cfg(feature = "tokio")]
pub use crate::core::context_stack::{scope, scope_with};

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender, JsonAppender};
    pub use crate::core::{
        Appender, BlobStore, CallSite, ContextData, ContextLogger, ContextLoggerBuilder,
        ContextLoggerConfig, ContextMap, ContextStack, FieldValue, FsBlobStore, LogBackend,
        LogContextData, LogLevel, LogPayload, Logger, LoggerError, LoggerMetrics, MemoryBackend,
        MemoryBlobStore, OutputFormat, Result, SubContextGuard, TimestampFormat,
    };
    pub use crate::global::{
        global_logger, log_error, log_info, log_warning, pop_sub_context, push_sub_context,
        set_global_logger,
    };
}

pub use crate::appenders::{ConsoleAppender, FileAppender, JsonAppender};
pub use crate::core::{
    Appender, BlobStore, CallSite, CapturedEntry, ContextData, ContextFormatter, ContextLogger,
    ContextLoggerBuilder, ContextLoggerConfig, ContextMap, ContextStack, DumpStore,
    ErrorContextExtractor, FieldValue, FsBlobStore, HtmlTraceRenderer, LogBackend,
    LogContextData, LogEntry, LogLevel, LogPayload, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, MemoryBackend, MemoryBlobStore, OutputFormat, Result, SharedConfig,
    SubContext, SubContextGuard, TimestampFormat, TraceRenderer,
};
pub use crate::global::{
    current_context, global_logger, log_error, log_info, log_warning, pop_sub_context,
    push_sub_context, set_global_logger,
};
