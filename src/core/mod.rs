//! Core logger types and traits

pub mod appender;
pub mod backend;
pub mod call_site;
pub mod config;
pub mod context_data;
pub mod context_logger;
pub mod context_stack;
pub mod dump_store;
pub mod error;
pub mod error_context;
pub mod formatter;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod payload;
pub mod timestamp;

pub use appender::Appender;
pub use backend::{CapturedEntry, LogBackend, MemoryBackend};
pub use call_site::CallSite;
pub use config::{ContextLoggerConfig, SharedConfig};
pub use context_data::{ContextData, ContextMap, FieldValue, LogContextData};
pub use context_logger::{ContextLogger, ContextLoggerBuilder};
pub use context_stack::{ContextStack, SubContext, SubContextGuard};
pub use dump_store::{BlobStore, DumpStore, FsBlobStore, MemoryBlobStore};
pub use error::{LoggerError, Result};
pub use error_context::{ErrorContextExtractor, HtmlTraceRenderer, TraceRenderer};
pub use formatter::ContextFormatter;
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use payload::LogPayload;
pub use timestamp::TimestampFormat;
