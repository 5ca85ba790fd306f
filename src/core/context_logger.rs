//! Context-aware log emitter
//!
//! [`ContextLogger`] ties the pieces together: it converts payloads, formats
//! them, merges them with the current subcontext stack, stamps the call
//! site and hands the result to a [`LogBackend`].
//!
//! Nothing here returns an error to the caller. Payloads that can't be
//! converted, unknown level names and backend panics all degrade to a
//! warning entry, a stderr report, or a metrics increment.

use std::path::PathBuf;
use std::sync::Arc;

use super::appender::Appender;
use super::backend::LogBackend;
use super::call_site::{CallSite, CALL_SITE_KEY};
use super::config::{ContextLoggerConfig, SharedConfig};
use super::context_data::{ContextData, ContextMap};
use super::context_stack::{self, ContextStack, SubContextGuard};
use super::dump_store::{BlobStore, DumpStore, FsBlobStore};
use super::error::Result;
use super::error_context::{ErrorContextExtractor, HtmlTraceRenderer, TraceRenderer};
use super::formatter::ContextFormatter;
use super::log_level::LogLevel;
use super::logger::{panic_message, Logger};
use super::metrics::LoggerMetrics;
use super::payload::LogPayload;

/// Message of the warning emitted when a pushed payload can't be converted
pub const INVALID_CONTEXT_MESSAGE: &str = "invalid log context";
/// Message of the warning emitted for an unknown level name
pub const INVALID_LEVEL_MESSAGE: &str = "invalid log level";

/// Outcome of converting a push payload
enum StagedPush {
    /// Empty payload; any existing subcontext is kept
    Ignored,
    Formatted(ContextMap),
    /// Conversion failed; carries the `ctx_obj` diagnostic
    Rejected(ContextMap),
}

pub struct ContextLogger {
    backend: Arc<dyn LogBackend>,
    formatter: ContextFormatter,
    extractor: ErrorContextExtractor,
    config: SharedConfig,
    metrics: Arc<LoggerMetrics>,
}

impl ContextLogger {
    #[must_use]
    pub fn builder() -> ContextLoggerBuilder {
        ContextLoggerBuilder::new()
    }

    // ---------- subcontexts ----------

    /// Push a named subcontext onto the current stack
    ///
    /// Every key is stored as `name_key`. A payload that can't be converted
    /// is not pushed; a warning carrying the payload as `ctx_obj` is logged
    /// against the stack as it was. An empty payload is ignored.
    #[track_caller]
    pub fn push_sub_context<'a>(&self, name: &str, payload: impl Into<LogPayload<'a>>) {
        self.push_sub_context_at(name, payload, CallSite::caller());
    }

    pub fn push_sub_context_at<'a>(
        &self,
        name: &str,
        payload: impl Into<LogPayload<'a>>,
        call_site: CallSite,
    ) {
        let staged = self.stage_push(name, &payload.into());
        let rejected =
            context_stack::with_current(|stack| self.apply_push(stack, name, staged, &call_site));
        if let Some(fields) = rejected {
            self.dispatch(LogLevel::Warning, INVALID_CONTEXT_MESSAGE, &fields);
        }
    }

    /// [`push_sub_context`](Self::push_sub_context) onto an explicitly owned stack
    #[track_caller]
    pub fn push_onto<'a>(
        &self,
        stack: &mut ContextStack,
        name: &str,
        payload: impl Into<LogPayload<'a>>,
    ) {
        let call_site = CallSite::caller();
        let staged = self.stage_push(name, &payload.into());
        if let Some(fields) = self.apply_push(stack, name, staged, &call_site) {
            self.dispatch(LogLevel::Warning, INVALID_CONTEXT_MESSAGE, &fields);
        }
    }

    /// Push a subcontext that is popped again when the guard drops
    #[track_caller]
    pub fn scoped_sub_context<'a>(
        &self,
        name: &str,
        payload: impl Into<LogPayload<'a>>,
    ) -> SubContextGuard {
        self.push_sub_context_at(name, payload, CallSite::caller());
        SubContextGuard::new(name)
    }

    /// Remove a subcontext; unknown names are ignored
    pub fn pop_sub_context(&self, name: &str) {
        context_stack::pop_current(name);
    }

    /// Merged context of the current stack, including `t`
    pub fn current_context(&self) -> ContextMap {
        self.current_context_with(ContextMap::new())
    }

    /// Merged context of the current stack overlaid with `appended`
    pub fn current_context_with(&self, appended: ContextMap) -> ContextMap {
        context_stack::with_current(|stack| stack.current_context(appended))
    }

    /// Converts and formats the payload without touching any stack
    ///
    /// Must run before the stack is borrowed: capability payloads may log
    /// or push themselves.
    fn stage_push(&self, name: &str, payload: &LogPayload<'_>) -> StagedPush {
        match payload.to_context_data(&self.extractor) {
            Ok(data) if data.is_empty() => StagedPush::Ignored,
            Ok(data) => StagedPush::Formatted(self.formatter.format(&data, Some(name))),
            Err(_) => {
                self.metrics.record_conversion_failure();
                let diagnostic = ContextData::new().with_field("ctx_obj", payload.describe());
                StagedPush::Rejected(self.formatter.format(&diagnostic, None))
            }
        }
    }

    /// Stores a staged push; returns the warning fields for a rejected one
    fn apply_push(
        &self,
        stack: &mut ContextStack,
        name: &str,
        staged: StagedPush,
        call_site: &CallSite,
    ) -> Option<ContextMap> {
        match staged {
            StagedPush::Ignored => None,
            StagedPush::Formatted(fields) => {
                stack.push(name, fields);
                None
            }
            StagedPush::Rejected(appended) => Some(self.assemble(stack, appended, call_site)),
        }
    }

    // ---------- emission ----------
    //
    // The method forms record the call site as `file:line`. The `log_*!`
    // macros record `Type::method` and take an optional key prefix.

    #[track_caller]
    pub fn info<'a>(&self, message: &str, payload: impl Into<LogPayload<'a>>) {
        self.log_at(LogLevel::Info, message, payload, None, CallSite::caller());
    }

    #[track_caller]
    pub fn warning<'a>(&self, message: &str, payload: impl Into<LogPayload<'a>>) {
        self.log_at(LogLevel::Warning, message, payload, None, CallSite::caller());
    }

    #[track_caller]
    pub fn error<'a>(&self, message: &str, payload: impl Into<LogPayload<'a>>) {
        self.log_at(LogLevel::Error, message, payload, None, CallSite::caller());
    }

    /// Log with appended payload keys rewritten as `prefix_key`
    #[track_caller]
    pub fn log<'a>(
        &self,
        level: LogLevel,
        message: &str,
        payload: impl Into<LogPayload<'a>>,
        prefix: Option<&str>,
    ) {
        self.log_at(level, message, payload, prefix, CallSite::caller());
    }

    /// Log against the current stack with an explicit call site
    pub fn log_at<'a>(
        &self,
        level: LogLevel,
        message: &str,
        payload: impl Into<LogPayload<'a>>,
        prefix: Option<&str>,
        call_site: CallSite,
    ) {
        let appended = self.appended_map(&payload.into(), prefix);
        self.emit(None, level, message, appended, &call_site);
    }

    /// Log against an explicitly owned stack instead of the current one
    pub fn log_with_stack<'a>(
        &self,
        stack: &ContextStack,
        level: LogLevel,
        message: &str,
        payload: impl Into<LogPayload<'a>>,
        prefix: Option<&str>,
        call_site: CallSite,
    ) {
        let appended = self.appended_map(&payload.into(), prefix);
        self.emit(Some(stack), level, message, appended, &call_site);
    }

    /// Log with a textual level: exactly `info`, `warning` or `error`
    ///
    /// Names are case-sensitive and `warn` is not accepted. Any other level is logged as a warning `"invalid log level"` carrying
    /// `invalid_level` and `orig_msg` next to the appended fields.
    #[track_caller]
    pub fn log_str<'a>(
        &self,
        level: &str,
        message: &str,
        payload: impl Into<LogPayload<'a>>,
        prefix: Option<&str>,
    ) {
        let call_site = CallSite::caller();
        match LogLevel::from_backend_name(level) {
            Some(level) => self.log_at(level, message, payload, prefix, call_site),
            None => {
                self.metrics.record_invalid_level();
                let mut appended = self.appended_map(&payload.into(), prefix);
                let diagnostic = ContextData::new()
                    .with_field("invalid_level", level)
                    .with_field("orig_msg", message);
                appended.extend(self.formatter.format(&diagnostic, None));
                self.emit(
                    None,
                    LogLevel::Warning,
                    INVALID_LEVEL_MESSAGE,
                    appended,
                    &call_site,
                );
            }
        }
    }

    /// Converted and formatted payload; a conversion failure yields an empty map
    fn appended_map(&self, payload: &LogPayload<'_>, prefix: Option<&str>) -> ContextMap {
        match payload.to_context_data(&self.extractor) {
            Ok(data) => self.formatter.format(&data, prefix),
            Err(_) => {
                self.metrics.record_conversion_failure();
                ContextMap::new()
            }
        }
    }

    fn emit(
        &self,
        stack: Option<&ContextStack>,
        level: LogLevel,
        message: &str,
        appended: ContextMap,
        call_site: &CallSite,
    ) {
        let fields = match stack {
            Some(stack) => self.assemble(stack, appended, call_site),
            None => context_stack::with_current(|stack| self.assemble(stack, appended, call_site)),
        };
        self.dispatch(level, message, &fields);
    }

    fn assemble(&self, stack: &ContextStack, appended: ContextMap, call_site: &CallSite) -> ContextMap {
        let mut fields = stack.current_context(appended);
        fields.insert(CALL_SITE_KEY.to_string(), call_site.identifier());
        fields
    }

    fn dispatch(&self, level: LogLevel, message: &str, fields: &ContextMap) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.backend.write(level, message, fields)
        }));

        if let Err(panic_info) = result {
            self.metrics.record_dropped();
            eprintln!(
                "[LOGGER CRITICAL] Log backend panicked: {}. Entry dropped.",
                panic_message(panic_info.as_ref())
            );
        }
    }

    // ---------- configuration ----------

    /// Takes effect on the next formatting call
    pub fn set_dump_threshold(&self, threshold: usize) {
        self.config.set_dump_threshold(threshold);
    }

    pub fn dump_threshold(&self) -> usize {
        self.config.dump_threshold()
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn dump_store(&self) -> &DumpStore {
        self.formatter.dumps()
    }

    pub fn formatter(&self) -> &ContextFormatter {
        &self.formatter
    }

    pub fn extractor(&self) -> &ErrorContextExtractor {
        &self.extractor
    }
}

impl std::fmt::Debug for ContextLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextLogger")
            .field("config", &self.config.get())
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ContextLogger`]
///
/// Without an explicit backend the logger writes to a [`Logger`] with a
/// console appender at the configured minimum level; without an explicit
/// blob store dumps go to an [`FsBlobStore`] at the configured storage root.
///
/// # Example
/// ```
/// use context_logger::prelude::*;
/// use std::sync::Arc;
///
/// let backend = Arc::new(MemoryBackend::new());
/// let logger = ContextLogger::builder()
///     .dump_threshold(64)
///     .backend(Arc::clone(&backend))
///     .blob_store(Arc::new(MemoryBlobStore::new()))
///     .build()
///     .unwrap();
///
/// logger.info("ready", ());
/// assert_eq!(backend.len(), 1);
/// ```
pub struct ContextLoggerBuilder {
    config: ContextLoggerConfig,
    backend: Option<Arc<dyn LogBackend>>,
    appenders: Vec<Box<dyn Appender>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    trace_renderer: Option<Arc<dyn TraceRenderer>>,
    metrics: Option<Arc<LoggerMetrics>>,
}

impl ContextLoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: ContextLoggerConfig::default(),
            backend: None,
            appenders: Vec::new(),
            blob_store: None,
            trace_renderer: None,
            metrics: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: ContextLoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn dump_threshold(mut self, threshold: usize) -> Self {
        self.config.dump_threshold = threshold;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.storage_root = root.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    /// Render error traces as HTML with the built-in renderer
    #[must_use = "builder methods return a new value"]
    pub fn html_traces(mut self, enabled: bool) -> Self {
        self.config.html_traces = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn backend<B: LogBackend + 'static>(mut self, backend: Arc<B>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Appender for the default backend; replaces the console appender
    ///
    /// Ignored when an explicit backend is set.
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn blob_store<S: BlobStore + 'static>(mut self, store: Arc<S>) -> Self {
        self.blob_store = Some(store);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn trace_renderer(mut self, renderer: Arc<dyn TraceRenderer>) -> Self {
        self.trace_renderer = Some(renderer);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn metrics(mut self, metrics: Arc<LoggerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate the configuration and assemble the logger
    pub fn build(self) -> Result<ContextLogger> {
        self.config.validate()?;
        Ok(self.build_unvalidated())
    }

    pub(crate) fn build_unvalidated(self) -> ContextLogger {
        let metrics = self.metrics.unwrap_or_default();

        let backend: Arc<dyn LogBackend> = match self.backend {
            Some(backend) => backend,
            None => {
                let mut logger = Logger::with_metrics(Arc::clone(&metrics));
                logger.set_min_level(self.config.min_level);
                if self.appenders.is_empty() {
                    logger.add_appender(Box::new(crate::appenders::ConsoleAppender::new()));
                }
                for appender in self.appenders {
                    logger.add_appender(appender);
                }
                Arc::new(logger)
            }
        };

        let store: Arc<dyn BlobStore> = match self.blob_store {
            Some(store) => store,
            None => Arc::new(FsBlobStore::new(self.config.storage_root.clone())),
        };

        let renderer = self.trace_renderer.or_else(|| {
            self.config
                .html_traces
                .then(|| Arc::new(HtmlTraceRenderer) as Arc<dyn TraceRenderer>)
        });
        let extractor = match renderer {
            Some(renderer) => ErrorContextExtractor::with_renderer(renderer),
            None => ErrorContextExtractor::new(),
        };

        let config = SharedConfig::new(self.config);
        let dumps = DumpStore::with_metrics(store, Arc::clone(&metrics));

        ContextLogger {
            backend,
            formatter: ContextFormatter::new(config.clone(), dumps),
            extractor,
            config,
            metrics,
        }
    }
}

impl Default for ContextLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
