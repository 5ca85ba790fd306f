//! Runtime configuration
//!
//! `dump_threshold` is read on every formatting call through
//! [`SharedConfig`], so it can be changed without rebuilding the logger.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;

/// Values longer than this many bytes are dumped by default
pub const DEFAULT_DUMP_THRESHOLD: usize = 128;

/// Default root directory of the file blob store
pub const DEFAULT_STORAGE_ROOT: &str = "storage/app";

pub const ENV_DUMP_THRESHOLD: &str = "CONTEXT_LOGGER_DUMP_THRESHOLD";
pub const ENV_STORAGE_ROOT: &str = "CONTEXT_LOGGER_STORAGE_ROOT";
pub const ENV_MIN_LEVEL: &str = "CONTEXT_LOGGER_MIN_LEVEL";
pub const ENV_HTML_TRACES: &str = "CONTEXT_LOGGER_HTML_TRACES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextLoggerConfig {
    /// Maximum length of a serialized context value before it is dumped
    pub dump_threshold: usize,
    /// Root directory for dump files
    pub storage_root: PathBuf,
    /// Minimum level passed on by the default backend
    pub min_level: LogLevel,
    /// Render error traces as HTML
    pub html_traces: bool,
}

impl Default for ContextLoggerConfig {
    fn default() -> Self {
        Self {
            dump_threshold: DEFAULT_DUMP_THRESHOLD,
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            min_level: LogLevel::Info,
            html_traces: false,
        }
    }
}

impl ContextLoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading configuration",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `CONTEXT_LOGGER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    ///
    /// Split out from [`from_env`](Self::from_env) so the parsing can be
    /// exercised without touching the process environment.
    pub fn merge_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_DUMP_THRESHOLD) {
            self.dump_threshold = raw.trim().parse().map_err(|_| {
                LoggerError::config(ENV_DUMP_THRESHOLD, format!("not an integer: '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_STORAGE_ROOT) {
            self.storage_root = PathBuf::from(raw);
        }
        if let Some(raw) = lookup(ENV_MIN_LEVEL) {
            self.min_level = raw
                .parse()
                .map_err(|e: LoggerError| LoggerError::config(ENV_MIN_LEVEL, e.to_string()))?;
        }
        if let Some(raw) = lookup(ENV_HTML_TRACES) {
            self.html_traces = matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dump_threshold == 0 {
            return Err(LoggerError::config(
                "ContextLoggerConfig",
                "dump_threshold must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Configuration shared between the logger and its formatter
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<ContextLoggerConfig>>,
}

impl SharedConfig {
    pub fn new(config: ContextLoggerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn dump_threshold(&self) -> usize {
        self.inner.read().dump_threshold
    }

    pub fn set_dump_threshold(&self, threshold: usize) {
        self.inner.write().dump_threshold = threshold;
    }

    /// Snapshot of the current configuration
    pub fn get(&self) -> ContextLoggerConfig {
        self.inner.read().clone()
    }

    pub fn replace(&self, config: ContextLoggerConfig) {
        *self.inner.write() = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ContextLoggerConfig::default();
        assert_eq!(config.dump_threshold, 128);
        assert_eq!(config.storage_root, PathBuf::from("storage/app"));
        assert_eq!(config.min_level, LogLevel::Info);
        assert!(!config.html_traces);
    }

    #[test]
    fn test_from_json_file_partial() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("context-logger.json");
        std::fs::write(&path, r#"{"dump_threshold": 64, "min_level": "warning"}"#)?;

        let config = ContextLoggerConfig::from_json_file(&path)?;
        assert_eq!(config.dump_threshold, 64);
        assert_eq!(config.min_level, LogLevel::Warning);
        assert_eq!(config.storage_root, PathBuf::from(DEFAULT_STORAGE_ROOT));
        Ok(())
    }

    #[test]
    fn test_from_json_file_rejects_zero_threshold() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"dump_threshold": 0}"#)?;

        let err = ContextLoggerConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        Ok(())
    }

    #[test]
    fn test_missing_file_reports_operation() {
        let err = ContextLoggerConfig::from_json_file("/nonexistent/context-logger.json")
            .unwrap_err();
        assert!(err.to_string().contains("reading configuration"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_DUMP_THRESHOLD, "256"),
            (ENV_STORAGE_ROOT, "/tmp/dumps"),
            (ENV_MIN_LEVEL, "error"),
            (ENV_HTML_TRACES, "true"),
        ]
        .into_iter()
        .collect();

        let config = ContextLoggerConfig::default()
            .merge_env_with(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.dump_threshold, 256);
        assert_eq!(config.storage_root, PathBuf::from("/tmp/dumps"));
        assert_eq!(config.min_level, LogLevel::Error);
        assert!(config.html_traces);
    }

    #[test]
    fn test_env_invalid_threshold() {
        let err = ContextLoggerConfig::default()
            .merge_env_with(|k| (k == ENV_DUMP_THRESHOLD).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_DUMP_THRESHOLD));
    }

    #[test]
    fn test_env_invalid_min_level() {
        let err = ContextLoggerConfig::default()
            .merge_env_with(|k| (k == ENV_MIN_LEVEL).then(|| "verbose".to_string()))
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_shared_config_runtime_update() {
        let shared = SharedConfig::default();
        let clone = shared.clone();
        clone.set_dump_threshold(16);
        assert_eq!(shared.dump_threshold(), 16);
    }
}
