//! Context data formatting
//!
//! Turns [`ContextData`] into the flat, string-valued [`ContextMap`] that
//! reaches the backend: values are rendered to strings, values longer than
//! the dump threshold are swapped for dump tokens, and keys get the
//! optional `prefix_` applied.

use super::config::SharedConfig;
use super::context_data::{ContextData, ContextMap, FieldValue};
use super::dump_store::DumpStore;

#[derive(Debug, Clone)]
pub struct ContextFormatter {
    config: SharedConfig,
    dumps: DumpStore,
}

impl ContextFormatter {
    pub fn new(config: SharedConfig, dumps: DumpStore) -> Self {
        Self { config, dumps }
    }

    pub fn dumps(&self) -> &DumpStore {
        &self.dumps
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Format every field of `data`
    ///
    /// The threshold is read once per call, so a concurrent reconfiguration
    /// applies to the next call rather than half of this one.
    pub fn format(&self, data: &ContextData, prefix: Option<&str>) -> ContextMap {
        let threshold = self.config.dump_threshold();
        data.iter()
            .map(|(key, value)| {
                (
                    prefixed_key(prefix, key),
                    self.format_value_with(value, threshold),
                )
            })
            .collect()
    }

    /// Render a single value, dumping it when it exceeds the threshold
    pub fn format_value(&self, value: &FieldValue) -> String {
        self.format_value_with(value, self.config.dump_threshold())
    }

    fn format_value_with(&self, value: &FieldValue, threshold: usize) -> String {
        let rendered = value.render();
        if rendered.len() > threshold {
            self.dumps.dump(&rendered)
        } else {
            rendered
        }
    }
}

/// `prefix_key`, or `key` when the prefix is absent or empty
pub fn prefixed_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}_{}", p, key),
        _ => key.to_string(),
    }
}
