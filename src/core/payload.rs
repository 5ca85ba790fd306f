//! Payloads accepted by push and log calls
//!
//! A payload is one of a flat map, a value with the [`LogContextData`]
//! capability, an error, or something unrecognized. Conversion to
//! [`ContextData`] is a pure function; only `Unrecognized` fails.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;

use super::context_data::{ContextData, FieldValue, LogContextData};
use super::error::{LoggerError, Result};
use super::error_context::ErrorContextExtractor;

pub enum LogPayload<'a> {
    /// No appended data
    Empty,
    Map(ContextData),
    Capability(&'a dyn LogContextData),
    Error(&'a (dyn Error + 'static)),
    /// A value of no recognized shape, kept for the diagnostic dump
    Unrecognized(serde_json::Value),
}

impl<'a> LogPayload<'a> {
    pub fn capability<T: LogContextData>(value: &'a T) -> Self {
        LogPayload::Capability(value)
    }

    pub fn error<E: Error + 'static>(err: &'a E) -> Self {
        LogPayload::Error(err)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LogPayload::Empty)
    }

    /// Convert the payload into key-value context data
    pub fn to_context_data(&self, extractor: &ErrorContextExtractor) -> Result<ContextData> {
        match self {
            LogPayload::Empty => Ok(ContextData::new()),
            LogPayload::Map(data) => Ok(data.clone()),
            LogPayload::Capability(value) => Ok(value.log_context_data()),
            LogPayload::Error(err) => Ok(extractor.extract(*err)),
            LogPayload::Unrecognized(value) => Err(LoggerError::conversion(value.to_string())),
        }
    }

    /// JSON rendering used as the `ctx_obj` diagnostic
    pub fn describe(&self) -> String {
        match self {
            LogPayload::Empty => "null".to_string(),
            LogPayload::Map(data) => serde_json::to_string(data.fields()).unwrap_or_default(),
            LogPayload::Capability(value) => {
                serde_json::to_string(value.log_context_data().fields()).unwrap_or_default()
            }
            LogPayload::Error(err) => serde_json::Value::String(err.to_string()).to_string(),
            LogPayload::Unrecognized(value) => value.to_string(),
        }
    }
}

impl fmt::Debug for LogPayload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogPayload::Empty => f.write_str("Empty"),
            LogPayload::Map(data) => f.debug_tuple("Map").field(data).finish(),
            LogPayload::Capability(_) => f.write_str("Capability(..)"),
            LogPayload::Error(err) => f.debug_tuple("Error").field(&err.to_string()).finish(),
            LogPayload::Unrecognized(value) => f.debug_tuple("Unrecognized").field(value).finish(),
        }
    }
}

impl Default for LogPayload<'_> {
    fn default() -> Self {
        LogPayload::Empty
    }
}

impl From<()> for LogPayload<'_> {
    fn from(_: ()) -> Self {
        LogPayload::Empty
    }
}

impl From<ContextData> for LogPayload<'_> {
    fn from(data: ContextData) -> Self {
        LogPayload::Map(data)
    }
}

impl<'a> From<&'a dyn LogContextData> for LogPayload<'a> {
    fn from(value: &'a dyn LogContextData) -> Self {
        LogPayload::Capability(value)
    }
}

impl<'a> From<&'a (dyn Error + 'static)> for LogPayload<'a> {
    fn from(err: &'a (dyn Error + 'static)) -> Self {
        LogPayload::Error(err)
    }
}

/// JSON objects are maps; every other JSON value is unrecognized
impl From<serde_json::Value> for LogPayload<'_> {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => LogPayload::Map(ContextData::from_json_object(map)),
            other => LogPayload::Unrecognized(other),
        }
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for LogPayload<'_>
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from(map: HashMap<K, V, S>) -> Self {
        LogPayload::Map(map.into_iter().collect())
    }
}

impl<K, V> From<BTreeMap<K, V>> for LogPayload<'_>
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        LogPayload::Map(map.into_iter().collect())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for LogPayload<'_>
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        LogPayload::Map(pairs.into_iter().collect())
    }
}
