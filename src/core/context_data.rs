//! Key-value context data
//!
//! This module provides:
//! - `FieldValue`: a single context value, scalar or composite
//! - `ContextData`: an unformatted key-value map as supplied by callers
//! - `ContextMap`: the flat, string-valued map handed to the log backend
//! - `LogContextData`: the capability of a value to describe itself as context

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::{LoggerError, Result};

/// Flat, string-valued context as seen by the log backend
pub type ContextMap = BTreeMap<String, String>;

/// Value type for context fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Arrays and objects; rendered as compact JSON
    Json(serde_json::Value),
}

impl FieldValue {
    /// Render the value as the string that ends up in the log line
    ///
    /// Scalars use their plain string form, `Null` renders as an empty
    /// string, composites are encoded as compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Null => String::new(),
            FieldValue::Json(serde_json::Value::String(s)) => s.clone(),
            FieldValue::Json(serde_json::Value::Null) => String::new(),
            FieldValue::Json(v) => v.to_string(),
        }
    }

    /// Whether the value is an array or object
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            FieldValue::Json(serde_json::Value::Array(_) | serde_json::Value::Object(_))
        )
    }

    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .unwrap_or_else(|| FieldValue::Json(serde_json::Value::Number(n))),
            },
            composite => FieldValue::Json(composite),
        }
    }
}

/// Unformatted key-value context data
///
/// Keys are kept sorted so formatted output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    fields: BTreeMap<String, FieldValue>,
}

impl ContextData {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    /// Add any serializable value as a field
    pub fn with_serialized<K, T>(self, key: K, value: &T) -> Result<Self>
    where
        K: Into<String>,
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        Ok(self.with_field(key, value))
    }

    /// Build context data from a serializable struct or map
    ///
    /// The value must serialize to a JSON object; each top-level member
    /// becomes one field.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => Ok(Self::from_json_object(map)),
            other => Err(LoggerError::conversion(other.to_string())),
        }
    }

    /// Build context data from a JSON object
    pub fn from_json_object(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }

    /// Get all fields
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ContextData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for ContextData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Capability of a value to expose loggable key-value data about itself
///
/// # Example
///
/// ```
/// use context_logger::{ContextData, LogContextData};
///
/// struct Order {
///     id: u32,
///     total_cents: i64,
/// }
///
/// impl LogContextData for Order {
///     fn log_context_data(&self) -> ContextData {
///         ContextData::new()
///             .with_field("id", self.id)
///             .with_field("total_cents", self.total_cents)
///     }
/// }
///
/// let order = Order { id: 7, total_cents: 1250 };
/// assert_eq!(order.log_context_data().len(), 2);
/// ```
pub trait LogContextData {
    fn log_context_data(&self) -> ContextData;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_data_creation() {
        let ctx = ContextData::new();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_context_data_with_fields() {
        let ctx = ContextData::new()
            .with_field("user_id", 123)
            .with_field("username", "john_doe")
            .with_field("active", true);

        assert_eq!(ctx.len(), 3);
        assert!(!ctx.is_empty());
    }

    #[test]
    fn test_context_data_format() {
        let ctx = ContextData::new()
            .with_field("key1", "value1")
            .with_field("key2", 42);

        assert_eq!(ctx.format_fields(), "key1=value1 key2=42");
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(FieldValue::from("abc").render(), "abc");
        assert_eq!(FieldValue::from(-5).render(), "-5");
        assert_eq!(FieldValue::from(1.5).render(), "1.5");
        assert_eq!(FieldValue::from(false).render(), "false");
        assert_eq!(FieldValue::Null.render(), "");
    }

    #[test]
    fn test_render_composites_as_json() {
        let value = FieldValue::from(json!({"a": 1, "b": [true, null]}));
        assert!(value.is_composite());
        assert_eq!(value.render(), r#"{"a":1,"b":[true,null]}"#);

        let list = FieldValue::from(json!([1, 2, 3]));
        assert_eq!(list.render(), "[1,2,3]");
    }

    #[test]
    fn test_json_scalars_normalize() {
        assert_eq!(FieldValue::from(json!("x")), FieldValue::String("x".into()));
        assert_eq!(FieldValue::from(json!(7)), FieldValue::Int(7));
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Null);
        assert!(!FieldValue::from(json!(2.5)).is_composite());
    }

    #[test]
    fn test_option_values() {
        let none: Option<&str> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3)), FieldValue::Int(3));
    }

    #[test]
    fn test_from_serializable() {
        #[derive(Serialize)]
        struct Request<'a> {
            id: u64,
            path: &'a str,
        }

        let data = ContextData::from_serializable(&Request { id: 9, path: "/x" }).unwrap();
        assert_eq!(data.get("id"), Some(&FieldValue::Int(9)));
        assert_eq!(data.get("path"), Some(&FieldValue::String("/x".into())));

        assert!(ContextData::from_serializable(&[1, 2]).is_err());
    }
}
