//! Output format configuration for log entries
//!
//! Provides different output formats for log entries:
//! - Text: Human-readable format (default)
//! - Json: One JSON object per entry, context fields inlined
//! - Logfmt: Key-value format compatible with log aggregation tools

use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;

/// Output format for log entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Example: `[2025-01-08T10:30:45.123Z] [INFO ] main - Request processed m=Api::handle t=1736332245`
    #[default]
    Text,

    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"info","message":"Request processed","m":"Api::handle"}`
    Json,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=info message="Request processed" m=Api::handle`
    Logfmt,
}

/// Keys reserved for entry metadata in JSON and logfmt output
const RESERVED_KEYS: [&str; 5] = ["timestamp", "level", "message", "thread_id", "thread_name"];

impl OutputFormat {
    /// Format a log entry according to this output format
    pub fn format(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => self.format_text(entry, timestamp_format),
            OutputFormat::Json => self.format_json(entry, timestamp_format),
            OutputFormat::Logfmt => self.format_logfmt(entry, timestamp_format),
        }
    }

    fn format_text(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let base = format!(
            "[{}] [{:5}] {} - {}",
            timestamp_format.format(&entry.timestamp),
            entry.level.label(),
            entry.thread_name.as_ref().unwrap_or(&entry.thread_id),
            entry.message
        );

        if entry.fields.is_empty() {
            base
        } else {
            format!("{} {}", base, entry.format_fields())
        }
    }

    fn format_json(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        json_value(entry, timestamp_format).to_string()
    }

    fn format_logfmt(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let mut parts = vec![
            format!(
                "timestamp={}",
                escape_logfmt_value(&timestamp_format.format(&entry.timestamp))
            ),
            format!("level={}", entry.level.to_str()),
            format!("message={}", quote_logfmt_value(&entry.message)),
            format!("thread_id={}", escape_logfmt_value(&entry.thread_id)),
        ];
        if let Some(ref name) = entry.thread_name {
            parts.push(format!("thread_name={}", escape_logfmt_value(name)));
        }

        for (key, value) in &entry.fields {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            parts.push(format!(
                "{}={}",
                escape_logfmt_key(key),
                escape_logfmt_value(value)
            ));
        }

        parts.join(" ")
    }
}

/// Entry as a JSON object, context fields inlined next to the metadata
pub fn json_value(entry: &LogEntry, timestamp_format: &TimestampFormat) -> serde_json::Value {
    let mut json_obj = serde_json::Map::new();

    // Context fields first so entry metadata overrides colliding keys
    for (key, value) in &entry.fields {
        json_obj.insert(key.clone(), serde_json::Value::String(value.clone()));
    }

    let timestamp = if timestamp_format.is_numeric() {
        timestamp_format
            .format(&entry.timestamp)
            .parse::<i64>()
            .map(|n| serde_json::Value::Number(n.into()))
            .unwrap_or(serde_json::Value::Null)
    } else {
        serde_json::Value::String(timestamp_format.format(&entry.timestamp))
    };
    json_obj.insert("timestamp".to_string(), timestamp);
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(entry.level.to_str().to_string()),
    );
    json_obj.insert(
        "message".to_string(),
        serde_json::Value::String(entry.message.clone()),
    );
    json_obj.insert(
        "thread_id".to_string(),
        serde_json::Value::String(entry.thread_id.clone()),
    );
    if let Some(ref name) = entry.thread_name {
        json_obj.insert(
            "thread_name".to_string(),
            serde_json::Value::String(name.clone()),
        );
    }

    serde_json::Value::Object(json_obj)
}

/// Escape a logfmt key (remove spaces and special chars)
fn escape_logfmt_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Quote a logfmt value if it contains spaces, quotes or `=`
fn escape_logfmt_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=']) {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    fn entry() -> LogEntry {
        LogEntry::new(LogLevel::Info, "User logged in")
            .with_field("req_id", "42")
            .with_field("m", "Session::login")
    }

    #[test]
    fn test_text_format() {
        let result = OutputFormat::Text.format(&entry(), &TimestampFormat::Iso8601);
        assert!(result.contains("[INFO ]"));
        assert!(result.contains("User logged in"));
        assert!(result.ends_with("m=Session::login req_id=42"));
    }

    #[test]
    fn test_json_format() {
        let result = OutputFormat::Json.format(&entry(), &TimestampFormat::Iso8601);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["message"], "User logged in");
        assert_eq!(parsed["req_id"], "42");
        assert!(parsed["timestamp"].is_string());
    }

    #[test]
    fn test_json_numeric_timestamp() {
        let result = OutputFormat::Json.format(&entry(), &TimestampFormat::Unix);
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert!(parsed["timestamp"].is_number());
    }

    #[test]
    fn test_logfmt_escape_special_chars() {
        let entry = LogEntry::new(LogLevel::Warning, "Query executed")
            .with_field("query", "SELECT * FROM users WHERE id=1");
        let result = OutputFormat::Logfmt.format(&entry, &TimestampFormat::Iso8601);

        assert!(result.contains("level=warning"));
        assert!(result.contains("message=\"Query executed\""));
        assert!(result.contains("query=\"SELECT * FROM users WHERE id=1\""));
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
