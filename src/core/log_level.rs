//! Log level definitions
//!
//! The backend accepts exactly three severities, named `info`, `warning`
//! and `error`. [`LogLevel::from_backend_name`] matches those names exactly
//! and is what the emitter uses for textual levels; `FromStr` is lenient
//! about case and `warn` for configuration input.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info = 0,
    Warning = 1,
    Error = 2,
}

impl LogLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }

    /// Exact backend name; anything but `info`, `warning` or `error` is `None`
    pub fn from_backend_name(name: &str) -> Option<Self> {
        match name {
            "info" => Some(LogLevel::Info),
            "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Upper-case label used by the text formats
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Info => Green,
            LogLevel::Warning => Yellow,
            LogLevel::Error => Red,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("info".parse::<LogLevel>().ok(), Some(LogLevel::Info));
        assert_eq!("WARNING".parse::<LogLevel>().ok(), Some(LogLevel::Warning));
        assert_eq!("warn".parse::<LogLevel>().ok(), Some(LogLevel::Warning));
        assert_eq!("Error".parse::<LogLevel>().ok(), Some(LogLevel::Error));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "debug".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel(ref name) if name == "debug"));
        assert!("".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_backend_names_are_exact() {
        assert_eq!(LogLevel::from_backend_name("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_backend_name("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_backend_name("error"), Some(LogLevel::Error));

        for name in ["warn", "INFO", "Error", "WARNING", " info", ""] {
            assert_eq!(LogLevel::from_backend_name(name), None, "{:?}", name);
        }
    }

    #[test]
    fn test_ordering() {
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }
}
