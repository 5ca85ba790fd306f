//! Console appender implementation

use crate::core::{Appender, LogEntry, LogLevel, OutputFormat, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;

pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(cfg!(feature = "console"))
    }

    /// Colors only take effect with the `console` feature
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    /// Set the output format for this appender
    ///
    /// # Example
    ///
    /// ```
    /// use context_logger::appenders::ConsoleAppender;
    /// use context_logger::OutputFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_output_format(OutputFormat::Logfmt);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn format_text(&self, entry: &LogEntry) -> String {
        let base = format!(
            "[{}] [{}] {} - {}",
            self.timestamp_format.format(&entry.timestamp),
            self.level_label(entry.level),
            entry.thread_name.as_ref().unwrap_or(&entry.thread_id),
            entry.message
        );

        if entry.fields.is_empty() {
            base
        } else {
            format!("{} {}", base, entry.format_fields())
        }
    }

    #[cfg(feature = "console")]
    fn level_label(&self, level: LogLevel) -> String {
        let label = format!("{:5}", level.label());
        if self.use_colors {
            label.color(level.color_code()).to_string()
        } else {
            label
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_label(&self, level: LogLevel) -> String {
        let _ = self.use_colors;
        format!("{:5}", level.label())
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let output = match self.output_format {
            OutputFormat::Text => self.format_text(entry),
            OutputFormat::Json | OutputFormat::Logfmt => {
                self.output_format.format(entry, &self.timestamp_format)
            }
        };

        // Errors go to stderr, everything else to stdout
        match entry.level {
            LogLevel::Error => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_includes_fields() {
        let appender = ConsoleAppender::with_colors(false);
        let entry = LogEntry::new(LogLevel::Warning, "slow").with_field("req_id", "42");
        let line = appender.format_text(&entry);
        assert!(line.contains("[WARN ]"));
        assert!(line.ends_with("slow req_id=42"));
    }

    #[test]
    fn test_append_does_not_fail() {
        let mut appender = ConsoleAppender::new().with_output_format(OutputFormat::Json);
        assert!(appender.append(&LogEntry::new(LogLevel::Info, "hi")).is_ok());
        assert!(appender.flush().is_ok());
    }
}
