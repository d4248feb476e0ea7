//! Run logging.
//!
//! Leveled entries written to stderr, leaving stdout for table output.
//! The CLI can silence the logger or switch it to JSON lines.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for sub-steps
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Human-readable line.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        format!("{}{} {}", "   ".repeat(self.indent as usize), prefix, self.message)
    }
}

/// How entries are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
    Off,
}

impl LogFormat {
    fn to_u8(self) -> u8 {
        match self {
            LogFormat::Text => 0,
            LogFormat::Json => 1,
            LogFormat::Off => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => LogFormat::Json,
            2 => LogFormat::Off,
            _ => LogFormat::Text,
        }
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Writes log entries to stderr in the selected format.
pub struct Logger {
    format: AtomicU8,
}

impl Logger {
    pub fn new() -> Self {
        Self { format: AtomicU8::new(LogFormat::Text.to_u8()) }
    }

    pub fn set_format(&self, format: LogFormat) {
        self.format.store(format.to_u8(), Ordering::Relaxed);
    }

    pub fn format(&self) -> LogFormat {
        LogFormat::from_u8(self.format.load(Ordering::Relaxed))
    }

    /// Write one entry.
    pub fn log(&self, entry: LogEntry) {
        let line = match self.format() {
            LogFormat::Off => return,
            LogFormat::Text => entry.render(),
            LogFormat::Json => match serde_json::to_string(&entry) {
                Ok(json) => json,
                Err(_) => entry.render(),
            },
        };
        // A closed stderr must not abort the migration.
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::info(msg).with_indent(indent));
}

pub fn log_success_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::success(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_indent() {
        let entry = LogEntry::success("Loaded 3 rows").with_indent(1);
        assert_eq!(entry.render(), "      ✓ Loaded 3 rows");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(LogEntry::warning("careful")).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["message"], "careful");
        assert_eq!(json["indent"], 0);
    }

    #[test]
    fn test_format_switch() {
        let logger = Logger::new();
        assert_eq!(logger.format(), LogFormat::Text);
        logger.set_format(LogFormat::Off);
        assert_eq!(logger.format(), LogFormat::Off);
        logger.log(LogEntry::error("not written"));
    }
}
