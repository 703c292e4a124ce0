//! Structured JSON-lines logger
//!
//! - One line per event
//! - `event` and `level` first, remaining keys sorted
//! - Synchronous, unbuffered
//! - Events below the process-wide minimum level are dropped without I/O.
//!   The default minimum is `Warn`, above anything the engine emits, so
//!   validation writes nothing unless a caller lowers it.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Per-call detail
    Trace = 0,
    /// Record-level failures and schema resolution problems
    Info = 1,
    /// Default threshold
    Warn = 2,
}

impl LogLevel {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
        }
    }

    fn from_u8(level: u8) -> Self {
        match level {
            0 => LogLevel::Trace,
            1 => LogLevel::Info,
            _ => LogLevel::Warn,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);

/// Sets the lowest level that is written.
pub fn set_min_level(level: LogLevel) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the lowest level that is written.
pub fn min_level() -> LogLevel {
    LogLevel::from_u8(MIN_LEVEL.load(Ordering::Relaxed))
}

/// A structured logger that outputs JSON lines to stdout
pub struct Logger;

impl Logger {
    /// Whether events at `level` are currently written
    pub fn enabled(level: LogLevel) -> bool {
        level >= min_level()
    }

    /// Log an event with the given level and fields
    pub fn log(level: LogLevel, event: &str, fields: &[(&str, &str)]) {
        if Self::enabled(level) {
            Self::log_to_writer(level, event, fields, &mut io::stdout());
        }
    }

    fn log_to_writer<W: Write>(
        level: LogLevel,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = Self::format_line(level, event, fields);

        // One write per line
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    fn format_line(level: LogLevel, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(128);

        output.push_str("{\"event\":");
        output.push_str(&quote(event));
        output.push_str(",\"level\":\"");
        output.push_str(level.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push(',');
            output.push_str(&quote(key));
            output.push(':');
            output.push_str(&quote(value));
        }

        output.push_str("}\n");
        output
    }
}

fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Capture logs to a buffer for testing
#[cfg(test)]
pub fn capture_log(level: LogLevel, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(level, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
    }

    #[test]
    fn test_default_threshold_is_silent() {
        assert_eq!(min_level(), LogLevel::Warn);
        assert!(!Logger::enabled(LogLevel::Trace));
        assert!(!Logger::enabled(LogLevel::Info));
        assert!(Logger::enabled(LogLevel::Warn));
    }

    #[test]
    fn test_log_json_format() {
        let output = capture_log(LogLevel::Info, "SELF_CHECK_FAILED", &[("mode", "create")]);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "SELF_CHECK_FAILED");
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["mode"], "create");
    }

    #[test]
    fn test_log_deterministic_ordering() {
        let output1 = capture_log(LogLevel::Trace, "TEST", &[("violations", "2"), ("fields", "5")]);
        let output2 = capture_log(LogLevel::Trace, "TEST", &[("fields", "5"), ("violations", "2")]);

        assert_eq!(output1, output2);
        assert!(output1.find("fields").unwrap() < output1.find("violations").unwrap());
    }

    #[test]
    fn test_log_escapes_special_chars() {
        let output = capture_log(
            LogLevel::Info,
            "TEST",
            &[("message", "name is \"bad\"\nsecond line")],
        );

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["message"], "name is \"bad\"\nsecond line");
        assert_eq!(output.chars().filter(|c| *c == '\n').count(), 1);
    }

    #[test]
    fn test_log_event_first() {
        let output = capture_log(LogLevel::Trace, "MY_EVENT", &[("a", "1")]);
        assert!(output.starts_with("{\"event\":\"MY_EVENT\""));
    }
}
