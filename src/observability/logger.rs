//! Structured single-line logger
//!
//! - One log line = one event
//! - Deterministic key order: severity, event, then fields as given
//! - Synchronous, no buffering, no side effects on execution

use std::fmt;
use std::io::{self, Write};

use super::events::Event;

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations.
    Info,
    /// Recoverable issues: rejected candidates, skipped rows.
    Warn,
    /// Operation failures.
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous structured logger writing one JSON object per line.
pub struct Logger;

impl Logger {
    pub fn info(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    fn log(severity: Severity, event: Event, fields: &[(&str, &str)]) {
        let line = Self::format_line(severity, event, fields);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{line}");
    }

    fn format_line(severity: Severity, event: Event, fields: &[(&str, &str)]) -> String {
        let mut line = format!(
            "{{\"severity\":\"{}\",\"event\":\"{}\"",
            severity.as_str(),
            event.as_str()
        );
        for (key, value) in fields {
            line.push(',');
            line.push_str(&json_string(key));
            line.push(':');
            line.push_str(&json_string(value));
        }
        line.push('}');
        line
    }
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
