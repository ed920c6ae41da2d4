//! Structured line logger.
//!
//! One JSON object per line, keys in deterministic (alphabetical) order so
//! runs diff cleanly. Logging is synchronous and never fails loudly: a sink
//! error drops the line rather than taking scoring down with it.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous structured logger with a severity floor.
pub struct Logger {
    min_severity: Severity,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Logger {
    /// Logger writing to stderr, the default for the binary.
    pub fn stderr(min_severity: Severity) -> Self {
        Self::to_sink(min_severity, Box::new(io::stderr()))
    }

    /// Logger writing to an arbitrary sink; tests capture through this.
    pub fn to_sink(min_severity: Severity, sink: Box<dyn Write + Send>) -> Self {
        Self {
            min_severity,
            sink: Mutex::new(sink),
        }
    }

    /// Logger that swallows everything.
    pub fn disabled() -> Self {
        Self::to_sink(Severity::Error, Box::new(io::sink()))
    }

    /// Emit one event line. Keys beyond `event`, `severity` and `ts` come
    /// from `fields`; serde_json's default map keeps the whole object
    /// alphabetical.
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, String)]) {
        if severity < self.min_severity {
            return;
        }
        let mut map = Map::new();
        map.insert("event".into(), Value::String(event.to_string()));
        map.insert(
            "severity".into(),
            Value::String(severity.as_str().to_string()),
        );
        map.insert("ts".into(), Value::String(Utc::now().to_rfc3339()));
        for (key, value) in fields {
            map.insert((*key).to_string(), Value::String(value.clone()));
        }
        let line = Value::Object(map);
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{line}");
            let _ = sink.flush();
        }
    }

    pub fn debug(&self, event: &str, fields: &[(&str, String)]) {
        self.log(Severity::Debug, event, fields);
    }

    pub fn info(&self, event: &str, fields: &[(&str, String)]) {
        self.log(Severity::Info, event, fields);
    }

    pub fn warn(&self, event: &str, fields: &[(&str, String)]) {
        self.log(Severity::Warn, event, fields);
    }

    pub fn error(&self, event: &str, fields: &[(&str, String)]) {
        self.log(Severity::Error, event, fields);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_severity", &self.min_severity)
            .finish_non_exhaustive()
    }
}
