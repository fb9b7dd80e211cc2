use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// A parser diagnostic. `line` is `-1` when the message is not tied to a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugMessage {
    pub line: i64,
    pub message: String,
    pub severity: Severity,
}

impl DebugMessage {
    pub fn new(message: impl Into<String>, line: i64, severity: Severity) -> Self {
        Self {
            line,
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>, line: i64) -> Self {
        Self::new(message, line, Severity::Info)
    }

    pub fn warning(message: impl Into<String>, line: i64) -> Self {
        Self::new(message, line, Severity::Warning)
    }

    pub fn error(message: impl Into<String>, line: i64) -> Self {
        Self::new(message, line, Severity::Error)
    }

    /// Moves a block-relative line index to a 1-based document line.
    pub fn shifted(mut self, first_line: usize) -> Self {
        if self.line >= 0 {
            self.line += first_line as i64 + 1;
        }
        self
    }
}

impl fmt::Display for DebugMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line >= 0 {
            write!(f, "{} (line {}): {}", self.severity, self.line, self.message)
        } else {
            write!(f, "{}: {}", self.severity, self.message)
        }
    }
}
