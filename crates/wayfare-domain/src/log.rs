//! Event log records
//!
//! Append-only operational entries. The pipeline writes them and never reads
//! them back; operators read them through the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use crate::config::ConfigError;
use crate::traits::EventLog;

/// Which component wrote an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogContext {
    /// Mailbox connection and protocol
    Imap,
    /// LLM extraction and validation
    Extraction,
    /// Orchestration and persistence
    Import,
    /// Share-page scraping
    #[serde(rename = "sharelink")]
    ShareLink,
}

impl LogContext {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogContext::Imap => "imap",
            LogContext::Extraction => "extraction",
            LogContext::Import => "import",
            LogContext::ShareLink => "sharelink",
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogContext {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imap" => Ok(LogContext::Imap),
            "extraction" => Ok(LogContext::Extraction),
            "import" => Ok(LogContext::Import),
            "sharelink" => Ok(LogContext::ShareLink),
            other => Err(ConfigError::InvalidValue {
                field: "context",
                value: other.to_string(),
            }),
        }
    }
}

/// Entry severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Normal progress
    Info,
    /// A failure the operator should look at
    Error,
}

impl Severity {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "error" => Ok(Severity::Error),
            other => Err(ConfigError::InvalidValue {
                field: "severity",
                value: other.to_string(),
            }),
        }
    }
}

/// An entry about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    /// Writing component
    pub context: LogContext,
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Booking reference, when known
    pub pnr: Option<String>,
    /// Email `Message-ID`, when known
    pub message_id: Option<String>,
}

impl NewLogEntry {
    /// Create an info entry
    pub fn info(context: LogContext, message: impl Into<String>) -> Self {
        Self {
            context,
            severity: Severity::Info,
            message: message.into(),
            pnr: None,
            message_id: None,
        }
    }

    /// Create an error entry
    pub fn error(context: LogContext, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::info(context, message)
        }
    }

    /// Attach a booking reference
    pub fn with_pnr(mut self, pnr: impl Into<String>) -> Self {
        self.pnr = Some(pnr.into());
        self
    }

    /// Attach a message id; empty ids are ignored
    pub fn with_message_id(mut self, message_id: Option<&str>) -> Self {
        self.message_id = message_id
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        self
    }
}

/// A written entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Row identifier
    pub id: i64,
    /// Writing component
    pub context: LogContext,
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Booking reference, when known
    pub pnr: Option<String>,
    /// Email `Message-ID`, when known
    pub message_id: Option<String>,
    /// Write time
    pub created_at: DateTime<Utc>,
}

/// In-memory event log for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryEventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of entries with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// Number of entries with the given context and severity
    pub fn count_in(&self, context: LogContext, severity: Severity) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.context == context && e.severity == severity)
            .count()
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, entry: NewLogEntry) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = entries.len() as i64 + 1;
        entries.push(LogEntry {
            id,
            context: entry.context,
            severity: entry.severity,
            message: entry.message,
            pnr: entry.pnr,
            message_id: entry.message_id,
            created_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let entry = NewLogEntry::error(LogContext::Import, "boom")
            .with_pnr("ABC123")
            .with_message_id(Some("<m1@example.com>"));

        assert_eq!(entry.severity, Severity::Error);
        assert_eq!(entry.pnr.as_deref(), Some("ABC123"));
        assert_eq!(entry.message_id.as_deref(), Some("<m1@example.com>"));
    }

    #[test]
    fn test_empty_message_id_dropped() {
        let entry = NewLogEntry::info(LogContext::Imap, "ok").with_message_id(Some(""));
        assert_eq!(entry.message_id, None);
    }

    #[test]
    fn test_memory_log_counts() {
        let log = MemoryEventLog::new();
        log.record(NewLogEntry::info(LogContext::Import, "one"));
        log.record(NewLogEntry::error(LogContext::Imap, "two"));
        log.record(NewLogEntry::error(LogContext::Extraction, "three"));

        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.count(Severity::Error), 2);
        assert_eq!(log.count_in(LogContext::Imap, Severity::Error), 1);
        assert_eq!(log.entries()[2].id, 3);
    }

    #[test]
    fn test_context_parse() {
        assert_eq!("imap".parse::<LogContext>().unwrap(), LogContext::Imap);
        assert_eq!("sharelink".parse::<LogContext>().unwrap(), LogContext::ShareLink);
        assert!("smtp".parse::<LogContext>().is_err());
    }
}
