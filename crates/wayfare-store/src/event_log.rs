//! SQLite event log

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;
use wayfare_domain::{EventLog, LogContext, LogEntry, NewLogEntry, Severity};

use crate::trips::{from_millis, now_millis};
use crate::StoreError;

/// Default number of entries returned by [`SqliteEventLog::recent`] callers
pub const DEFAULT_LOG_LIMIT: usize = 25;

/// Event log persisted in the `event_log` table
///
/// Writes never fail the caller: an entry that cannot be stored is reported
/// through `tracing` and dropped.
pub struct SqliteEventLog {
    conn: Mutex<Connection>,
}

impl SqliteEventLog {
    /// Open (or create) the log at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = crate::open_connection(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, context, severity, message, pnr, message_id, created_at
             FROM event_log ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit as i64], |row| {
                let context: String = row.get(1)?;
                let severity: String = row.get(2)?;
                Ok(LogEntry {
                    id: row.get(0)?,
                    context: context.parse::<LogContext>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
                    })?,
                    severity: severity.parse::<Severity>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
                    })?,
                    message: row.get(3)?,
                    pnr: row.get(4)?,
                    message_id: row.get(5)?,
                    created_at: from_millis(row.get(6)?, 6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn insert(&self, entry: &NewLogEntry) -> Result<(), StoreError> {
        self.lock().execute(
            "INSERT INTO event_log (context, pnr, severity, message, message_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.context.as_str(),
                entry.pnr,
                entry.severity.as_str(),
                entry.message,
                entry.message_id,
                now_millis(),
            ],
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventLog for SqliteEventLog {
    fn record(&self, entry: NewLogEntry) {
        if let Err(e) = self.insert(&entry) {
            warn!(
                context = %entry.context,
                severity = %entry.severity,
                error = %e,
                "Dropped event log entry: {}",
                entry.message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read_back() {
        let log = SqliteEventLog::new(":memory:").unwrap();
        log.record(NewLogEntry::info(LogContext::Import, "Imported trip ABC123").with_pnr("ABC123"));
        log.record(
            NewLogEntry::error(LogContext::Imap, "Mailbox connection failed")
                .with_message_id(Some("<m@x>")),
        );

        let entries = log.recent(DEFAULT_LOG_LIMIT).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].context, LogContext::Imap);
        assert_eq!(entries[0].severity, Severity::Error);
        assert_eq!(entries[0].message_id.as_deref(), Some("<m@x>"));
        assert_eq!(entries[1].pnr.as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_recent_respects_limit() {
        let log = SqliteEventLog::new(":memory:").unwrap();
        for i in 0..5 {
            log.record(NewLogEntry::info(LogContext::Import, format!("entry {}", i)));
        }

        let entries = log.recent(3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "entry 4");
    }
}
