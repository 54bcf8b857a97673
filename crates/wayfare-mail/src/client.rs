//! Mail client
//!
//! Every operation validates the configuration, opens its own session,
//! and closes it before returning, whatever the outcome.

use std::sync::Arc;
use tracing::{debug, info, warn};
use wayfare_domain::{EventLog, LogContext, MailboxConfig, MailboxMessage, MessagePreview, NewLogEntry};

use crate::connector::{MailboxConnector, MailboxSession, OpenMode};
use crate::parse::{parse_message, preview};
use crate::MailError;

/// Default number of messages fetched per call
pub const DEFAULT_FETCH_LIMIT: usize = 10;

/// Mailbox operations over a connector
pub struct MailClient<C> {
    connector: C,
    log: Arc<dyn EventLog>,
}

impl<C: MailboxConnector> MailClient<C> {
    /// Create a client that reports failures to `log`
    pub fn new(connector: C, log: Arc<dyn EventLog>) -> Self {
        Self { connector, log }
    }

    /// Check credentials and reachability without selecting the mailbox
    pub fn test_connection(&self, config: &MailboxConfig) -> Result<(), MailError> {
        let session = self.open(config, OpenMode::HalfOpen)?;
        close_quietly(session);
        info!(host = %config.host, "Mailbox connection verified");
        Ok(())
    }

    /// Fetch up to `limit` unseen messages without marking them seen
    pub fn fetch_unseen(
        &self,
        config: &MailboxConfig,
        limit: usize,
    ) -> Result<Vec<MailboxMessage>, MailError> {
        let mut session = self.open(config, OpenMode::Full)?;
        let result = read_unseen(session.as_mut(), limit);
        close_quietly(session);

        match result {
            Ok(messages) => {
                debug!(count = messages.len(), "Fetched unseen messages");
                Ok(messages)
            }
            Err(e) => {
                self.log
                    .record(NewLogEntry::error(LogContext::Imap, format!("Fetch failed: {}", e)));
                Err(e)
            }
        }
    }

    /// Header metadata and snippets for up to `limit` unseen messages
    pub fn preview_unseen(
        &self,
        config: &MailboxConfig,
        limit: usize,
    ) -> Result<Vec<MessagePreview>, MailError> {
        let messages = self.fetch_unseen(config, limit)?;
        Ok(messages.iter().map(preview).collect())
    }

    /// Flag the given UIDs seen in one batch
    ///
    /// Best-effort: a failure is logged and returned so the caller can choose
    /// to ignore it. Empty input does nothing.
    pub fn mark_seen(&self, config: &MailboxConfig, uids: &[u32]) -> Result<(), MailError> {
        if uids.is_empty() {
            return Ok(());
        }

        let result = self.open(config, OpenMode::Full).and_then(|mut session| {
            let stored = session.add_seen_flag(uids);
            close_quietly(session);
            stored.map_err(|e| {
                self.log.record(NewLogEntry::error(
                    LogContext::Imap,
                    format!("Unable to mark messages seen: {}", e),
                ));
                e
            })
        });

        if result.is_ok() {
            debug!(count = uids.len(), "Marked messages seen");
        }
        result
    }

    fn open(
        &self,
        config: &MailboxConfig,
        mode: OpenMode,
    ) -> Result<Box<dyn MailboxSession>, MailError> {
        config.validate()?;

        self.connector.connect(config, mode).map_err(|e| {
            self.log.record(NewLogEntry::error(
                LogContext::Imap,
                format!("Mailbox connection failed: {}", e),
            ));
            e
        })
    }
}

fn read_unseen(
    session: &mut dyn MailboxSession,
    limit: usize,
) -> Result<Vec<MailboxMessage>, MailError> {
    let uids = session.search_unseen()?;
    uids.into_iter()
        .take(limit)
        .map(|uid| session.fetch_raw(uid).map(|raw| parse_message(uid, &raw)))
        .collect()
}

fn close_quietly(session: Box<dyn MailboxSession>) {
    if let Err(e) = session.close() {
        warn!(error = %e, "Mailbox logout failed");
    }
}
