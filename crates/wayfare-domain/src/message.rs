//! Mailbox messages
//!
//! Transient values that live for one import pass and are never stored.

use serde::{Deserialize, Serialize};

/// A fetched message with its decoded body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxMessage {
    /// Mailbox-assigned UID, used to mark the message seen
    pub uid: u32,
    /// `Message-ID` header; empty when absent
    pub message_id: String,
    /// `Subject` header
    pub subject: String,
    /// `From` header
    pub from: String,
    /// `Date` header as sent
    pub date: String,
    /// Plain-text body
    pub body: String,
}

impl MailboxMessage {
    /// Hints passed along to the extractor
    pub fn hints(&self) -> ContextHints {
        ContextHints {
            message_id: Some(self.message_id.clone()).filter(|id| !id.is_empty()),
            date: Some(self.date.clone()).filter(|d| !d.is_empty()),
            from: Some(self.from.clone()).filter(|f| !f.is_empty()),
        }
    }
}

/// Header metadata plus a short snippet, for read-only inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreview {
    /// Mailbox-assigned UID
    pub uid: u32,
    /// `Message-ID` header; empty when absent
    pub message_id: String,
    /// `Subject` header
    pub subject: String,
    /// `From` header
    pub from: String,
    /// `Date` header as sent
    pub date: String,
    /// Whitespace-collapsed plain-text excerpt
    pub snippet: String,
}

/// Metadata about the message being extracted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextHints {
    /// Email `Message-ID`, attached to log entries
    pub message_id: Option<String>,
    /// Email `Date` header
    pub date: Option<String>,
    /// Email sender
    pub from: Option<String>,
}
