//! Connector and session seam
//!
//! A connector opens one session per client call; the session is closed
//! before the call returns. Nothing holds a session across calls.

use wayfare_domain::MailboxConfig;

use crate::MailError;

/// How much of the mailbox to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Authenticate only, without selecting the mailbox
    HalfOpen,
    /// Authenticate and select the configured mailbox
    Full,
}

/// Opens mailbox sessions
pub trait MailboxConnector: Send + Sync {
    /// Open a session against the configured server
    fn connect(
        &self,
        config: &MailboxConfig,
        mode: OpenMode,
    ) -> Result<Box<dyn MailboxSession>, MailError>;
}

/// An open mailbox session
pub trait MailboxSession {
    /// UIDs of unseen messages, in mailbox order
    fn search_unseen(&mut self) -> Result<Vec<u32>, MailError>;

    /// Full RFC 5322 message, fetched without setting `\Seen`
    fn fetch_raw(&mut self, uid: u32) -> Result<Vec<u8>, MailError>;

    /// Set `\Seen` on all of the given UIDs in one command
    fn add_seen_flag(&mut self, uids: &[u32]) -> Result<(), MailError>;

    /// Log out and drop the connection
    fn close(self: Box<Self>) -> Result<(), MailError>;
}
