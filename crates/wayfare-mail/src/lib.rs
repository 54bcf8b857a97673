//! Wayfare Mail Client
//!
//! Reads airline confirmation emails from an IMAP mailbox.
//!
//! # Architecture
//!
//! - `MailClient` implements the operations: connection test, unseen fetch,
//!   previews, mark-seen
//! - `MailboxConnector`/`MailboxSession` are the transport seam
//! - `ImapConnector` talks to a real server; `MemoryConnector` is scripted
//!
//! All operations are blocking. Async callers run them on a blocking thread.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use wayfare_domain::{Encryption, MailboxConfig, MemoryEventLog};
//! use wayfare_mail::{MailClient, MemoryConnector};
//!
//! let connector = MemoryConnector::new();
//! connector.deliver("Subject: Booking\r\n\r\nABC123");
//!
//! let client = MailClient::new(connector, Arc::new(MemoryEventLog::new()));
//! let config = MailboxConfig {
//!     host: "imap.example.com".to_string(),
//!     port: 993,
//!     username: "me".to_string(),
//!     password: "pw".to_string(),
//!     mailbox: "INBOX".to_string(),
//!     encryption: Encryption::Ssl,
//! };
//! let messages = client.fetch_unseen(&config, 10).unwrap();
//! assert_eq!(messages[0].subject, "Booking");
//! ```

#![warn(missing_docs)]

mod client;
mod connector;
mod error;
mod imap_connector;
mod memory;
pub mod parse;

pub use client::{MailClient, DEFAULT_FETCH_LIMIT};
pub use connector::{MailboxConnector, MailboxSession, OpenMode};
pub use error::MailError;
pub use imap_connector::ImapConnector;
pub use memory::MemoryConnector;
