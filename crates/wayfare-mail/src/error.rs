//! Mail client error types

use thiserror::Error;
use wayfare_domain::ConfigError;

/// Errors that can occur while talking to the mailbox
#[derive(Error, Debug)]
pub enum MailError {
    /// Required settings missing or invalid; no I/O was attempted
    #[error("Mailbox configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Server unreachable or TLS negotiation failed
    #[error("Mailbox connection failed: {0}")]
    Connection(String),

    /// Server rejected the credentials
    #[error("Mailbox authentication failed: {0}")]
    Authentication(String),

    /// A command failed on an established session
    #[error("Mailbox protocol error: {0}")]
    Protocol(String),
}
