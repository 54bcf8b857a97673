//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mailbox error
    #[error(transparent)]
    Mail(#[from] wayfare_mail::MailError),

    /// Trip store or event log error
    #[error(transparent)]
    Store(#[from] wayfare_store::StoreError),

    /// Completion provider setup error
    #[error(transparent)]
    Llm(#[from] wayfare_llm::LlmError),

    /// Share page error
    #[error(transparent)]
    ShareLink(#[from] wayfare_sharelink::ShareLinkError),

    /// The import run aborted
    #[error("{0}")]
    Import(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No trip with this PNR
    #[error("No trip found for PNR '{0}'")]
    TripNotFound(String),
}
