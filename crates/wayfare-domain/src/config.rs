//! Mailbox connection settings
//!
//! Built once per run and handed to the mail client by reference. Nothing in
//! the workspace reads mailbox settings from ambient state.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while validating configuration before any I/O happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent or empty
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    /// A setting is present but not one of the accepted values
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Offending value
        value: String,
    },
}

/// Transport security mode for the mailbox connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    /// Plaintext IMAP
    #[default]
    #[serde(alias = "")]
    None,
    /// TLS from the first byte (usually port 993)
    Ssl,
    /// TLS negotiated on a plaintext connection
    Tls,
    /// Explicit STARTTLS upgrade
    #[serde(rename = "starttls")]
    StartTls,
}

impl Encryption {
    /// Get the setting value for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Encryption::None => "none",
            Encryption::Ssl => "ssl",
            Encryption::Tls => "tls",
            Encryption::StartTls => "starttls",
        }
    }

    /// Connection-string flag for this mode
    pub fn flag(&self) -> &'static str {
        match self {
            Encryption::None => "",
            Encryption::Ssl => "/ssl",
            Encryption::Tls | Encryption::StartTls => "/tls",
        }
    }
}

impl std::str::FromStr for Encryption {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Encryption::None),
            "ssl" => Ok(Encryption::Ssl),
            "tls" => Ok(Encryption::Tls),
            "starttls" => Ok(Encryption::StartTls),
            other => Err(ConfigError::InvalidValue {
                field: "encryption",
                value: other.to_string(),
            }),
        }
    }
}

/// IMAP mailbox settings
///
/// Missing fields deserialize as empty so that [`MailboxConfig::validate`]
/// can name them instead of failing inside the TOML parser.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Server hostname
    #[serde(default)]
    pub host: String,

    /// Server port (0 means unset)
    #[serde(default)]
    pub port: u16,

    /// Login name
    #[serde(default)]
    pub username: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Folder to poll, e.g. `INBOX`
    #[serde(default)]
    pub mailbox: String,

    /// Transport security mode
    #[serde(default)]
    pub encryption: Encryption,
}

impl MailboxConfig {
    /// Check that every required setting is present
    ///
    /// Fields are checked in a fixed order and the first missing one is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required: [(&'static str, bool); 5] = [
            ("host", self.host.trim().is_empty()),
            ("port", self.port == 0),
            ("username", self.username.is_empty()),
            ("password", self.password.is_empty()),
            ("mailbox", self.mailbox.trim().is_empty()),
        ];

        for (field, missing) in required {
            if missing {
                return Err(ConfigError::MissingField(field));
            }
        }

        Ok(())
    }

    /// Build the mailbox connection string, e.g. `{imap.example.com:993/imap/ssl}INBOX`
    pub fn connection_string(&self) -> String {
        format!(
            "{{{}:{}/imap{}}}{}",
            self.host,
            self.port,
            self.encryption.flag(),
            self.mailbox
        )
    }
}

impl fmt::Debug for MailboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mailbox", &self.mailbox)
            .field("encryption", &self.encryption)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> MailboxConfig {
        MailboxConfig {
            host: "imap.example.com".to_string(),
            port: 993,
            username: "trips@example.com".to_string(),
            password: "hunter2".to_string(),
            mailbox: "INBOX".to_string(),
            encryption: Encryption::Ssl,
        }
    }

    #[test]
    fn test_complete_config_is_valid() {
        assert!(complete_config().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_named() {
        let mut config = complete_config();
        config.password.clear();
        assert_eq!(config.validate(), Err(ConfigError::MissingField("password")));

        let mut config = complete_config();
        config.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::MissingField("port")));

        let config = MailboxConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingField("host")));
    }

    #[test]
    fn test_connection_string_per_mode() {
        let mut config = complete_config();
        assert_eq!(config.connection_string(), "{imap.example.com:993/imap/ssl}INBOX");

        config.encryption = Encryption::StartTls;
        config.port = 143;
        assert_eq!(config.connection_string(), "{imap.example.com:143/imap/tls}INBOX");

        config.encryption = Encryption::None;
        assert_eq!(config.connection_string(), "{imap.example.com:143/imap}INBOX");
    }

    #[test]
    fn test_encryption_parsing() {
        assert_eq!("SSL".parse::<Encryption>(), Ok(Encryption::Ssl));
        assert_eq!("starttls".parse::<Encryption>(), Ok(Encryption::StartTls));
        assert_eq!("".parse::<Encryption>(), Ok(Encryption::None));
        assert!(matches!(
            "ssl3".parse::<Encryption>(),
            Err(ConfigError::InvalidValue { field: "encryption", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", complete_config());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
