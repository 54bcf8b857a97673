//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wayfare_domain::MailboxConfig;
use wayfare_extractor::ExtractorConfig;
use wayfare_mail::DEFAULT_FETCH_LIMIT;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path; defaults to `~/.wayfare/wayfare.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Mailbox to import from
    #[serde(default)]
    pub mailbox: MailboxConfig,

    /// Completion endpoint settings
    #[serde(default)]
    pub extraction: ExtractorConfig,

    /// Import run settings
    #[serde(default)]
    pub import: ImportSection,

    /// Display settings
    #[serde(default)]
    pub settings: Settings,
}

/// Import run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSection {
    /// Messages taken per run
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Directory holding the default configuration and database.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".wayfare"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path`, or the default path when `None`.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply secrets passed on the command line or through the environment.
    pub fn with_secrets(mut self, imap_password: Option<String>, api_key: Option<String>) -> Self {
        if let Some(password) = imap_password.filter(|p| !p.is_empty()) {
            self.mailbox.password = password;
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.extraction.api_key = key;
        }
        self
    }

    /// Resolved database path, creating its directory when needed.
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.database {
            Some(path) => path.clone(),
            None => Self::home()?.join("wayfare.db"),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_batch_limit() -> usize {
    DEFAULT_FETCH_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wayfare_domain::Encryption;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.import.batch_limit, 10);
        assert_eq!(config.extraction.model, "gpt-4.1-mini");
        assert!(config.settings.color);
        assert!(config.mailbox.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
database = "/tmp/trips.db"

[mailbox]
host = "imap.example.com"
port = 993
username = "trips@example.com"
password = "secret"
mailbox = "INBOX"
encryption = "ssl"

[extraction]
api_key = "sk-test"
timeout_secs = 45

[import]
batch_limit = 3
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.database, Some(PathBuf::from("/tmp/trips.db")));
        assert_eq!(config.mailbox.encryption, Encryption::Ssl);
        assert!(config.mailbox.validate().is_ok());
        assert_eq!(config.extraction.timeout_secs, 45);
        assert_eq!(config.extraction.model, "gpt-4.1-mini");
        assert_eq!(config.import.batch_limit, 3);
        assert_eq!(config.settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_unknown_encryption_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[mailbox]\nencryption = \"ssl3\"\n").unwrap();

        assert!(matches!(
            Config::load(Some(file.path())),
            Err(CliError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_secrets_override_file() {
        let config = Config::default().with_secrets(Some("pw".into()), Some("sk-env".into()));
        assert_eq!(config.mailbox.password, "pw");
        assert_eq!(config.extraction.api_key, "sk-env");

        let config = config.with_secrets(Some(String::new()), None);
        assert_eq!(config.mailbox.password, "pw");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::default().with_secrets(Some("hunter2".into()), Some("sk-live".into()));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("sk-live"));
    }
}
