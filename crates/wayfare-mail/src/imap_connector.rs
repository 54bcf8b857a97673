//! IMAP connector
//!
//! Blocking IMAP over plain TCP, implicit TLS, or a STARTTLS upgrade,
//! depending on the configured encryption mode.

use native_tls::{TlsConnector, TlsStream};
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;
use wayfare_domain::{Encryption, MailboxConfig};

use crate::connector::{MailboxConnector, MailboxSession, OpenMode};
use crate::MailError;

/// Default socket timeout for mailbox I/O (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connector backed by a real IMAP server
#[derive(Debug, Clone)]
pub struct ImapConnector {
    timeout: Duration,
}

impl ImapConnector {
    /// Create a connector with the default socket timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a connector with an explicit socket timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn open_tcp(&self, config: &MailboxConfig) -> Result<TcpStream, MailError> {
        let addrs = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| MailError::Connection(format!("{}: {}", config.host, e)))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(self.timeout))
                        .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
                        .map_err(|e| MailError::Connection(e.to_string()))?;
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(MailError::Connection(match last_error {
            Some(e) => format!("{}:{}: {}", config.host, config.port, e),
            None => format!("{}: no addresses resolved", config.host),
        }))
    }
}

impl Default for ImapConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MailboxConnector for ImapConnector {
    fn connect(
        &self,
        config: &MailboxConfig,
        mode: OpenMode,
    ) -> Result<Box<dyn MailboxSession>, MailError> {
        debug!(mailbox = %config.connection_string(), ?mode, "Opening mailbox");
        let tcp = self.open_tcp(config)?;

        match config.encryption {
            Encryption::None => {
                let mut client = imap::Client::new(tcp);
                client.read_greeting().map_err(connection_error)?;
                ImapSession::login(client, config, mode)
            }
            Encryption::Ssl => {
                let tls = tls_connector()?;
                let stream = tls
                    .connect(&config.host, tcp)
                    .map_err(|e| MailError::Connection(format!("TLS handshake failed: {}", e)))?;
                let mut client = imap::Client::new(stream);
                client.read_greeting().map_err(connection_error)?;
                ImapSession::login(client, config, mode)
            }
            Encryption::Tls | Encryption::StartTls => {
                let tls = tls_connector()?;
                let mut client = imap::Client::new(tcp);
                client.read_greeting().map_err(connection_error)?;
                let client = client
                    .secure(&config.host, &tls)
                    .map_err(|e| MailError::Connection(format!("STARTTLS failed: {}", e)))?;
                ImapSession::<TlsStream<TcpStream>>::login(client, config, mode)
            }
        }
    }
}

fn tls_connector() -> Result<TlsConnector, MailError> {
    TlsConnector::builder()
        .build()
        .map_err(|e| MailError::Connection(format!("TLS setup failed: {}", e)))
}

fn connection_error(error: imap::error::Error) -> MailError {
    MailError::Connection(error.to_string())
}

fn protocol_error(error: imap::error::Error) -> MailError {
    MailError::Protocol(error.to_string())
}

struct ImapSession<T: Read + Write> {
    session: imap::Session<T>,
}

impl<T: Read + Write + Send + 'static> ImapSession<T> {
    fn login(
        client: imap::Client<T>,
        config: &MailboxConfig,
        mode: OpenMode,
    ) -> Result<Box<dyn MailboxSession>, MailError> {
        let mut session = client
            .login(&config.username, &config.password)
            .map_err(|(e, _client)| MailError::Authentication(e.to_string()))?;

        if mode == OpenMode::Full {
            if let Err(e) = session.select(&config.mailbox) {
                let _ = session.logout();
                return Err(MailError::Connection(format!(
                    "Cannot open mailbox {}: {}",
                    config.mailbox, e
                )));
            }
        }

        Ok(Box::new(ImapSession { session }))
    }
}

impl<T: Read + Write> MailboxSession for ImapSession<T> {
    fn search_unseen(&mut self) -> Result<Vec<u32>, MailError> {
        let mut uids: Vec<u32> = self
            .session
            .uid_search("UNSEEN")
            .map_err(protocol_error)?
            .into_iter()
            .collect();
        // UIDs are strictly ascending in mailbox order
        uids.sort_unstable();
        Ok(uids)
    }

    fn fetch_raw(&mut self, uid: u32) -> Result<Vec<u8>, MailError> {
        let fetches = self
            .session
            .uid_fetch(uid.to_string(), "(UID BODY.PEEK[])")
            .map_err(protocol_error)?;

        fetches
            .iter()
            .find_map(|fetch| fetch.body().map(<[u8]>::to_vec))
            .ok_or_else(|| MailError::Protocol(format!("No body returned for UID {}", uid)))
    }

    fn add_seen_flag(&mut self, uids: &[u32]) -> Result<(), MailError> {
        let set = uids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.session
            .uid_store(set, "+FLAGS (\\Seen)")
            .map_err(protocol_error)?;
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<(), MailError> {
        self.session.logout().map_err(protocol_error)
    }
}
