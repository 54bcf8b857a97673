//! In-memory connector
//!
//! A scripted mailbox for tests and dry runs. Clones share state, so a test
//! can hand one clone to a client and inspect the other afterwards.

use std::sync::{Arc, Mutex, MutexGuard};
use wayfare_domain::MailboxConfig;

use crate::connector::{MailboxConnector, MailboxSession, OpenMode};
use crate::MailError;

#[derive(Debug, Clone)]
struct StoredMessage {
    uid: u32,
    raw: Vec<u8>,
    seen: bool,
}

#[derive(Debug, Default)]
struct State {
    messages: Vec<StoredMessage>,
    next_uid: u32,
    unreachable: Option<String>,
    reject_login: bool,
    fail_store: bool,
    connects: usize,
    open_sessions: usize,
}

/// Connector over an in-memory mailbox
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<State>>,
}

impl MemoryConnector {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an unseen message and return its UID
    pub fn deliver(&self, raw: impl Into<Vec<u8>>) -> u32 {
        let mut state = self.lock();
        state.next_uid += 1;
        let uid = state.next_uid;
        state.messages.push(StoredMessage {
            uid,
            raw: raw.into(),
            seen: false,
        });
        uid
    }

    /// Make every connection attempt fail as unreachable
    pub fn set_unreachable(&self, reason: impl Into<String>) {
        self.lock().unreachable = Some(reason.into());
    }

    /// Make every login attempt fail
    pub fn set_reject_login(&self, reject: bool) {
        self.lock().reject_login = reject;
    }

    /// Make flag updates fail
    pub fn set_fail_store(&self, fail: bool) {
        self.lock().fail_store = fail;
    }

    /// UIDs still unseen, in mailbox order
    pub fn unseen_uids(&self) -> Vec<u32> {
        self.lock()
            .messages
            .iter()
            .filter(|m| !m.seen)
            .map(|m| m.uid)
            .collect()
    }

    /// UIDs flagged seen, in mailbox order
    pub fn seen_uids(&self) -> Vec<u32> {
        self.lock()
            .messages
            .iter()
            .filter(|m| m.seen)
            .map(|m| m.uid)
            .collect()
    }

    /// Number of connection attempts so far
    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    /// Sessions opened and not yet closed
    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MailboxConnector for MemoryConnector {
    fn connect(
        &self,
        _config: &MailboxConfig,
        _mode: OpenMode,
    ) -> Result<Box<dyn MailboxSession>, MailError> {
        let mut state = self.lock();
        state.connects += 1;

        if let Some(reason) = &state.unreachable {
            return Err(MailError::Connection(reason.clone()));
        }
        if state.reject_login {
            return Err(MailError::Authentication("invalid credentials".to_string()));
        }

        state.open_sessions += 1;
        Ok(Box::new(MemorySession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemorySession {
    state: Arc<Mutex<State>>,
}

impl MemorySession {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MailboxSession for MemorySession {
    fn search_unseen(&mut self) -> Result<Vec<u32>, MailError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| !m.seen)
            .map(|m| m.uid)
            .collect())
    }

    fn fetch_raw(&mut self, uid: u32) -> Result<Vec<u8>, MailError> {
        self.lock()
            .messages
            .iter()
            .find(|m| m.uid == uid)
            .map(|m| m.raw.clone())
            .ok_or_else(|| MailError::Protocol(format!("No message with UID {}", uid)))
    }

    fn add_seen_flag(&mut self, uids: &[u32]) -> Result<(), MailError> {
        let mut state = self.lock();
        if state.fail_store {
            return Err(MailError::Protocol("STORE rejected".to_string()));
        }
        for message in state.messages.iter_mut() {
            if uids.contains(&message.uid) {
                message.seen = true;
            }
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), MailError> {
        let mut state = self.lock();
        state.open_sessions = state.open_sessions.saturating_sub(1);
        Ok(())
    }
}
