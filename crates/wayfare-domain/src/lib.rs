//! Wayfare Domain Layer
//!
//! Core model and trait interfaces for the email-to-trip pipeline. Every other
//! crate in the workspace depends on this one; it carries no I/O of its own.
//!
//! ## Key Concepts
//!
//! - **Trip**: A persisted itinerary keyed by its booking reference (PNR)
//! - **Manual fields**: Operator-entered overrides that imports never clobber
//! - **Extracted fields**: A flattened `path -> value` mirror of trip data
//! - **Event log**: Append-only operational records (`imap`, `extraction`, `import`)
//!
//! ## Architecture
//!
//! - Pure data types and functions only
//! - Infrastructure implementations (SQLite, IMAP, HTTP) live in other crates
//! - Trait definitions for the seams between components

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod fields;
pub mod log;
pub mod message;
pub mod traits;
pub mod trip;

// Re-exports for convenience
pub use config::{ConfigError, Encryption, MailboxConfig};
pub use fields::{build_meta_key, flatten, rebuild, FlatFields, EXTRACTED_META_PREFIX};
pub use log::{LogContext, LogEntry, MemoryEventLog, NewLogEntry, Severity};
pub use message::{ContextHints, MailboxMessage, MessagePreview};
pub use trip::{ManualFields, PostId, Trip, TripStatus, TripSummary, TripUpsert};
pub use traits::{CompletionProvider, CompletionRequest, EventLog, TripStore};
