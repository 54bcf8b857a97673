//! Wayfare Storage Layer
//!
//! Implements the `TripStore` and `EventLog` traits on SQLite.
//!
//! # Architecture
//!
//! - `trips`: one row per PNR, with the last imported itinerary as JSON
//! - `trip_posts`: the display entity each trip owns
//! - `post_meta`: flattened extracted fields, the manual field map,
//!   share-page link and payload
//! - `event_log`: append-only operational entries
//!
//! Imports replace the extracted mirror wholesale and merge manual fields;
//! only an explicit replace removes a manual field.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use wayfare_domain::{TripStore, TripUpsert};
//! use wayfare_store::SqliteTripStore;
//!
//! let mut store = SqliteTripStore::new(":memory:").unwrap();
//! let post_id = store
//!     .upsert_trip(TripUpsert::imported("ABC123", json!({"pnr": "ABC123"})))
//!     .unwrap();
//! assert_eq!(store.get_by_pnr("ABC123").unwrap().unwrap().post_id, post_id);
//! ```

#![warn(missing_docs)]

mod error;
mod event_log;
mod meta;
mod trips;

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub use error::StoreError;
pub use event_log::{SqliteEventLog, DEFAULT_LOG_LIMIT};
pub use meta::{sanitize_key, sanitize_value};
pub use trips::{SqliteTripStore, DEFAULT_RECENT_LIMIT};

/// Open a connection and make sure the schema exists
fn open_connection<P: AsRef<Path>>(path: P) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(include_str!("schema.sql"))?;
    Ok(conn)
}
