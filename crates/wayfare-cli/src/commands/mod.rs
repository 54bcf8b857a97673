//! Command implementations.
//!
//! Each command returns its rendered output; `main` prints it.

pub mod import;
pub mod logs;
pub mod mailbox;
pub mod share_link;
pub mod trips;

pub use self::import::{execute_import, run_import};
pub use self::logs::execute_logs;
pub use self::mailbox::{execute_inbox, execute_test_connection};
pub use self::share_link::execute_share_link;
pub use self::trips::{
    execute_edit, execute_latest, execute_manual, execute_resync, execute_show, execute_trips,
};

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;
use wayfare_domain::EventLog;
use wayfare_store::{SqliteEventLog, SqliteTripStore};

/// Open the trip store at the configured database path.
pub fn open_store(config: &Config) -> Result<SqliteTripStore> {
    Ok(SqliteTripStore::new(config.database_path()?)?)
}

/// Open the event log at the configured database path.
pub fn open_log(config: &Config) -> Result<Arc<SqliteEventLog>> {
    Ok(Arc::new(SqliteEventLog::new(config.database_path()?)?))
}

fn as_sink(log: &Arc<SqliteEventLog>) -> Arc<dyn EventLog> {
    log.clone()
}
