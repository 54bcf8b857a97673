//! Logs command implementation.

use crate::cli::LimitArgs;
use crate::commands::open_log;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use wayfare_store::DEFAULT_LOG_LIMIT;

/// Execute the logs command.
pub fn execute_logs(args: LimitArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let log = open_log(config)?;
    let entries = log.recent(args.limit.unwrap_or(DEFAULT_LOG_LIMIT))?;
    formatter.format_logs(&entries)
}
