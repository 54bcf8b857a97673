//! Mailbox command implementations.

use crate::cli::LimitArgs;
use crate::commands::{as_sink, open_log};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use wayfare_mail::{ImapConnector, MailClient, DEFAULT_FETCH_LIMIT};

/// Execute the test-connection command.
pub fn execute_test_connection(config: &Config, formatter: &Formatter) -> Result<String> {
    let log = open_log(config)?;
    let client = MailClient::new(ImapConnector::new(), as_sink(&log));

    tokio::task::block_in_place(|| client.test_connection(&config.mailbox))?;
    Ok(formatter.success(&format!(
        "Connected to {}",
        config.mailbox.connection_string()
    )))
}

/// Execute the inbox command.
pub fn execute_inbox(args: LimitArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let log = open_log(config)?;
    let client = MailClient::new(ImapConnector::new(), as_sink(&log));
    let limit = args.limit.unwrap_or(DEFAULT_FETCH_LIMIT);

    let previews = tokio::task::block_in_place(|| client.preview_unseen(&config.mailbox, limit))?;
    formatter.format_previews(&previews)
}
