//! Share-link command implementation.

use crate::cli::ShareLinkArgs;
use crate::commands::{as_sink, open_log, open_store};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use wayfare_domain::{EventLog, LogContext, NewLogEntry, TripStore};
use wayfare_sharelink::{ShareLinkClient, ShareLinkConfig};

/// Execute the share-link command.
pub async fn execute_share_link(
    args: ShareLinkArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    let mut store = open_store(config)?;
    let trip = store
        .get_by_pnr(&args.pnr)?
        .ok_or_else(|| CliError::TripNotFound(args.pnr.clone()))?;

    let settings = if args.no_consent {
        ShareLinkConfig::without_consent()
    } else {
        ShareLinkConfig::default()
    };
    let log = open_log(config)?;
    let client = ShareLinkClient::new(settings, as_sink(&log))?;

    let payload = client.fetch_payload(&args.url).await?;
    store.store_share_payload(trip.post_id, &args.url, &payload)?;
    log.record(
        NewLogEntry::info(
            LogContext::ShareLink,
            format!("Stored share payload for trip {}", trip.pnr),
        )
        .with_pnr(trip.pnr.clone()),
    );

    formatter.format_value(
        &payload,
        &format!("Share payload stored for trip {}", trip.pnr),
    )
}
