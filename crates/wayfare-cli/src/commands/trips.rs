//! Trip command implementations.

use crate::cli::{EditArgs, LimitArgs, ManualArgs, PnrArgs};
use crate::commands::open_store;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{Formatter, TripView};
use serde_json::{json, Value};
use std::fs;
use wayfare_domain::{ManualFields, Trip, TripStore};
use wayfare_store::{SqliteTripStore, DEFAULT_RECENT_LIMIT};

/// Execute the trips command.
pub fn execute_trips(args: LimitArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let store = open_store(config)?;
    let trips = store.get_recent(args.limit.unwrap_or(DEFAULT_RECENT_LIMIT))?;
    formatter.format_trips(&trips)
}

/// Execute the latest command.
pub fn execute_latest(config: &Config, formatter: &Formatter) -> Result<String> {
    let store = open_store(config)?;
    match store.get_latest()? {
        Some(trip) => formatter.format_trip(&view(&store, trip)?),
        None => formatter.format_trips(&[]),
    }
}

/// Execute the show command.
pub fn execute_show(args: PnrArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let store = open_store(config)?;
    let trip = find(&store, &args.pnr)?;
    formatter.format_trip(&view(&store, trip)?)
}

/// Execute the manual command.
pub fn execute_manual(args: ManualArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let fields = parse_fields(&args.fields)?;
    let mut store = open_store(config)?;
    let trip = find(&store, &args.pnr)?;

    store.replace_manual_fields(trip.post_id, fields)?;
    let stored = store.manual_fields(trip.post_id)?;
    formatter.format_value(
        &stored,
        &format!("{} manual field(s) set on trip {}", stored.len(), trip.pnr),
    )
}

/// Execute the edit command.
pub fn execute_edit(args: EditArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let contents = fs::read_to_string(&args.file)?;
    let trip_data: Value = serde_json::from_str(&contents)?;

    let mut store = open_store(config)?;
    find(&store, &args.pnr)?;
    store.update_trip_data(&args.pnr, trip_data)?;

    let trip = find(&store, &args.pnr)?;
    formatter.format_value(&trip, &format!("Trip {} updated", trip.pnr))
}

/// Execute the resync command.
pub fn execute_resync(config: &Config, formatter: &Formatter) -> Result<String> {
    let mut store = open_store(config)?;
    let synced = store.sync_all_trip_meta()?;
    formatter.format_value(
        &json!({ "synced": synced }),
        &format!("Re-synced {} trip(s)", synced),
    )
}

fn find(store: &SqliteTripStore, pnr: &str) -> Result<Trip> {
    store
        .get_by_pnr(pnr)?
        .ok_or_else(|| CliError::TripNotFound(pnr.to_string()))
}

fn view(store: &SqliteTripStore, trip: Trip) -> Result<TripView> {
    Ok(TripView {
        manual_fields: store.manual_fields(trip.post_id)?,
        extracted_fields: store.extracted_fields(trip.post_id)?,
        share_link: store.share_link(trip.post_id)?,
        trip,
    })
}

/// Parse `key=value` arguments into manual fields.
pub fn parse_fields(pairs: &[String]) -> Result<ManualFields> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                CliError::InvalidInput(format!("Expected key=value, got '{}'", pair))
            })?;
            if key.trim().is_empty() {
                return Err(CliError::InvalidInput(format!("Empty key in '{}'", pair)));
            }
            Ok((key.trim().to_string(), value.to_string()))
        })
        .collect()
}
