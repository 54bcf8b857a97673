//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wayfare CLI - Import airline confirmation emails as structured trips.
#[derive(Debug, Parser)]
#[command(name = "wayfare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// IMAP password, overriding the configuration file
    #[arg(long, env = "WAYFARE_IMAP_PASSWORD", global = true, hide_env_values = true)]
    pub imap_password: Option<String>,

    /// Completion API key, overriding the configuration file
    #[arg(long, env = "WAYFARE_OPENAI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import unseen airline emails as trips
    Import,

    /// Check mailbox credentials and reachability
    TestConnection,

    /// Preview unseen messages without changing them
    Inbox(LimitArgs),

    /// List recently imported trips
    Trips(LimitArgs),

    /// Show the most recently imported trip
    Latest,

    /// Show one trip with its manual and extracted fields
    Show(PnrArgs),

    /// Replace a trip's manual fields
    Manual(ManualArgs),

    /// Replace a trip's data from a JSON file
    Edit(EditArgs),

    /// Rebuild the extracted-field mirror for every trip
    Resync,

    /// Show recent event log entries
    Logs(LimitArgs),

    /// Fetch a share page and store its payload on a trip
    ShareLink(ShareLinkArgs),
}

/// Arguments for commands that list entries.
#[derive(Debug, Parser)]
pub struct LimitArgs {
    /// Maximum number of entries
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments naming one trip.
#[derive(Debug, Parser)]
pub struct PnrArgs {
    /// Booking reference
    pub pnr: String,
}

/// Arguments for the manual command.
#[derive(Debug, Parser)]
pub struct ManualArgs {
    /// Booking reference
    pub pnr: String,

    /// Fields as key=value; none clears every manual field
    pub fields: Vec<String>,
}

/// Arguments for the edit command.
#[derive(Debug, Parser)]
pub struct EditArgs {
    /// Booking reference
    pub pnr: String,

    /// JSON file holding the full itinerary
    #[arg(long)]
    pub file: PathBuf,
}

/// Arguments for the share-link command.
#[derive(Debug, Parser)]
pub struct ShareLinkArgs {
    /// Booking reference
    pub pnr: String,

    /// Public share page URL
    pub url: String,

    /// Skip the consent request before fetching
    #[arg(long)]
    pub no_consent: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
