//! Wayfare CLI - Operator command line for the airline email importer.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wayfare_cli::commands;
use wayfare_cli::{Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> wayfare_cli::Result<String> {
    let config =
        Config::load(cli.config.as_deref())?.with_secrets(cli.imap_password, cli.api_key);
    debug!(
        config = ?cli.config,
        database = ?config.database,
        host = %config.mailbox.host,
        "Configuration loaded"
    );

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Import => commands::execute_import(&config, &formatter).await,
        Command::TestConnection => commands::execute_test_connection(&config, &formatter),
        Command::Inbox(args) => commands::execute_inbox(args, &config, &formatter),
        Command::Trips(args) => commands::execute_trips(args, &config, &formatter),
        Command::Latest => commands::execute_latest(&config, &formatter),
        Command::Show(args) => commands::execute_show(args, &config, &formatter),
        Command::Manual(args) => commands::execute_manual(args, &config, &formatter),
        Command::Edit(args) => commands::execute_edit(args, &config, &formatter),
        Command::Resync => commands::execute_resync(&config, &formatter),
        Command::Logs(args) => commands::execute_logs(args, &config, &formatter),
        Command::ShareLink(args) => commands::execute_share_link(args, &config, &formatter).await,
    }
}
