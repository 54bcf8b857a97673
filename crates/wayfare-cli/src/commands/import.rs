//! Import command implementation.

use crate::commands::{as_sink, open_log, open_store};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::sync::{Arc, Mutex};
use wayfare_domain::CompletionProvider;
use wayfare_extractor::ItineraryExtractor;
use wayfare_importer::{ImportReport, ImportSettings, Importer};
use wayfare_llm::{LlmError, OpenAiProvider};
use wayfare_mail::{ImapConnector, MailClient, MailboxConnector};

/// Execute the import command.
pub async fn execute_import(config: &Config, formatter: &Formatter) -> Result<String> {
    let extraction = &config.extraction;
    let provider = OpenAiProvider::with_timeout(
        &extraction.endpoint,
        &extraction.model,
        &extraction.api_key,
        extraction.timeout_secs,
    )?;

    let report = run_import(config, ImapConnector::new(), provider).await?;
    let output = formatter.format_report(&report)?;

    if report.is_failed() {
        if formatter.format() == OutputFormat::Json {
            println!("{}", output);
        }
        return Err(CliError::Import(report.notice()));
    }
    Ok(output)
}

/// Run one import pass against the configured database.
pub async fn run_import<C, P>(config: &Config, connector: C, provider: P) -> Result<ImportReport>
where
    C: MailboxConnector + 'static,
    P: CompletionProvider<Error = LlmError>,
{
    let log = open_log(config)?;
    let store = Arc::new(Mutex::new(open_store(config)?));

    let mail = Arc::new(MailClient::new(connector, as_sink(&log)));
    let extractor = ItineraryExtractor::new(provider, config.extraction.clone(), as_sink(&log));
    let settings =
        ImportSettings::new(config.mailbox.clone()).with_batch_limit(config.import.batch_limit);

    let mut importer = Importer::new(settings, mail, extractor, store, as_sink(&log));
    Ok(importer.run().await)
}
