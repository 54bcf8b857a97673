//! The import run
//!
//! One run walks `Idle -> Connecting -> Fetching -> ParsingMessage* ->
//! Reconciling -> Done`, or ends in `Failed` when settings are missing or
//! the mailbox cannot be reached. Per-message failures never abort a run.

use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use wayfare_domain::{
    CompletionProvider, EventLog, LogContext, MailboxConfig, MailboxMessage, NewLogEntry,
    TripStore, TripUpsert,
};
use wayfare_extractor::ItineraryExtractor;
use wayfare_llm::LlmError;
use wayfare_mail::{MailClient, MailError, MailboxConnector, DEFAULT_FETCH_LIMIT};

use crate::report::{
    ImportOutcome, ImportReport, ImportStage, ImportedTrip, MessageFailure,
};

/// Run parameters
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// Mailbox to poll
    pub mailbox: MailboxConfig,
    /// Maximum number of messages taken per run
    pub batch_limit: usize,
}

impl ImportSettings {
    /// Settings with the default batch size
    pub fn new(mailbox: MailboxConfig) -> Self {
        Self {
            mailbox,
            batch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    /// Override the batch size
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }
}

/// Pulls unseen airline emails into the trip store
pub struct Importer<C, P, S> {
    settings: ImportSettings,
    mail: Arc<MailClient<C>>,
    extractor: ItineraryExtractor<P>,
    store: Arc<Mutex<S>>,
    log: Arc<dyn EventLog>,
    stage: ImportStage,
}

impl<C, P, S> Importer<C, P, S>
where
    C: MailboxConnector + 'static,
    P: CompletionProvider<Error = LlmError>,
    S: TripStore,
    S::Error: Display,
{
    /// Create a new importer
    pub fn new(
        settings: ImportSettings,
        mail: Arc<MailClient<C>>,
        extractor: ItineraryExtractor<P>,
        store: Arc<Mutex<S>>,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            settings,
            mail,
            extractor,
            store,
            log,
            stage: ImportStage::Idle,
        }
    }

    /// Stage reached by the last run
    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    /// Run one import pass
    ///
    /// Never returns an error: the outcome, counts and per-message failures
    /// are all carried by the report.
    pub async fn run(&mut self) -> ImportReport {
        let mut report = ImportReport::new();
        self.enter(ImportStage::Connecting, &mut report);

        if let Err(reason) = self.check_settings() {
            self.log.record(NewLogEntry::error(
                LogContext::Import,
                format!("Import aborted: {}", reason),
            ));
            return self.fail(report, ImportStage::Connecting, reason);
        }

        if let Err(e) = self.with_mail(|mail, config, _| mail.test_connection(config)).await {
            return self.fail(report, ImportStage::Connecting, e.to_string());
        }

        self.enter(ImportStage::Fetching, &mut report);
        let messages = match self
            .with_mail(|mail, config, limit| mail.fetch_unseen(config, limit))
            .await
        {
            Ok(messages) => messages,
            Err(e) => return self.fail(report, ImportStage::Fetching, e.to_string()),
        };

        if messages.is_empty() {
            self.log.record(NewLogEntry::info(
                LogContext::Import,
                "No new airline emails found.",
            ));
            report.outcome = ImportOutcome::NothingToDo;
            self.enter(ImportStage::Done, &mut report);
            return report;
        }

        let mut imported_uids = Vec::new();
        for message in &messages {
            self.enter(ImportStage::ParsingMessage, &mut report);
            match self.import_message(message).await {
                Ok(trip) => {
                    imported_uids.push(trip.uid);
                    report.imported.push(trip);
                    report.summary.succeeded += 1;
                }
                Err(failure) => {
                    report.failures.push(failure);
                    report.summary.failed += 1;
                }
            }
        }

        self.enter(ImportStage::Reconciling, &mut report);
        if !imported_uids.is_empty() {
            let uids = imported_uids.clone();
            match self
                .with_mail(move |mail, config, _| mail.mark_seen(config, &uids))
                .await
            {
                Ok(()) => report.marked_seen = imported_uids,
                // Already in the event log; the messages are retried next run.
                Err(e) => warn!(error = %e, "Imported messages left unseen"),
            }
        }

        report.outcome = ImportOutcome::Completed;
        self.enter(ImportStage::Done, &mut report);
        info!(
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            "Import run finished"
        );
        report
    }

    fn check_settings(&self) -> Result<(), String> {
        self.settings
            .mailbox
            .validate()
            .map_err(|e| e.to_string())?;
        self.extractor
            .check_configuration()
            .map_err(|e| e.to_string())
    }

    async fn import_message(&self, message: &MailboxMessage) -> Result<ImportedTrip, MessageFailure> {
        let failure = |reason: String| MessageFailure {
            uid: message.uid,
            message_id: message.message_id.clone(),
            reason,
        };
        let message_id = Some(message.message_id.as_str());

        let itinerary = self
            .extractor
            .extract(&message.body, &message.hints())
            .await
            .map_err(|e| failure(e.to_string()))?;

        let pnr = itinerary.pnr().trim().to_string();
        let upsert = TripUpsert::imported(pnr.clone(), itinerary.into_value());
        let stored = {
            let mut store = self.store.lock().unwrap_or_else(|p| p.into_inner());
            store.upsert_trip(upsert).map_err(|e| e.to_string())
        };

        match stored {
            Ok(post_id) => {
                let source = if message.message_id.is_empty() {
                    "unknown message"
                } else {
                    message.message_id.as_str()
                };
                self.log.record(
                    NewLogEntry::info(
                        LogContext::Import,
                        format!("Imported trip {} from {}", pnr, source),
                    )
                    .with_pnr(pnr.clone())
                    .with_message_id(message_id),
                );
                debug!(uid = message.uid, pnr = %pnr, "Message imported");
                Ok(ImportedTrip {
                    uid: message.uid,
                    pnr,
                    post_id,
                })
            }
            Err(reason) => {
                self.log.record(
                    NewLogEntry::error(
                        LogContext::Import,
                        format!("Failed to import email: {}", reason),
                    )
                    .with_pnr(pnr)
                    .with_message_id(message_id),
                );
                Err(failure(reason))
            }
        }
    }

    /// Run a blocking mailbox call off the async executor
    async fn with_mail<T, F>(&self, call: F) -> Result<T, MailError>
    where
        T: Send + 'static,
        F: FnOnce(&MailClient<C>, &MailboxConfig, usize) -> Result<T, MailError> + Send + 'static,
    {
        let mail = Arc::clone(&self.mail);
        let config = self.settings.mailbox.clone();
        let limit = self.settings.batch_limit;

        match tokio::task::spawn_blocking(move || call(&mail, &config, limit)).await {
            Ok(result) => result,
            Err(e) => {
                let error = MailError::Connection(format!("mailbox task failed: {}", e));
                self.log
                    .record(NewLogEntry::error(LogContext::Imap, error.to_string()));
                Err(error)
            }
        }
    }

    fn enter(&mut self, stage: ImportStage, report: &mut ImportReport) {
        debug!(stage = %stage, "Import stage");
        self.stage = stage;
        report.stages.push(stage);
    }

    fn fail(&mut self, mut report: ImportReport, stage: ImportStage, reason: String) -> ImportReport {
        warn!(stage = %stage, reason = %reason, "Import run failed");
        report.outcome = ImportOutcome::Failed { stage, reason };
        self.enter(ImportStage::Failed, &mut report);
        report
    }
}
