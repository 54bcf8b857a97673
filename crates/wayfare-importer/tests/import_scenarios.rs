//! End-to-end import runs over an in-memory mailbox, a scripted model and
//! an in-memory SQLite store.

use std::sync::{Arc, Mutex};
use wayfare_domain::{
    Encryption, FlatFields, LogContext, MailboxConfig, ManualFields, MemoryEventLog, PostId,
    Severity, Trip, TripStatus, TripStore, TripSummary, TripUpsert,
};
use wayfare_extractor::{ExtractorConfig, ItineraryExtractor};
use wayfare_importer::{ImportOutcome, ImportSettings, ImportStage, Importer};
use wayfare_llm::MockProvider;
use wayfare_mail::{MailClient, MemoryConnector};
use wayfare_store::SqliteTripStore;

fn mailbox() -> MailboxConfig {
    MailboxConfig {
        host: "imap.example.com".to_string(),
        port: 993,
        username: "trips@example.com".to_string(),
        password: "secret".to_string(),
        mailbox: "INBOX".to_string(),
        encryption: Encryption::Ssl,
    }
}

fn itinerary(pnr: &str) -> String {
    format!(
        r#"{{
            "pnr": "{}",
            "airline": "KLM",
            "passengers": [{{"name": "Jane Doe"}}],
            "journeys": [{{"segments": [{{
                "flight_number": "KL1290",
                "departure": "BLL",
                "arrival": "AMS",
                "departure_time": "2025-12-27T06:00:00",
                "arrival_time": "2025-12-27T07:15:00"
            }}]}}]
        }}"#,
        pnr
    )
}

fn email(tag: &str) -> String {
    format!(
        "From: KLM <noreply@klm.com>\r\nSubject: Booking {tag}\r\nMessage-ID: <{tag}@klm.com>\r\nDate: Mon, 1 Dec 2025 10:00:00 +0000\r\n\r\nBooking {tag} confirmed\r\n",
        tag = tag
    )
}

struct Harness {
    connector: MemoryConnector,
    provider: MockProvider,
    log: Arc<MemoryEventLog>,
    store: Arc<Mutex<SqliteTripStore>>,
}

impl Harness {
    fn new(provider: MockProvider) -> Self {
        Self {
            connector: MemoryConnector::new(),
            provider,
            log: Arc::new(MemoryEventLog::new()),
            store: Arc::new(Mutex::new(SqliteTripStore::new(":memory:").unwrap())),
        }
    }

    fn importer(&self, api_key: &str) -> Importer<MemoryConnector, MockProvider, SqliteTripStore> {
        let mail = Arc::new(MailClient::new(self.connector.clone(), self.log.clone()));
        let extractor = ItineraryExtractor::new(
            self.provider.clone(),
            ExtractorConfig::default().with_api_key(api_key),
            self.log.clone(),
        );
        Importer::new(
            ImportSettings::new(mailbox()),
            mail,
            extractor,
            self.store.clone(),
            self.log.clone(),
        )
    }

    fn trip(&self, pnr: &str) -> Option<Trip> {
        self.store.lock().unwrap().get_by_pnr(pnr).unwrap()
    }
}

#[tokio::test]
async fn test_mixed_batch_imports_valid_messages() {
    let mut provider = MockProvider::default();
    provider.add_response("Booking AAA111", itinerary("AAA111"));
    provider.add_response("Booking BBB222", itinerary("BBB222"));
    provider.add_response("Booking BROKEN", r#"{"pnr": "ZZZ999", "airline": "KLM"}"#);

    let harness = Harness::new(provider);
    let first = harness.connector.deliver(email("AAA111"));
    let broken = harness.connector.deliver(email("BROKEN"));
    let second = harness.connector.deliver(email("BBB222"));

    let mut importer = harness.importer("sk-test");
    let report = importer.run().await;

    assert_eq!(report.outcome, ImportOutcome::Completed);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.notice(), "Import completed. 2 imported, 1 failed.");
    assert_eq!(importer.stage(), ImportStage::Done);

    assert_eq!(report.marked_seen, vec![first, second]);
    assert_eq!(harness.connector.seen_uids(), vec![first, second]);
    assert_eq!(harness.connector.unseen_uids(), vec![broken]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].uid, broken);
    assert_eq!(report.failures[0].message_id, "<BROKEN@klm.com>");

    assert_eq!(harness.log.count(Severity::Error), 1);
    assert_eq!(harness.log.count_in(LogContext::Extraction, Severity::Error), 1);
    assert_eq!(harness.log.count(Severity::Info), 2);
    assert_eq!(harness.log.count_in(LogContext::Import, Severity::Info), 2);

    let trip = harness.trip("AAA111").unwrap();
    assert_eq!(trip.status, TripStatus::Parsed);
    assert!(trip.last_imported.is_some());
    assert!(harness.trip("BBB222").is_some());
    assert!(harness.trip("ZZZ999").is_none());
}

#[tokio::test]
async fn test_import_log_names_trip_and_message() {
    let mut provider = MockProvider::default();
    provider.add_response("Booking AAA111", itinerary("AAA111"));
    let harness = Harness::new(provider);
    harness.connector.deliver(email("AAA111"));

    harness.importer("sk-test").run().await;

    let entries = harness.log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "Imported trip AAA111 from <AAA111@klm.com>");
    assert_eq!(entries[0].pnr.as_deref(), Some("AAA111"));
    assert_eq!(entries[0].message_id.as_deref(), Some("<AAA111@klm.com>"));
}

#[tokio::test]
async fn test_padded_pnr_is_reported_as_stored() {
    let mut provider = MockProvider::default();
    provider.add_response("Booking AAA111", itinerary(" AAA111 "));
    let harness = Harness::new(provider);
    harness.connector.deliver(email("AAA111"));

    let report = harness.importer("sk-test").run().await;

    assert_eq!(report.imported.len(), 1);
    assert_eq!(report.imported[0].pnr, "AAA111");
    assert!(harness.trip("AAA111").is_some());

    let entries = harness.log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "Imported trip AAA111 from <AAA111@klm.com>");
    assert_eq!(entries[0].pnr.as_deref(), Some("AAA111"));
}

#[tokio::test]
async fn test_missing_message_id_reads_unknown() {
    let mut provider = MockProvider::default();
    provider.add_response("Booking AAA111", itinerary("AAA111"));
    let harness = Harness::new(provider);
    harness
        .connector
        .deliver("Subject: Booking\r\n\r\nBooking AAA111 confirmed\r\n");

    harness.importer("sk-test").run().await;

    let entries = harness.log.entries();
    assert_eq!(entries[0].message, "Imported trip AAA111 from unknown message");
    assert_eq!(entries[0].message_id, None);
}

#[tokio::test]
async fn test_unreachable_mailbox_fails_run() {
    let harness = Harness::new(MockProvider::default());
    harness.connector.deliver(email("AAA111"));
    harness.connector.set_unreachable("connection refused");

    let mut importer = harness.importer("sk-test");
    let report = importer.run().await;

    assert!(report.is_failed());
    assert!(matches!(
        report.outcome,
        ImportOutcome::Failed { stage: ImportStage::Connecting, .. }
    ));
    assert_eq!(importer.stage(), ImportStage::Failed);
    assert_eq!(
        report.stages,
        vec![ImportStage::Idle, ImportStage::Connecting, ImportStage::Failed]
    );
    assert!(report.imported.is_empty());
    assert_eq!(harness.provider.call_count(), 0);
    assert_eq!(harness.store.lock().unwrap().count().unwrap(), 0);

    let entries = harness.log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].context, LogContext::Imap);
    assert_eq!(entries[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_rejected_login_fails_run() {
    let harness = Harness::new(MockProvider::default());
    harness.connector.set_reject_login(true);

    let report = harness.importer("sk-test").run().await;

    assert!(report.is_failed());
    assert_eq!(harness.log.count_in(LogContext::Imap, Severity::Error), 1);
    assert_eq!(harness.log.entries().len(), 1);
}

#[tokio::test]
async fn test_non_json_reply_leaves_message_unseen() {
    let harness = Harness::new(MockProvider::new("Sorry, I cannot help with that."));
    let uid = harness.connector.deliver(email("AAA111"));

    let report = harness.importer("sk-test").run().await;

    assert_eq!(report.summary.succeeded, 0);
    assert_eq!(report.summary.failed, 1);
    assert!(report.marked_seen.is_empty());
    assert_eq!(harness.connector.unseen_uids(), vec![uid]);
    assert!(harness.trip("AAA111").is_none());
    assert_eq!(harness.log.count_in(LogContext::Extraction, Severity::Error), 1);
    assert_eq!(harness.log.entries().len(), 1);
}

#[tokio::test]
async fn test_empty_mailbox_is_nothing_to_do() {
    let harness = Harness::new(MockProvider::default());

    let report = harness.importer("sk-test").run().await;

    assert_eq!(report.outcome, ImportOutcome::NothingToDo);
    assert_eq!(report.notice(), "No new airline emails found.");
    assert_eq!(harness.provider.call_count(), 0);
    assert_eq!(harness.log.count(Severity::Info), 1);
    assert_eq!(harness.log.count(Severity::Error), 0);
}

#[tokio::test]
async fn test_missing_api_key_skips_mailbox() {
    let harness = Harness::new(MockProvider::default());
    harness.connector.deliver(email("AAA111"));

    let report = harness.importer("").run().await;

    assert!(report.is_failed());
    assert_eq!(harness.connector.connect_count(), 0);
    assert_eq!(harness.connector.unseen_uids().len(), 1);
    assert_eq!(harness.log.count_in(LogContext::Import, Severity::Error), 1);
    assert_eq!(harness.log.entries().len(), 1);
}

#[tokio::test]
async fn test_mark_seen_failure_keeps_imports() {
    let mut provider = MockProvider::default();
    provider.add_response("Booking AAA111", itinerary("AAA111"));
    let harness = Harness::new(provider);
    let uid = harness.connector.deliver(email("AAA111"));
    harness.connector.set_fail_store(true);

    let report = harness.importer("sk-test").run().await;

    assert_eq!(report.outcome, ImportOutcome::Completed);
    assert_eq!(report.summary.succeeded, 1);
    assert!(report.marked_seen.is_empty());
    assert_eq!(harness.connector.unseen_uids(), vec![uid]);
    assert!(harness.trip("AAA111").is_some());
    assert_eq!(harness.log.count_in(LogContext::Imap, Severity::Error), 1);
}

#[tokio::test]
async fn test_reimport_preserves_manual_fields() {
    let mut provider = MockProvider::default();
    provider.add_response("Booking AAA111", itinerary("AAA111"));
    let harness = Harness::new(provider);
    harness.connector.deliver(email("AAA111"));
    harness.importer("sk-test").run().await;

    let post_id = harness.trip("AAA111").unwrap().post_id;
    let mut manual = ManualFields::new();
    manual.insert("seat".to_string(), "12A".to_string());
    harness
        .store
        .lock()
        .unwrap()
        .replace_manual_fields(post_id, manual.clone())
        .unwrap();

    harness.connector.deliver(email("AAA111"));
    let report = harness.importer("sk-test").run().await;

    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.imported[0].post_id, post_id);
    let store = harness.store.lock().unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.manual_fields(post_id).unwrap(), manual);
}

#[tokio::test]
async fn test_failed_message_retried_next_run() {
    let harness = Harness::new(MockProvider::new("not json"));
    let uid = harness.connector.deliver(email("AAA111"));
    harness.importer("sk-test").run().await;
    assert_eq!(harness.connector.unseen_uids(), vec![uid]);

    let mut provider = MockProvider::default();
    provider.add_response("Booking AAA111", itinerary("AAA111"));
    let retry = Harness {
        connector: harness.connector.clone(),
        provider,
        log: harness.log.clone(),
        store: harness.store.clone(),
    };
    let report = retry.importer("sk-test").run().await;

    assert_eq!(report.summary.succeeded, 1);
    assert!(retry.connector.unseen_uids().is_empty());
    assert!(retry.trip("AAA111").is_some());
}

#[tokio::test]
async fn test_batch_limit_caps_messages() {
    let harness = Harness::new(MockProvider::new(itinerary("AAA111")));
    for i in 0..4 {
        harness.connector.deliver(email(&format!("M{}", i)));
    }

    let mail = Arc::new(MailClient::new(harness.connector.clone(), harness.log.clone()));
    let extractor = ItineraryExtractor::new(
        harness.provider.clone(),
        ExtractorConfig::default().with_api_key("sk-test"),
        harness.log.clone(),
    );
    let mut importer = Importer::new(
        ImportSettings::new(mailbox()).with_batch_limit(2),
        mail,
        extractor,
        harness.store.clone(),
        harness.log.clone(),
    );
    let report = importer.run().await;

    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(harness.connector.unseen_uids().len(), 2);
}

/// Store that refuses every write
struct FailingStore;

#[derive(Debug)]
struct Refused;

impl std::fmt::Display for Refused {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("database is locked")
    }
}

impl TripStore for FailingStore {
    type Error = Refused;

    fn upsert_trip(&mut self, _upsert: TripUpsert) -> Result<PostId, Refused> {
        Err(Refused)
    }

    fn replace_manual_fields(&mut self, _post_id: PostId, _fields: ManualFields) -> Result<(), Refused> {
        Err(Refused)
    }

    fn update_trip_data(&mut self, _pnr: &str, _trip_data: serde_json::Value) -> Result<(), Refused> {
        Err(Refused)
    }

    fn get_by_pnr(&self, _pnr: &str) -> Result<Option<Trip>, Refused> {
        Ok(None)
    }

    fn get_latest(&self) -> Result<Option<Trip>, Refused> {
        Ok(None)
    }

    fn get_recent(&self, _limit: usize) -> Result<Vec<TripSummary>, Refused> {
        Ok(Vec::new())
    }

    fn manual_fields(&self, _post_id: PostId) -> Result<ManualFields, Refused> {
        Ok(ManualFields::new())
    }

    fn extracted_fields(&self, _post_id: PostId) -> Result<FlatFields, Refused> {
        Ok(FlatFields::new())
    }
}

#[tokio::test]
async fn test_store_failure_logged_as_import_error() {
    let connector = MemoryConnector::new();
    let uid = connector.deliver(email("AAA111"));
    let log = Arc::new(MemoryEventLog::new());

    let mail = Arc::new(MailClient::new(connector.clone(), log.clone()));
    let extractor = ItineraryExtractor::new(
        MockProvider::new(itinerary("AAA111")),
        ExtractorConfig::default().with_api_key("sk-test"),
        log.clone(),
    );
    let mut importer = Importer::new(
        ImportSettings::new(mailbox()),
        mail,
        extractor,
        Arc::new(Mutex::new(FailingStore)),
        log.clone(),
    );
    let report = importer.run().await;

    assert_eq!(report.summary.failed, 1);
    assert_eq!(connector.unseen_uids(), vec![uid]);

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].context, LogContext::Import);
    assert_eq!(entries[0].severity, Severity::Error);
    assert_eq!(entries[0].message, "Failed to import email: database is locked");
    assert_eq!(entries[0].pnr.as_deref(), Some("AAA111"));
}
