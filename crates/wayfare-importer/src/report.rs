//! Import run reports

use serde::Serialize;
use std::fmt;
use wayfare_domain::PostId;

/// Where an import run is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    /// Not started
    Idle,
    /// Checking settings and mailbox reachability
    Connecting,
    /// Retrieving unseen messages
    Fetching,
    /// Extracting and storing one message
    ParsingMessage,
    /// Marking imported messages seen
    Reconciling,
    /// Finished, with or without work
    Done,
    /// Aborted before any message was processed
    Failed,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Idle => "idle",
            ImportStage::Connecting => "connecting",
            ImportStage::Fetching => "fetching",
            ImportStage::ParsingMessage => "parsing_message",
            ImportStage::Reconciling => "reconciling",
            ImportStage::Done => "done",
            ImportStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-run counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Messages extracted and stored
    pub succeeded: usize,
    /// Messages that failed extraction, validation, or storage
    pub failed: usize,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// Messages were processed
    Completed,
    /// The mailbox had no unseen messages
    NothingToDo,
    /// The run aborted at `stage`
    Failed {
        /// Stage that failed
        stage: ImportStage,
        /// Error description
        reason: String,
    },
}

/// A message that became a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedTrip {
    /// Mailbox UID
    pub uid: u32,
    /// Booking reference
    pub pnr: String,
    /// Display entity of the stored trip
    pub post_id: PostId,
}

/// A message that did not become a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageFailure {
    /// Mailbox UID
    pub uid: u32,
    /// Email `Message-ID`; empty when absent
    pub message_id: String,
    /// Error description
    pub reason: String,
}

/// Result of one import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// How the run ended
    #[serde(flatten)]
    pub outcome: ImportOutcome,
    /// Counts
    pub summary: ImportSummary,
    /// Stored trips, in mailbox order
    pub imported: Vec<ImportedTrip>,
    /// Failed messages, in mailbox order
    pub failures: Vec<MessageFailure>,
    /// UIDs flagged seen at the end of the run
    pub marked_seen: Vec<u32>,
    /// Stages entered, in order
    pub stages: Vec<ImportStage>,
}

impl ImportReport {
    pub(crate) fn new() -> Self {
        Self {
            outcome: ImportOutcome::Completed,
            summary: ImportSummary::default(),
            imported: Vec::new(),
            failures: Vec::new(),
            marked_seen: Vec::new(),
            stages: vec![ImportStage::Idle],
        }
    }

    /// Whether the run aborted
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ImportOutcome::Failed { .. })
    }

    /// One-line notice for the operator
    pub fn notice(&self) -> String {
        match &self.outcome {
            ImportOutcome::Completed => format!(
                "Import completed. {} imported, {} failed.",
                self.summary.succeeded, self.summary.failed
            ),
            ImportOutcome::NothingToDo => "No new airline emails found.".to_string(),
            ImportOutcome::Failed { reason, .. } => format!("Import failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice() {
        let mut report = ImportReport::new();
        report.summary = ImportSummary { succeeded: 8, failed: 2 };
        assert_eq!(report.notice(), "Import completed. 8 imported, 2 failed.");

        report.outcome = ImportOutcome::NothingToDo;
        assert_eq!(report.notice(), "No new airline emails found.");

        report.outcome = ImportOutcome::Failed {
            stage: ImportStage::Connecting,
            reason: "refused".to_string(),
        };
        assert!(report.is_failed());
        assert_eq!(report.notice(), "Import failed: refused");
    }

    #[test]
    fn test_new_report_starts_idle() {
        let report = ImportReport::new();
        assert_eq!(report.stages, vec![ImportStage::Idle]);
        assert!(!report.is_failed());
    }
}
