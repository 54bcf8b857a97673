//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use wayfare_domain::{FlatFields, LogEntry, ManualFields, MessagePreview, Severity, Trip, TripSummary};
use wayfare_importer::ImportReport;

/// One trip with its side maps, as shown by `show` and `latest`.
#[derive(Debug, Serialize)]
pub struct TripView {
    /// The stored trip
    #[serde(flatten)]
    pub trip: Trip,
    /// Operator-entered fields
    pub manual_fields: ManualFields,
    /// Flattened mirror of the trip data
    pub extracted_fields: FlatFields,
    /// Share page the trip was enriched from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_link: Option<String>,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an import report.
    pub fn format_report(&self, report: &ImportReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }

        let notice = report.notice();
        let mut out = if report.is_failed() {
            self.error(&notice)
        } else if report.summary.failed > 0 {
            self.warning(&notice)
        } else {
            self.success(&notice)
        };

        if !report.failures.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["UID", "Message-ID", "Reason"]);
            for failure in &report.failures {
                builder.push_record([
                    failure.uid.to_string(),
                    failure.message_id.clone(),
                    failure.reason.clone(),
                ]);
            }
            out.push('\n');
            out.push_str(&self.table(builder));
        }
        Ok(out)
    }

    /// Format trip summaries.
    pub fn format_trips(&self, trips: &[TripSummary]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(trips)?);
        }
        if trips.is_empty() {
            return Ok(self.colorize("No trips found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["PNR", "Status", "Last imported", "Post"]);
        for trip in trips {
            builder.push_record([
                trip.pnr.clone(),
                trip.status.to_string(),
                trip.last_imported.map(format_time).unwrap_or_default(),
                trip.post_id.to_string(),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format one trip with its field maps.
    pub fn format_trip(&self, view: &TripView) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(view)?);
        }

        let trip = &view.trip;
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["PNR".to_string(), trip.pnr.clone()]);
        builder.push_record(["Status".to_string(), trip.status.to_string()]);
        builder.push_record(["Post".to_string(), trip.post_id.to_string()]);
        builder.push_record([
            "Last imported".to_string(),
            trip.last_imported.map(format_time).unwrap_or_default(),
        ]);
        builder.push_record(["Created".to_string(), format_time(trip.created_at)]);
        builder.push_record(["Updated".to_string(), format_time(trip.updated_at)]);
        if let Some(link) = &view.share_link {
            builder.push_record(["Share link".to_string(), link.clone()]);
        }
        for (key, value) in &view.manual_fields {
            builder.push_record([format!("manual.{}", key), value.clone()]);
        }
        for (key, value) in &view.extracted_fields {
            builder.push_record([key.clone(), value.clone()]);
        }
        Ok(self.table(builder))
    }

    /// Format unseen message previews.
    pub fn format_previews(&self, previews: &[MessagePreview]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(previews)?);
        }
        if previews.is_empty() {
            return Ok(self.colorize("No unseen messages.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["UID", "From", "Subject", "Date", "Snippet"]);
        for preview in previews {
            builder.push_record([
                preview.uid.to_string(),
                preview.from.clone(),
                preview.subject.clone(),
                preview.date.clone(),
                preview.snippet.clone(),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format event log entries.
    pub fn format_logs(&self, entries: &[LogEntry]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(entries)?);
        }
        if entries.is_empty() {
            return Ok(self.colorize("No log entries.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Time", "Context", "Severity", "PNR", "Message"]);
        for entry in entries {
            let severity = match entry.severity {
                Severity::Error => self.colorize(entry.severity.as_str(), "red"),
                Severity::Info => entry.severity.as_str().to_string(),
            };
            builder.push_record([
                format_time(entry.created_at),
                entry.context.as_str().to_string(),
                severity,
                entry.pnr.clone().unwrap_or_default(),
                entry.message.clone(),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format a serializable value in JSON mode, or a message otherwise.
    pub fn format_value<T: Serialize>(&self, value: &T, message: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Table => Ok(self.success(message)),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wayfare_domain::{LogContext, PostId, TripStatus};

    fn trip() -> Trip {
        let now = Utc::now();
        Trip {
            id: 1,
            pnr: "ABC123".to_string(),
            status: TripStatus::Parsed,
            trip_data: json!({"pnr": "ABC123"}),
            post_id: PostId(7),
            last_imported: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_trips_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let trip = trip();
        let summary = TripSummary {
            pnr: trip.pnr.clone(),
            status: trip.status,
            last_imported: trip.last_imported,
            post_id: trip.post_id,
        };
        let output = formatter.format_trips(&[summary]).unwrap();
        assert!(output.contains("PNR"));
        assert!(output.contains("ABC123"));
        assert!(output.contains("parsed"));
    }

    #[test]
    fn test_empty_trips() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.format_trips(&[]).unwrap(), "No trips found.");
    }

    #[test]
    fn test_trip_json_flattens_trip() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let mut manual = ManualFields::new();
        manual.insert("seat".to_string(), "12A".to_string());
        let view = TripView {
            trip: trip(),
            manual_fields: manual,
            extracted_fields: FlatFields::new(),
            share_link: None,
        };

        let output = formatter.format_trip(&view).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["pnr"], "ABC123");
        assert_eq!(value["manual_fields"]["seat"], "12A");
        assert!(value.get("share_link").is_none());
    }

    #[test]
    fn test_logs_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let entry = LogEntry {
            id: 1,
            context: LogContext::Imap,
            severity: Severity::Error,
            message: "Mailbox connection failed".to_string(),
            pnr: None,
            message_id: None,
            created_at: Utc::now(),
        };
        let output = formatter.format_logs(&[entry]).unwrap();
        assert!(output.contains("imap"));
        assert!(output.contains("Mailbox connection failed"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }
}
