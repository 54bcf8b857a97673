//! Trip records
//!
//! A trip is the persisted form of an itinerary, keyed by PNR. Imports replace
//! its `trip_data` and extracted mirror; manual fields belong to the operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Operator-entered overrides, e.g. `seat -> 12A`
pub type ManualFields = BTreeMap<String, String>;

/// Identifier of the display entity owned by a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing state of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Created but not yet parsed
    Pending,
    /// Parsed and validated
    #[default]
    Parsed,
    /// Last processing attempt failed
    Error,
}

impl TripStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::Parsed => "parsed",
            TripStatus::Error => "error",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TripStatus::Pending),
            "parsed" => Ok(TripStatus::Parsed),
            "error" => Ok(TripStatus::Error),
            other => Err(ConfigError::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// A persisted trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Row identifier
    pub id: i64,

    /// Booking reference (unique, case-sensitive)
    pub pnr: String,

    /// Processing state
    pub status: TripStatus,

    /// Last imported or edited itinerary payload
    pub trip_data: Value,

    /// Display entity for this trip
    pub post_id: PostId,

    /// When an import last touched this trip
    pub last_imported: Option<DateTime<Utc>>,

    /// Row creation time
    pub created_at: DateTime<Utc>,

    /// Last row modification time
    pub updated_at: DateTime<Utc>,
}

/// Listing view of a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    /// Booking reference
    pub pnr: String,

    /// Processing state
    pub status: TripStatus,

    /// When an import last touched this trip
    pub last_imported: Option<DateTime<Utc>>,

    /// Display entity for this trip
    pub post_id: PostId,
}

/// Input to an upsert
///
/// `extracted_fields` replaces the flattened mirror wholesale; `manual_fields`
/// is merged key by key into what is already stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TripUpsert {
    /// Booking reference
    pub pnr: String,

    /// New processing state
    pub status: TripStatus,

    /// Itinerary payload stored on the row
    pub trip_data: Value,

    /// Payload mirrored into the flattened field map
    pub extracted_fields: Value,

    /// Manual fields to merge; empty leaves the stored ones untouched
    pub manual_fields: ManualFields,
}

impl TripUpsert {
    /// Upsert for a freshly imported payload
    ///
    /// Stores the payload as both trip data and extracted fields and merges no
    /// manual fields.
    pub fn imported(pnr: impl Into<String>, payload: Value) -> Self {
        Self {
            pnr: pnr.into(),
            status: TripStatus::Parsed,
            extracted_fields: payload.clone(),
            trip_data: payload,
            manual_fields: ManualFields::new(),
        }
    }

    /// Override the status
    pub fn with_status(mut self, status: TripStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach manual fields to merge
    pub fn with_manual_fields(mut self, fields: ManualFields) -> Self {
        self.manual_fields = fields;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_round_trip() {
        for status in [TripStatus::Pending, TripStatus::Parsed, TripStatus::Error] {
            assert_eq!(status.as_str().parse::<TripStatus>().unwrap(), status);
        }
        assert!("PARSED".parse::<TripStatus>().is_err());
        assert_eq!(TripStatus::default(), TripStatus::Parsed);
    }

    #[test]
    fn test_imported_upsert() {
        let payload = json!({"pnr": "ABC123"});
        let upsert = TripUpsert::imported("ABC123", payload.clone());

        assert_eq!(upsert.status, TripStatus::Parsed);
        assert_eq!(upsert.trip_data, payload);
        assert_eq!(upsert.extracted_fields, payload);
        assert!(upsert.manual_fields.is_empty());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TripStatus::Error).unwrap(), "\"error\"");
    }
}
