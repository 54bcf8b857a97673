//! SQLite trip store

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};
use wayfare_domain::{FlatFields, ManualFields, PostId, Trip, TripStatus, TripStore, TripSummary, TripUpsert};

use crate::meta;
use crate::StoreError;

/// Default number of trips returned by [`TripStore::get_recent`] callers
pub const DEFAULT_RECENT_LIMIT: usize = 20;

const TRIP_COLUMNS: &str =
    "id, pnr, status, trip_data, post_id, last_imported, created_at, updated_at";

/// SQLite-based implementation of TripStore
///
/// Trips live in the `trips` table keyed by PNR. Each trip owns a display
/// entity in `trip_posts`; the flattened extracted mirror, the manual field
/// map, and share-page data hang off that entity in `post_meta`.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store behind a mutex or
/// open one per thread.
pub struct SqliteTripStore {
    conn: Connection,
}

impl SqliteTripStore {
    /// Open (or create) the store at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfare_store::SqliteTripStore;
    ///
    /// let store = SqliteTripStore::new(":memory:").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = crate::open_connection(path)?;
        Ok(Self { conn })
    }

    /// Re-mirror `trip_data` into the flattened map for every trip
    ///
    /// Rows whose data does not decode as a JSON object or list are skipped.
    /// Returns the number of trips mirrored.
    pub fn sync_all_trip_meta(&mut self) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let rows: Vec<(i64, String)> = {
            let mut stmt = tx.prepare("SELECT post_id, trip_data FROM trips ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut synced = 0;
        for (post_id, raw) in rows {
            if post_id <= 0 {
                continue;
            }
            match serde_json::from_str::<Value>(&raw) {
                Ok(data) if data.is_object() || data.is_array() => {
                    meta::mirror_extracted(&tx, PostId(post_id), &data)?;
                    synced += 1;
                }
                _ => warn!(post_id, "Skipping trip with undecodable data"),
            }
        }

        tx.commit()?;
        debug!(synced, "Re-mirrored trip metadata");
        Ok(synced)
    }

    /// Attach a share-page link and the payload scraped from it
    pub fn store_share_payload(
        &mut self,
        post_id: PostId,
        link: &str,
        payload: &Value,
    ) -> Result<(), StoreError> {
        self.require_post(post_id)?;
        let tx = self.conn.transaction()?;
        meta::set_meta(&tx, post_id, meta::SHARE_LINK_KEY, link.trim())?;
        meta::set_meta(&tx, post_id, meta::SHARE_PAYLOAD_KEY, &serde_json::to_string(payload)?)?;
        tx.commit()?;
        Ok(())
    }

    /// Stored share-page link, if any
    pub fn share_link(&self, post_id: PostId) -> Result<Option<String>, StoreError> {
        meta::get_meta(&self.conn, post_id, meta::SHARE_LINK_KEY)
    }

    /// Stored share-page payload, if any
    pub fn share_payload(&self, post_id: PostId) -> Result<Option<Value>, StoreError> {
        Ok(meta::get_meta(&self.conn, post_id, meta::SHARE_PAYLOAD_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    /// Number of stored trips
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn require_post(&self, post_id: PostId) -> Result<(), StoreError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM trip_posts WHERE id = ?1",
                params![post_id.0],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if exists {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("post {}", post_id)))
        }
    }

    fn query_trip(&self, sql_tail: &str, param: Option<&str>) -> Result<Option<Trip>, StoreError> {
        let sql = format!("SELECT {} FROM trips {}", TRIP_COLUMNS, sql_tail);
        let trip = match param {
            Some(value) => self.conn.query_row(&sql, params![value], row_to_trip),
            None => self.conn.query_row(&sql, [], row_to_trip),
        }
        .optional()?;
        Ok(trip)
    }
}

/// Create the display entity on first import, or retitle the existing one
fn ensure_post(conn: &Connection, pnr: &str, existing: Option<i64>, now: i64) -> Result<PostId, StoreError> {
    if let Some(post_id) = existing {
        let updated = conn.execute(
            "UPDATE trip_posts SET title = ?1, updated_at = ?2 WHERE id = ?3",
            params![pnr, now, post_id],
        )?;
        if updated > 0 {
            return Ok(PostId(post_id));
        }
    }

    conn.execute(
        "INSERT INTO trip_posts (title, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![pnr, now],
    )?;
    Ok(PostId(conn.last_insert_rowid()))
}

fn row_to_trip(row: &Row<'_>) -> rusqlite::Result<Trip> {
    let status: String = row.get(2)?;
    let status = status.parse::<TripStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    // Undecodable data reads as an empty object rather than failing the row
    let raw: String = row.get(3)?;
    let trip_data = serde_json::from_str(&raw).unwrap_or_else(|_| Value::Object(Default::default()));

    let last_imported: Option<i64> = row.get(5)?;

    Ok(Trip {
        id: row.get(0)?,
        pnr: row.get(1)?,
        status,
        trip_data,
        post_id: PostId(row.get(4)?),
        last_imported: last_imported.map(|ms| from_millis(ms, 5)).transpose()?,
        created_at: from_millis(row.get(6)?, 6)?,
        updated_at: from_millis(row.get(7)?, 7)?,
    })
}

pub(crate) fn from_millis(ms: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {}", ms).into(),
        )
    })
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl TripStore for SqliteTripStore {
    type Error = StoreError;

    fn upsert_trip(&mut self, upsert: TripUpsert) -> Result<PostId, Self::Error> {
        let pnr = upsert.pnr.trim();
        if pnr.is_empty() {
            return Err(StoreError::InvalidData("PNR is required for upsert".to_string()));
        }

        let trip_data = serde_json::to_string(&upsert.trip_data)?;
        let now = now_millis();

        let tx = self.conn.transaction()?;

        let row: Option<(i64, Option<i64>)> = tx
            .query_row(
                "SELECT post_id, last_imported FROM trips WHERE pnr = ?1",
                params![pnr],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let existing = row.map(|(post_id, _)| post_id);
        let post_id = ensure_post(&tx, pnr, existing, now)?;

        // Strictly later than the previous import, even within the same millisecond.
        let imported_at = match row.and_then(|(_, previous)| previous) {
            Some(previous) => now.max(previous + 1),
            None => now,
        };

        tx.execute(
            "INSERT INTO trips (pnr, status, trip_data, post_id, last_imported, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(pnr) DO UPDATE SET
             status = excluded.status,
             trip_data = excluded.trip_data,
             post_id = excluded.post_id,
             last_imported = excluded.last_imported,
             updated_at = excluded.updated_at",
            params![pnr, upsert.status.as_str(), trip_data, post_id.0, imported_at, now],
        )?;

        let mirrored = meta::mirror_extracted(&tx, post_id, &upsert.extracted_fields)?;
        meta::merge_manual(&tx, post_id, &upsert.manual_fields)?;

        tx.commit()?;

        debug!(pnr, %post_id, mirrored, created = existing.is_none(), "Upserted trip");
        Ok(post_id)
    }

    fn replace_manual_fields(&mut self, post_id: PostId, fields: ManualFields) -> Result<(), Self::Error> {
        self.require_post(post_id)?;
        meta::replace_manual(&self.conn, post_id, &fields)
    }

    fn update_trip_data(&mut self, pnr: &str, trip_data: Value) -> Result<(), Self::Error> {
        let validated = wayfare_validator::validate(trip_data)?;
        let data = validated.into_value();
        let encoded = serde_json::to_string(&data)?;

        let tx = self.conn.transaction()?;
        let post_id: i64 = tx
            .query_row(
                "SELECT post_id FROM trips WHERE pnr = ?1",
                params![pnr],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(pnr.to_string()))?;

        tx.execute(
            "UPDATE trips SET trip_data = ?1, updated_at = ?2 WHERE pnr = ?3",
            params![encoded, now_millis(), pnr],
        )?;
        meta::mirror_extracted(&tx, PostId(post_id), &data)?;
        tx.commit()?;

        Ok(())
    }

    fn get_by_pnr(&self, pnr: &str) -> Result<Option<Trip>, Self::Error> {
        self.query_trip("WHERE pnr = ?1", Some(pnr))
    }

    fn get_latest(&self) -> Result<Option<Trip>, Self::Error> {
        self.query_trip("ORDER BY last_imported DESC, id DESC LIMIT 1", None)
    }

    fn get_recent(&self, limit: usize) -> Result<Vec<TripSummary>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT pnr, status, last_imported, post_id FROM trips
             ORDER BY last_imported DESC, id DESC LIMIT ?1",
        )?;

        let trips = stmt
            .query_map(params![limit as i64], |row| {
                let status: String = row.get(1)?;
                let status = status.parse::<TripStatus>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
                })?;
                let last_imported: Option<i64> = row.get(2)?;
                Ok(TripSummary {
                    pnr: row.get(0)?,
                    status,
                    last_imported: last_imported.map(|ms| from_millis(ms, 2)).transpose()?,
                    post_id: PostId(row.get(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trips)
    }

    fn manual_fields(&self, post_id: PostId) -> Result<ManualFields, Self::Error> {
        meta::manual_fields(&self.conn, post_id)
    }

    fn extracted_fields(&self, post_id: PostId) -> Result<FlatFields, Self::Error> {
        meta::extracted_fields(&self.conn, post_id)
    }
}
