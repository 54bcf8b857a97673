//! Post metadata: extracted mirror, manual fields, share-page data

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use wayfare_domain::{build_meta_key, flatten, FlatFields, ManualFields, PostId, EXTRACTED_META_PREFIX};

use crate::StoreError;

pub(crate) const MANUAL_FIELDS_KEY: &str = "_wayfare_manual_fields";
pub(crate) const SHARE_LINK_KEY: &str = "_wayfare_share_link";
pub(crate) const SHARE_PAYLOAD_KEY: &str = "_wayfare_share_json";

/// Normalize a manual field key to lowercase `[a-z0-9_-]`
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Collapse whitespace runs and trim a manual field value
pub fn sanitize_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 8);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Replace the flattened mirror of `data` for a post
///
/// Every previously mirrored key is removed first, so keys from an older
/// payload shape never linger.
pub(crate) fn mirror_extracted(conn: &Connection, post_id: PostId, data: &Value) -> Result<usize, StoreError> {
    conn.execute(
        "DELETE FROM post_meta WHERE post_id = ?1 AND meta_key LIKE ?2 ESCAPE '\\'",
        params![post_id.0, like_prefix(EXTRACTED_META_PREFIX)],
    )?;

    let flat = flatten(data);
    let mut stmt = conn.prepare(
        "INSERT INTO post_meta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
         ON CONFLICT(post_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
    )?;
    for (path, value) in &flat {
        stmt.execute(params![post_id.0, build_meta_key(path), value])?;
    }

    Ok(flat.len())
}

pub(crate) fn extracted_fields(conn: &Connection, post_id: PostId) -> Result<FlatFields, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT meta_key, meta_value FROM post_meta
         WHERE post_id = ?1 AND meta_key LIKE ?2 ESCAPE '\\'
         ORDER BY meta_key",
    )?;
    let rows = stmt
        .query_map(params![post_id.0, like_prefix(EXTRACTED_META_PREFIX)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<FlatFields, _>>()?;
    Ok(rows)
}

pub(crate) fn get_meta(conn: &Connection, post_id: PostId, key: &str) -> Result<Option<String>, StoreError> {
    let value = conn
        .query_row(
            "SELECT meta_value FROM post_meta WHERE post_id = ?1 AND meta_key = ?2",
            params![post_id.0, key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub(crate) fn set_meta(conn: &Connection, post_id: PostId, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO post_meta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
         ON CONFLICT(post_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
        params![post_id.0, key, value],
    )?;
    Ok(())
}

pub(crate) fn manual_fields(conn: &Connection, post_id: PostId) -> Result<ManualFields, StoreError> {
    let stored = match get_meta(conn, post_id, MANUAL_FIELDS_KEY)? {
        Some(raw) => raw,
        None => return Ok(ManualFields::new()),
    };
    // A corrupt map reads as empty rather than failing every read
    Ok(serde_json::from_str(&stored).unwrap_or_default())
}

fn write_manual(conn: &Connection, post_id: PostId, fields: &ManualFields) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(fields)?;
    set_meta(conn, post_id, MANUAL_FIELDS_KEY, &encoded)
}

/// Merge manual fields into what is stored
///
/// New keys are added and present keys overwritten; nothing is removed.
/// Empty input leaves the stored map untouched.
pub(crate) fn merge_manual(conn: &Connection, post_id: PostId, fields: &ManualFields) -> Result<(), StoreError> {
    if fields.is_empty() {
        return Ok(());
    }

    let mut merged = manual_fields(conn, post_id)?;
    for (key, value) in fields {
        let key = sanitize_key(key);
        if key.is_empty() {
            continue;
        }
        merged.insert(key, sanitize_value(value));
    }
    write_manual(conn, post_id, &merged)
}

/// Replace manual fields wholesale; keys that sanitize to nothing are dropped
pub(crate) fn replace_manual(conn: &Connection, post_id: PostId, fields: &ManualFields) -> Result<(), StoreError> {
    let sanitized: ManualFields = fields
        .iter()
        .map(|(key, value)| (sanitize_key(key), sanitize_value(value)))
        .filter(|(key, _)| !key.is_empty())
        .collect();
    write_manual(conn, post_id, &sanitized)
}
