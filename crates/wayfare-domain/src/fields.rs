//! Flattened field mirror
//!
//! Trip data is mirrored into a flat `path -> value` map so that a display
//! layer can address individual fields. Paths join object keys and list
//! indices with `.`, e.g. `journeys.0.segments.1.flight_number`.
//!
//! Rebuilding from paths cannot tell a list index from an object key: both
//! come back as object keys (`"0"`, `"1"`, ...). Callers that need lists must
//! not rely on a flatten/rebuild round trip for them.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Prefix for extracted-field meta keys
pub const EXTRACTED_META_PREFIX: &str = "_wayfare_field_";

/// Flattened `path -> value` map
pub type FlatFields = BTreeMap<String, String>;

/// Flatten a nested value into `path -> value` pairs
///
/// Leaves are stringified: `true` → `"1"`, `false` → `"0"`, `null` → `""`,
/// strings as-is, numbers in their JSON form. Empty lists and objects
/// contribute no entries.
pub fn flatten(value: &Value) -> FlatFields {
    let mut flat = FlatFields::new();
    flatten_into(String::new(), value, &mut flat);
    flat
}

fn flatten_into(path: String, value: &Value, flat: &mut FlatFields) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child_path(&path, key), child, flat);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child_path(&path, &index.to_string()), child, flat);
            }
        }
        leaf => {
            flat.insert(path, stringify_leaf(leaf));
        }
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn stringify_leaf(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rebuild a nested object from flattened paths
///
/// Every path segment, numeric or not, becomes an object key. Intermediate
/// objects are created as needed; a leaf sitting where an intermediate object
/// is required is replaced by that object.
pub fn rebuild(flat: &FlatFields) -> Value {
    let mut root = Map::new();

    for (path, value) in flat {
        let segments: Vec<&str> = path.split('.').collect();
        insert_path(&mut root, &segments, value);
    }

    Value::Object(root)
}

fn insert_path(node: &mut Map<String, Value>, segments: &[&str], value: &str) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        node.insert((*first).to_string(), Value::String(value.to_string()));
        return;
    }

    let child = node
        .entry((*first).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(map) = child {
        insert_path(map, rest, value);
    }
}

/// Build the meta key for a flattened path
///
/// Runs of characters outside `[A-Za-z0-9]` collapse to one `_`, the result
/// is lowercased and trimmed of `_`, and an empty result becomes `value`.
pub fn build_meta_key(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut pending_separator = false;

    for ch in path.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if normalized.is_empty() {
        normalized.push_str("value");
    }

    format!("{}{}", EXTRACTED_META_PREFIX, normalized)
}
