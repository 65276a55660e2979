//! Decoding of stored record collections.
//!
//! Stored collections are loosely shaped JSON. Each record is decoded on its own so
//! one bad entry never poisons the rest of the collection.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a stored JSON array into typed records.
///
/// Absent, unparsable, or non-array payloads decode to an empty collection. Records
/// that fail to decode are dropped with a warning.
pub fn decode_records<T: DeserializeOwned>(key: &str, raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            tracing::warn!("Stored {} is not an array (found {}), ignoring", key, kind(&other));
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!("Stored {} is not valid JSON: {}", key, e);
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Dropping malformed record {} of {}: {}", index, key, e);
                None
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
