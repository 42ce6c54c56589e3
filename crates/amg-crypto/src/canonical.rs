use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Render a `DateTime<Utc>` as ISO-8601 with microsecond resolution, matching
/// the canonical-JSON format audit signatures are computed over:
/// `2025-01-01T00:00:00.000000Z`.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Encode a `Serialize` value as canonical JSON: UTF-8, object keys sorted
/// ascending. Serializes through a `BTreeMap` so key order falls out of the
/// map's own iteration order rather than relying on a library-specific
/// "sort_keys" flag.
///
/// # Errors
/// Returns the underlying `serde_json` error if `value` cannot be represented
/// as a JSON object, or if encoding fails.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_value(value)?;
    let canonical = canonicalize(json);
    serde_json::to_string(&canonical)
}

fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<String, serde_json::Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            serde_json::to_value(sorted).expect("BTreeMap of Values always serializes")
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(canonicalize).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Unsorted {
        z: i32,
        a: i32,
        m: Vec<i32>,
    }

    #[test]
    fn keys_sorted_ascending() {
        let value = Unsorted { z: 1, a: 2, m: vec![1, 2] };
        let json = to_canonical_json(&value).unwrap();
        assert_eq!(json, r#"{"a":2,"m":[1,2],"z":1}"#);
    }

    #[test]
    fn timestamp_has_microsecond_resolution() {
        let ts = DateTime::parse_from_rfc3339("2025-01-01T00:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(ts), "2025-01-01T00:00:00.123456Z");
    }
}
