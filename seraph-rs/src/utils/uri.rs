//! URI and identifier helpers for REST entity representations.

use serde_json::Value;

/// Parse the trailing integer segment of an entity URI.
///
/// `"http://localhost:7474/db/data/node/17"` → `Some(17)`. A trailing slash is
/// ignored. Returns `None` when the last segment is not an unsigned integer.
pub fn trailing_id(uri: &str) -> Option<u64> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u64>().ok())
}

/// Identifier of an entity representation.
///
/// Prefers `metadata.id`, then the trailing segment of `self`, then a bare
/// numeric `id` (already-shaped entities).
pub fn entity_id(repr: &Value) -> Option<u64> {
    repr.pointer("/metadata/id")
        .and_then(Value::as_u64)
        .or_else(|| repr.get("self").and_then(Value::as_str).and_then(trailing_id))
        .or_else(|| repr.get("id").and_then(Value::as_u64))
}

/// Percent-encode a single path segment.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Render an index value as a path segment: strings as text, everything else
/// as JSON, percent-encoded.
pub fn value_segment(value: &Value) -> String {
    match value {
        Value::String(s) => encode_segment(s),
        other => encode_segment(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trailing_id_parses_last_segment() {
        assert_eq!(trailing_id("http://localhost:7474/db/data/node/17"), Some(17));
        assert_eq!(trailing_id("/relationship/3/"), Some(3));
        assert_eq!(trailing_id("/node/abc"), None);
        assert_eq!(trailing_id(""), None);
    }

    #[test]
    fn entity_id_prefers_metadata() {
        let repr = json!({
            "self": "http://localhost:7474/db/data/node/5",
            "metadata": { "id": 6 },
        });
        assert_eq!(entity_id(&repr), Some(6));
    }

    #[test]
    fn entity_id_falls_back_to_self_then_id() {
        assert_eq!(entity_id(&json!({ "self": "/db/data/node/5" })), Some(5));
        assert_eq!(entity_id(&json!({ "id": 9, "name": "A" })), Some(9));
        assert_eq!(entity_id(&json!({ "name": "A" })), None);
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(encode_segment("full name"), "full%20name");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(value_segment(&json!("Ada Lovelace")), "Ada%20Lovelace");
        assert_eq!(value_segment(&json!(42)), "42");
        assert_eq!(value_segment(&json!(["a b"])), "%5B%22a%20b%22%5D");
    }
}
