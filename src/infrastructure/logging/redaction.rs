//! Redaction of sensitive fields in structured payloads
//!
//! Any object key containing (case-insensitively) one of the denylisted
//! fragments has its value replaced with [`REDACTED`]. Nested objects and
//! objects inside arrays are scrubbed too; primitives are left as they are.
//! Redaction never fails outward: anything that cannot be scrubbed becomes
//! the [`sanitize_failure`] marker.

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::domain::models::{LogEntry, RequestBody};

/// Replacement for sensitive values
pub const REDACTED: &str = "[REDACTED]";

/// Case-insensitive key fragments treated as sensitive
pub const SENSITIVE_KEYS: [&str; 15] = [
    "password",
    "token",
    "secret",
    "apiKey",
    "api_key",
    "key",
    "credential",
    "credentials",
    "auth",
    "authentication",
    "jwt",
    "authorization",
    "cookie",
    "x-auth-token",
    "x-api-key",
];

/// Nesting beyond this is treated as malformed input
const MAX_DEPTH: usize = 64;

/// Case-insensitive substring match against the sensitive key list
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS
        .iter()
        .any(|fragment| key.contains(&fragment.to_ascii_lowercase()))
}

/// Placeholder returned when a payload could not be scrubbed
pub fn sanitize_failure() -> Value {
    json!({ "sanitized": false, "error": "Could not sanitize body" })
}

/// Deep copy of `value` with sensitive keys redacted.
pub fn sanitize(value: &Value) -> Value {
    scrub(value, 0).unwrap_or_else(sanitize_failure)
}

fn scrub(value: &Value, depth: usize) -> Option<Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                let inner = if is_sensitive_key(key) {
                    Value::String(REDACTED.to_string())
                } else {
                    scrub(inner, depth + 1)?
                };
                out.insert(key.clone(), inner);
            }
            Some(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| scrub(item, depth + 1))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        primitive => Some(primitive.clone()),
    }
}

/// Copy of `entry` whose payload has been sanitized
pub fn redact_entry(entry: &LogEntry) -> LogEntry {
    LogEntry {
        additional_info: entry.additional_info.as_ref().map(sanitize),
        ..entry.clone()
    }
}

/// Serialize an arbitrary payload into a JSON value, falling back to the
/// failure marker when serialization fails.
///
/// No redaction is applied; callers sanitize where the payload leaves the
/// process.
pub fn to_payload<T: Serialize + ?Sized>(payload: &T) -> Value {
    serde_json::to_value(payload).unwrap_or_else(|_| sanitize_failure())
}

/// Header map with sensitive values replaced by the marker.
pub fn redact_headers(headers: &HeaderMap) -> Value {
    let mut out = Map::new();
    for name in headers.keys() {
        let value = if is_sensitive_key(name.as_str()) {
            REDACTED.to_string()
        } else {
            headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.insert(name.as_str().to_string(), Value::String(value));
    }
    Value::Object(out)
}

/// Loggable summary of an outbound request body.
///
/// Binary and file bodies are never inspected; only their type, size and
/// name are reported. Form bodies report their field names.
pub fn sanitize_body(body: &RequestBody) -> Value {
    match body {
        RequestBody::Empty => Value::Null,
        RequestBody::Json(value) => sanitize(value),
        RequestBody::Text(text) => Value::String(text.clone()),
        RequestBody::Bytes { content_type, data } => json!({
            "type": content_type,
            "size": data.len(),
            "name": "Blob",
        }),
        RequestBody::File {
            name,
            content_type,
            data,
        } => json!({
            "type": content_type,
            "size": data.len(),
            "name": name,
        }),
        RequestBody::Form(fields) => json!({
            "formData": fields.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};

    #[test]
    fn test_nested_keys_are_redacted() {
        let input = json!({"password": "x", "nested": {"token": "y"}});
        assert_eq!(
            sanitize(&input),
            json!({"password": "[REDACTED]", "nested": {"token": "[REDACTED]"}})
        );
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let input = json!({
            "user": "ana",
            "ApiKey": "k",
            "profile": {"sessionToken": "t", "age": 31},
            "items": [{"secretCode": 1}, 2, "three"],
        });
        let once = sanitize(&input);
        assert_eq!(sanitize(&once), once);
        assert_eq!(once["user"], "ana");
        assert_eq!(once["ApiKey"], REDACTED);
        assert_eq!(once["profile"]["sessionToken"], REDACTED);
        assert_eq!(once["profile"]["age"], 31);
        assert_eq!(once["items"], json!([{"secretCode": REDACTED}, 2, "three"]));
    }

    #[test]
    fn test_substring_matching_is_case_insensitive() {
        assert!(is_sensitive_key("X-API-KEY"));
        assert!(is_sensitive_key("monkey"));
        assert!(is_sensitive_key("OAuthState"));
        assert!(!is_sensitive_key("username"));
        assert!(!is_sensitive_key("content-type"));
    }

    #[test]
    fn test_primitives_pass_through() {
        assert_eq!(sanitize(&json!(5)), json!(5));
        assert_eq!(sanitize(&json!("password")), json!("password"));
        assert_eq!(sanitize(&json!([1, 2, 3])), json!([1, 2, 3]));
    }

    #[test]
    fn test_excessive_nesting_returns_marker() {
        let mut value = json!("leaf");
        for _ in 0..(MAX_DEPTH + 5) {
            value = json!({ "child": value });
        }
        assert_eq!(sanitize(&value), sanitize_failure());
    }

    #[test]
    fn test_redact_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let redacted = redact_headers(&headers);
        assert_eq!(redacted["authorization"], REDACTED);
        assert_eq!(redacted["content-type"], "application/json");
    }

    #[test]
    fn test_body_summaries() {
        let file = RequestBody::File {
            name: "report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![0; 12],
        };
        assert_eq!(
            sanitize_body(&file),
            json!({"type": "application/pdf", "size": 12, "name": "report.pdf"})
        );

        let form = RequestBody::Form(vec![
            ("name".to_string(), "a".to_string()),
            ("password".to_string(), "b".to_string()),
        ]);
        assert_eq!(sanitize_body(&form), json!({"formData": ["name", "password"]}));

        let body = RequestBody::Json(json!({"login": "a", "password": "b"}));
        assert_eq!(
            sanitize_body(&body),
            json!({"login": "a", "password": REDACTED})
        );
        assert_eq!(sanitize_body(&RequestBody::Empty), Value::Null);
    }

    #[test]
    fn test_failing_serialize_becomes_marker() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cycle detected"))
            }
        }
        assert_eq!(to_payload(&Broken), sanitize_failure());
        assert_eq!(to_payload(&json!({"a": 1})), json!({"a": 1}));
    }
}
