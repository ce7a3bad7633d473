//! Body serialization utilities.

use bytes::Bytes;

use crate::{DecodeError, TransportError};

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use auto_api_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Lookup<'a> { url: &'a str }
///
/// let bytes = to_json(&Lookup { url: "https://fem.encar.com/cars/detail/40427050" }).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"url":"https://fem.encar.com/cars/detail/40427050"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes, TransportError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the exact field that failed
/// (e.g. `change_id`), or `.` when the document itself is malformed.
///
/// # Errors
///
/// Returns a [`DecodeError`] if JSON deserialization fails.
///
/// # Example
///
/// ```
/// use auto_api_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct ChangeId { change_id: i64 }
///
/// let value: ChangeId = from_json(br#"{"change_id":42567}"#).expect("deserialize");
/// assert_eq!(value, ChangeId { change_id: 42567 });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| DecodeError::new(e.path().to_string(), e.inner().to_string()))?;
    deserializer
        .end()
        .map_err(|e| DecodeError::new(".", e.to_string()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn content_type_as_str() {
        assert_eq!(ContentType::Json.as_str(), "application/json");
        assert_eq!(ContentType::Json.to_string(), "application/json");
    }

    #[test]
    fn to_json_serialize() {
        let bytes = to_json(&json!({"url": "https://example.com/car/1"})).expect("serialize");
        assert_eq!(bytes.as_ref(), br#"{"url":"https://example.com/car/1"}"#);
    }

    #[test]
    fn from_json_keeps_value_unchanged() {
        let bytes = br#"{"data":[{"id":1},{"id":2}],"total":100}"#;
        let value: Value = from_json(bytes).expect("deserialize");

        assert_eq!(value, json!({"data": [{"id": 1}, {"id": 2}], "total": 100}));
    }

    #[test]
    fn from_json_syntax_error_is_at_root() {
        let err = from_json::<Value>(b"not json").expect_err("should fail");

        assert_eq!(err.path(), ".");
        assert!(err.message().contains("expected"), "unexpected message: {err}");
    }

    #[test]
    fn from_json_rejects_trailing_characters() {
        let err = from_json::<Value>(br#"{"a":1} trailing"#).expect_err("should fail");

        assert!(err.to_string().contains("trailing"), "unexpected message: {err}");
    }

    #[test]
    fn from_json_missing_field_error_with_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Meta {
            #[allow(dead_code)]
            page: u64,
        }

        #[derive(Debug, serde::Deserialize)]
        struct Listing {
            #[allow(dead_code)]
            meta: Meta,
        }

        let err = from_json::<Listing>(br#"{"meta":{}}"#).expect_err("should fail");
        let msg = err.to_string();

        assert!(msg.contains("meta"), "Expected path 'meta' in error: {msg}");
        assert!(msg.contains("page"), "Expected field 'page' in error: {msg}");
    }
}
