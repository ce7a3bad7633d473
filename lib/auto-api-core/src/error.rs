//! Error types for auto-api.
//!
//! Two layers exist:
//! - [`TransportError`] is what a [`crate::HttpClient`] reports when no HTTP
//!   response could be obtained at all.
//! - [`ApiError`] is what every public operation returns. It carries an
//!   [`ErrorKind`] so callers can tell credential failures apart from any
//!   other failure with a single `match`.

use std::fmt;

use derive_more::{Display, Error, From};
use serde_json::Value;

/// Message used by [`ApiError::default_auth`].
pub const DEFAULT_AUTH_MESSAGE: &str = "Invalid or missing API key";

/// Returns `true` for the statuses the upstream uses to reject credentials.
#[must_use]
pub const fn is_auth_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

// ============================================================================
// Transport Error
// ============================================================================

/// Failures raised before an HTTP response exists.
///
/// Non-2xx responses are not transport errors: transports hand them back as
/// regular [`crate::Response`]s.
#[derive(Debug, Display, Error, From)]
pub enum TransportError {
    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error for a request body.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

impl TransportError {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

// ============================================================================
// Decode Error
// ============================================================================

/// JSON decoding failure with the path of the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct DecodeError {
    path: String,
    message: String,
}

impl DecodeError {
    /// Create a decode error from a JSON path (`.` for the document root) and a message.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// JSON path to the error (e.g. `meta.next_page`), `.` for the root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Underlying parser message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() || self.path == "." {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at '{}'", self.message, self.path)
        }
    }
}

// ============================================================================
// API Error
// ============================================================================

/// Discriminant of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// Any failed request: non-2xx status, undecodable body, or no response at all.
    #[display("generic")]
    Generic,
    /// The upstream rejected the credentials (401 or 403).
    #[display("auth")]
    Auth,
}

/// Error returned by every API operation.
///
/// The status is always set; it is `0` when no HTTP response was received.
/// The body is only present when the upstream answered an error with a JSON
/// object or array.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: u16,
    body: Option<Value>,
}

/// Result type alias using [`ApiError`] by default.
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

impl ApiError {
    /// Create a generic error.
    #[must_use]
    pub fn generic(message: impl Into<String>, status: u16, body: Option<Value>) -> Self {
        Self {
            kind: ErrorKind::Generic,
            message: message.into(),
            status,
            body,
        }
    }

    /// Create a credential error.
    ///
    /// `status` must be 401 or 403.
    #[must_use]
    pub fn auth(message: impl Into<String>, status: u16) -> Self {
        debug_assert!(is_auth_status(status), "auth error with status {status}");
        Self {
            kind: ErrorKind::Auth,
            message: message.into(),
            status,
            body: None,
        }
    }

    /// Credential error with the default message and status 401.
    #[must_use]
    pub fn default_auth() -> Self {
        Self::auth(DEFAULT_AUTH_MESSAGE, 401)
    }

    /// Error for a successful response whose body is not the expected JSON.
    #[must_use]
    pub fn invalid_json(detail: impl fmt::Display, status: u16) -> Self {
        Self::generic(format!("Invalid JSON response: {detail}"), status, None)
    }

    /// Classify a non-2xx response.
    ///
    /// A JSON `message` field in the body replaces the generic HTTP message.
    /// 401 and 403 become [`ErrorKind::Auth`], everything else
    /// [`ErrorKind::Generic`] carrying the decoded body.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let decoded = serde_json::from_slice::<Value>(body)
            .ok()
            .filter(|value| value.is_object() || value.is_array());

        let message = decoded
            .as_ref()
            .and_then(|value| value.get("message"))
            .and_then(|message| match message {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| http_error_message(status));

        if is_auth_status(status) {
            Self::auth(message, status)
        } else {
            Self::generic(message, status, decoded)
        }
    }

    /// Error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` for credential failures.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self.kind, ErrorKind::Auth)
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code, `0` when no response was received.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Decoded error body, if the upstream sent JSON.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Consume into the decoded error body.
    #[must_use]
    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::generic(err.to_string(), 0, None)
    }
}

fn http_error_message(status: u16) -> String {
    match http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("HTTP error {status}: {reason}"),
        None => format!("HTTP error {status}"),
    }
}
