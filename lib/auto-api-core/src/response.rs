//! HTTP response handling.
//!
//! [`Response`] provides access to status, headers, and body with JSON deserialization.

use std::collections::HashMap;

use bytes::Bytes;

use crate::DecodeError;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

impl Response<Bytes> {
    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, DecodeError> {
        crate::from_json(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn response_basic() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        let response = Response::new(200, headers, Bytes::from(r#"{"change_id":1}"#));

        assert_eq!(response.status(), 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert!(response.is_success());
    }

    #[test]
    fn response_status_checks() {
        assert!(Response::new(204, HashMap::new(), Bytes::new()).is_success());
        assert!(!Response::new(301, HashMap::new(), Bytes::new()).is_success());
        assert!(!Response::new(401, HashMap::new(), Bytes::new()).is_success());
        assert!(!Response::new(503, HashMap::new(), Bytes::new()).is_success());
    }

    #[test]
    fn response_json() {
        let body = Bytes::from(r#"{"brands":["Toyota","Honda"],"body_types":["sedan","suv"]}"#);
        let response = Response::new(200, HashMap::new(), body);

        let value: Value = response.json().expect("deserialize");
        assert_eq!(
            value,
            json!({"brands": ["Toyota", "Honda"], "body_types": ["sedan", "suv"]})
        );
    }

    #[test]
    fn response_json_error() {
        let response = Response::new(200, HashMap::new(), Bytes::from("<html>"));

        assert!(response.json::<Value>().is_err());
    }

    #[test]
    fn response_into_body() {
        let response = Response::new(200, HashMap::new(), Bytes::from("raw"));

        assert_eq!(response.body().as_ref(), b"raw");
        assert_eq!(response.into_body(), Bytes::from("raw"));
    }
}
