//! Core types and traits for the auto-api client.
//!
//! This crate provides the transport-agnostic pieces used by `auto-api`:
//! - [`Method`] - HTTP methods used by the upstream API
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Response`] - HTTP response type
//! - [`ApiError`], [`ErrorKind`] and [`Result`] - Error taxonomy surfaced to callers
//! - [`TransportError`] - Failures raised before any HTTP response exists
//! - [`HttpClient`] - Transport seam for executing requests
//! - [`Params`] and [`ToQueryPairs`] - Ordered query parameters
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)

mod body;
mod client;
mod error;
mod method;
mod params;
pub mod prelude;
mod request;
mod response;

pub use body::{ContentType, from_json, to_json};
pub use client::HttpClient;
pub use error::{
    ApiError, DEFAULT_AUTH_MESSAGE, DecodeError, ErrorKind, Result, TransportError, is_auth_status,
};
pub use method::Method;
pub use params::{Params, ToQueryPairs};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes
pub use http::StatusCode;
