//! Tower middleware layers for the auto-api transport.
//!
//! Layers wrap the [`crate::HyperClient`] service and see every request
//! before it leaves the process. Apply them through
//! [`crate::HyperClientBuilder::layer`] or the `with_*` helpers.
//!
//! # Available Layers
//!
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`, with the API key redacted
//! - [`FollowRedirectLayer`] - Follows 3xx responses; installed by `ApiClientBuilder::build`
//!
//! # Example
//!
//! ```ignore
//! use auto_api::HyperClient;
//! use auto_api::middleware::LoggingLayer;
//!
//! let client = HyperClient::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod follow_redirect;
mod logging;

pub use follow_redirect::{DEFAULT_MAX_REDIRECTS, FollowRedirect, FollowRedirectLayer};
pub use logging::{LogLevel, Logging, LoggingLayer, REDACTED, redact_headers, redact_url};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
