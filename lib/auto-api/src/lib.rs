//! Async client for the auto-api.com vehicle marketplace API.
//!
//! Six endpoints expose offer listings, single offers, filter catalogs and a
//! change feed for marketplaces such as encar, mobile.de or che168. Responses
//! come back as untyped [`serde_json::Value`]s; failures as [`ApiError`].
//!
//! # Example
//!
//! ```ignore
//! use auto_api::prelude::*;
//!
//! let client = ApiClient::new("your-api-key");
//!
//! let offers = client
//!     .get_offers("encar", OffersQuery::page(1).brand("Hyundai"))
//!     .await?;
//!
//! match client.get_offer("encar", "40427050").await {
//!     Ok(offer) => println!("{offer}"),
//!     Err(err) if err.is_auth() => eprintln!("check the API key: {err}"),
//!     Err(err) => eprintln!("HTTP {}: {err}", err.status()),
//! }
//! ```

mod api_client;
mod client;
mod config;
mod connector;
pub mod middleware;
mod paging;
pub mod prelude;
mod query;

// Re-export client types
pub use api_client::{ApiClient, ApiClientBuilder, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_TIMEOUT};
pub use paging::{next_change_id, next_page};
pub use query::OffersQuery;

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use auto_api_core::{
    ApiError, ContentType, DEFAULT_AUTH_MESSAGE, DecodeError, ErrorKind, HttpClient, Method,
    Params, Request, RequestBuilder, Response, Result, ToQueryPairs, TransportError, from_json,
    is_auth_status, to_json,
};

// Re-export http types for status codes
pub use auto_api_core::StatusCode;

pub use serde_json::Value;
pub use url;
