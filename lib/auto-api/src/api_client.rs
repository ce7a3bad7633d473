//! Client for the auto-api.com marketplace data API.
//!
//! [`ApiClient`] maps each upstream endpoint onto one async method, signs the
//! request with the API key, and turns every failure into an [`ApiError`].
//!
//! GET endpoints authenticate with the `api_key` query parameter. The
//! offer-by-url lookup is a POST that authenticates with the `x-api-key`
//! header instead and is pinned to `/api/v1` whatever version is configured.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::middleware::{DEFAULT_MAX_REDIRECTS, FollowRedirectLayer, LoggingLayer};
use crate::{
    ApiError, ClientConfig, HttpClient, HyperClient, Method, Request, Response, Result,
    ToQueryPairs,
};

/// Upstream base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api1.auto-api.com";

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v2";

const API_KEY_PARAM: &str = "api_key";
const API_KEY_HEADER: &str = "x-api-key";
const OFFER_INFO_PATH: &str = "api/v1/offer/info";
const USER_AGENT: &str = concat!("auto-api-rust/", env!("CARGO_PKG_VERSION"));

/// Characters escaped when a value is used as a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Client for the marketplace data API.
///
/// Immutable after construction and safe to share between tasks; clone it
/// when the transport is cheap to clone (as [`HyperClient`] is).
///
/// # Example
///
/// ```ignore
/// use auto_api::{ApiClient, Params};
///
/// let client = ApiClient::new("your-api-key");
///
/// let filters = client.get_filters("encar").await?;
/// let offers = client
///     .get_offers("encar", Params::new().with("page", 1).with("brand", "Hyundai"))
///     .await?;
/// ```
#[derive(Clone)]
pub struct ApiClient<C = HyperClient> {
    transport: C,
    base_url: String,
    api_version: String,
    api_key: String,
}

impl<C: fmt::Debug> fmt::Debug for ApiClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("transport", &self.transport)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl ApiClient<HyperClient> {
    /// Client for the default base URL and version over a default [`HyperClient`].
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder(api_key).build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(api_key)
    }
}

impl<C> ApiClient<C> {
    /// Client for the default base URL and version over the given transport.
    #[must_use]
    pub fn with_transport(transport: C, api_key: impl Into<String>) -> Self {
        ApiClientBuilder::new(api_key).build_with(transport)
    }

    /// Base URL, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// API version segment used by the GET endpoints.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &C {
        &self.transport
    }

    fn scoped_path(&self, source: &str, endpoint: &str) -> String {
        format!(
            "api/{}/{}/{endpoint}",
            utf8_percent_encode(&self.api_version, PATH_SEGMENT),
            utf8_percent_encode(source, PATH_SEGMENT),
        )
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        url::Url::parse(&format!("{}{path}", self.base_url)).map_err(|err| {
            ApiError::from(crate::TransportError::from(err))
        })
    }
}

impl<C: HttpClient> ApiClient<C> {
    /// Available filters for a source (brands, models, body types, ...).
    ///
    /// `GET /api/{version}/{source}/filters`
    pub async fn get_filters(&self, source: &str) -> Result<Value> {
        let response = self
            .send_get(&self.scoped_path(source, "filters"), Vec::new())
            .await?;
        decode(&response)
    }

    /// One page of offers, filtered by `params`.
    ///
    /// `GET /api/{version}/{source}/offers`. Parameters are passed through
    /// verbatim (`page`, `brand`, `model`, `year_from`, `price_to`, ...); see
    /// [`crate::OffersQuery`] for a typed builder.
    pub async fn get_offers(&self, source: &str, params: impl ToQueryPairs) -> Result<Value> {
        let response = self
            .send_get(&self.scoped_path(source, "offers"), params.to_query_pairs())
            .await?;
        decode(&response)
    }

    /// A single offer by its marketplace inner id.
    ///
    /// `GET /api/{version}/{source}/offer?inner_id=...`
    pub async fn get_offer(&self, source: &str, inner_id: &str) -> Result<Value> {
        let response = self
            .send_get(
                &self.scoped_path(source, "offer"),
                [("inner_id", inner_id)].to_query_pairs(),
            )
            .await?;
        decode(&response)
    }

    /// The first `change_id` of a day (`yyyy-mm-dd`, not validated here).
    ///
    /// `GET /api/{version}/{source}/change_id?date=...`. Numeric strings and
    /// floats in the response are coerced to an integer. A missing, `null`,
    /// boolean or non-numeric `change_id` is an `Invalid JSON response` error,
    /// never a silent `0`.
    pub async fn get_change_id(&self, source: &str, date: &str) -> Result<i64> {
        let response = self
            .send_get(
                &self.scoped_path(source, "change_id"),
                [("date", date)].to_query_pairs(),
            )
            .await?;
        let envelope: ChangeIdEnvelope = decode(&response)?;
        Ok(envelope.change_id)
    }

    /// The change feed (added/changed/removed offers) starting at `change_id`.
    ///
    /// `GET /api/{version}/{source}/changes?change_id=...`
    pub async fn get_changes(&self, source: &str, change_id: i64) -> Result<Value> {
        let response = self
            .send_get(
                &self.scoped_path(source, "changes"),
                [("change_id", change_id)].to_query_pairs(),
            )
            .await?;
        decode(&response)
    }

    /// Offer data looked up by its URL on the marketplace.
    ///
    /// `POST /api/v1/offer/info` with body `{"url": ...}` and the key in the
    /// `x-api-key` header.
    pub async fn get_offer_by_url(&self, url: &str) -> Result<Value> {
        let response = self
            .send_post(OFFER_INFO_PATH, &OfferLookup { url })
            .await?;
        decode(&response)
    }

    async fn send_get(&self, path: &str, pairs: Vec<(String, String)>) -> Result<Response<Bytes>> {
        let query = self.signed(pairs);

        let request = Request::builder(Method::Get, self.endpoint(path)?)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .query_pairs(query)
            .build();

        self.dispatch(request).await
    }

    /// Caller pairs kept as given, repeats included, with the configured key
    /// in place of the first `api_key` pair (appended when there is none).
    fn signed(&self, mut pairs: Vec<(String, String)>) -> Vec<(String, String)> {
        let mut signed = false;
        pairs.retain_mut(|(name, value)| {
            if name != API_KEY_PARAM {
                return true;
            }
            if signed {
                return false;
            }
            signed = true;
            value.clone_from(&self.api_key);
            true
        });
        if !signed {
            pairs.push((API_KEY_PARAM.to_string(), self.api_key.clone()));
        }
        pairs
    }

    async fn send_post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<Response<Bytes>> {
        let request = Request::builder(Method::Post, self.endpoint(path)?)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(body)?
            .build();

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let method = request.method();
        let path = request.url().path().to_string();
        debug!(%method, %path, "calling auto-api");

        let response = self.transport.execute(request).await.map_err(|err| {
            warn!(%method, %path, error = %err, "no response from auto-api");
            ApiError::from(err)
        })?;

        if !response.is_success() {
            let err = ApiError::from_response(response.status(), response.body());
            warn!(
                %method,
                %path,
                status = err.status(),
                kind = %err.kind(),
                message = err.message(),
                "auto-api returned an error"
            );
            return Err(err);
        }

        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(response: &Response<Bytes>) -> Result<T> {
    response
        .json()
        .map_err(|err| ApiError::invalid_json(err, response.status()))
}

#[derive(Serialize)]
struct OfferLookup<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChangeIdEnvelope {
    #[serde(deserialize_with = "lenient_i64")]
    change_id: i64,
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    #[allow(clippy::cast_possible_truncation)]
    let truncate = |value: f64| value.trunc() as i64;

    match Lenient::deserialize(deserializer)? {
        Lenient::Integer(value) => Ok(value),
        Lenient::Float(value) => Ok(truncate(value)),
        Lenient::Text(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .or_else(|_| text.parse::<f64>().map(truncate))
                .map_err(|_| D::Error::custom(format!("`{text}` is not an integer")))
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ApiClient`].
///
/// # Example
///
/// ```ignore
/// use auto_api::ApiClient;
/// use std::time::Duration;
///
/// let client = ApiClient::builder("your-api-key")
///     .base_url("https://api2.auto-api.com/")
///     .api_version("v3")
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
pub struct ApiClientBuilder {
    api_key: String,
    base_url: String,
    api_version: String,
    config: ClientConfig,
    logging: Option<LoggingLayer>,
    max_redirects: usize,
}

impl fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("config", &self.config)
            .field("logging", &self.logging)
            .field("max_redirects", &self.max_redirects)
            .finish_non_exhaustive()
    }
}

impl ApiClientBuilder {
    /// Creates a builder with the default base URL, version and transport configuration.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            config: ClientConfig::default(),
            logging: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Set the base URL. A trailing slash is optional.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API version segment of the GET endpoints.
    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Replace the transport configuration used by [`ApiClientBuilder::build`].
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the request timeout used by [`ApiClientBuilder::build`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Log every request through `tracing` (used by [`ApiClientBuilder::build`]).
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.logging = Some(LoggingLayer::new());
        self
    }

    /// Log every request with redacted headers at debug level (used by [`ApiClientBuilder::build`]).
    #[must_use]
    pub fn with_debug_logging(mut self) -> Self {
        self.logging = Some(LoggingLayer::debug());
        self
    }

    /// Redirect hops followed by [`ApiClientBuilder::build`] (default
    /// [`DEFAULT_MAX_REDIRECTS`]); `0` turns every 3xx into an error.
    #[must_use]
    pub const fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Build a client over a [`HyperClient`] that follows redirects.
    ///
    /// Logging sits below the redirect layer, so every hop is logged.
    #[must_use]
    pub fn build(mut self) -> ApiClient<HyperClient> {
        let mut transport = HyperClient::builder().config(self.config.clone());
        if let Some(layer) = self.logging.take() {
            transport = transport.layer(layer);
        }
        let transport = transport
            .layer(FollowRedirectLayer::with_max_redirects(self.max_redirects))
            .build();
        self.build_with(transport)
    }

    /// Build a client over the given transport.
    ///
    /// Transport configuration, logging and redirect following set on this
    /// builder are ignored.
    #[must_use]
    pub fn build_with<C>(self, transport: C) -> ApiClient<C> {
        ApiClient {
            transport,
            base_url: format!("{}/", self.base_url.trim_end_matches('/')),
            api_version: self.api_version,
            api_key: self.api_key,
        }
    }
}
