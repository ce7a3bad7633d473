//! Hyper-based transport.
//!
//! [`HyperClient`] owns one pooled hyper-util client behind a tower service
//! stack. Layers added through [`HyperClientBuilder::layer`] wrap the raw
//! connection service; the stack is shared between clones.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::Layer;
use tower::ServiceExt;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::connector::https_connector;
use crate::middleware::{FollowRedirectLayer, LoggingLayer};
use crate::{Request, Response, TransportError};

type TransportResult<T> = std::result::Result<T, TransportError>;

/// Type-erased transport stack, as seen by layers.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, TransportError>;

/// Future returned by the transport stack.
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = TransportResult<Response<Bytes>>> + Send + 'static>>;

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Shared handle on the layered stack.
///
/// `BoxCloneService` is `Send` but not `Sync`; each call clones the stack out
/// of the mutex and drives the clone to readiness, then through the request,
/// without holding the lock.
#[derive(Clone)]
struct SharedStack(Arc<Mutex<BoxedService>>);

impl SharedStack {
    fn new(service: BoxedService) -> Self {
        Self(Arc::new(Mutex::new(service)))
    }

    fn dispatch(&self, request: Request<Bytes>) -> ServiceFuture {
        let service = self.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Box::pin(service.oneshot(request))
    }
}

/// Innermost service: one HTTP exchange over the pooled connection.
#[derive(Clone)]
struct Exchange {
    pool: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl Exchange {
    fn new(config: &ClientConfig) -> Self {
        let pool = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config));

        Self {
            pool,
            timeout: config.timeout,
        }
    }

    /// Runs the exchange, body included, under the configured timeout.
    async fn run(self, request: Request<Bytes>) -> TransportResult<Response<Bytes>> {
        let outgoing = into_hyper(request)?;
        tokio::time::timeout(self.timeout, self.round_trip(outgoing))
            .await
            .map_err(|_| TransportError::Timeout)?
    }

    async fn round_trip(
        &self,
        outgoing: http::Request<Full<Bytes>>,
    ) -> TransportResult<Response<Bytes>> {
        let incoming = self.pool.request(outgoing).await.map_err(classify)?;

        let status = incoming.status().as_u16();
        let headers = text_headers(incoming.headers());
        let body = incoming
            .into_body()
            .collect()
            .await
            .map_err(|err| TransportError::connection(format!("reading response body: {err}")))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }
}

impl Service<Request<Bytes>> for Exchange {
    type Response = Response<Bytes>;
    type Error = TransportError;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<TransportResult<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        Box::pin(self.clone().run(request))
    }
}

fn into_hyper(request: Request<Bytes>) -> TransportResult<http::Request<Full<Bytes>>> {
    let (method, url, headers, body) = request.into_parts();

    headers
        .iter()
        .fold(
            http::Request::builder()
                .method(http::Method::from(method))
                .uri(url.as_str()),
            |builder, (name, value)| builder.header(name.as_str(), value.as_str()),
        )
        .body(body.map_or_else(Full::default, Full::new))
        .map_err(|err| TransportError::invalid_request(err.to_string()))
}

/// Response headers that are valid UTF-8; others are dropped.
fn text_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

/// Sort a hyper failure into TLS or connection trouble by walking its sources.
#[allow(clippy::needless_pass_by_value)]
fn classify(err: hyper_util::client::legacy::Error) -> TransportError {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail = format!("{detail}: {cause}");
        if is_tls(cause) {
            return TransportError::tls(detail);
        }
        source = cause.source();
    }
    TransportError::connection(detail)
}

fn is_tls(cause: &(dyn StdError + 'static)) -> bool {
    cause.is::<rustls::Error>()
        || cause
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::get_ref)
            .is_some_and(|inner| inner.is::<rustls::Error>())
}

/// Pooled HTTPS transport with TLS, a whole-exchange timeout and tower layers.
///
/// Non-2xx responses come back as `Ok`; only failures without a response
/// are reported as [`TransportError`].
///
/// # Example
///
/// ```ignore
/// use auto_api::HyperClient;
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    stack: SharedStack,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Transport with the default configuration and no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Transport with the given configuration and no layers.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Builder for layers and configuration.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Configuration the transport was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl auto_api_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> TransportResult<Response<Bytes>> {
        self.stack.dispatch(request).await
    }
}

impl Service<Request<Bytes>> for HyperClient {
    type Response = Response<Bytes>;
    type Error = TransportError;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<TransportResult<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.stack.dispatch(request)
    }
}

/// Builder for [`HyperClient`].
///
/// # Example
///
/// ```ignore
/// use auto_api::HyperClient;
/// use auto_api::middleware::LoggingLayer;
///
/// let client = HyperClient::builder()
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    layers: Vec<LayerFn>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = ClientConfigBuilder::from(config);
        self
    }

    /// Set the whole-exchange timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the TCP connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Add a tower layer.
    ///
    /// The first layer added sits closest to the connection; the last one
    /// sees each request first.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = TransportError>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers
            .push(Arc::new(move |inner| BoxCloneService::new(layer.layer(inner))));
        self
    }

    /// Log each exchange at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each exchange at debug level, redacted headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Follow up to [`crate::middleware::DEFAULT_MAX_REDIRECTS`] redirects.
    #[must_use]
    pub fn with_follow_redirects(self) -> Self {
        self.layer(FollowRedirectLayer::new())
    }

    /// Build the transport with its layer stack.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let stack = self
            .layers
            .iter()
            .fold(BoxCloneService::new(Exchange::new(&config)), |inner, wrap| {
                wrap(inner)
            });

        HyperClient {
            stack: SharedStack::new(stack),
            config,
        }
    }
}
