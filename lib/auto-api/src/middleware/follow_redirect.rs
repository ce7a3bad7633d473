//! Redirect following.
//!
//! [`FollowRedirectLayer`] re-issues a request when the upstream answers with
//! 301, 302, 303, 307 or 308 and a usable `Location` header. A redirect that
//! cannot be followed (hop limit reached, `Location` missing or unparsable)
//! is handed back unchanged, so the caller still sees its 3xx status.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service, ServiceExt};
use tracing::{debug, warn};
use url::Url;

use crate::{Method, Request, Response, TransportError};

/// Hops followed when no limit is configured.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

const LOCATION: &str = "location";
const CONTENT_TYPE: &str = "content-type";
const API_KEY_HEADER: &str = "x-api-key";

/// Layer that follows HTTP redirects.
///
/// # Example
///
/// ```ignore
/// use auto_api::HyperClient;
/// use auto_api::middleware::FollowRedirectLayer;
///
/// let client = HyperClient::builder()
///     .layer(FollowRedirectLayer::with_max_redirects(3))
///     .build();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FollowRedirectLayer {
    max_redirects: usize,
}

impl Default for FollowRedirectLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowRedirectLayer {
    /// Follow up to [`DEFAULT_MAX_REDIRECTS`] hops.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_max_redirects(DEFAULT_MAX_REDIRECTS)
    }

    /// Follow up to `max_redirects` hops; `0` disables following.
    #[must_use]
    pub const fn with_max_redirects(max_redirects: usize) -> Self {
        Self { max_redirects }
    }

    /// Configured hop limit.
    #[must_use]
    pub const fn max_redirects(&self) -> usize {
        self.max_redirects
    }
}

impl<S> Layer<S> for FollowRedirectLayer {
    type Service = FollowRedirect<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FollowRedirect {
            inner,
            max_redirects: self.max_redirects,
        }
    }
}

/// Service produced by [`FollowRedirectLayer`].
#[derive(Debug, Clone)]
pub struct FollowRedirect<S> {
    inner: S,
    max_redirects: usize,
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// 307 and 308 keep the method and body; every other redirect becomes a bodiless GET.
fn redirect_method(status: u16, original: Method) -> Method {
    match status {
        307 | 308 => original,
        _ => Method::Get,
    }
}

fn resolve_location(current: &Url, location: &str) -> Option<Url> {
    Url::parse(location).or_else(|_| current.join(location)).ok()
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// The request for the next hop, or `None` when `response` is not a
/// redirect that can be followed.
fn next_hop(request: &Request<Bytes>, response: &Response<Bytes>) -> Option<Request<Bytes>> {
    let status = response.status();
    let Some(location) = response.header(LOCATION) else {
        warn!(status, "redirect without Location header");
        return None;
    };
    let Some(url) = resolve_location(request.url(), location) else {
        warn!(status, location, "redirect to an unparsable Location");
        return None;
    };

    let method = redirect_method(status, request.method());
    let keep_body = method == request.method() && method != Method::Get;
    let cross_origin = !same_origin(request.url(), &url);

    let (_, _, headers, body) = request.clone().into_parts();
    let mut builder = Request::builder(method, url);
    for (name, value) in headers {
        let dropped = (!keep_body && name.eq_ignore_ascii_case(CONTENT_TYPE))
            || (cross_origin && name.eq_ignore_ascii_case(API_KEY_HEADER));
        if !dropped {
            builder = builder.header(name, value);
        }
    }
    if let Some(body) = body.filter(|_| keep_body) {
        builder = builder.body(body);
    }
    Some(builder.build())
}

impl<S> Service<Request<Bytes>> for FollowRedirect<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let max_redirects = self.max_redirects;

        Box::pin(async move {
            let mut request = request;
            let mut response = inner.call(request.clone()).await?;
            let mut hops = 0;

            while is_redirect(response.status()) {
                if hops >= max_redirects {
                    warn!(status = response.status(), max_redirects, "too many redirects");
                    break;
                }
                let Some(next) = next_hop(&request, &response) else {
                    break;
                };

                debug!(
                    status = response.status(),
                    from = %request.url().path(),
                    to = %next.url().path(),
                    "following redirect"
                );
                request = next;
                hops += 1;
                response = inner.ready().await?.call(request.clone()).await?;
            }

            Ok(response)
        })
    }
}
