//! Transport seam.
//!
//! [`HttpClient`] is the only capability the API client needs from a
//! transport: send a request, get a status and a body back. The hyper-based
//! implementation lives in `auto-api`; tests inject their own.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Response, Result, TransportError};

/// Core HTTP client trait.
///
/// Implementations must return non-2xx responses as `Ok`: classifying them
/// is the caller's job. `Err` is reserved for failures where no response
/// exists.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Invalid request
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send;
}

impl<T: HttpClient> HttpClient for &T {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send {
        (**self).execute(request)
    }
}

impl<T: HttpClient> HttpClient for Arc<T> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>, TransportError>> + Send {
        (**self).execute(request)
    }
}

