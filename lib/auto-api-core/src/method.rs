//! HTTP method types.

use derive_more::Display;

/// HTTP request method.
///
/// The upstream API only exposes read endpoints plus one lookup by POST,
/// so only those two methods are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - all catalogue and feed endpoints.
    #[display("GET")]
    Get,
    /// POST method - offer lookup by marketplace URL.
    #[display("POST")]
    Post,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
        }
    }
}
