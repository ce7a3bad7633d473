//! Prelude module for convenient imports.
//!
//! ```ignore
//! use auto_api_core::prelude::*;
//! ```

pub use crate::{
    ApiError, ContentType, ErrorKind, HttpClient, Method, Params, Request, RequestBuilder,
    Response, Result, ToQueryPairs, TransportError, from_json, to_json,
};
