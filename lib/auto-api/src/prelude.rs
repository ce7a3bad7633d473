//! Convenient re-exports for common usage.
//!
//! ```ignore
//! use auto_api::prelude::*;
//! ```

pub use auto_api_core::prelude::*;

pub use crate::{ApiClient, ApiClientBuilder, ClientConfig, HyperClient, OffersQuery};
pub use crate::{next_change_id, next_page};
