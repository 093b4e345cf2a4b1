//! DataCite REST API client.
//!
//! [`RegistryClient`] issues the record operations the sync needs (create,
//! URL and related-item patches, fetch, delete, paginated listing) over a
//! [`Transport`]. [`HttpTransport`] talks to the live service with HTTP Basic
//! authentication.

pub mod client;
pub mod context;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod pagination;
pub mod retry;
pub mod transport;

pub use client::{RegistryClient, patch_document};
pub use context::{DEFAULT_API_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, RunContext};
pub use error::{RegistryError, Result};
pub use http::HttpTransport;
pub use pagination::{ListOptions, PageWalker, WalkEnd};
pub use retry::RetryPolicy;
pub use transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};
