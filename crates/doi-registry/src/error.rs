//! Error types for registry operations.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while talking to the registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(#[from] TransportError),

    /// The registry answered with a status the operation does not accept.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl RegistryError {
    /// Status code, when the registry answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(_) | Self::Client(_) => None,
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
