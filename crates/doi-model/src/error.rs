//! Errors raised while parsing model values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("credentials must be in the form repo_id:password")]
    MalformedCredentials,
    #[error("event must be one of draft, publish, register (got '{0}')")]
    UnknownEvent(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
