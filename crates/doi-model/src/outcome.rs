//! Per-row reconciliation outcomes.

use thiserror::Error;

use crate::row::RequiredField;

/// Why a row was not sent to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("validation failed: {reason}")]
    ValidationFailed {
        missing_fields: Vec<RequiredField>,
        reason: String,
    },
    #[error("DOI is empty but no prefix was provided; pass --prefix <your-prefix> to mint DOIs")]
    MissingPrefix,
}

/// Why a create request did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("create returned status {status}: {body}")]
    CreateFailed { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result of reconciling one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The record exists remotely (or would, in a dry run). The identifier is
    /// `None` only in a dry run for a row that has none yet.
    Success { identifier: Option<String> },
    Failure(FailureReason),
    Skipped(SkipReason),
}

impl RowOutcome {
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Success { identifier } => identifier.as_deref(),
            Self::Failure(_) | Self::Skipped(_) => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Failure(_) => "failed",
            Self::Skipped(_) => "skipped",
        }
    }
}
