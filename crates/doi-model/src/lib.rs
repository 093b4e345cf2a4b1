//! Data model shared by the DOI sync crates.
//!
//! Rows read from spreadsheets, the lifecycle events accepted by the
//! registry, per-row reconciliation outcomes, and the JSON:API records the
//! registry returns.

pub mod credentials;
pub mod error;
pub mod event;
pub mod outcome;
pub mod record;
pub mod related;
pub mod row;

pub use credentials::Credentials;
pub use error::{ModelError, Result};
pub use event::Event;
pub use outcome::{FailureReason, RowOutcome, SkipReason};
pub use record::{RecordAttributes, RegistryRecord};
pub use related::{RelatedItem, RelatedItemIdentifier, RelatedTitle};
pub use row::{RequiredField, Row, RowColumns, RowField, is_missing, resolve_column};
