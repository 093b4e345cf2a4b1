//! Reconciliation of spreadsheet rows with DataCite DOI records.
//!
//! - [`validate`] and [`payload`] turn a [`doi_model::Row`] into a create
//!   document.
//! - [`engine`] runs the create-then-patch protocol for one row.
//! - [`sync`] drives the engine over a whole spreadsheet and writes
//!   identifiers back.
//! - [`prune`] deletes confirmed drafts; [`related`] patches related items
//!   onto existing records.

pub mod engine;
pub mod payload;
pub mod prune;
pub mod related;
pub mod suffix;
pub mod sync;
pub mod validate;

pub use engine::{EngineOptions, ReconciliationEngine, RowPlan};
pub use payload::{PayloadBuilder, PayloadOptions};
pub use prune::{DraftPruner, PruneAction, PruneOptions, PruneReport, merge_candidates};
pub use related::{PatchOptions, PatchReport, PatchTargets, RelatedItemPatcher, normalize_doi};
pub use suffix::{
    DEFAULT_URL_FILTER_PREFIX, append_to_url, build_url_addendum, extract_suffix, url_with_suffix,
};
pub use sync::{DOI_COLUMN, SpreadsheetSync, SyncOptions, SyncReport};
pub use validate::{ValidatedRow, parse_publication_year, validate};
