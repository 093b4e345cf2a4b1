use std::path::PathBuf;

use doi_core::{PatchReport, PruneReport, SyncReport};

#[derive(Debug)]
pub struct PublishSummary {
    pub file: PathBuf,
    pub dry_run: bool,
    pub report: SyncReport,
}

#[derive(Debug)]
pub struct PruneSummary {
    pub dry_run: bool,
    pub report: PruneReport,
}

#[derive(Debug)]
pub struct PatchSummary {
    pub dry_run: bool,
    pub report: PatchReport,
}
