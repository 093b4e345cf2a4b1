//! Safe deletion of draft records.
//!
//! Candidates may come from a file or from a listing filtered on the
//! requested `event`, but a record is only deleted after a fresh read shows
//! its confirmed `state` is `draft`.

use std::collections::HashSet;

use tracing::{info, warn};

use doi_model::RegistryRecord;
use doi_registry::{ListOptions, RegistryClient, Transport};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOptions {
    pub dry_run: bool,
    pub list: ListOptions,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneAction {
    Deleted,
    /// Dry run: the record is a draft and would have been deleted.
    WouldDelete,
    /// The record is not a confirmed draft.
    NotDraft { state: Option<String> },
    /// The record could not be read; its state is unknown.
    FetchFailed,
    DeleteFailed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub actions: Vec<(String, PruneAction)>,
}

impl PruneReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn count(&self, matches: impl Fn(&PruneAction) -> bool) -> usize {
        self.actions.iter().filter(|(_, action)| matches(action)).count()
    }

    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count(|action| matches!(action, PruneAction::Deleted | PruneAction::WouldDelete))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|action| {
            matches!(
                action,
                PruneAction::NotDraft { .. } | PruneAction::FetchFailed
            )
        })
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|action| matches!(action, PruneAction::DeleteFailed { .. }))
    }
}

/// Merges candidate lists, keeping first occurrences in order.
#[must_use]
pub fn merge_candidates<I>(lists: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .map(|identifier| identifier.trim().to_string())
        .filter(|identifier| !identifier.is_empty())
        .filter(|identifier| seen.insert(identifier.clone()))
        .collect()
}

pub struct DraftPruner<'a, T> {
    client: &'a RegistryClient<T>,
    options: PruneOptions,
}

impl<'a, T: Transport> DraftPruner<'a, T> {
    pub fn new(client: &'a RegistryClient<T>, options: PruneOptions) -> Self {
        Self { client, options }
    }

    /// Identifiers of listed records whose requested event is `draft`.
    ///
    /// This is only a candidate filter; [`DraftPruner::prune`] re-checks the
    /// confirmed state of each record.
    pub fn fetch_draft_candidates(&self) -> Vec<String> {
        let candidates: Vec<String> = self
            .client
            .list(self.options.list.clone())
            .filter_map(|value| RegistryRecord::from_value(&value))
            .filter(RegistryRecord::requested_draft)
            .filter_map(|record| record.identifier().map(str::to_string))
            .collect();
        info!(count = candidates.len(), "fetched draft candidates");
        candidates
    }

    /// Processes candidates in order.
    pub fn prune(&self, candidates: &[String]) -> PruneReport {
        let mut report = PruneReport::default();
        info!(
            count = candidates.len(),
            dry_run = self.options.dry_run,
            "processing candidates"
        );
        for identifier in candidates {
            let action = self.prune_one(identifier);
            report.actions.push((identifier.clone(), action));
        }
        report
    }

    fn prune_one(&self, identifier: &str) -> PruneAction {
        let Some(record) = self.client.fetch_one(identifier) else {
            warn!(%identifier, "skipping: cannot retrieve metadata");
            return PruneAction::FetchFailed;
        };
        let attributes = &record.attributes;
        info!(
            %identifier,
            state = attributes.state.as_deref().unwrap_or("-"),
            event = attributes.event.as_deref().unwrap_or("-"),
            "current record status"
        );
        if !record.is_confirmed_draft() {
            info!(%identifier, "skipping: state is not draft");
            return PruneAction::NotDraft {
                state: attributes.state.clone(),
            };
        }
        if self.options.dry_run {
            info!(%identifier, "dry run: would delete");
            return PruneAction::WouldDelete;
        }
        match self.client.delete(identifier) {
            Ok(()) => {
                info!(%identifier, "deleted draft");
                PruneAction::Deleted
            }
            Err(err) => {
                warn!(%identifier, status = ?err.status(), error = %err, "delete failed");
                PruneAction::DeleteFailed {
                    error: err.to_string(),
                }
            }
        }
    }
}
