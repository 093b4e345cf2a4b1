//! Bulk patching of the `relatedItems` block on existing records.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use doi_ingest::Table;
use doi_model::related::{
    DEFAULT_RELATED_IDENTIFIER, DEFAULT_RELATED_IDENTIFIER_TYPE, DEFAULT_RELATED_ITEM_TYPE,
    DEFAULT_RELATED_PUBLICATION_YEAR, DEFAULT_RELATED_TITLE, DEFAULT_RELATION_TYPE,
};
use doi_model::{RegistryRecord, RelatedItem, RowField, is_missing, resolve_column};
use doi_registry::{ListOptions, RegistryClient, Transport};

const RESOLVER_PREFIXES: [&str; 4] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

/// Override columns for one related-item field, with the value used when no
/// column is present or the cell is empty.
struct OverrideField {
    aliases: &'static [&'static str],
    default: &'static str,
}

const TITLE: OverrideField = OverrideField {
    aliases: &["related_title", "Related_Title"],
    default: DEFAULT_RELATED_TITLE,
};
const RELATION_TYPE: OverrideField = OverrideField {
    aliases: &["related_relationType", "related_relationtype"],
    default: DEFAULT_RELATION_TYPE,
};
const PUBLICATION_YEAR: OverrideField = OverrideField {
    aliases: &[
        "related_publication_year",
        "Related_publication_year",
        "related_publicationYear",
    ],
    default: DEFAULT_RELATED_PUBLICATION_YEAR,
};
const ITEM_TYPE: OverrideField = OverrideField {
    aliases: &["related_item_type", "Related_item_type", "relatedItemType"],
    default: DEFAULT_RELATED_ITEM_TYPE,
};
const IDENTIFIER: OverrideField = OverrideField {
    aliases: &["related_url", "Related_URL", "relatedItemIdentifier"],
    default: DEFAULT_RELATED_IDENTIFIER,
};
const IDENTIFIER_TYPE: OverrideField = OverrideField {
    aliases: &[
        "related_identifier_type",
        "Related_identifier_type",
        "relatedItemIdentifierType",
    ],
    default: DEFAULT_RELATED_IDENTIFIER_TYPE,
};

/// Strips a DOI resolver prefix, ignoring case. Blank input yields `None`.
#[must_use]
pub fn normalize_doi(raw: &str) -> Option<String> {
    if is_missing(raw) {
        return None;
    }
    let trimmed = raw.trim();
    let stripped = RESOLVER_PREFIXES
        .iter()
        .find(|prefix| {
            trimmed
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map_or(trimmed, |prefix| &trimmed[prefix.len()..]);
    (!stripped.is_empty()).then(|| stripped.to_string())
}

/// Column indices of the override fields in one table.
struct OverrideColumns([Option<usize>; 6]);

impl OverrideColumns {
    fn resolve(headers: &[String]) -> Self {
        let find = |field: &OverrideField| resolve_column(headers, field.aliases);
        Self([
            find(&TITLE),
            find(&RELATION_TYPE),
            find(&PUBLICATION_YEAR),
            find(&ITEM_TYPE),
            find(&IDENTIFIER),
            find(&IDENTIFIER_TYPE),
        ])
    }

    fn item(&self, cells: &[String]) -> RelatedItem {
        let value = |slot: usize, field: &OverrideField| -> String {
            self.0[slot]
                .and_then(|index| cells.get(index))
                .filter(|cell| !is_missing(cell))
                .map_or_else(|| field.default.to_string(), |cell| cell.trim().to_string())
        };
        RelatedItem::new(
            value(0, &TITLE),
            value(1, &RELATION_TYPE),
            value(2, &PUBLICATION_YEAR),
            value(3, &ITEM_TYPE),
            value(4, &IDENTIFIER),
            value(5, &IDENTIFIER_TYPE),
        )
    }
}

/// Records to patch, keyed by identifier so iteration is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchTargets {
    items: BTreeMap<String, RelatedItem>,
}

impl PatchTargets {
    /// Reads targets from a table's `doi` column, building each item from
    /// the row's override columns. A repeated identifier keeps the last row.
    #[must_use]
    pub fn from_table(table: &Table) -> Self {
        let mut targets = Self::default();
        let Some(doi_column) = resolve_column(&table.headers, RowField::Doi.aliases()) else {
            warn!("table has no doi column; no targets read from it");
            return targets;
        };
        let overrides = OverrideColumns::resolve(&table.headers);
        for cells in &table.rows {
            let Some(identifier) = cells.get(doi_column).and_then(|raw| normalize_doi(raw)) else {
                continue;
            };
            targets.items.insert(identifier, overrides.item(cells));
        }
        targets
    }

    /// Adds identifiers not already present, with the default item.
    pub fn extend_with_defaults<I>(&mut self, identifiers: I)
    where
        I: IntoIterator<Item = String>,
    {
        for identifier in identifiers {
            self.items.entry(identifier).or_default();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelatedItem)> {
        self.items.iter().map(|(id, item)| (id.as_str(), item))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// The run was interrupted before every target was processed.
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    pub dry_run: bool,
    pub list: ListOptions,
}

pub struct RelatedItemPatcher<'a, T> {
    client: &'a RegistryClient<T>,
    options: PatchOptions,
    cancel: Arc<AtomicBool>,
}

impl<'a, T: Transport> RelatedItemPatcher<'a, T> {
    pub fn new(client: &'a RegistryClient<T>, options: PatchOptions) -> Self {
        Self {
            client,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares a flag that, once set, stops the run before the next target.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Identifiers of every record in the repository listing.
    ///
    /// The cancel flag is checked before every record, so an interrupt
    /// stops the walk before the next page is requested.
    pub fn fetch_existing(&self) -> Vec<String> {
        let mut walker = self.client.list(self.options.list.clone());
        let identifiers: Vec<String> = std::iter::from_fn(|| {
            if self.is_cancelled() {
                None
            } else {
                walker.next()
            }
        })
        .filter_map(|value| RegistryRecord::from_value(&value))
        .filter_map(|record| record.id.filter(|id| !id.is_empty()))
        .collect();
        if self.is_cancelled() {
            warn!(
                count = identifiers.len(),
                pages = walker.pages_fetched(),
                "listing interrupted by user"
            );
        } else {
            info!(
                count = identifiers.len(),
                pages = walker.pages_fetched(),
                "fetched existing records"
            );
        }
        identifiers
    }

    /// Patches every target in sorted order. Failures are counted and the
    /// run continues.
    pub fn run(&self, targets: &PatchTargets) -> PatchReport {
        let mut report = PatchReport {
            total: targets.len(),
            ..PatchReport::default()
        };
        for (identifier, item) in targets.iter() {
            if self.is_cancelled() {
                warn!("operation cancelled by user");
                report.cancelled = true;
                break;
            }
            if self.patch_one(identifier, item) {
                report.success += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    fn patch_one(&self, identifier: &str, item: &RelatedItem) -> bool {
        let document = serde_json::to_string_pretty(item).unwrap_or_default();
        info!(%identifier, related_item = %document, "prepared related item patch");
        if self.options.dry_run {
            info!(%identifier, "dry run: not sending request");
            return true;
        }
        match self.client.patch_related_items(identifier, item) {
            Ok(()) => {
                info!(%identifier, "patched related items");
                true
            }
            Err(err) => {
                error!(%identifier, error = %err, "failed to patch related items");
                false
            }
        }
    }
}
