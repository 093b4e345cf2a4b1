//! JSON:API DOI records as returned by the registry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subset of DOI attributes this tool reads back.
///
/// Everything is optional: the registry omits fields depending on schema
/// version and endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordAttributes {
    pub doi: Option<String>,
    /// Confirmed lifecycle state (`draft`, `registered`, `findable`).
    pub state: Option<String>,
    /// Last requested transition.
    pub event: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryRecord {
    pub id: Option<String>,
    pub attributes: RecordAttributes,
}

#[derive(Deserialize)]
struct Document {
    data: RegistryRecord,
}

impl RegistryRecord {
    /// Parses a single-record document (`{"data": {...}}`).
    pub fn from_document(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Document>(body).map(|doc| doc.data)
    }

    /// Parses one entry of a listing page; malformed entries yield `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Record id, falling back to the `doi` attribute.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.attributes.doi.as_deref().filter(|doi| !doi.is_empty()))
    }

    #[must_use]
    pub fn is_confirmed_draft(&self) -> bool {
        self.attributes.state.as_deref() == Some("draft")
    }

    #[must_use]
    pub fn requested_draft(&self) -> bool {
        self.attributes.event.as_deref() == Some("draft")
    }
}
