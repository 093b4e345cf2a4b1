//! Related-item block attached to DOI records.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RELATED_TITLE: &str = "Pipeline Accelerator - Voucher Scheme - 25-26 Round 1";
pub const DEFAULT_RELATION_TYPE: &str = "IsPartOf";
pub const DEFAULT_RELATED_PUBLICATION_YEAR: &str = "2025";
pub const DEFAULT_RELATED_ITEM_TYPE: &str = "Award";
pub const DEFAULT_RELATED_IDENTIFIER: &str = "https://raid.org/10.82287/f7b08ebc";
pub const DEFAULT_RELATED_IDENTIFIER_TYPE: &str = "URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTitle {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItemIdentifier {
    pub related_item_identifier: String,
    pub related_item_identifier_type: String,
}

/// DataCite `relatedItems` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItem {
    pub titles: Vec<RelatedTitle>,
    pub relation_type: String,
    pub publication_year: String,
    pub related_item_type: String,
    pub related_item_identifier: RelatedItemIdentifier,
}

impl RelatedItem {
    pub fn new(
        title: impl Into<String>,
        relation_type: impl Into<String>,
        publication_year: impl Into<String>,
        related_item_type: impl Into<String>,
        identifier: impl Into<String>,
        identifier_type: impl Into<String>,
    ) -> Self {
        Self {
            titles: vec![RelatedTitle {
                title: title.into(),
            }],
            relation_type: relation_type.into(),
            publication_year: publication_year.into(),
            related_item_type: related_item_type.into(),
            related_item_identifier: RelatedItemIdentifier {
                related_item_identifier: identifier.into(),
                related_item_identifier_type: identifier_type.into(),
            },
        }
    }
}

impl Default for RelatedItem {
    /// The award block every record is linked to unless a row overrides it.
    fn default() -> Self {
        Self::new(
            DEFAULT_RELATED_TITLE,
            DEFAULT_RELATION_TYPE,
            DEFAULT_RELATED_PUBLICATION_YEAR,
            DEFAULT_RELATED_ITEM_TYPE,
            DEFAULT_RELATED_IDENTIFIER,
            DEFAULT_RELATED_IDENTIFIER_TYPE,
        )
    }
}
