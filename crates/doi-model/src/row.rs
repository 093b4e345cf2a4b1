//! Typed spreadsheet rows and column alias resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cell values spreadsheet tooling writes for "no value".
const NA_TOKENS: &[&str] = &[
    "nan", "NaN", "-nan", "-NaN", "NA", "N/A", "n/a", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Returns true for blank cells and NA tokens.
#[must_use]
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || NA_TOKENS.contains(&trimmed)
}

fn present(value: &str) -> Option<String> {
    if is_missing(value) {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// Finds the column for the first alias present in `headers`.
///
/// Exact header matches win over case-insensitive ones; within each pass,
/// earlier aliases win.
#[must_use]
pub fn resolve_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|header| header == alias))
        .or_else(|| {
            aliases.iter().find_map(|alias| {
                headers
                    .iter()
                    .position(|header| header.eq_ignore_ascii_case(alias))
            })
        })
}

/// Logical row fields and the headers accepted for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Title,
    Creator,
    CreatorRor,
    Publisher,
    PublicationYear,
    Url,
    Doi,
    ContributorName,
    ContributorOrcid,
}

impl RowField {
    pub const ALL: [RowField; 9] = [
        Self::Title,
        Self::Creator,
        Self::CreatorRor,
        Self::Publisher,
        Self::PublicationYear,
        Self::Url,
        Self::Doi,
        Self::ContributorName,
        Self::ContributorOrcid,
    ];

    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Title => &["title", "Title"],
            Self::Creator => &["Creator", "creator"],
            Self::CreatorRor => &["Creator_ROR", "creator_ror"],
            Self::Publisher => &["Publisher", "publisher"],
            Self::PublicationYear => &["publication_year", "publicationYear"],
            Self::Url => &["url", "URL"],
            Self::Doi => &["doi", "DOI"],
            Self::ContributorName => &["Contrib_name", "contributor_name"],
            Self::ContributorOrcid => &["Contrib_ORCID", "contributor_orcid"],
        }
    }
}

/// Fields that must be present before a row is sent anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequiredField {
    Title,
    Creator,
    Publisher,
    PublicationYear,
    Url,
}

impl RequiredField {
    pub const ALL: [RequiredField; 5] = [
        Self::Title,
        Self::Creator,
        Self::Publisher,
        Self::PublicationYear,
        Self::Url,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Creator => "creator",
            Self::Publisher => "publisher",
            Self::PublicationYear => "publicationYear",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spreadsheet record. Missing cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub creator_ror: Option<String>,
    pub publisher: Option<String>,
    /// Raw cell text; integer coercion happens during validation.
    pub publication_year: Option<String>,
    pub url: Option<String>,
    pub doi: Option<String>,
    pub contributor_name: Option<String>,
    pub contributor_orcid: Option<String>,
}

impl Row {
    /// Builds a row from cells, given each field's column index.
    #[must_use]
    pub fn from_cells(columns: &RowColumns, cells: &[String]) -> Self {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| cells.get(i))
                .and_then(|value| present(value))
        };
        Self {
            title: cell(columns.title),
            creator: cell(columns.creator),
            creator_ror: cell(columns.creator_ror),
            publisher: cell(columns.publisher),
            publication_year: cell(columns.publication_year),
            url: cell(columns.url),
            doi: cell(columns.doi),
            contributor_name: cell(columns.contributor_name),
            contributor_orcid: cell(columns.contributor_orcid),
        }
    }

    #[must_use]
    pub fn required(&self, field: RequiredField) -> Option<&str> {
        match field {
            RequiredField::Title => self.title.as_deref(),
            RequiredField::Creator => self.creator.as_deref(),
            RequiredField::Publisher => self.publisher.as_deref(),
            RequiredField::PublicationYear => self.publication_year.as_deref(),
            RequiredField::Url => self.url.as_deref(),
        }
    }

    /// Title for log lines.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("<untitled>")
    }
}

/// Column index of each row field within one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowColumns {
    pub title: Option<usize>,
    pub creator: Option<usize>,
    pub creator_ror: Option<usize>,
    pub publisher: Option<usize>,
    pub publication_year: Option<usize>,
    pub url: Option<usize>,
    pub doi: Option<usize>,
    pub contributor_name: Option<usize>,
    pub contributor_orcid: Option<usize>,
}

impl RowColumns {
    #[must_use]
    pub fn resolve(headers: &[String]) -> Self {
        let find = |field: RowField| resolve_column(headers, field.aliases());
        Self {
            title: find(RowField::Title),
            creator: find(RowField::Creator),
            creator_ror: find(RowField::CreatorRor),
            publisher: find(RowField::Publisher),
            publication_year: find(RowField::PublicationYear),
            url: find(RowField::Url),
            doi: find(RowField::Doi),
            contributor_name: find(RowField::ContributorName),
            contributor_orcid: find(RowField::ContributorOrcid),
        }
    }
}
