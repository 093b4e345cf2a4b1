//! Required-field checks run before a row is turned into a payload.

use doi_model::{RequiredField, Row, SkipReason, is_missing};

/// A row whose required fields are present and whose publication year is an
/// integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRow<'a> {
    pub row: &'a Row,
    pub title: &'a str,
    pub creator: &'a str,
    pub publisher: &'a str,
    pub publication_year: i64,
    pub url: &'a str,
}

/// Parses a year cell.
///
/// Accepts integer literals and float literals with no fractional part,
/// which is how spreadsheet engines hand back numeric cells (`2024.0`).
#[must_use]
pub fn parse_publication_year(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(year) = value.parse::<i64>() {
        return Some(year);
    }
    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

fn present(row: &Row, field: RequiredField) -> Option<&str> {
    row.required(field)
        .filter(|value| !is_missing(value))
        .map(str::trim)
}

/// Checks a row for the fields every record needs.
///
/// Missing fields are reported together, in declaration order, and the year
/// is only checked once nothing is missing.
pub fn validate(row: &Row) -> Result<ValidatedRow<'_>, SkipReason> {
    let missing: Vec<RequiredField> = RequiredField::ALL
        .into_iter()
        .filter(|field| present(row, *field).is_none())
        .collect();

    let (Some(title), Some(creator), Some(publisher), Some(year), Some(url)) = (
        present(row, RequiredField::Title),
        present(row, RequiredField::Creator),
        present(row, RequiredField::Publisher),
        present(row, RequiredField::PublicationYear),
        present(row, RequiredField::Url),
    ) else {
        let names: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
        return Err(SkipReason::ValidationFailed {
            reason: format!("missing required fields: {}", names.join(", ")),
            missing_fields: missing,
        });
    };

    let Some(publication_year) = parse_publication_year(year) else {
        return Err(SkipReason::ValidationFailed {
            missing_fields: vec![RequiredField::PublicationYear],
            reason: format!("publicationYear '{year}' is not an integer"),
        });
    };

    Ok(ValidatedRow {
        row,
        title,
        creator,
        publisher,
        publication_year,
        url,
    })
}
