//! Landing-page URL rewriting from DOI suffixes.

/// Query fragment placed before the suffix when none is configured.
pub const DEFAULT_URL_FILTER_PREFIX: &str = "?wdt_column_filter[5]=";

/// Returns the part of `identifier` after the first `/`, which may be empty.
#[must_use]
pub fn extract_suffix(identifier: &str) -> Option<&str> {
    identifier.split_once('/').map(|(_, suffix)| suffix)
}

#[must_use]
pub fn build_url_addendum(filter_prefix: &str, suffix: &str) -> String {
    format!("{filter_prefix}{suffix}")
}

/// Appends `addendum` to `base`.
///
/// When `base` already has a query string the addendum's first `?` becomes
/// `&`. An empty side leaves `base` unchanged.
#[must_use]
pub fn append_to_url(base: &str, addendum: &str) -> String {
    if base.is_empty() || addendum.is_empty() {
        return base.to_string();
    }
    if base.contains('?') {
        format!("{base}{}", addendum.replacen('?', "&", 1))
    } else {
        format!("{base}{addendum}")
    }
}

/// Rewrites `base` to filter on the suffix of `identifier`. Returns `None`
/// when the identifier has no slash or nothing after it.
#[must_use]
pub fn url_with_suffix(base: &str, identifier: &str, filter_prefix: &str) -> Option<String> {
    let suffix = extract_suffix(identifier).filter(|suffix| !suffix.is_empty())?;
    Some(append_to_url(
        base,
        &build_url_addendum(filter_prefix, suffix),
    ))
}
