//! Per-run connection settings.

use std::time::Duration;

use doi_model::Credentials;

/// Default endpoint: the DataCite test registry.
pub const DEFAULT_API_URL: &str = "https://api.test.datacite.org/dois";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "doi-sync/",
    env!("CARGO_PKG_VERSION"),
    " (mailto:doi-admin@example.org)"
);

/// Per-request timeout for listing and patch calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Content type and accept header for every request.
pub const JSON_API: &str = "application/vnd.api+json";

/// Connection settings threaded through every registry call.
///
/// Built once from CLI flags and never mutated.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Records collection endpoint, e.g. `https://api.datacite.org/dois`.
    pub api_url: String,
    pub credentials: Credentials,
    pub user_agent: String,
    pub timeout: Duration,
}

impl RunContext {
    pub fn new(api_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            api_url: api_url.into(),
            credentials,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Records endpoint without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// API root: the records endpoint with its `/dois` segment removed.
    #[must_use]
    pub fn api_root(&self) -> &str {
        let base = self.api_base();
        base.strip_suffix("/dois").unwrap_or(base)
    }

    /// Account introspection endpoint used by the preflight check.
    #[must_use]
    pub fn client_url(&self) -> String {
        format!("{}/clients/{}", self.api_root(), self.credentials.repo_id)
    }

    /// URL of a single record. `/` between prefix and suffix stays literal;
    /// every segment is percent-encoded.
    #[must_use]
    pub fn record_url(&self, identifier: &str) -> String {
        let path = identifier
            .split('/')
            .map(urlencoding::encode)
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.api_base(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(url: &str) -> RunContext {
        RunContext::new(url, Credentials::new("ANU.TEST", "secret"))
    }

    #[test]
    fn client_url_strips_records_segment() {
        assert_eq!(
            context("https://api.test.datacite.org/dois/").client_url(),
            "https://api.test.datacite.org/clients/ANU.TEST"
        );
        assert_eq!(
            context("https://registry.example/api").client_url(),
            "https://registry.example/api/clients/ANU.TEST"
        );
    }

    #[test]
    fn record_url_keeps_slash_and_escapes_the_rest() {
        let ctx = context(DEFAULT_API_URL);
        assert_eq!(
            ctx.record_url("10.5072/abc-1.2"),
            "https://api.test.datacite.org/dois/10.5072/abc-1.2"
        );
        assert_eq!(
            ctx.record_url("10.5072/a b#c"),
            "https://api.test.datacite.org/dois/10.5072/a%20b%23c"
        );
    }

    #[test]
    fn defaults_apply() {
        let ctx = context(DEFAULT_API_URL);
        assert_eq!(ctx.timeout, DEFAULT_TIMEOUT);
        assert!(ctx.user_agent.starts_with("doi-sync/"));
    }
}
