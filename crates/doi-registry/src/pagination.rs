//! Lazy walk over paginated listings.
//!
//! The walk follows `links.next` until it is absent, points at a URL already
//! visited, or the page budget runs out. Any page that cannot be fetched or
//! parsed ends the walk early; pages are never skipped.

use std::collections::{HashSet, VecDeque};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::RegistryClient;
use crate::retry::RetryPolicy;
use crate::transport::{ApiRequest, Method, Transport};

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_MAX_PAGES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Sent as `page[size]` on the first request only.
    pub page_size: usize,
    pub max_pages: usize,
    pub retry: RetryPolicy,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            retry: RetryPolicy::default(),
        }
    }
}

impl ListOptions {
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Why a walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEnd {
    /// No further `next` link.
    Exhausted,
    /// `next` pointed at a page already fetched.
    Cycle(String),
    /// Page budget reached while more pages were advertised.
    PageLimit(usize),
    /// A page could not be fetched or parsed.
    Aborted(String),
}

/// Iterator over raw record objects from a listing.
///
/// Restart a walk by asking the client for a new one.
pub struct PageWalker<'a, T> {
    client: &'a RegistryClient<T>,
    options: ListOptions,
    next_url: Option<String>,
    first_page: bool,
    pages_fetched: usize,
    visited: HashSet<String>,
    buffer: VecDeque<Value>,
    end: Option<WalkEnd>,
}

impl<'a, T: Transport> PageWalker<'a, T> {
    pub(crate) fn new(client: &'a RegistryClient<T>, start_url: String, options: ListOptions) -> Self {
        Self {
            client,
            options,
            next_url: Some(start_url),
            first_page: true,
            pages_fetched: 0,
            visited: HashSet::new(),
            buffer: VecDeque::new(),
            end: None,
        }
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Why the walk ended, once it has.
    pub fn end(&self) -> Option<&WalkEnd> {
        self.end.as_ref()
    }

    fn finish(&mut self, end: WalkEnd) {
        match &end {
            WalkEnd::Exhausted => debug!(pages = self.pages_fetched, "listing exhausted"),
            WalkEnd::Cycle(url) => info!(%url, "stopping pagination: already visited"),
            WalkEnd::PageLimit(max) => {
                warn!(max_pages = max, "stopped pagination at page limit");
            }
            WalkEnd::Aborted(reason) => warn!(%reason, "pagination aborted"),
        }
        self.end = Some(end);
    }

    /// Fetches the next page into the buffer. Returns false once the walk
    /// has ended.
    fn fetch_page(&mut self) -> bool {
        let Some(url) = self.next_url.take() else {
            self.finish(WalkEnd::Exhausted);
            return false;
        };
        if self.visited.contains(&url) {
            self.finish(WalkEnd::Cycle(url));
            return false;
        }
        if self.pages_fetched >= self.options.max_pages {
            self.finish(WalkEnd::PageLimit(self.options.max_pages));
            return false;
        }
        self.visited.insert(url.clone());
        self.pages_fetched += 1;

        let mut request = ApiRequest::new(Method::Get, url.clone())
            .with_timeout(self.client.context().timeout);
        if self.first_page {
            request = request.with_query("page[size]", self.options.page_size.to_string());
            self.first_page = false;
        }
        debug!(%url, page = self.pages_fetched, "fetching listing page");

        let client = self.client;
        let response = match self.options.retry.run(&url, || client.send(&request)) {
            Ok(response) => response,
            Err(error) => {
                self.finish(WalkEnd::Aborted(format!(
                    "failed to fetch {url} after retries: {error}"
                )));
                return false;
            }
        };
        if response.status != 200 {
            self.finish(WalkEnd::Aborted(format!(
                "listing returned {}: {}",
                response.status,
                response.body_preview()
            )));
            return false;
        }
        let body: Value = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(error) => {
                self.finish(WalkEnd::Aborted(format!(
                    "failed to decode JSON from {url}: {error}"
                )));
                return false;
            }
        };

        if let Some(items) = body.get("data").and_then(Value::as_array) {
            self.buffer.extend(items.iter().cloned());
        }
        self.next_url = body
            .get("links")
            .and_then(|links| links.get("next"))
            .and_then(Value::as_str)
            .filter(|next| !next.is_empty())
            .map(str::to_string);
        true
    }
}

impl<T: Transport> Iterator for PageWalker<'_, T> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(item);
            }
            if self.end.is_some() || !self.fetch_page() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use doi_model::Credentials;
    use serde_json::json;

    use super::*;
    use crate::context::{DEFAULT_API_URL, RunContext};
    use crate::mock::ScriptedTransport;

    fn client() -> RegistryClient<ScriptedTransport> {
        RegistryClient::new(
            RunContext::new(DEFAULT_API_URL, Credentials::new("ANU.TEST", "pw")),
            ScriptedTransport::new(),
        )
    }

    fn page(ids: &[&str], next: Option<&str>) -> String {
        let data: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        json!({"data": data, "links": {"next": next}}).to_string()
    }

    fn ids(items: Vec<Value>) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| item["id"].as_str().map(str::to_string))
            .collect()
    }

    fn fast() -> ListOptions {
        ListOptions::default().with_retry(RetryPolicy::immediate(3))
    }

    #[test]
    fn follows_next_links_and_sizes_first_page_only() {
        let client = client();
        client
            .transport()
            .respond(200, page(&["a", "b"], Some("https://api.test/dois?page=2")))
            .respond(200, page(&["c"], None));

        let mut walker = client.list(fast().with_page_size(2));
        let items: Vec<Value> = walker.by_ref().collect();
        assert_eq!(ids(items), vec!["a", "b", "c"]);
        assert_eq!(walker.end(), Some(&WalkEnd::Exhausted));

        let requests = client.transport().requests();
        assert_eq!(requests[0].url, DEFAULT_API_URL);
        assert_eq!(requests[0].query, vec![("page[size]".into(), "2".into())]);
        assert_eq!(requests[1].url, "https://api.test/dois?page=2");
        assert!(requests[1].query.is_empty());
    }

    #[test]
    fn cycle_in_next_links_terminates() {
        let client = client();
        let second = "https://api.test/dois?page=2";
        client
            .transport()
            .respond(200, page(&["a"], Some(second)))
            .respond(200, page(&["b"], Some(second)));

        let mut walker = client.list(fast());
        let items: Vec<Value> = walker.by_ref().collect();
        assert_eq!(ids(items), vec!["a", "b"]);
        assert_eq!(walker.end(), Some(&WalkEnd::Cycle(second.to_string())));
        assert_eq!(client.transport().request_count(), 2);
    }

    #[test]
    fn page_limit_is_a_hard_stop() {
        let client = client();
        for n in 0..5 {
            client.transport().respond(
                200,
                page(&["x"], Some(&format!("https://api.test/dois?page={}", n + 2))),
            );
        }
        let mut walker = client.list(fast().with_max_pages(3));
        assert_eq!(walker.by_ref().count(), 3);
        assert_eq!(walker.end(), Some(&WalkEnd::PageLimit(3)));
        assert_eq!(client.transport().request_count(), 3);
    }

    #[test]
    fn transport_errors_are_retried_then_abandon_walk() {
        let client = client();
        client
            .transport()
            .respond(200, page(&["a"], Some("https://api.test/dois?page=2")))
            .fail("reset")
            .fail("reset")
            .fail("reset")
            .respond(200, page(&["never"], None));

        let mut walker = client.list(fast());
        let items: Vec<Value> = walker.by_ref().collect();
        assert_eq!(ids(items), vec!["a"]);
        assert!(matches!(walker.end(), Some(WalkEnd::Aborted(_))));
        assert_eq!(client.transport().request_count(), 4);
        assert_eq!(client.transport().remaining(), 1);
    }

    #[test]
    fn transient_error_recovers_within_attempts() {
        let client = client();
        client
            .transport()
            .fail("timeout")
            .respond(200, page(&["a"], None));
        let items: Vec<Value> = client.list(fast()).collect();
        assert_eq!(ids(items), vec!["a"]);
    }

    #[test]
    fn non_200_and_malformed_pages_abort() {
        let client = client();
        client.transport().respond(500, "down");
        assert_eq!(client.list(fast()).count(), 0);

        let client = self::client();
        client
            .transport()
            .respond(200, page(&["a"], Some("https://api.test/dois?page=2")))
            .respond(200, "<html>");
        let items: Vec<Value> = client.list(fast()).collect();
        assert_eq!(ids(items), vec!["a"]);
    }

    #[test]
    fn walk_is_restartable() {
        let client = client();
        client
            .transport()
            .respond(200, page(&["a"], None))
            .respond(200, page(&["a"], None));
        assert_eq!(client.list(fast()).count(), 1);
        assert_eq!(client.list(fast()).count(), 1);
    }
}
