//! Per-row reconciliation between a spreadsheet row and the registry.
//!
//! A row is planned first (validation, identifier normalization, URL rewrite
//! and payload construction, all offline) and then executed: one create,
//! optionally followed by a URL patch once the registry has minted an
//! identifier. Creates are never retried.

use serde_json::Value;
use tracing::{debug, error, info, info_span, warn};

use doi_model::{FailureReason, Row, RowOutcome, SkipReason, is_missing};
use doi_registry::{RegistryClient, RegistryError, Transport};

use crate::payload::{PayloadBuilder, PayloadOptions};
use crate::suffix::{DEFAULT_URL_FILTER_PREFIX, url_with_suffix};
use crate::validate::validate;

/// Options for a publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub payload: PayloadOptions,
    /// Build payloads and report, without calling the registry.
    pub dry_run: bool,
    /// Rewrite landing-page URLs to filter on the DOI suffix.
    pub append_suffix: bool,
    pub url_filter_prefix: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            payload: PayloadOptions::default(),
            dry_run: false,
            append_suffix: false,
            url_filter_prefix: DEFAULT_URL_FILTER_PREFIX.to_string(),
        }
    }
}

/// Everything decided about a row before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlan {
    /// The row's own identifier, trimmed.
    pub identifier: Option<String>,
    /// Landing page as written in the row.
    pub base_url: String,
    pub payload: Value,
}

pub struct ReconciliationEngine<'a, T> {
    client: &'a RegistryClient<T>,
    options: EngineOptions,
    builder: PayloadBuilder,
}

impl<'a, T: Transport> ReconciliationEngine<'a, T> {
    pub fn new(client: &'a RegistryClient<T>, options: EngineOptions) -> Self {
        let builder = PayloadBuilder::new(options.payload.clone());
        Self {
            client,
            options,
            builder,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Plans a row without touching the network. Planning the same row twice
    /// yields the same payload.
    pub fn plan(&self, row: &Row) -> Result<RowPlan, SkipReason> {
        let validated = validate(row)?;
        let identifier = row
            .doi
            .as_deref()
            .filter(|doi| !is_missing(doi))
            .map(|doi| doi.trim().to_string());
        let base_url = validated.url.to_string();

        let url = match identifier.as_deref() {
            Some(doi) if self.options.append_suffix => {
                match url_with_suffix(&base_url, doi, &self.options.url_filter_prefix) {
                    Some(url) => {
                        info!(from = %base_url, to = %url, "appended DOI suffix to URL");
                        url
                    }
                    None => base_url.clone(),
                }
            }
            _ => base_url.clone(),
        };

        let payload = self
            .builder
            .build(&validated, identifier.as_deref(), &url)?;
        Ok(RowPlan {
            identifier,
            base_url,
            payload,
        })
    }

    /// Reconciles one row. `index` is the zero-based data row number and
    /// only feeds the log span.
    pub fn reconcile(&self, index: usize, row: &Row) -> RowOutcome {
        let span = info_span!("row", index, title = row.display_title());
        let _guard = span.enter();

        let plan = match self.plan(row) {
            Ok(plan) => plan,
            Err(reason) => {
                warn!(%reason, "skipping row");
                return RowOutcome::Skipped(reason);
            }
        };
        debug!(payload = %plan.payload, "prepared payload");

        if self.options.dry_run {
            info!(
                event = %self.options.payload.event,
                identifier = plan.identifier.as_deref().unwrap_or("<to be minted>"),
                "dry run: would create record"
            );
            return RowOutcome::Success {
                identifier: plan.identifier,
            };
        }

        let record = match self.client.create(&plan.payload) {
            Ok(record) => record,
            Err(err) => {
                error!(error = %err, "create failed");
                return RowOutcome::Failure(failure_reason(err));
            }
        };
        let effective = record
            .identifier()
            .map(str::to_string)
            .or_else(|| plan.identifier.clone());
        info!(
            identifier = effective.as_deref().unwrap_or("<unknown>"),
            event = %self.options.payload.event,
            "record created"
        );

        if self.options.append_suffix
            && plan.identifier.is_none()
            && let Some(minted) = effective.as_deref()
        {
            self.patch_minted_url(minted, &plan.base_url);
        }

        RowOutcome::Success {
            identifier: effective,
        }
    }

    fn patch_minted_url(&self, identifier: &str, base_url: &str) {
        let Some(url) = url_with_suffix(base_url, identifier, &self.options.url_filter_prefix)
        else {
            return;
        };
        match self.client.patch_url(identifier, &url) {
            Ok(()) => info!(%identifier, %url, "updated landing page URL"),
            Err(err) => error!(%identifier, error = %err, "failed to update landing page URL"),
        }
    }
}

fn failure_reason(err: RegistryError) -> FailureReason {
    match err {
        RegistryError::UnexpectedStatus { status, body } => {
            FailureReason::CreateFailed { status, body }
        }
        other => FailureReason::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use doi_model::{Credentials, Event, RequiredField};
    use doi_registry::mock::ScriptedTransport;
    use doi_registry::{DEFAULT_API_URL, Method, RunContext};
    use serde_json::json;

    use super::*;

    fn client() -> RegistryClient<ScriptedTransport> {
        RegistryClient::new(
            RunContext::new(DEFAULT_API_URL, Credentials::new("ANU.TEST", "pw")),
            ScriptedTransport::new(),
        )
    }

    fn row(doi: Option<&str>) -> Row {
        Row {
            title: Some("Voucher 12".into()),
            creator: Some("ANU".into()),
            publisher: Some("Phenomics Australia".into()),
            publication_year: Some("2025".into()),
            url: Some("https://example.org/vouchers".into()),
            doi: doi.map(str::to_string),
            ..Row::default()
        }
    }

    fn options(prefix: Option<&str>) -> EngineOptions {
        EngineOptions {
            payload: PayloadOptions {
                prefix: prefix.map(str::to_string),
                ..PayloadOptions::default()
            },
            ..EngineOptions::default()
        }
    }

    fn body(request: &doi_registry::ApiRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn planning_twice_yields_identical_payloads() {
        let client = client();
        let engine = ReconciliationEngine::new(
            &client,
            EngineOptions {
                append_suffix: true,
                ..options(None)
            },
        );
        let row = row(Some(" 10.5072/abc "));
        let first = engine.plan(&row).unwrap();
        let second = engine.plan(&row).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.identifier.as_deref(), Some("10.5072/abc"));
        assert_eq!(
            first.payload["data"]["attributes"]["url"],
            "https://example.org/vouchers?wdt_column_filter[5]=abc"
        );
        assert_eq!(first.base_url, "https://example.org/vouchers");
    }

    #[test]
    fn dry_run_makes_no_requests() {
        let client = client();
        let engine = ReconciliationEngine::new(
            &client,
            EngineOptions {
                dry_run: true,
                ..options(Some("10.5072"))
            },
        );
        assert_eq!(
            engine.reconcile(0, &row(None)),
            RowOutcome::Success { identifier: None }
        );
        assert_eq!(
            engine.reconcile(1, &row(Some("10.5072/x"))),
            RowOutcome::Success {
                identifier: Some("10.5072/x".into())
            }
        );
        assert_eq!(client.transport().request_count(), 0);
    }

    #[test]
    fn missing_prefix_skips_without_network() {
        let client = client();
        let engine = ReconciliationEngine::new(&client, options(None));
        assert_eq!(
            engine.reconcile(0, &row(None)),
            RowOutcome::Skipped(SkipReason::MissingPrefix)
        );
        assert_eq!(client.transport().request_count(), 0);
    }

    #[test]
    fn invalid_row_is_skipped() {
        let client = client();
        let engine = ReconciliationEngine::new(&client, options(Some("10.5072")));
        let mut invalid = row(None);
        invalid.url = None;
        match engine.reconcile(0, &invalid) {
            RowOutcome::Skipped(SkipReason::ValidationFailed { missing_fields, .. }) => {
                assert_eq!(missing_fields, vec![RequiredField::Url]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(client.transport().request_count(), 0);
    }

    #[test]
    fn minted_identifier_is_patched_into_url() {
        let client = client();
        client
            .transport()
            .respond(201, r#"{"data": {"id": "10.5072/k9x"}}"#)
            .respond(200, "{}");
        let engine = ReconciliationEngine::new(
            &client,
            EngineOptions {
                append_suffix: true,
                payload: PayloadOptions {
                    prefix: Some("10.5072".into()),
                    event: Event::Publish,
                    ..PayloadOptions::default()
                },
                ..EngineOptions::default()
            },
        );

        let outcome = engine.reconcile(0, &row(None));
        assert_eq!(outcome.identifier(), Some("10.5072/k9x"));

        let requests = client.transport().requests();
        assert_eq!(client.transport().methods(), vec![Method::Post, Method::Patch]);
        let created = body(&requests[0]);
        assert_eq!(created["data"]["attributes"]["prefix"], "10.5072");
        assert_eq!(created["data"]["attributes"]["url"], "https://example.org/vouchers");
        assert_eq!(requests[1].url, format!("{DEFAULT_API_URL}/10.5072/k9x"));
        assert_eq!(
            body(&requests[1]),
            json!({"data": {
                "id": "10.5072/k9x",
                "type": "dois",
                "attributes": {"url": "https://example.org/vouchers?wdt_column_filter[5]=k9x"}
            }})
        );
    }

    #[test]
    fn explicit_identifier_is_never_patched_afterwards() {
        let client = client();
        client
            .transport()
            .respond(201, r#"{"data": {"id": "10.5072/abc"}}"#);
        let engine = ReconciliationEngine::new(
            &client,
            EngineOptions {
                append_suffix: true,
                ..options(None)
            },
        );
        let outcome = engine.reconcile(0, &row(Some("10.5072/abc")));
        assert!(outcome.is_success());
        assert_eq!(client.transport().methods(), vec![Method::Post]);
    }

    #[test]
    fn effective_identifier_falls_back_to_doi_attribute_then_row() {
        let client = client();
        client
            .transport()
            .respond(201, r#"{"data": {"attributes": {"doi": "10.5072/from-attr"}}}"#)
            .respond(201, "not json");
        let engine = ReconciliationEngine::new(&client, options(Some("10.5072")));
        assert_eq!(
            engine.reconcile(0, &row(None)).identifier(),
            Some("10.5072/from-attr")
        );
        assert_eq!(
            engine.reconcile(1, &row(Some("10.5072/own"))).identifier(),
            Some("10.5072/own")
        );
    }

    #[test]
    fn rejected_create_is_a_failure_without_patch() {
        let client = client();
        client
            .transport()
            .respond(422, r#"{"errors": [{"title": "DOI already taken"}]}"#);
        let engine = ReconciliationEngine::new(
            &client,
            EngineOptions {
                append_suffix: true,
                ..options(Some("10.5072"))
            },
        );
        match engine.reconcile(0, &row(None)) {
            RowOutcome::Failure(FailureReason::CreateFailed { status, body }) => {
                assert_eq!(status, 422);
                assert!(body.contains("already taken"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(client.transport().methods(), vec![Method::Post]);
    }

    #[test]
    fn transport_error_on_create_is_not_retried() {
        let client = client();
        client.transport().fail("connection reset");
        let engine = ReconciliationEngine::new(&client, options(Some("10.5072")));
        assert!(matches!(
            engine.reconcile(0, &row(None)),
            RowOutcome::Failure(FailureReason::Transport(_))
        ));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[test]
    fn failed_url_patch_keeps_success() {
        let client = client();
        client
            .transport()
            .respond(201, r#"{"data": {"id": "10.5072/k9x"}}"#)
            .respond(500, "boom");
        let engine = ReconciliationEngine::new(
            &client,
            EngineOptions {
                append_suffix: true,
                ..options(Some("10.5072"))
            },
        );
        assert_eq!(
            engine.reconcile(0, &row(None)),
            RowOutcome::Success {
                identifier: Some("10.5072/k9x".into())
            }
        );
        assert_eq!(client.transport().request_count(), 2);
    }
}
