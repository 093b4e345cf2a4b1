//! Registry operations over a [`Transport`].
//!
//! Each method maps to one HTTP call and decides success purely from the
//! status code; what to do with a failure is up to the caller.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use doi_model::{RegistryRecord, RelatedItem};

use crate::context::RunContext;
use crate::error::{RegistryError, Result};
use crate::pagination::{ListOptions, PageWalker};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Wraps a `{"data": {...}}` PATCH document around `attributes`.
#[must_use]
pub fn patch_document(identifier: &str, attributes: Value) -> Value {
    json!({
        "data": {
            "id": identifier,
            "type": "dois",
            "attributes": attributes,
        }
    })
}

fn expect_status(response: ApiResponse, accepted: &[u16]) -> Result<ApiResponse> {
    if accepted.contains(&response.status) {
        Ok(response)
    } else {
        Err(RegistryError::UnexpectedStatus {
            status: response.status,
            body: response.body,
        })
    }
}

/// Client for the DOI records collection of one repository.
#[derive(Debug)]
pub struct RegistryClient<T> {
    context: RunContext,
    transport: T,
}

impl<T: Transport> RegistryClient<T> {
    pub fn new(context: RunContext, transport: T) -> Self {
        Self { context, transport }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn send(
        &self,
        request: &ApiRequest,
    ) -> std::result::Result<ApiResponse, crate::transport::TransportError> {
        self.transport.send(request)
    }

    /// Authentication check against the account endpoint. Read-only.
    pub fn preflight_check(&self) -> bool {
        let url = self.context.client_url();
        info!(%url, "preflight check");
        match self.transport.send(&ApiRequest::new(Method::Get, url)) {
            Ok(response) => {
                info!(
                    status = response.status,
                    body = response.body_preview(),
                    "preflight response"
                );
                response.status == 200
            }
            Err(error) => {
                warn!(%error, "preflight request failed");
                false
            }
        }
    }

    /// POSTs a new record (or an explicit-id upsert). Only 201 is success.
    ///
    /// The returned record carries whatever identifiers the response body
    /// held; an unparseable body yields an empty record.
    pub fn create(&self, payload: &Value) -> Result<RegistryRecord> {
        let request =
            ApiRequest::new(Method::Post, self.context.api_base()).with_body(payload.to_string());
        let response = self.transport.send(&request)?;
        debug!(status = response.status, body = %response.body, "create response");
        let response = expect_status(response, &[201])?;
        Ok(RegistryRecord::from_document(&response.body).unwrap_or_default())
    }

    /// Replaces the landing-page URL of a record.
    pub fn patch_url(&self, identifier: &str, url: &str) -> Result<()> {
        self.patch(identifier, json!({ "url": url }))
    }

    /// Replaces the `relatedItems` of a record with a single item.
    pub fn patch_related_items(&self, identifier: &str, item: &RelatedItem) -> Result<()> {
        self.patch(identifier, json!({ "relatedItems": [item] }))
    }

    fn patch(&self, identifier: &str, attributes: Value) -> Result<()> {
        let body = patch_document(identifier, attributes);
        let request = ApiRequest::new(Method::Patch, self.context.record_url(identifier))
            .with_body(body.to_string())
            .with_timeout(self.context.timeout);
        let response = self.transport.send(&request)?;
        debug!(%identifier, status = response.status, "patch response");
        expect_status(response, &[200, 201]).map(|_| ())
    }

    /// Reads one record. Any failure is logged and yields `None`; callers
    /// must treat that as "state unknown".
    pub fn fetch_one(&self, identifier: &str) -> Option<RegistryRecord> {
        let request = ApiRequest::new(Method::Get, self.context.record_url(identifier));
        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(error) => {
                warn!(%identifier, %error, "fetch failed");
                return None;
            }
        };
        if response.status != 200 {
            warn!(
                %identifier,
                status = response.status,
                body = response.body_preview(),
                "fetch returned non-200"
            );
            return None;
        }
        match RegistryRecord::from_document(&response.body) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(%identifier, %error, "fetch returned malformed body");
                None
            }
        }
    }

    /// Deletes a record. Success is 200 or 204.
    pub fn delete(&self, identifier: &str) -> Result<()> {
        let request = ApiRequest::new(Method::Delete, self.context.record_url(identifier));
        let response = self.transport.send(&request)?;
        expect_status(response, &[200, 204]).map(|_| ())
    }

    /// Lazily walks the records collection from the configured endpoint.
    pub fn list(&self, options: ListOptions) -> PageWalker<'_, T> {
        self.list_from(self.context.api_base().to_string(), options)
    }

    /// Lazily walks a listing starting at `start_url`.
    pub fn list_from(&self, start_url: String, options: ListOptions) -> PageWalker<'_, T> {
        PageWalker::new(self, start_url, options)
    }
}
