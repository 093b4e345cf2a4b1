//! `reqwest` transport with Basic authentication.

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use doi_model::Credentials;

use crate::context::{JSON_API, RunContext};
use crate::error::{RegistryError, Result};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

/// Blocking HTTP transport for the live registry.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    credentials: Credentials,
}

impl HttpTransport {
    /// Builds a client sending the context's user agent and JSON:API accept
    /// header on every request.
    pub fn new(context: &RunContext) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(context.user_agent.clone())
            .build()
            .map_err(|e| RegistryError::Client(e.to_string()))?;

        Ok(Self {
            client,
            credentials: context.credentials.clone(),
        })
    }
}

fn request_url(request: &ApiRequest) -> std::result::Result<Url, TransportError> {
    let parsed = if request.query.is_empty() {
        Url::parse(&request.url)
    } else {
        Url::parse_with_params(&request.url, &request.query)
    };
    parsed.map_err(|e| TransportError::new(format!("invalid URL {}: {e}", request.url)))
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = request_url(request)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(method, url).basic_auth(
            &self.credentials.repo_id,
            Some(&self.credentials.password),
        );
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, JSON_API).body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;
        Ok(ApiResponse { status, body })
    }
}
