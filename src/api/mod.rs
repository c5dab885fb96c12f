//! Seller API plumbing.
//!
//! The resolver talks to the marketplace through the [`Transport`] trait so
//! the protocol can be exercised against scripted responses. [`HttpTransport`]
//! is the production implementation on top of `reqwest`.

pub mod shape;
pub mod types;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{Config, Credentials};
use crate::error::{ConfigError, TransportError};

/// Order-request search.
pub const SEARCH_ENDPOINT: &str = "/v2/supply-order/list";

/// Batched order-request details.
pub const EXPAND_ENDPOINT: &str = "/v2/supply-order/get";

/// Bundle contents, addressed by bundle or by supply id.
pub const BUNDLE_ENDPOINT: &str = "/v1/supply-order/bundle";

/// A JSON-over-HTTP POST capability.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `endpoint` and return the decoded JSON response.
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, TransportError>;
}

/// Production transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport that sends `credentials` on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("client-id"),
            header_value("OZON_CLIENT_ID", credentials.client_id())?,
        );
        headers.insert(
            HeaderName::from_static("api-key"),
            header_value("OZON_API_KEY", credentials.api_key())?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| ConfigError::Invalid {
                name: "HTTP client",
                reason: err.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a transport from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let credentials = config.credentials()?;
        Self::new(config.api_url.as_str(), &credentials, config.request_timeout)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    let mut value = HeaderValue::from_str(value).map_err(|err| ConfigError::Invalid {
        name,
        reason: err.to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        info!(%url, "POST");
        debug!(%body, "request body");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let status = status.as_u16();
            return Err(if status == 401 || status == 403 {
                TransportError::Unauthorized { status, body }
            } else {
                TransportError::Status { status, body }
            });
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|err| TransportError::Decode(err.to_string()))?;

        info!(status = status.as_u16(), "response received");
        Ok(value)
    }
}

fn from_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}
