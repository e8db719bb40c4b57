//! Reqwest-backed transport

use crate::config::ClientConfig;
use crate::core::endpoint::{EndpointDescriptor, RequestParams};
use crate::core::error::{ClientError, ClientResult, FetchError};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::time::Duration;

/// HTTP client bound to one backend base URL
///
/// JSON in, JSON out. Non-2xx responses surface the status code and the
/// backend body verbatim; nothing is retried here.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base: Url,
}

impl RestClient {
    /// Build a client from configuration
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let mut base = Url::parse(&config.base_url).map_err(|e| ClientError::Config {
            message: format!("invalid base URL '{}': {}", config.base_url, e),
        })?;
        // Url::join replaces the last segment of a non-slash-terminated
        // path, so "http://host/api/v1" would lose "v1" on every request.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, base })
    }

    /// Build a client against a base URL with default settings
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        };
        Self::from_config(&config)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, path: &str, params: &RequestParams) -> Result<Url, FetchError> {
        // Paths are joined relative to the base; the leading slash is
        // stripped so a base with a path prefix (e.g. /api/v1/) survives.
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::Transport {
                message: format!("invalid request URL '{}': {}", path, e),
            })?;

        let pairs = params.query_pairs();
        if !pairs.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (k, v) in &pairs {
                qp.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn handle(response: Response) -> Result<Value, FetchError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(FetchError::from)?;

        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl super::Transport for RestClient {
    async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        params: &RequestParams,
    ) -> Result<Value, FetchError> {
        let path = descriptor
            .resolve_path(params)
            .map_err(|e| FetchError::Transport {
                message: e.to_string(),
            })?;
        let url = self.url_for(&path, params)?;

        tracing::debug!(
            operation = %descriptor.operation,
            method = %descriptor.method,
            url = %url,
            "issuing request"
        );

        let mut request = self.client.request(descriptor.method.clone(), url);
        if let Some(body) = &params.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(FetchError::from)?;
        Self::handle(response).await
    }
}
