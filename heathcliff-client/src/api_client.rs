//! HTTPS transport for the Search Ads API.

use crate::config::ApiConfig;
use async_trait::async_trait;
use heathcliff_core::{Query, ReportError, ReportResult, SearchAdsTransport};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to read certificate file {path}: {source}")]
    Certificate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    fn on(self, endpoint: &str) -> ReportError {
        ReportError::Transport {
            endpoint: endpoint.to_string(),
            reason: self.to_string(),
        }
    }
}

/// Certificate-authenticated client for one API version.
///
/// Requests carry `Authorization: orgId={id}` while an organization is
/// selected.
#[derive(Clone)]
pub struct SearchAdsClient {
    client: reqwest::Client,
    base_url: String,
    org_id: Option<u64>,
}

impl SearchAdsClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let identity = load_identity(&config.certificate_path, &config.key_path)?;
        let client = reqwest::Client::builder()
            .identity(identity)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                config.api_version
            ),
            org_id: config.org_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(org_id) = self.org_id {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("orgId={}", org_id))?,
            );
        }
        Ok(headers)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let response = request.headers(self.headers()?).send().await?;
        let status = response.status();
        let text = response.text().await?;
        // Error bodies are JSON too; the reporting layer inspects them.
        serde_json::from_str::<Value>(&text).map_err(|_| {
            ClientError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), text))
        })
    }
}

#[async_trait]
impl SearchAdsTransport for SearchAdsClient {
    async fn get(&self, endpoint: &str, query: &Query) -> ReportResult<Value> {
        tracing::debug!(endpoint, org_id = ?self.org_id, "GET");
        let request = self.client.get(self.url(endpoint)).query(query);
        self.send(request).await.map_err(|e| e.on(endpoint))
    }

    async fn post(&self, endpoint: &str, body: &Value) -> ReportResult<Value> {
        tracing::debug!(endpoint, org_id = ?self.org_id, "POST");
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send(request).await.map_err(|e| e.on(endpoint))
    }

    async fn put(&self, endpoint: &str, body: &Value) -> ReportResult<Value> {
        tracing::debug!(endpoint, org_id = ?self.org_id, "PUT");
        let request = self.client.put(self.url(endpoint)).json(body);
        self.send(request).await.map_err(|e| e.on(endpoint))
    }

    fn org_id(&self) -> Option<u64> {
        self.org_id
    }

    fn set_org_id(&mut self, org_id: Option<u64>) {
        self.org_id = org_id;
    }
}

impl std::fmt::Debug for SearchAdsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAdsClient")
            .field("base_url", &self.base_url)
            .field("org_id", &self.org_id)
            .finish()
    }
}

/// Client identity from a PEM certificate and its PEM private key.
fn load_identity(certificate: &Path, key: &Path) -> Result<reqwest::Identity, ClientError> {
    let mut pem = read_pem(certificate)?;
    pem.push(b'\n');
    pem.extend(read_pem(key)?);
    Ok(reqwest::Identity::from_pem(&pem)?)
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ClientError> {
    std::fs::read(path).map_err(|source| ClientError::Certificate {
        path: path.to_path_buf(),
        source,
    })
}
