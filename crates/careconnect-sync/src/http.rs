//! reqwest-backed [`Transport`] for the remote content pipeline.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::fetcher::FetcherConfig;
use crate::transport::{RawResponse, Transport, TransportError};

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a client for `config.base_url` with `config.timeout` applied to
    /// every request.
    pub fn new(config: &FetcherConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(classify)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read(resp: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify)?;
        debug!(status, bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let resp = self.client.post(&url).json(body).send().await.map_err(classify)?;
        Self::read(resp).await
    }

    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let resp = self.client.get(&url).send().await.map_err(classify)?;
        Self::read(resp).await
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}
