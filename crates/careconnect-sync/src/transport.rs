//! The seam between the fetcher and the network.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A response that completed at the HTTP level, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, TransportError>;
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError>;
}
