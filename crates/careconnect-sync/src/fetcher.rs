//! One request to the remote content pipeline, classified into a live
//! response or a failure reason.
//!
//! The fetcher never retries and never touches the cache or the store; the
//! loader decides what to do with the outcome.

use std::time::Duration;

use careconnect_core::{AnonymizedProfile, FeedbackSummary, LiveResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::transport::{Transport, TransportError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Like `http://localhost:8000` (no trailing slash).
    pub base_url: String,
    pub dashboard_path: String,
    pub health_path: String,
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL.to_string())
    }
}

impl FetcherConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            dashboard_path: "/api/dashboard".to_string(),
            health_path: "/health".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Why a fetch produced no usable response.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FetchFailure {
    #[error("network error: {message}")]
    NetworkError { message: String },
    #[error("server returned HTTP {status}")]
    HttpError { status: u16 },
    #[error("invalid response shape: {detail}")]
    InvalidShape { detail: String },
}

impl FetchFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NetworkError { .. } => "network_error",
            Self::HttpError { .. } => "http_error",
            Self::InvalidShape { .. } => "invalid_shape",
        }
    }
}

impl From<TransportError> for FetchFailure {
    fn from(e: TransportError) -> Self {
        Self::NetworkError {
            message: e.to_string(),
        }
    }
}

/// Body of `POST /api/dashboard`.
#[derive(Debug, Serialize)]
pub struct DashboardRequest<'a> {
    pub patient_profile: &'a AnonymizedProfile,
    pub session_id: &'a str,
    pub feedback_data: &'a FeedbackSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Online,
    Offline,
}

pub struct ContentFetcher<T> {
    transport: T,
    config: FetcherConfig,
}

impl<T: Transport> ContentFetcher<T> {
    pub fn new(transport: T, config: FetcherConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Request personalized content for `profile`.
    ///
    /// A 2xx body must be a JSON object carrying both `patient_info` and
    /// `content` objects; anything else is [`FetchFailure::InvalidShape`].
    pub async fn fetch(
        &self,
        profile: &AnonymizedProfile,
        feedback: &FeedbackSummary,
        session_id: &str,
    ) -> Result<LiveResponse, FetchFailure> {
        let request = DashboardRequest {
            patient_profile: profile,
            session_id,
            feedback_data: feedback,
        };
        let body = serde_json::to_value(&request).map_err(|e| FetchFailure::NetworkError {
            message: format!("request encoding: {e}"),
        })?;

        info!(
            path = %self.config.dashboard_path,
            session_id,
            age_group = profile.age_group.as_str(),
            likes = feedback.likes.len(),
            dislikes = feedback.dislikes.len(),
            "requesting dashboard content"
        );
        let resp = self
            .transport
            .post_json(&self.config.dashboard_path, &body)
            .await?;

        if !resp.is_success() {
            warn!(status = resp.status, "dashboard request rejected");
            return Err(FetchFailure::HttpError {
                status: resp.status,
            });
        }

        let parsed: Value =
            serde_json::from_str(&resp.body).map_err(|e| FetchFailure::InvalidShape {
                detail: format!("body is not JSON: {e}"),
            })?;
        let live = LiveResponse::from_value(parsed).map_err(|e| FetchFailure::InvalidShape {
            detail: e.to_string(),
        })?;

        info!(
            domains = live.content.len(),
            has_pipeline_metadata = live.pipeline_metadata.is_some(),
            "dashboard content received"
        );
        Ok(live)
    }

    /// Liveness check for the connectivity banner.
    pub async fn health(&self) -> Connectivity {
        match self.transport.get(&self.config.health_path).await {
            Ok(resp) if resp.is_success() => {
                let unhealthy = serde_json::from_str::<Value>(&resp.body)
                    .ok()
                    .and_then(|v| v.get("status").and_then(Value::as_str).map(str::to_owned))
                    .is_some_and(|s| s == "unhealthy");
                if unhealthy {
                    Connectivity::Offline
                } else {
                    Connectivity::Online
                }
            }
            Ok(resp) => {
                warn!(status = resp.status, "health check failed");
                Connectivity::Offline
            }
            Err(e) => {
                warn!(error = %e, "health check unreachable");
                Connectivity::Offline
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RawResponse;
    use async_trait::async_trait;
    use careconnect_core::{AgeGroup, Domain};
    use serde_json::json;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<RawResponse, TransportError>,
        seen: Mutex<Vec<(String, Option<Value>)>>,
    }

    impl Canned {
        fn new(reply: Result<RawResponse, TransportError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn ok(status: u16, body: &str) -> Self {
            Self::new(Ok(RawResponse {
                status,
                body: body.to_string(),
            }))
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, TransportError> {
            self.seen
                .lock()
                .unwrap()
                .push((path.to_string(), Some(body.clone())));
            self.reply.clone()
        }

        async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
            self.seen.lock().unwrap().push((path.to_string(), None));
            self.reply.clone()
        }
    }

    fn profile() -> AnonymizedProfile {
        AnonymizedProfile {
            age_group: AgeGroup::OldestSenior,
            cultural_heritage: "Italian-American".into(),
            interests: vec!["music".into()],
            profile_complete: true,
        }
    }

    async fn fetch_with(transport: Canned) -> (Result<LiveResponse, FetchFailure>, Canned) {
        let fetcher = ContentFetcher::new(transport, FetcherConfig::default());
        let feedback = FeedbackSummary {
            likes: vec!["In the Mood".into()],
            dislikes: vec![],
        };
        let result = fetcher.fetch(&profile(), &feedback, "session_1_abc").await;
        (result, fetcher.transport)
    }

    #[tokio::test]
    async fn well_shaped_response_is_ok() {
        let body = json!({
            "patient_info": {"cultural_heritage": "Italian-American"},
            "content": {"music": {"artist": "Dean Martin"}},
            "metadata": {"theme": "Family"}
        });
        let (result, _) = fetch_with(Canned::ok(200, &body.to_string())).await;
        let live = result.unwrap();
        assert_eq!(live.domain(Domain::Music).unwrap()["artist"], "Dean Martin");
        assert_eq!(live.metadata["theme"], "Family");
    }

    #[tokio::test]
    async fn request_body_matches_wire_format() {
        let (_, transport) = fetch_with(Canned::ok(500, "")).await;
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, body) = &seen[0];
        assert_eq!(path, "/api/dashboard");
        let body = body.as_ref().unwrap();
        assert_eq!(body["session_id"], "session_1_abc");
        assert_eq!(body["patient_profile"]["age_group"], "oldest_senior");
        assert_eq!(body["feedback_data"], json!({"likes": ["In the Mood"], "dislikes": []}));
    }

    #[tokio::test]
    async fn non_2xx_is_http_error() {
        let (result, _) = fetch_with(Canned::ok(503, "maintenance")).await;
        assert_eq!(result.unwrap_err(), FetchFailure::HttpError { status: 503 });
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let (result, transport) = fetch_with(Canned::new(Err(TransportError::Timeout))).await;
        let err = result.unwrap_err();
        assert_eq!(err.reason(), "network_error");
        assert_eq!(transport.seen.lock().unwrap().len(), 1, "no retry");
    }

    #[tokio::test]
    async fn missing_keys_are_invalid_shape() {
        for body in [
            json!({"success": true, "pipeline_results": {}}),
            json!({"content": {"music": {}}}),
            json!({"patient_info": {}}),
            json!({"patient_info": {}, "content": null}),
        ] {
            let (result, _) = fetch_with(Canned::ok(200, &body.to_string())).await;
            assert_eq!(result.unwrap_err().reason(), "invalid_shape", "body {body}");
        }
    }

    #[tokio::test]
    async fn unparseable_body_is_invalid_shape() {
        let (result, _) = fetch_with(Canned::ok(200, "<html>oops</html>")).await;
        assert!(matches!(result, Err(FetchFailure::InvalidShape { .. })));
    }

    #[tokio::test]
    async fn health_check_reports_connectivity() {
        let online = ContentFetcher::new(
            Canned::ok(200, r#"{"status":"healthy"}"#),
            FetcherConfig::default(),
        );
        assert_eq!(online.health().await, Connectivity::Online);

        let unhealthy = ContentFetcher::new(
            Canned::ok(200, r#"{"status":"unhealthy"}"#),
            FetcherConfig::default(),
        );
        assert_eq!(unhealthy.health().await, Connectivity::Offline);

        let down = ContentFetcher::new(
            Canned::new(Err(TransportError::Request("refused".into()))),
            FetcherConfig::default(),
        );
        assert_eq!(down.health().await, Connectivity::Offline);
        assert_eq!(down.transport.seen.lock().unwrap()[0].0, "/health");
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = FetcherConfig::new("http://localhost:8000/".into());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn failure_serializes_with_reason_tag() {
        let json = serde_json::to_value(FetchFailure::HttpError { status: 500 }).unwrap();
        assert_eq!(json, json!({"reason": "http_error", "status": 500}));
    }
}
