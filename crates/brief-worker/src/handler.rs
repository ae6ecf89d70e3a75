//! Job handlers and their registry.
//!
//! Actual production work (rendering, TTS, generation) happens in
//! external services; a handler is the worker-side adapter that drives
//! one job kind to completion and reports the outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use brief_models::Job;

use crate::error::HandlerError;

/// Executes jobs of one kind.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Kind name this handler serves, matching `JobKind::name()`.
    fn kind(&self) -> &str;

    /// Execute one job and return its result payload.
    async fn execute(&self, job: &Job) -> Result<serde_json::Value, HandlerError>;
}

/// Handler lookup keyed by job kind name.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.insert(handler.kind().to_string(), handler);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn JobHandler>> {
        self.handlers.get(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Build a registry of remote handlers from `JOB_HANDLER_<KIND>_URL`
    /// environment variables. Kinds without a configured endpoint get no
    /// handler and fail terminally when claimed.
    pub fn from_env(client: &reqwest::Client) -> Self {
        const KINDS: [&str; 5] = [
            "render_scene",
            "tts",
            "generate_asset",
            "upscale",
            "mix_audio",
        ];

        let mut registry = Self::new();
        for kind in KINDS {
            let var = format!("JOB_HANDLER_{}_URL", kind.to_uppercase());
            if let Ok(url) = std::env::var(&var) {
                registry =
                    registry.register(Arc::new(RemoteJobHandler::new(kind, url, client.clone())));
            }
        }
        registry
    }
}

#[derive(Serialize)]
struct RemoteJobRequest<'a> {
    job_id: &'a str,
    #[serde(flatten)]
    job: &'a Job,
}

/// Handler that forwards the job to a remote execution endpoint.
///
/// The remote service owns the actual work; this adapter only maps HTTP
/// outcomes onto the retry policy. Timeouts, connection errors, and 5xx
/// responses are retryable; 4xx responses mean the payload itself is
/// unusable and fail the job terminally.
pub struct RemoteJobHandler {
    kind: String,
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteJobHandler {
    pub fn new(kind: impl Into<String>, endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            kind: kind.into(),
            endpoint: endpoint.into(),
            client,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl JobHandler for RemoteJobHandler {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn execute(&self, job: &Job) -> Result<serde_json::Value, HandlerError> {
        debug!(job_id = %job.id, endpoint = %self.endpoint, "Dispatching job to remote handler");

        let request = RemoteJobRequest {
            job_id: job.id.as_str(),
            job,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HandlerError::retryable(format!("Remote handler timed out: {e}"))
                } else {
                    HandlerError::retryable(format!("Remote handler unreachable: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(HandlerError::fatal(format!(
                "Remote handler rejected job ({status}): {body}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HandlerError::retryable(format!(
                "Remote handler error ({status}): {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| HandlerError::retryable(format!("Malformed handler response: {e}")))
    }
}
