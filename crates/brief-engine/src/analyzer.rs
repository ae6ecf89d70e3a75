//! Remote analyzer clients and per-domain analyzer chains.
//!
//! Analyzers are opaque remote calls: they either return a structured
//! payload or fail. Timeouts and non-2xx responses are both failures
//! and trigger the domain's fallback chain.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use brief_models::{AnalysisDomain, MediaAsset};

/// Why a single analyzer invocation failed.
#[derive(Debug, Error)]
pub enum AnalyzerFailure {
    #[error("request timed out")]
    Timeout,

    #[error("analyzer returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("{0}")]
    Other(String),
}

/// One analysis backend.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Name recorded in analysis outcomes (e.g. a model name).
    fn name(&self) -> &str;

    /// Analyze one asset. The prompt carries the request intent.
    async fn analyze(
        &self,
        asset: &MediaAsset,
        prompt: &str,
    ) -> Result<serde_json::Value, AnalyzerFailure>;
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    asset_id: &'a str,
    url: &'a str,
    media_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    prompt: &'a str,
}

/// HTTP analyzer backend.
pub struct RemoteAnalyzer {
    name: String,
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteAnalyzer {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            client,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(
        &self,
        asset: &MediaAsset,
        prompt: &str,
    ) -> Result<serde_json::Value, AnalyzerFailure> {
        let request = AnalyzeRequest {
            asset_id: &asset.id,
            url: &asset.url,
            media_type: asset.media_type.as_str(),
            description: asset.description(),
            prompt,
        };

        debug!(analyzer = %self.name, asset_id = %asset.id, "Calling remote analyzer");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerFailure::Timeout
                } else {
                    AnalyzerFailure::Other(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerFailure::Http { status, body });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AnalyzerFailure::Malformed(e.to_string()))
    }
}

/// Primary analyzer plus ordered fallback chain for one domain.
#[derive(Clone)]
pub struct AnalyzerSet {
    pub primary: Arc<dyn Analyzer>,
    /// Tried in declared order, stopping at the first success
    pub fallbacks: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerSet {
    pub fn new(primary: Arc<dyn Analyzer>) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.fallbacks.push(analyzer);
        self
    }
}

/// Analyzer chains keyed by domain.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    sets: HashMap<AnalysisDomain, AnalyzerSet>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: AnalysisDomain, set: AnalyzerSet) -> Self {
        self.sets.insert(domain, set);
        self
    }

    pub fn get(&self, domain: AnalysisDomain) -> Option<&AnalyzerSet> {
        self.sets.get(&domain)
    }

    /// Build remote analyzer chains from environment variables.
    ///
    /// For each domain D, `ANALYZER_<D>_URL` configures the primary
    /// endpoint and `ANALYZER_<D>_FALLBACK_URLS` an ordered
    /// comma-separated fallback list. Unconfigured domains are skipped
    /// and simply produce no analysis entries.
    pub fn from_env(client: reqwest::Client) -> Self {
        let mut registry = Self::new();

        for domain in [
            AnalysisDomain::Vision,
            AnalysisDomain::Video,
            AnalysisDomain::Audio,
            AnalysisDomain::Text,
        ] {
            let upper = domain.as_str().to_uppercase();
            let Ok(primary_url) = std::env::var(format!("ANALYZER_{}_URL", upper)) else {
                continue;
            };

            let mut set = AnalyzerSet::new(Arc::new(RemoteAnalyzer::new(
                format!("{}-primary", domain),
                primary_url,
                client.clone(),
            )));

            if let Ok(fallbacks) = std::env::var(format!("ANALYZER_{}_FALLBACK_URLS", upper)) {
                for (idx, url) in fallbacks
                    .split(',')
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .enumerate()
                {
                    set = set.with_fallback(Arc::new(RemoteAnalyzer::new(
                        format!("{}-fallback-{}", domain, idx),
                        url,
                        client.clone(),
                    )));
                }
            }

            registry = registry.with_domain(domain, set);
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_models::MediaKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn asset() -> MediaAsset {
        MediaAsset::new("https://cdn.example.com/a.png", MediaKind::Image)
    }

    #[tokio::test]
    async fn test_remote_analyzer_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tags": ["logo", "blue"]
            })))
            .mount(&server)
            .await;

        let analyzer = RemoteAnalyzer::new(
            "vision-primary",
            format!("{}/analyze", server.uri()),
            reqwest::Client::new(),
        );

        let payload = analyzer.analyze(&asset(), "describe").await.unwrap();
        assert_eq!(payload["tags"][0], "logo");
    }

    #[tokio::test]
    async fn test_remote_analyzer_non_2xx_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let analyzer =
            RemoteAnalyzer::new("vision-primary", server.uri(), reqwest::Client::new());

        let err = analyzer.analyze(&asset(), "describe").await.unwrap_err();
        assert!(matches!(err, AnalyzerFailure::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_remote_analyzer_malformed_body_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let analyzer =
            RemoteAnalyzer::new("vision-primary", server.uri(), reqwest::Client::new());

        let err = analyzer.analyze(&asset(), "describe").await.unwrap_err();
        assert!(matches!(err, AnalyzerFailure::Malformed(_)));
    }
}
