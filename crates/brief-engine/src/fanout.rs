//! Concurrent analysis fan-out.
//!
//! Every (asset, domain) pair is analyzed independently: the domain's
//! primary analyzer first, then its fallback chain in declared order,
//! stopping at the first success. A pair whose whole chain fails is
//! recorded as failed without aborting the rest; partial results are
//! the norm. The caller's cancellation token is checked before every
//! remote call.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use brief_models::{
    analysis_counts, AnalysisDomain, AnalysisMap, AnalysisOutcome, AnalysisResult, MediaAsset,
};

use crate::analyzer::{AnalyzerRegistry, AnalyzerSet};
use crate::error::{EngineError, EngineResult};
use crate::session::CancelToken;

/// Fan-out configuration.
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    /// Cap on concurrent analyzer calls per request, to avoid
    /// overwhelming downstream model APIs
    pub max_concurrency: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self { max_concurrency: 8 }
    }
}

impl FanoutConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrency: std::env::var("FANOUT_MAX_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
        }
    }
}

/// Fans assets out to the analyzer chains and joins the outcomes.
pub struct AnalysisFanout {
    registry: Arc<AnalyzerRegistry>,
    config: FanoutConfig,
}

impl AnalysisFanout {
    pub fn new(registry: AnalyzerRegistry, config: FanoutConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// Analyze all assets across their applicable domains.
    ///
    /// Returns the joined map, or `EngineError::Cancelled` if the token
    /// fired; a cancelled fan-out yields no partial map.
    pub async fn analyze(
        &self,
        assets: &[MediaAsset],
        prompt: &str,
        token: &CancelToken,
    ) -> EngineResult<AnalysisMap> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks: JoinSet<Option<(AnalysisDomain, String, AnalysisResult)>> = JoinSet::new();
        let mut pairs = 0usize;

        for asset in assets {
            for &domain in AnalysisDomain::for_media_kind(asset.media_type) {
                let Some(set) = self.registry.get(domain) else {
                    continue;
                };

                pairs += 1;
                let set = set.clone();
                let asset = asset.clone();
                let prompt = prompt.to_string();
                let token = token.clone();
                let semaphore = Arc::clone(&semaphore);

                tasks.spawn(async move {
                    let _permit = semaphore.acquire().await.ok()?;
                    if token.is_cancelled() {
                        return None;
                    }
                    let result = run_chain(&set, &asset, &prompt, &token).await?;
                    Some((domain, asset.url.clone(), result))
                });
            }
        }

        debug!(pairs, "Fan-out dispatched");

        let mut map = AnalysisMap::new();
        while let Some(joined) = tasks.join_next().await {
            let entry = joined.map_err(|e| EngineError::Join(e.to_string()))?;
            if let Some((domain, url, result)) = entry {
                map.entry(domain).or_default().insert(url, result);
            }
        }

        // A cancelled fan-out must not surface partial results.
        if token.is_cancelled() {
            info!("Fan-out cancelled, discarding partial results");
            return Err(EngineError::Cancelled);
        }

        let (ok, failed) = analysis_counts(&map);
        info!(ok, failed, "Fan-out joined");

        Ok(map)
    }
}

/// Run one domain chain for one asset: primary, then fallbacks in order.
///
/// Returns `None` only when cancellation was observed before a call.
async fn run_chain(
    set: &AnalyzerSet,
    asset: &MediaAsset,
    prompt: &str,
    token: &CancelToken,
) -> Option<AnalysisResult> {
    let primary_name = set.primary.name().to_string();
    let primary = match set.primary.analyze(asset, prompt).await {
        Ok(payload) => {
            return Some(AnalysisResult::primary_success(AnalysisOutcome::success(
                payload,
                primary_name,
            )))
        }
        Err(e) => {
            warn!(analyzer = %primary_name, asset_id = %asset.id, error = %e, "Primary analyzer failed");
            AnalysisOutcome::failure(e.to_string(), primary_name)
        }
    };

    let mut last_failure = None;
    for fallback in &set.fallbacks {
        if token.is_cancelled() {
            return None;
        }
        let name = fallback.name().to_string();
        match fallback.analyze(asset, prompt).await {
            Ok(payload) => {
                info!(analyzer = %name, asset_id = %asset.id, "Recovered via fallback");
                return Some(AnalysisResult::recovered(
                    primary,
                    AnalysisOutcome::success(payload, name),
                ));
            }
            Err(e) => {
                warn!(analyzer = %name, asset_id = %asset.id, error = %e, "Fallback analyzer failed");
                last_failure = Some(AnalysisOutcome::failure(e.to_string(), name));
            }
        }
    }

    Some(AnalysisResult::exhausted(primary, last_failure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Analyzer, AnalyzerFailure};
    use async_trait::async_trait;
    use brief_models::MediaKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test analyzer that fails a fixed number of callers before
    /// succeeding, or always fails.
    struct ScriptedAnalyzer {
        name: String,
        succeed: bool,
        calls: AtomicUsize,
    }

    impl ScriptedAnalyzer {
        fn ok(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                succeed: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                succeed: false,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Analyzer for ScriptedAnalyzer {
        fn name(&self) -> &str {
            &self.name
        }

        async fn analyze(
            &self,
            asset: &MediaAsset,
            _prompt: &str,
        ) -> Result<serde_json::Value, AnalyzerFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(serde_json::json!({ "analyzer": self.name, "asset": asset.id }))
            } else {
                Err(AnalyzerFailure::Other("scripted failure".to_string()))
            }
        }
    }

    fn image_asset(id: &str) -> MediaAsset {
        let mut asset = MediaAsset::new(
            format!("https://cdn.example.com/{}.png", id),
            MediaKind::Image,
        );
        asset.id = id.to_string();
        asset
    }

    #[tokio::test]
    async fn test_fallback_order_first_success_wins() {
        let second = ScriptedAnalyzer::ok("fb-2");
        let registry = AnalyzerRegistry::new().with_domain(
            AnalysisDomain::Vision,
            AnalyzerSet::new(ScriptedAnalyzer::failing("primary"))
                .with_fallback(ScriptedAnalyzer::ok("fb-1"))
                .with_fallback(second.clone()),
        );

        let fanout = AnalysisFanout::new(registry, FanoutConfig::default());
        let assets = vec![image_asset("a1")];
        let map = fanout
            .analyze(&assets, "p", &CancelToken::never())
            .await
            .unwrap();

        let result = &map[&AnalysisDomain::Vision][&assets[0].url];
        assert!(result.fallback_used);
        assert_eq!(result.payload().unwrap()["analyzer"], "fb-1");
        // The chain stopped at the first fallback success.
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_does_not_abort_other_entries() {
        let registry = AnalyzerRegistry::new()
            .with_domain(
                AnalysisDomain::Vision,
                AnalyzerSet::new(ScriptedAnalyzer::failing("v-primary"))
                    .with_fallback(ScriptedAnalyzer::failing("v-fb")),
            )
            .with_domain(
                AnalysisDomain::Text,
                AnalyzerSet::new(ScriptedAnalyzer::ok("t-primary")),
            );

        let fanout = AnalysisFanout::new(registry, FanoutConfig::default());
        let assets = vec![image_asset("a1")];
        let map = fanout
            .analyze(&assets, "p", &CancelToken::never())
            .await
            .unwrap();

        assert!(map[&AnalysisDomain::Vision][&assets[0].url].is_failed());
        assert!(!map[&AnalysisDomain::Text][&assets[0].url].is_failed());
    }

    #[tokio::test]
    async fn test_cancelled_fanout_returns_no_partial_map() {
        let registry = AnalyzerRegistry::new().with_domain(
            AnalysisDomain::Vision,
            AnalyzerSet::new(ScriptedAnalyzer::ok("primary")),
        );

        let fanout = AnalysisFanout::new(registry, FanoutConfig::default());
        let tracker = crate::session::SessionTracker::new();
        let token = tracker.begin("s1");
        let _superseding = tracker.begin("s1");

        let assets = vec![image_asset("a1")];
        let err = fanout.analyze(&assets, "p", &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
