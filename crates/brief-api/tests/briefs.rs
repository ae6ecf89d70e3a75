//! Brief endpoint behavior, including session duplicate suppression.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::Json;

use brief_api::handlers::briefs::{create_brief, CreateBriefRequest};
use brief_api::{ApiConfig, ApiError, AppState};
use brief_engine::{
    AnalysisFanout, Analyzer, AnalyzerFailure, AnalyzerRegistry, AnalyzerSet, BriefEngine,
    EngineError, FanoutConfig,
};
use brief_models::{AnalysisDomain, AssetMetadata, MediaAsset, MediaReference};
use brief_queue::{JobQueue, MemoryJobStore};

struct SlowAnalyzer {
    delay: Duration,
}

#[async_trait]
impl Analyzer for SlowAnalyzer {
    fn name(&self) -> &str {
        "slow-vision"
    }

    async fn analyze(
        &self,
        asset: &MediaAsset,
        _prompt: &str,
    ) -> Result<serde_json::Value, AnalyzerFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(serde_json::json!({ "asset": asset.id }))
    }
}

fn state(delay: Duration) -> AppState {
    let registry = AnalyzerRegistry::new().with_domain(
        AnalysisDomain::Vision,
        AnalyzerSet::new(Arc::new(SlowAnalyzer { delay })),
    );
    let engine = BriefEngine::new(AnalysisFanout::new(registry, FanoutConfig::default()));
    AppState::new(
        ApiConfig::default(),
        engine,
        JobQueue::new(MemoryJobStore::shared()),
    )
}

fn request(session_id: Option<&str>) -> CreateBriefRequest {
    CreateBriefRequest {
        query: "product teaser".to_string(),
        assets: vec![MediaReference {
            id: Some("a1".to_string()),
            url: "https://cdn.example.com/a1.png".to_string(),
            media_type: "image".to_string(),
            metadata: AssetMetadata::default(),
        }],
        intent: Default::default(),
        preferences: Default::default(),
        session_id: session_id.map(str::to_string),
    }
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let state = state(Duration::ZERO);
    let mut req = request(None);
    req.query = "   ".to_string();

    let err = create_brief(State(state), Json(req)).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn brief_response_carries_plan_and_analysis() {
    let state = state(Duration::ZERO);

    let package = create_brief(State(state), Json(request(None)))
        .await
        .unwrap();
    assert!(!package.0.plan.creative_options.is_empty());
    assert!(package.0.analysis.contains_key(&AnalysisDomain::Vision));
}

/// A newer request on the same session supersedes the one in flight;
/// the superseded request surfaces as a conflict, the newer one wins.
#[tokio::test]
async fn duplicate_session_cancels_in_flight_run() {
    let state = state(Duration::from_millis(200));

    let first_state = state.clone();
    let first = tokio::spawn(async move {
        create_brief(State(first_state), Json(request(Some("session-1")))).await
    });

    // Let the first request reach its analyzer before superseding it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = create_brief(State(state), Json(request(Some("session-1")))).await;

    let first = first.await.unwrap();
    let err = first.unwrap_err();
    assert!(matches!(err, ApiError::Engine(EngineError::Cancelled)));

    let package = second.unwrap();
    assert!(package.0.analysis.contains_key(&AnalysisDomain::Vision));
}
