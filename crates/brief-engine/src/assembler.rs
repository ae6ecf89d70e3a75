//! Brief package assembly.

use chrono::Utc;
use tracing::info;

use brief_models::{AnalysisMap, BriefId, BriefPackage, BriefRequest, CreativePlan};

use crate::error::{EngineError, EngineResult};

/// Assemble a brief package from a request, its analysis, and the
/// synthesized plan.
///
/// A fresh `brief_id` is generated per call. Packages are immutable:
/// re-running analysis for an updated request produces a new package
/// and the caller treats the old one as stale.
pub fn assemble(
    request: BriefRequest,
    analysis: AnalysisMap,
    plan: CreativePlan,
) -> EngineResult<BriefPackage> {
    if request.query.trim().is_empty() {
        return Err(EngineError::assembly("request query is empty"));
    }

    // Analysis may be degraded, but it must at least have been attempted
    // when assets were supplied.
    if !request.assets.is_empty() && analysis.is_empty() {
        return Err(EngineError::assembly(
            "assets supplied but analysis was not attempted",
        ));
    }

    let brief_id = BriefId::new();
    info!(brief_id = %brief_id, assets = request.assets.len(), "Assembled brief package");

    Ok(BriefPackage {
        brief_id,
        request,
        analysis,
        plan,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_models::{
        AnalysisDomain, AnalysisOutcome, AnalysisResult, BriefPreferences, CreativeIntent,
        MediaAsset, MediaKind,
    };
    use std::collections::HashMap;

    fn request(assets: Vec<MediaAsset>) -> BriefRequest {
        BriefRequest {
            query: "make a teaser".to_string(),
            assets,
            intent: CreativeIntent::Video,
            preferences: BriefPreferences::default(),
        }
    }

    fn empty_plan() -> CreativePlan {
        CreativePlan {
            creative_options: vec![],
            asset_processing: HashMap::new(),
            cost_estimate: 1.0,
        }
    }

    #[test]
    fn test_fresh_brief_id_per_call() {
        let a = assemble(request(vec![]), AnalysisMap::new(), empty_plan()).unwrap();
        let b = assemble(request(vec![]), AnalysisMap::new(), empty_plan()).unwrap();
        assert_ne!(a.brief_id, b.brief_id);
    }

    #[test]
    fn test_empty_query_is_fatal() {
        let mut r = request(vec![]);
        r.query = "  ".to_string();
        let err = assemble(r, AnalysisMap::new(), empty_plan()).unwrap_err();
        assert!(matches!(err, EngineError::Assembly(_)));
    }

    #[test]
    fn test_assets_without_attempted_analysis_is_fatal() {
        let asset = MediaAsset::new("https://cdn.example.com/a.png", MediaKind::Image);
        let err = assemble(request(vec![asset]), AnalysisMap::new(), empty_plan()).unwrap_err();
        assert!(matches!(err, EngineError::Assembly(_)));
    }

    #[test]
    fn test_degraded_analysis_is_a_legitimate_package() {
        let asset = MediaAsset::new("https://cdn.example.com/a.png", MediaKind::Image);
        let mut analysis = AnalysisMap::new();
        analysis.entry(AnalysisDomain::Vision).or_default().insert(
            asset.url.clone(),
            AnalysisResult::exhausted(
                AnalysisOutcome::failure("timeout", "vision-primary"),
                None,
            ),
        );

        let package = assemble(request(vec![asset]), analysis, empty_plan()).unwrap();
        assert_eq!(package.request.assets.len(), 1);
    }
}
