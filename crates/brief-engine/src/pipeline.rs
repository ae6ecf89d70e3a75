//! End-to-end brief pipeline: normalize, fan out, synthesize, assemble.

use tracing::info;

use brief_models::{
    normalize_assets, BriefPackage, BriefPreferences, BriefRequest, CreativeIntent,
    MediaReference,
};

use crate::assembler;
use crate::error::EngineResult;
use crate::fanout::AnalysisFanout;
use crate::session::{CancelToken, SessionTracker};
use crate::synthesizer;

/// Orchestrates one analysis run per inbound request.
pub struct BriefEngine {
    fanout: AnalysisFanout,
    sessions: SessionTracker,
}

impl BriefEngine {
    pub fn new(fanout: AnalysisFanout) -> Self {
        Self {
            fanout,
            sessions: SessionTracker::new(),
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// When a `session_id` is given, any prior in-flight run for the
    /// same session is cancelled first.
    pub async fn run(
        &self,
        query: String,
        refs: &[MediaReference],
        intent: CreativeIntent,
        preferences: BriefPreferences,
        session_id: Option<&str>,
    ) -> EngineResult<BriefPackage> {
        let assets = normalize_assets(refs)?;

        let token = match session_id {
            Some(id) => self.sessions.begin(id),
            None => CancelToken::never(),
        };

        let analysis = self.fanout.analyze(&assets, &query, &token).await;
        if let Some(id) = session_id {
            // Releases the session only if this run's token is still the
            // registered one; a superseding run keeps its own entry.
            self.sessions.finish(id, &token);
        }
        let analysis = analysis?;

        let request = BriefRequest {
            query,
            assets,
            intent,
            preferences,
        };

        let plan = synthesizer::synthesize(&request, &analysis);
        let package = assembler::assemble(request, analysis, plan)?;

        info!(brief_id = %package.brief_id, "Brief pipeline completed");
        Ok(package)
    }
}
