//! Analysis fan-out result models.
//!
//! Each (domain, asset url) pair holds a primary outcome and, when the
//! primary analyzer failed, the outcome of the fallback chain. A recorded
//! success is never overwritten by a later failure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::asset::MediaKind;

/// Analysis domain an analyzer operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDomain {
    Vision,
    Video,
    Audio,
    Text,
}

impl AnalysisDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisDomain::Vision => "vision",
            AnalysisDomain::Video => "video",
            AnalysisDomain::Audio => "audio",
            AnalysisDomain::Text => "text",
        }
    }

    /// Domains applicable to a given media kind.
    pub fn for_media_kind(kind: MediaKind) -> &'static [AnalysisDomain] {
        match kind {
            MediaKind::Image => &[AnalysisDomain::Vision, AnalysisDomain::Text],
            MediaKind::Video => &[
                AnalysisDomain::Video,
                AnalysisDomain::Vision,
                AnalysisDomain::Audio,
                AnalysisDomain::Text,
            ],
            MediaKind::Audio => &[AnalysisDomain::Audio, AnalysisDomain::Text],
            MediaKind::Document => &[AnalysisDomain::Text],
        }
    }
}

impl fmt::Display for AnalysisDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single analyzer invocation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Analyzer returned a structured payload.
    Success {
        /// Opaque analyzer payload
        payload: serde_json::Value,
        /// Analyzer that produced it (e.g. model name)
        analyzer: String,
    },
    /// Analyzer failed (timeout, non-2xx, malformed payload).
    Failure {
        /// Error description for operator visibility
        error: String,
        /// Analyzer that failed
        analyzer: String,
    },
}

impl AnalysisOutcome {
    pub fn success(payload: serde_json::Value, analyzer: impl Into<String>) -> Self {
        Self::Success {
            payload,
            analyzer: analyzer.into(),
        }
    }

    pub fn failure(error: impl Into<String>, analyzer: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
            analyzer: analyzer.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success { .. })
    }
}

/// Recorded result for one (domain, asset) pair.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Outcome of the primary analyzer
    pub primary: AnalysisOutcome,

    /// Outcome of the fallback chain, when the primary failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<AnalysisOutcome>,

    /// True when the usable payload came from a fallback analyzer
    #[serde(default)]
    pub fallback_used: bool,
}

impl AnalysisResult {
    /// A result where the primary analyzer succeeded.
    pub fn primary_success(outcome: AnalysisOutcome) -> Self {
        Self {
            primary: outcome,
            fallback: None,
            fallback_used: false,
        }
    }

    /// A result recovered through the fallback chain.
    pub fn recovered(primary: AnalysisOutcome, fallback: AnalysisOutcome) -> Self {
        Self {
            primary,
            fallback: Some(fallback),
            fallback_used: true,
        }
    }

    /// A result where every analyzer in the chain failed.
    pub fn exhausted(primary: AnalysisOutcome, last_fallback: Option<AnalysisOutcome>) -> Self {
        Self {
            primary,
            fallback: last_fallback,
            fallback_used: false,
        }
    }

    /// The usable payload, if any analyzer succeeded.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        let outcome = if self.fallback_used {
            self.fallback.as_ref()?
        } else {
            &self.primary
        };
        match outcome {
            AnalysisOutcome::Success { payload, .. } => Some(payload),
            AnalysisOutcome::Failure { .. } => None,
        }
    }

    /// True if no analyzer produced a payload for this entry.
    pub fn is_failed(&self) -> bool {
        self.payload().is_none()
    }
}

/// Joined fan-out results: domain → asset url → result.
pub type AnalysisMap = HashMap<AnalysisDomain, HashMap<String, AnalysisResult>>;

/// Count (successful, failed) entries across the whole map.
pub fn analysis_counts(map: &AnalysisMap) -> (usize, usize) {
    let mut ok = 0;
    let mut failed = 0;
    for per_asset in map.values() {
        for result in per_asset.values() {
            if result.is_failed() {
                failed += 1;
            } else {
                ok += 1;
            }
        }
    }
    (ok, failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_for_media_kind() {
        assert_eq!(
            AnalysisDomain::for_media_kind(MediaKind::Image),
            &[AnalysisDomain::Vision, AnalysisDomain::Text]
        );
        assert_eq!(AnalysisDomain::for_media_kind(MediaKind::Video).len(), 4);
        assert_eq!(
            AnalysisDomain::for_media_kind(MediaKind::Document),
            &[AnalysisDomain::Text]
        );
    }

    #[test]
    fn test_recovered_result_uses_fallback_payload() {
        let result = AnalysisResult::recovered(
            AnalysisOutcome::failure("timeout", "vision-primary"),
            AnalysisOutcome::success(serde_json::json!({"tags": ["logo"]}), "vision-fallback"),
        );

        assert!(result.fallback_used);
        assert!(!result.is_failed());
        assert_eq!(result.payload().unwrap()["tags"][0], "logo");
    }

    #[test]
    fn test_exhausted_result_is_failed() {
        let result = AnalysisResult::exhausted(
            AnalysisOutcome::failure("timeout", "a"),
            Some(AnalysisOutcome::failure("503", "b")),
        );
        assert!(result.is_failed());
        assert!(result.payload().is_none());
    }
}
