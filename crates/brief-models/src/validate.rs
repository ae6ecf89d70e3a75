//! Structural manifest validation.
//!
//! Validation is pure, synchronous, and total: semantically odd but
//! well-formed manifests (overlapping scenes, gaps) pass; only
//! structural violations are rejected, and all of them are reported in
//! one pass as field-qualified issues.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ValidationError, ValidationErrors};
use crate::manifest::{ProductionManifest, VisualSource};

/// Minimum scene duration in seconds.
pub const MIN_SCENE_DURATION_SECS: f64 = 0.05;

/// Minimum total output duration in seconds.
pub const MIN_TOTAL_DURATION_SECS: f64 = 1.0;

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Structural violation; the manifest is rejected
    Error,
    /// Suspicious but accepted
    Warning,
}

/// One field-qualified validation finding.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Dotted path of the offending field
    pub field: String,
    pub message: String,
}

/// Result of validating a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no error-severity issue was found.
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|i| i.severity == Severity::Error)
    }

    /// Error-severity issues only.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    /// Warning-severity issues only.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Convert into a `Result`, keeping only errors on the failure side.
    pub fn into_result(self) -> Result<Vec<ValidationIssue>, ValidationErrors> {
        if self.is_valid() {
            Ok(self.issues)
        } else {
            Err(ValidationErrors::new(
                self.errors()
                    .map(|i| ValidationError::new(i.field.clone(), i.message.clone()))
                    .collect(),
            ))
        }
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        });
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        });
    }
}

/// Validate a production manifest against the structural schema.
pub fn validate_manifest(manifest: &ProductionManifest) -> ValidationReport {
    let mut report = ValidationReport::default();

    if manifest.metadata.duration_seconds < MIN_TOTAL_DURATION_SECS {
        report.error(
            "metadata.duration_seconds",
            format!(
                "must be >= {}, got {}",
                MIN_TOTAL_DURATION_SECS, manifest.metadata.duration_seconds
            ),
        );
    }

    if manifest.scenes.is_empty() {
        report.error("scenes", "must contain at least one scene");
    }

    let mut seen_scene_ids = HashSet::new();

    for (idx, scene) in manifest.scenes.iter().enumerate() {
        let path = format!("scenes[{}]", idx);

        if !seen_scene_ids.insert(scene.id.as_str()) {
            report.error(
                format!("{}.id", path),
                format!("duplicate scene id {:?}", scene.id),
            );
        }

        if !scene.start_at_sec.is_finite() || scene.start_at_sec < 0.0 {
            report.error(
                format!("{}.start_at_sec", path),
                format!("must be >= 0, got {}", scene.start_at_sec),
            );
        }

        if !scene.duration_seconds.is_finite()
            || scene.duration_seconds < MIN_SCENE_DURATION_SECS
        {
            report.error(
                format!("{}.duration_seconds", path),
                format!(
                    "must be >= {}, got {}",
                    MIN_SCENE_DURATION_SECS, scene.duration_seconds
                ),
            );
        }

        if scene.end_at_sec() > manifest.metadata.duration_seconds {
            report.warning(
                format!("{}.duration_seconds", path),
                format!(
                    "scene window ends at {}s, past the manifest duration of {}s",
                    scene.end_at_sec(),
                    manifest.metadata.duration_seconds
                ),
            );
        }

        if scene.visuals.is_empty() {
            report.error(
                format!("{}.visuals", path),
                "must contain at least one visual",
            );
        }

        for (vidx, visual) in scene.visuals.iter().enumerate() {
            let known = manifest.assets.contains_key(&visual.asset_id);
            let placeholder = visual.source == VisualSource::Generated;
            if !known && !placeholder {
                report.error(
                    format!("{}.visuals[{}].asset_id", path, vidx),
                    format!(
                        "references unknown asset {:?} and is not flagged as generated",
                        visual.asset_id
                    ),
                );
            }
        }
    }

    let mut seen_job_ids = HashSet::new();
    for (idx, job) in manifest.jobs.iter().enumerate() {
        if !seen_job_ids.insert(job.id.as_str()) {
            report.error(
                format!("jobs[{}].id", idx),
                format!("duplicate job id {:?}", job.id),
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{
        ManifestAsset, ManifestMetadata, ScenePlan, SceneVisual, VisualSource,
    };
    use std::collections::HashMap;

    fn metadata(duration: f64) -> ManifestMetadata {
        ManifestMetadata {
            intent: Default::default(),
            duration_seconds: duration,
            aspect_ratio: "9:16".to_string(),
            platform: "tiktok".to_string(),
            language: "en".to_string(),
            profile: None,
            priority: None,
            voice_gender: None,
            cinematic_level: None,
        }
    }

    fn scene(id: &str, start: f64, duration: f64, asset_id: &str) -> ScenePlan {
        ScenePlan {
            id: id.to_string(),
            start_at_sec: start,
            duration_seconds: duration,
            purpose: "hook".to_string(),
            narration: None,
            language: None,
            tts: None,
            music_cue: None,
            visual_anchor: None,
            visuals: vec![SceneVisual {
                source: VisualSource::UserSupplied,
                asset_id: asset_id.to_string(),
                transform: None,
                shot: None,
            }],
        }
    }

    fn manifest_with(scenes: Vec<ScenePlan>, assets: HashMap<String, ManifestAsset>) -> ProductionManifest {
        ProductionManifest {
            user_id: None,
            source_refs: Default::default(),
            metadata: metadata(10.0),
            scenes,
            assets,
            audio: Default::default(),
            visuals: Default::default(),
            effects: Default::default(),
            consistency: Default::default(),
            jobs: Vec::new(),
        }
    }

    fn known_asset(id: &str) -> (String, ManifestAsset) {
        (
            id.to_string(),
            ManifestAsset {
                url: format!("https://cdn.example.com/{}.png", id),
                media_type: Some("image".to_string()),
                description: None,
            },
        )
    }

    #[test]
    fn test_empty_scenes_rejected() {
        let report = validate_manifest(&manifest_with(vec![], HashMap::new()));
        assert!(!report.is_valid());
        assert!(report.errors().any(|i| i.field.contains("scenes")));
    }

    #[test]
    fn test_missing_asset_reference_rejected() {
        // Scenario: one scene referencing "a1", absent from assets and not
        // flagged generated.
        let report = validate_manifest(&manifest_with(
            vec![scene("s1", 0.0, 0.05, "a1")],
            HashMap::new(),
        ));
        assert!(!report.is_valid());
        assert!(report
            .errors()
            .any(|i| i.field.contains("asset_id") && i.message.contains("a1")));
    }

    #[test]
    fn test_generated_placeholder_accepted() {
        let mut s = scene("s1", 0.0, 1.0, "to-generate");
        s.visuals[0].source = VisualSource::Generated;
        let report = validate_manifest(&manifest_with(vec![s], HashMap::new()));
        assert!(report.is_valid());
    }

    #[test]
    fn test_minimal_valid_manifest() {
        let report = validate_manifest(&manifest_with(
            vec![scene("s1", 0.0, 0.05, "a1")],
            HashMap::from([known_asset("a1")]),
        ));
        assert!(report.is_valid(), "issues: {:?}", report.issues);
    }

    #[test]
    fn test_short_duration_and_negative_start_rejected() {
        let report = validate_manifest(&manifest_with(
            vec![scene("s1", -1.0, 0.01, "a1")],
            HashMap::from([known_asset("a1")]),
        ));
        let fields: Vec<_> = report.errors().map(|i| i.field.clone()).collect();
        assert!(fields.iter().any(|f| f.contains("start_at_sec")));
        assert!(fields.iter().any(|f| f.contains("duration_seconds")));
    }

    #[test]
    fn test_scene_past_total_duration_is_warning_only() {
        let report = validate_manifest(&manifest_with(
            vec![scene("s1", 8.0, 5.0, "a1")],
            HashMap::from([known_asset("a1")]),
        ));
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_overlapping_scenes_accepted() {
        // Overlap is a policy question for the assembler, not a structural
        // violation.
        let report = validate_manifest(&manifest_with(
            vec![scene("s1", 0.0, 5.0, "a1"), scene("s2", 2.0, 5.0, "a1")],
            HashMap::from([known_asset("a1")]),
        ));
        assert!(report.is_valid());
    }

    #[test]
    fn test_total_duration_floor() {
        let mut m = manifest_with(
            vec![scene("s1", 0.0, 0.5, "a1")],
            HashMap::from([known_asset("a1")]),
        );
        m.metadata.duration_seconds = 0.5;
        let report = validate_manifest(&m);
        assert!(report
            .errors()
            .any(|i| i.field == "metadata.duration_seconds"));
    }
}
