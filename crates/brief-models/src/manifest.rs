//! Production manifest models.
//!
//! A `ProductionManifest` is the structured plan a caller derives from a
//! brief: scenes, asset descriptors, audio configuration, and the jobs
//! needed to produce the output. Manifests are validated (see
//! [`crate::validate`]) before any job is enqueued.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::brief::CreativeIntent;
use crate::job::JobKind;

/// Where a scene visual comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisualSource {
    /// References an asset the caller supplied
    UserSupplied,
    /// References an asset still to be generated
    Generated,
}

/// Crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometric transform applied to a visual.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VisualTransform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,

    /// Rotation in degrees, clockwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// Camera treatment for a visual.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ShotDescriptor {
    /// Camera movement (e.g. "slow push-in", "static")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_movement: Option<String>,

    /// Focal framing (e.g. "centered product", "rule-of-thirds left")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_framing: Option<String>,
}

/// One visual inside a scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneVisual {
    /// Source of the visual
    #[serde(rename = "type")]
    pub source: VisualSource,

    /// Asset this visual renders; must exist in `manifest.assets` unless
    /// the source is `generated`
    pub asset_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<VisualTransform>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shot: Option<ShotDescriptor>,
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TtsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_gender: Option<String>,

    /// Speaking rate multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

/// One planned scene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenePlan {
    /// Scene identifier, unique within the manifest
    pub id: String,

    /// Start offset in seconds from the beginning of the output
    pub start_at_sec: f64,

    /// Scene duration in seconds
    pub duration_seconds: f64,

    /// What the scene is for (e.g. "hook", "feature", "call-to-action")
    pub purpose: String,

    /// Narration text, if the scene is narrated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,

    /// Narration language override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Per-scene TTS override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<TtsConfig>,

    /// Music cue name for this scene
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_cue: Option<String>,

    /// Visual the scene anchors on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_anchor: Option<String>,

    /// Visuals composing the scene; must be non-empty
    pub visuals: Vec<SceneVisual>,
}

impl ScenePlan {
    /// Exclusive end of the scene's time window.
    pub fn end_at_sec(&self) -> f64 {
        self.start_at_sec + self.duration_seconds
    }
}

/// Descriptor for an asset referenced by the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ManifestAsset {
    /// Asset URL (may be empty for assets still to be generated)
    #[serde(default)]
    pub url: String,

    /// Media kind as a string, free-form for generated assets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// User description carried from the brief, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Background music descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MusicDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_url: Option<String>,

    /// Volume 0.0-1.0 under narration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ducked_volume: Option<f64>,
}

/// Audio plan for the whole output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AudioPlan {
    /// Default TTS configuration, overridable per scene
    #[serde(default)]
    pub tts: TtsConfig,

    /// Narration overrides keyed by scene id
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub narration_overrides: HashMap<String, String>,

    /// Background music
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicDescriptor>,
}

/// Global visual treatment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VisualsPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default)]
    pub overlays: Vec<String>,
}

/// Global effects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EffectsPlan {
    #[serde(default)]
    pub transitions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Manifest-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ManifestMetadata {
    /// Output kind
    #[serde(default)]
    pub intent: CreativeIntent,

    /// Total output duration in seconds; must be >= 1
    pub duration_seconds: f64,

    /// Aspect ratio (e.g. "9:16")
    pub aspect_ratio: String,

    /// Platform target
    pub platform: String,

    /// Output language
    pub language: String,

    /// Optional quality/profile selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Optional scheduling priority applied to extracted jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Preferred narration voice gender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_gender: Option<String>,

    /// Cinematic treatment level 0-10
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cinematic_level: Option<u8>,
}

/// Links back to the brief stages that produced a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SourceRefs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_id: Option<String>,

    /// Creative option the manifest was derived from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_id: Option<String>,
}

/// A job extracted from a manifest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobSpec {
    /// Job identifier, unique within the manifest
    pub id: String,

    /// Typed job kind and payload
    #[serde(flatten)]
    pub kind: JobKind,
}

/// The full production manifest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductionManifest {
    /// Owning user, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Provenance links back to the brief
    #[serde(default)]
    pub source_refs: SourceRefs,

    pub metadata: ManifestMetadata,

    /// Scenes; must be non-empty
    pub scenes: Vec<ScenePlan>,

    /// Asset descriptors keyed by asset id
    #[serde(default)]
    pub assets: HashMap<String, ManifestAsset>,

    #[serde(default)]
    pub audio: AudioPlan,

    #[serde(default)]
    pub visuals: VisualsPlan,

    #[serde(default)]
    pub effects: EffectsPlan,

    /// Free-form cross-scene constraints
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub consistency: HashMap<String, serde_json::Value>,

    /// Jobs to execute
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_end_at() {
        let scene = ScenePlan {
            id: "s1".to_string(),
            start_at_sec: 2.0,
            duration_seconds: 3.5,
            purpose: "hook".to_string(),
            narration: None,
            language: None,
            tts: None,
            music_cue: None,
            visual_anchor: None,
            visuals: vec![],
        };
        assert!((scene.end_at_sec() - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scene_visual_serde_type_tag() {
        let visual = SceneVisual {
            source: VisualSource::UserSupplied,
            asset_id: "a1".to_string(),
            transform: None,
            shot: None,
        };
        let json = serde_json::to_value(&visual).unwrap();
        assert_eq!(json["type"], "user_supplied");
        assert_eq!(json["asset_id"], "a1");
    }
}
