//! Brief package models.
//!
//! A `BriefPackage` is the immutable output of one analysis run: the
//! original request, the joined analysis map, and the synthesized
//! creative plan. It is created once per request and superseded, never
//! mutated, by a newer request.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::analysis::AnalysisMap;
use crate::asset::MediaAsset;

/// Unique identifier for a brief package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BriefId(pub String);

impl BriefId {
    /// Generate a new random brief ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BriefId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BriefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of output the user wants produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreativeIntent {
    Image,
    #[default]
    Video,
    Audio,
    Mix,
}

impl CreativeIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreativeIntent::Image => "image",
            CreativeIntent::Video => "video",
            CreativeIntent::Audio => "audio",
            CreativeIntent::Mix => "mix",
        }
    }
}

/// Caller preferences for the produced output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BriefPreferences {
    /// Target aspect ratio (e.g. "9:16")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,

    /// Platform target (e.g. "tiktok", "youtube")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Desired number of output variants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_count: Option<u32>,

    /// Desired output duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_duration_seconds: Option<f64>,
}

/// An inbound creative request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BriefRequest {
    /// Free-form creative request text
    pub query: String,

    /// Normalized media assets
    pub assets: Vec<MediaAsset>,

    /// Desired output kind
    #[serde(default)]
    pub intent: CreativeIntent,

    /// Output preferences
    #[serde(default)]
    pub preferences: BriefPreferences,
}

/// Expected audience engagement for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

/// How an option opens, looks, and moves.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreativeDirection {
    /// Opening strategy (e.g. "hook with product close-up")
    pub opening_strategy: String,
    /// Visual treatment (e.g. "high-contrast, bold typography")
    pub visual_treatment: String,
    /// Pacing (e.g. "fast", "relaxed")
    pub pacing: String,
    /// Transition style between scenes
    pub transition_style: String,
}

/// How an option uses the supplied assets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetUsage {
    /// Asset the option is built around
    pub primary_asset_id: String,

    /// User description of the primary asset, carried verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_asset_description: Option<String>,

    /// Enhancements the option needs (e.g. "upscale", "color-grade")
    #[serde(default)]
    pub enhancement_needs: Vec<String>,
}

/// One ranked creative option. Consumers typically take the top 1-3.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreativeOption {
    /// Option identifier, unique within the plan
    pub id: String,
    /// Short display title
    pub title: String,
    /// Longer pitch of the option
    pub description: String,
    /// Direction details
    pub creative_direction: CreativeDirection,
    /// Asset usage strategy
    pub asset_usage: AssetUsage,
    /// Expected engagement
    pub target_engagement: EngagementLevel,
}

/// A processing action to apply to one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetAction {
    Enhance,
    Upscale,
    Trim,
    Transcribe,
    RemoveBackground,
    ColorGrade,
    NormalizeAudio,
    ExtractKeyframes,
}

/// Per-asset processing plan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetProcessingPlan {
    /// Actions to apply, in order
    pub actions: Vec<AssetAction>,

    /// User description of this asset, carried verbatim when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
}

/// The synthesized creative plan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreativePlan {
    /// Ranked creative options, best first
    pub creative_options: Vec<CreativeOption>,

    /// Processing actions keyed by asset id
    pub asset_processing: HashMap<String, AssetProcessingPlan>,

    /// Estimated cost in credits; non-decreasing in asset count and
    /// option complexity
    pub cost_estimate: f64,
}

/// The immutable output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BriefPackage {
    /// Unique id, fresh per assembly
    pub brief_id: BriefId,

    /// The original request
    pub request: BriefRequest,

    /// Joined analysis results (possibly degraded for some assets)
    pub analysis: AnalysisMap,

    /// Synthesized plan
    pub plan: CreativePlan,

    /// When the package was assembled
    pub created_at: DateTime<Utc>,
}

impl BriefPackage {
    /// Look up the processing plan for an asset.
    pub fn processing_for(&self, asset_id: &str) -> Option<&AssetProcessingPlan> {
        self.plan.asset_processing.get(asset_id)
    }
}
