//! Creative option synthesis.
//!
//! Operates purely on the request and the already-gathered analysis;
//! no network calls. Output is not required to be deterministic across
//! builds, but two contracts always hold: a user asset description is
//! carried verbatim into structures keyed by the same asset id, and the
//! cost estimate never decreases when assets or option complexity grow.

use std::collections::HashMap;

use tracing::debug;

use brief_models::{
    AnalysisDomain, AnalysisMap, AssetAction, AssetProcessingPlan, AssetUsage, BriefRequest,
    CreativeDirection, CreativeOption, CreativePlan, EngagementLevel, MediaAsset, MediaKind,
};

const BASE_COST: f64 = 1.0;
const COST_PER_ASSET: f64 = 0.5;
const COST_PER_ACTION: f64 = 0.25;

fn engagement_cost(level: EngagementLevel) -> f64 {
    match level {
        EngagementLevel::Low => 0.5,
        EngagementLevel::Medium => 1.0,
        EngagementLevel::High => 1.5,
    }
}

/// Processing actions for one asset, derived from its kind and whether
/// usable analysis exists for it.
fn actions_for(asset: &MediaAsset, analysis: &AnalysisMap) -> Vec<AssetAction> {
    let mut actions = match asset.media_type {
        MediaKind::Image => vec![AssetAction::Enhance, AssetAction::Upscale],
        MediaKind::Video => vec![
            AssetAction::Trim,
            AssetAction::ColorGrade,
            AssetAction::ExtractKeyframes,
        ],
        MediaKind::Audio => vec![AssetAction::NormalizeAudio, AssetAction::Transcribe],
        MediaKind::Document => vec![AssetAction::Transcribe],
    };

    // Without vision analysis we cannot safely cut the background.
    if asset.media_type == MediaKind::Image && has_payload(analysis, AnalysisDomain::Vision, asset)
    {
        actions.push(AssetAction::RemoveBackground);
    }

    actions
}

fn has_payload(analysis: &AnalysisMap, domain: AnalysisDomain, asset: &MediaAsset) -> bool {
    analysis
        .get(&domain)
        .and_then(|per_asset| per_asset.get(&asset.url))
        .map(|r| !r.is_failed())
        .unwrap_or(false)
}

struct OptionTemplate {
    title: &'static str,
    description: &'static str,
    opening_strategy: &'static str,
    visual_treatment: &'static str,
    pacing: &'static str,
    transition_style: &'static str,
    engagement: EngagementLevel,
}

const OPTION_TEMPLATES: &[OptionTemplate] = &[
    OptionTemplate {
        title: "Bold opener",
        description: "Lead with the strongest asset, punchy cuts, attention-first",
        opening_strategy: "hook with primary asset close-up",
        visual_treatment: "high contrast, bold typography",
        pacing: "fast",
        transition_style: "hard cut",
        engagement: EngagementLevel::High,
    },
    OptionTemplate {
        title: "Narrative build",
        description: "Set context first, reveal the product mid-way",
        opening_strategy: "establishing shot, voiceover context",
        visual_treatment: "natural palette, soft gradients",
        pacing: "medium",
        transition_style: "crossfade",
        engagement: EngagementLevel::Medium,
    },
    OptionTemplate {
        title: "Minimal showcase",
        description: "Single-asset focus, generous whitespace, calm pacing",
        opening_strategy: "static hero frame",
        visual_treatment: "minimal, muted tones",
        pacing: "relaxed",
        transition_style: "dissolve",
        engagement: EngagementLevel::Low,
    },
];

/// Synthesize ranked creative options and per-asset processing plans.
pub fn synthesize(request: &BriefRequest, analysis: &AnalysisMap) -> CreativePlan {
    let assets = &request.assets;

    let mut asset_processing: HashMap<String, AssetProcessingPlan> = HashMap::new();
    for asset in assets {
        asset_processing.insert(
            asset.id.clone(),
            AssetProcessingPlan {
                actions: actions_for(asset, analysis),
                // Verbatim carry; exact-matching contract.
                user_description: asset.description().map(str::to_string),
            },
        );
    }

    // The option anchor: prefer an asset the user bothered to describe.
    let anchor = assets
        .iter()
        .find(|a| a.description().is_some())
        .or_else(|| assets.first());

    let wanted = request
        .preferences
        .output_count
        .map(|n| n.clamp(1, OPTION_TEMPLATES.len() as u32) as usize)
        .unwrap_or(OPTION_TEMPLATES.len());

    let mut creative_options = Vec::with_capacity(wanted);
    if let Some(anchor) = anchor {
        for (idx, template) in OPTION_TEMPLATES.iter().take(wanted).enumerate() {
            let enhancement_needs = asset_processing
                .get(&anchor.id)
                .map(|p| {
                    p.actions
                        .iter()
                        .map(|a| format!("{:?}", a).to_lowercase())
                        .collect()
                })
                .unwrap_or_default();

            creative_options.push(CreativeOption {
                id: format!("option-{}", idx + 1),
                title: template.title.to_string(),
                description: template.description.to_string(),
                creative_direction: CreativeDirection {
                    opening_strategy: template.opening_strategy.to_string(),
                    visual_treatment: template.visual_treatment.to_string(),
                    pacing: template.pacing.to_string(),
                    transition_style: template.transition_style.to_string(),
                },
                asset_usage: AssetUsage {
                    primary_asset_id: anchor.id.clone(),
                    primary_asset_description: anchor.description().map(str::to_string),
                    enhancement_needs,
                },
                target_engagement: template.engagement,
            });
        }
    }

    let cost_estimate = estimate_cost(assets.len(), &creative_options, &asset_processing);

    debug!(
        options = creative_options.len(),
        assets = assets.len(),
        cost_estimate,
        "Synthesized creative plan"
    );

    CreativePlan {
        creative_options,
        asset_processing,
        cost_estimate,
    }
}

/// Cost model: base + per-asset + per-option complexity. Monotonically
/// non-decreasing in asset count and in option/action complexity.
fn estimate_cost(
    asset_count: usize,
    options: &[CreativeOption],
    processing: &HashMap<String, AssetProcessingPlan>,
) -> f64 {
    let option_cost: f64 = options
        .iter()
        .map(|o| engagement_cost(o.target_engagement))
        .sum();
    let action_cost: f64 = processing
        .values()
        .map(|p| p.actions.len() as f64 * COST_PER_ACTION)
        .sum();

    BASE_COST + asset_count as f64 * COST_PER_ASSET + option_cost + action_cost
}
