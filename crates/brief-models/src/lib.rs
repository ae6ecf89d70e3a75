//! Shared data models for the BriefForge pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Media assets and normalization
//! - Analysis fan-out results
//! - Brief packages and creative plans
//! - Production manifests and their structural validation
//! - Durable job records and derived statistics

pub mod analysis;
pub mod asset;
pub mod brief;
pub mod error;
pub mod job;
pub mod manifest;
pub mod stats;
pub mod validate;

// Re-export common types
pub use analysis::{
    analysis_counts, AnalysisDomain, AnalysisMap, AnalysisOutcome, AnalysisResult,
};
pub use asset::{normalize_assets, AssetMetadata, MediaAsset, MediaKind, MediaReference};
pub use brief::{
    AssetAction, AssetProcessingPlan, AssetUsage, BriefId, BriefPackage, BriefPreferences,
    BriefRequest, CreativeDirection, CreativeIntent, CreativeOption, CreativePlan,
    EngagementLevel,
};
pub use error::{ValidationError, ValidationErrors};
pub use job::{Job, JobId, JobKind, JobStatus};
pub use manifest::{
    AudioPlan, JobSpec, ManifestAsset, ManifestMetadata, MusicDescriptor, ProductionManifest,
    ScenePlan, SceneVisual, SourceRefs, TtsConfig, VisualSource,
};
pub use stats::{compute_stats, JobStats};
pub use validate::{validate_manifest, Severity, ValidationIssue, ValidationReport};
