//! Media asset models and normalization.
//!
//! Callers hand the pipeline loosely-shaped media references. The
//! normalizer turns them into canonical [`MediaAsset`] records with
//! stable ids before anything downstream sees them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{ValidationError, ValidationErrors};

/// Kind of media an asset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// Parse from a caller-supplied string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Free-form metadata bag attached to an asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AssetMetadata {
    /// Original filename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Duration in seconds (video/audio)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    /// Pixel width (image/video)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Pixel height (image/video)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// MIME type as reported by the uploader
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Provenance tag (e.g. "upload", "library", "generated")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Free-text description attached by the user.
    ///
    /// Once set, this string must reach every downstream structure that
    /// references the asset by id byte-for-byte. It is an exact-matching
    /// contract, not a best-effort copy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Canonical media asset record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaAsset {
    /// Caller-stable identifier
    pub id: String,

    /// Resolvable URL of the asset content
    pub url: String,

    /// Media kind
    pub media_type: MediaKind,

    /// Metadata bag
    #[serde(default)]
    pub metadata: AssetMetadata,
}

impl MediaAsset {
    /// Create a new asset with a generated id.
    pub fn new(url: impl Into<String>, media_type: MediaKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            media_type,
            metadata: AssetMetadata::default(),
        }
    }

    /// Set the user description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    /// Set the metadata bag.
    pub fn with_metadata(mut self, metadata: AssetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The user description, if one is attached and non-empty.
    pub fn description(&self) -> Option<&str> {
        self.metadata
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
    }
}

/// A loosely-shaped media reference as supplied by a caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaReference {
    /// Caller-assigned id, kept verbatim when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Asset URL
    pub url: String,

    /// Media kind as a string ("image", "video", "audio", "document")
    pub media_type: String,

    /// Optional metadata
    #[serde(default)]
    pub metadata: AssetMetadata,
}

/// Normalize caller media references into canonical assets.
///
/// Pure transform: ids already supplied by the caller are kept as-is,
/// missing ids are generated and returned to the caller via the asset
/// record. All references are checked; errors are collected rather than
/// short-circuited so the caller sees every problem at once.
pub fn normalize_assets(refs: &[MediaReference]) -> Result<Vec<MediaAsset>, ValidationErrors> {
    let mut assets = Vec::with_capacity(refs.len());
    let mut errors = Vec::new();

    for (idx, r) in refs.iter().enumerate() {
        let mut bad = false;

        if r.url.is_empty() || url::Url::parse(&r.url).is_err() {
            errors.push(ValidationError::new(
                format!("assets[{}].url", idx),
                format!("not a resolvable URL: {:?}", r.url),
            ));
            bad = true;
        }

        let kind = match MediaKind::parse(&r.media_type) {
            Some(k) => Some(k),
            None => {
                errors.push(ValidationError::new(
                    format!("assets[{}].media_type", idx),
                    format!("unsupported media kind: {:?}", r.media_type),
                ));
                bad = true;
                None
            }
        };

        if bad {
            continue;
        }

        assets.push(MediaAsset {
            id: r
                .id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            url: r.url.clone(),
            media_type: kind.unwrap(),
            metadata: r.metadata.clone(),
        });
    }

    if errors.is_empty() {
        Ok(assets)
    } else {
        Err(ValidationErrors::new(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(url: &str, kind: &str) -> MediaReference {
        MediaReference {
            id: None,
            url: url.to_string(),
            media_type: kind.to_string(),
            metadata: AssetMetadata::default(),
        }
    }

    #[test]
    fn test_normalize_keeps_caller_ids() {
        let mut r = reference("https://cdn.example.com/logo.png", "image");
        r.id = Some("asset-7".to_string());

        let assets = normalize_assets(&[r]).unwrap();
        assert_eq!(assets[0].id, "asset-7");
    }

    #[test]
    fn test_normalize_generates_missing_ids() {
        let assets = normalize_assets(&[
            reference("https://cdn.example.com/a.png", "image"),
            reference("https://cdn.example.com/b.mp4", "video"),
        ])
        .unwrap();

        assert!(!assets[0].id.is_empty());
        assert_ne!(assets[0].id, assets[1].id);
    }

    #[test]
    fn test_normalize_rejects_bad_url_and_kind() {
        let err = normalize_assets(&[
            reference("not a url", "image"),
            reference("https://cdn.example.com/x.bin", "hologram"),
        ])
        .unwrap_err();

        assert_eq!(err.errors.len(), 2);
        assert!(err.errors[0].field.contains("url"));
        assert!(err.errors[1].field.contains("media_type"));
    }

    #[test]
    fn test_normalize_reports_all_errors_at_once() {
        let err = normalize_assets(&[reference("", "nope")]).unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn test_description_filters_empty() {
        let asset = MediaAsset::new("https://cdn.example.com/a.png", MediaKind::Image)
            .with_description("");
        assert!(asset.description().is_none());

        let asset = asset.with_description("blue logo on white background");
        assert_eq!(asset.description(), Some("blue logo on white background"));
    }
}
