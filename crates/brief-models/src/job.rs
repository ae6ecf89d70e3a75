//! Durable job records and their status state machine.
//!
//! A job is created once when a manifest is accepted and is never
//! deleted; it is the audit record of one unit of production work.
//! Status transitions:
//!
//! `pending -> processing -> {completed | failed}`; a recoverable
//! failure returns the job to `pending` while attempts remain, otherwise
//! `failed` is terminal. `pending`/`processing` may become `cancelled`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::brief::BriefId;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
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

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job status in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting in queue
    #[default]
    Pending,
    /// Claimed by a worker
    Processing,
    /// Finished successfully
    Completed,
    /// Failed with attempts exhausted, or failed non-retryably
    Failed,
    /// Cancelled before completion
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed union of known job kinds with typed payloads.
///
/// Unknown work arrives through the `Extension` variant rather than an
/// open-ended type string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum JobKind {
    /// Render one scene of the manifest
    RenderScene { scene_id: String },
    /// Synthesize narration for a scene
    Tts { scene_id: String, text: String },
    /// Generate a placeholder asset
    GenerateAsset { asset_id: String, prompt: String },
    /// Upscale an existing asset
    Upscale { asset_id: String },
    /// Mix the final audio track
    MixAudio,
    /// Escape hatch for job kinds this build does not know
    Extension {
        name: String,
        payload: serde_json::Value,
    },
}

impl JobKind {
    /// Stable kind name used for handler dispatch and stats keys.
    pub fn name(&self) -> &str {
        match self {
            JobKind::RenderScene { .. } => "render_scene",
            JobKind::Tts { .. } => "tts",
            JobKind::GenerateAsset { .. } => "generate_asset",
            JobKind::Upscale { .. } => "upscale",
            JobKind::MixAudio => "mix_audio",
            JobKind::Extension { name, .. } => name,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

/// A durable job record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Brief the job traces back to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_id: Option<BriefId>,

    /// Typed kind and payload
    #[serde(flatten)]
    pub kind: JobKind,

    /// Current status
    #[serde(default)]
    pub status: JobStatus,

    /// Scheduling priority; higher runs first
    #[serde(default)]
    pub priority: i32,

    /// Execution attempts so far
    #[serde(default)]
    pub attempts: u32,

    /// Maximum attempts before terminal failure; >= 1
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Last error message, retained for operator visibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution result of the final successful attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Worker holding the current claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new pending job.
    pub fn new(kind: JobKind) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            brief_id: None,
            kind,
            status: JobStatus::Pending,
            priority: 0,
            attempts: 0,
            max_attempts: default_max_attempts(),
            error: None,
            result: None,
            claimed_by: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// Set the originating brief.
    pub fn with_brief(mut self, brief_id: BriefId) -> Self {
        self.brief_id = Some(brief_id);
        self
    }

    /// Set the scheduling priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the attempt budget (clamped to at least 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Claim the job: `pending -> processing`, increments attempts.
    pub fn start(mut self, worker_id: impl Into<String>) -> Self {
        self.status = JobStatus::Processing;
        self.claimed_by = Some(worker_id.into());
        self.attempts += 1;
        self.started_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }

    /// `processing -> completed`.
    pub fn complete(mut self, result: serde_json::Value) -> Self {
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        self.claimed_by = None;
        self.updated_at = Utc::now();
        self
    }

    /// Recoverable failure: back to `pending` while attempts remain,
    /// terminal `failed` once the budget is spent.
    pub fn fail_recoverable(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.claimed_by = None;
        if self.attempts < self.max_attempts {
            self.status = JobStatus::Pending;
        } else {
            self.status = JobStatus::Failed;
            self.completed_at = Some(Utc::now());
        }
        self.updated_at = Utc::now();
        self
    }

    /// Non-retryable failure: immediately terminal.
    pub fn fail_terminal(mut self, error: impl Into<String>) -> Self {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.claimed_by = None;
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }

    /// External cancellation of a pending or processing job.
    pub fn cancel(mut self) -> Self {
        self.status = JobStatus::Cancelled;
        self.claimed_by = None;
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }

    /// True while more execution attempts are allowed.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Wall-clock execution duration, when both endpoints are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
