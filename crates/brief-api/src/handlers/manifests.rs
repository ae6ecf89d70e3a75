//! Manifest submission handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use brief_models::{validate_manifest, JobId, ProductionManifest, ValidationIssue};
use brief_queue::jobs_from_manifest;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Accepted-manifest response: the jobs now queued plus any warnings
/// the validator raised without rejecting.
#[derive(Debug, Serialize)]
pub struct SubmitManifestResponse {
    pub job_ids: Vec<JobId>,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a manifest and enqueue its jobs.
///
/// Structural errors reject the whole manifest with the complete issue
/// list; nothing is enqueued on rejection.
pub async fn submit_manifest(
    State(state): State<AppState>,
    Json(manifest): Json<ProductionManifest>,
) -> ApiResult<Json<SubmitManifestResponse>> {
    let report = validate_manifest(&manifest);
    if !report.is_valid() {
        return Err(ApiError::ManifestRejected(report));
    }
    let warnings: Vec<ValidationIssue> = report.warnings().cloned().collect();

    let jobs = jobs_from_manifest(&manifest);
    let job_ids = state.queue.enqueue(jobs).await?;

    info!(
        job_count = job_ids.len(),
        warning_count = warnings.len(),
        scene_count = manifest.scenes.len(),
        "Manifest accepted"
    );

    Ok(Json(SubmitManifestResponse { job_ids, warnings }))
}
