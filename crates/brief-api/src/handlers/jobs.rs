//! Job inspection handlers for the operations dashboard.

use axum::extract::{Path, State};
use axum::Json;

use brief_models::{Job, JobId, JobStats};

use crate::error::ApiResult;
use crate::state::AppState;

/// Jobs waiting to be claimed, best-first.
pub async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.queue.list_pending().await?))
}

/// Jobs currently held by workers.
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.queue.list_active().await?))
}

/// Aggregate (kind, status) statistics over all job records.
pub async fn job_stats(State(state): State<AppState>) -> ApiResult<Json<Vec<JobStats>>> {
    Ok(Json(state.queue.stats().await?))
}

/// Fetch one job record by ID.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job = state.queue.get(&JobId::from_string(job_id)).await?;
    Ok(Json(job))
}

/// Cancel a pending or processing job.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job = state.queue.cancel(&JobId::from_string(job_id)).await?;
    Ok(Json(job))
}
