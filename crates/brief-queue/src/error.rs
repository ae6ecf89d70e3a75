//! Queue error types.

use thiserror::Error;

use brief_models::JobId;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Enqueue failed: {0}")]
    EnqueueFailed(String),

    /// A conditional write was refused: the stored status no longer
    /// matches what the writer last saw. This is what keeps terminal
    /// statuses final when a stale worker writes back late.
    #[error("Conditional update conflict on job {0}")]
    UpdateConflict(JobId),

    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueueError {
    pub fn enqueue_failed(msg: impl Into<String>) -> Self {
        Self::EnqueueFailed(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
