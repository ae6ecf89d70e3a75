//! Structured job logging helper.

use tracing::{error, info, warn, Span};

use brief_models::JobId;

/// Logger carrying job identity through every lifecycle message.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    kind: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId, kind: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(job_id = %self.job_id, kind = %self.kind, "Job started: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, kind = %self.kind, "Job warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, kind = %self.kind, "Job error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(job_id = %self.job_id, kind = %self.kind, "Job completed: {}", message);
    }

    /// Span for attaching further structured fields during execution.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, kind = %self.kind)
    }
}
