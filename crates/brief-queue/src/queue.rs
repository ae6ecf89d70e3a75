//! Priority job queue over a pluggable store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use brief_models::{compute_stats, Job, JobId, JobStats, JobStatus};

use crate::error::{QueueError, QueueResult};
use crate::store::JobStore;

/// Queue facade shared by the API and the executor.
#[derive(Clone)]
pub struct JobQueue {
    store: Arc<dyn JobStore>,
}

impl JobQueue {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Persist a batch of jobs as pending.
    ///
    /// All-or-nothing is not promised: jobs are inserted one at a time
    /// and the first failure aborts the rest. Returns the IDs actually
    /// enqueued.
    pub async fn enqueue(&self, jobs: Vec<Job>) -> QueueResult<Vec<JobId>> {
        let mut ids = Vec::with_capacity(jobs.len());
        for job in jobs {
            let id = job.id.clone();
            let kind = job.kind.name().to_string();
            self.store.insert(job).await?;
            info!(job_id = %id, kind = %kind, "Enqueued job");
            ids.push(id);
        }
        Ok(ids)
    }

    /// Claim the next pending job for a worker, if any.
    pub async fn claim_next(&self, worker_id: &str) -> QueueResult<Option<Job>> {
        let claimed = self.store.claim_next(worker_id).await?;
        if let Some(job) = &claimed {
            debug!(job_id = %job.id, worker_id, attempt = job.attempts, "Claimed job");
        }
        Ok(claimed)
    }

    /// Fetch one job record.
    pub async fn get(&self, id: &JobId) -> QueueResult<Job> {
        self.store.get(id).await
    }

    /// Write back a job after a worker transition.
    ///
    /// The write only lands while the stored status still equals
    /// `expected`; a concurrent transition (most commonly a cancel)
    /// surfaces as [`QueueError::UpdateConflict`] and the caller's copy
    /// is discarded.
    pub async fn update(&self, job: Job, expected: JobStatus) -> QueueResult<()> {
        self.store.update(job, expected).await
    }

    /// Jobs waiting to be claimed, best-first.
    pub async fn list_pending(&self) -> QueueResult<Vec<Job>> {
        self.store.list_by_status(JobStatus::Pending).await
    }

    /// Jobs currently held by workers.
    pub async fn list_active(&self) -> QueueResult<Vec<Job>> {
        self.store.list_by_status(JobStatus::Processing).await
    }

    /// Aggregate counts and durations across every job ever enqueued.
    pub async fn stats(&self) -> QueueResult<Vec<JobStats>> {
        let jobs = self.store.list_all().await?;
        Ok(compute_stats(&jobs))
    }

    /// Cancel a pending or processing job.
    ///
    /// Terminal jobs are left untouched; cancelling one is a conflict
    /// rather than a silent no-op so callers learn the race happened.
    /// The write is conditional on the status the cancel observed, so a
    /// completion landing in between also surfaces as a conflict
    /// instead of being overwritten.
    pub async fn cancel(&self, id: &JobId) -> QueueResult<Job> {
        let job = self.store.get(id).await?;
        if job.status.is_terminal() {
            warn!(job_id = %id, status = %job.status, "Refusing to cancel terminal job");
            return Err(QueueError::UpdateConflict(id.clone()));
        }
        let observed = job.status;
        let cancelled = job.cancel();
        self.store.update(cancelled.clone(), observed).await?;
        info!(job_id = %id, "Cancelled job");
        Ok(cancelled)
    }
}
