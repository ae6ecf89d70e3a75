//! Job persistence seam.
//!
//! The queue talks to storage through [`JobStore`] so deployments can
//! plug in a durable backend. [`MemoryJobStore`] is the in-process
//! implementation used by the bundled executor and by tests; its claim
//! path holds one lock across the read-and-flip, which is what makes
//! claims at-most-once.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use brief_models::{Job, JobId, JobStatus};

use crate::error::{QueueError, QueueResult};

/// Storage backend for durable job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job. Fails if the ID is already taken.
    async fn insert(&self, job: Job) -> QueueResult<()>;

    /// Fetch one job by ID.
    async fn get(&self, id: &JobId) -> QueueResult<Job>;

    /// Conditionally overwrite an existing job record.
    ///
    /// The write applies only while the stored status still equals
    /// `expected`; otherwise `UpdateConflict`. Terminal statuses are
    /// final because any writer holding a stale copy fails this check.
    async fn update(&self, job: Job, expected: JobStatus) -> QueueResult<()>;

    /// Atomically claim the best pending job for `worker_id`.
    ///
    /// Selection order is priority descending, then creation time
    /// ascending. The chosen job is flipped to `processing` in the same
    /// critical section that selected it; no two callers can receive
    /// the same job. Returns `None` when nothing is pending.
    async fn claim_next(&self, worker_id: &str) -> QueueResult<Option<Job>>;

    /// List jobs in a given status, claim order.
    async fn list_by_status(&self, status: JobStatus) -> QueueResult<Vec<Job>>;

    /// List every job record.
    async fn list_all(&self) -> QueueResult<Vec<Job>>;
}

/// In-memory job store backed by a single mutex-guarded map.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn claim_order(a: &Job, b: &Job) -> std::cmp::Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: Job) -> QueueResult<()> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.id) {
            return Err(QueueError::enqueue_failed(format!(
                "Duplicate job ID: {}",
                job.id
            )));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &JobId) -> QueueResult<Job> {
        let jobs = self.jobs.lock().await;
        jobs.get(id)
            .cloned()
            .ok_or_else(|| QueueError::JobNotFound(id.clone()))
    }

    async fn update(&self, job: Job, expected: JobStatus) -> QueueResult<()> {
        let mut jobs = self.jobs.lock().await;
        let current = jobs
            .get(&job.id)
            .ok_or_else(|| QueueError::JobNotFound(job.id.clone()))?;
        if current.status != expected {
            return Err(QueueError::UpdateConflict(job.id.clone()));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn claim_next(&self, worker_id: &str) -> QueueResult<Option<Job>> {
        let mut jobs = self.jobs.lock().await;

        let candidate = jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .min_by(|a, b| claim_order(a, b))
            .map(|j| j.id.clone());

        let Some(id) = candidate else {
            return Ok(None);
        };

        // Still inside the lock: flip before anyone else can see it.
        let job = jobs
            .remove(&id)
            .ok_or_else(|| QueueError::JobNotFound(id.clone()))?
            .start(worker_id);
        jobs.insert(id, job.clone());
        Ok(Some(job))
    }

    async fn list_by_status(&self, status: JobStatus) -> QueueResult<Vec<Job>> {
        let jobs = self.jobs.lock().await;
        let mut matched: Vec<Job> = jobs
            .values()
            .filter(|j| j.status == status)
            .cloned()
            .collect();
        matched.sort_by(claim_order);
        Ok(matched)
    }

    async fn list_all(&self) -> QueueResult<Vec<Job>> {
        let jobs = self.jobs.lock().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(claim_order);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_models::JobKind;

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = MemoryJobStore::new();
        let job = Job::new(JobKind::MixAudio);
        store.insert(job.clone()).await.unwrap();

        let err = store.insert(job).await.unwrap_err();
        assert!(matches!(err, QueueError::EnqueueFailed(_)));
    }

    #[tokio::test]
    async fn test_claim_prefers_higher_priority() {
        let store = MemoryJobStore::new();
        let low = Job::new(JobKind::MixAudio).with_priority(1);
        let high = Job::new(JobKind::MixAudio).with_priority(10);
        store.insert(low.clone()).await.unwrap();
        store.insert(high.clone()).await.unwrap();

        let claimed = store.claim_next("w1").await.unwrap().unwrap();
        assert_eq!(claimed.id, high.id);
        assert_eq!(claimed.status, JobStatus::Processing);
        assert_eq!(claimed.claimed_by.as_deref(), Some("w1"));
    }

    #[tokio::test]
    async fn test_claim_breaks_priority_ties_by_age() {
        let store = MemoryJobStore::new();
        let first = Job::new(JobKind::MixAudio);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = Job::new(JobKind::MixAudio);
        store.insert(second).await.unwrap();
        store.insert(first.clone()).await.unwrap();

        let claimed = store.claim_next("w1").await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
    }

    #[tokio::test]
    async fn test_claim_on_empty_store_returns_none() {
        let store = MemoryJobStore::new();
        assert!(store.claim_next("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_write_cannot_revive_a_cancelled_job() {
        let store = MemoryJobStore::new();
        let job = Job::new(JobKind::MixAudio);
        store.insert(job.clone()).await.unwrap();

        // A worker claims the job and holds its copy while executing.
        let claimed = store.claim_next("w1").await.unwrap().unwrap();

        // A cancel lands before the worker writes back.
        let cancelled = store.get(&job.id).await.unwrap().cancel();
        store
            .update(cancelled, JobStatus::Processing)
            .await
            .unwrap();

        // The worker's completion is now stale and must be refused.
        let err = store
            .update(
                claimed.complete(serde_json::json!({"ok": true})),
                JobStatus::Processing,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::UpdateConflict(_)));
        assert_eq!(
            store.get(&job.id).await.unwrap().status,
            JobStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_update_requires_observed_status() {
        let store = MemoryJobStore::new();
        let job = Job::new(JobKind::MixAudio);
        store.insert(job.clone()).await.unwrap();

        let err = store
            .update(job.clone().cancel(), JobStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::UpdateConflict(_)));

        store.update(job.cancel(), JobStatus::Pending).await.unwrap();
    }
}
