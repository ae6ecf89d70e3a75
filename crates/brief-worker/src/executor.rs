//! Job executor: claim loop, handler dispatch, retry transitions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use brief_models::{Job, JobStatus};
use brief_queue::{JobQueue, QueueError};

use crate::config::WorkerConfig;
use crate::error::{HandlerError, WorkerError, WorkerResult};
use crate::handler::HandlerRegistry;
use crate::logging::JobLogger;
use crate::retry::RetryConfig;

/// Claims jobs from the queue and drives them to a terminal status.
pub struct JobExecutor {
    config: WorkerConfig,
    queue: JobQueue,
    handlers: Arc<HandlerRegistry>,
    semaphore: Arc<Semaphore>,
    shutdown: tokio::sync::watch::Sender<bool>,
    worker_id: String,
}

impl JobExecutor {
    pub fn new(config: WorkerConfig, queue: JobQueue, handlers: HandlerRegistry) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let (shutdown, _) = tokio::sync::watch::channel(false);
        let worker_id = format!("worker-{}", Uuid::new_v4());

        Self {
            config,
            queue,
            handlers: Arc::new(handlers),
            semaphore,
            shutdown,
            worker_id,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Run the claim loop until shutdown is signalled.
    pub async fn run(&self) -> WorkerResult<()> {
        info!(
            worker_id = %self.worker_id,
            max_concurrent = self.config.max_concurrent_jobs,
            "Starting job executor"
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping executor");
                        break;
                    }
                }
                result = self.claim_cycle() => {
                    if let Err(e) = result {
                        warn!("Claim cycle error: {}", e);
                        tokio::time::sleep(self.config.poll_interval).await;
                    }
                }
            }
        }

        info!("Waiting for in-flight jobs to complete...");
        let _ = tokio::time::timeout(self.config.shutdown_timeout, self.wait_for_jobs()).await;

        info!("Job executor stopped");
        Ok(())
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Claim one job and spawn its execution, or idle briefly.
    async fn claim_cycle(&self) -> WorkerResult<()> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| WorkerError::job_failed("Semaphore closed"))?;

        match self.queue.claim_next(&self.worker_id).await? {
            Some(job) => {
                let queue = self.queue.clone();
                let handlers = Arc::clone(&self.handlers);
                let retry = self.config.retry.clone();
                let job_timeout = self.config.job_timeout;

                tokio::spawn(async move {
                    let _permit = permit;
                    Self::execute_job(queue, handlers, retry, job_timeout, job).await;
                });
            }
            None => {
                drop(permit);
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        Ok(())
    }

    /// Drain the queue inline until no pending work remains.
    ///
    /// Used by the in-process deployment mode and by tests; retries run
    /// their full backoff delay before re-claiming.
    pub async fn run_until_idle(&self) -> WorkerResult<usize> {
        let mut processed = 0usize;
        while let Some(job) = self.queue.claim_next(&self.worker_id).await? {
            Self::execute_job(
                self.queue.clone(),
                Arc::clone(&self.handlers),
                self.config.retry.clone(),
                self.config.job_timeout,
                job,
            )
            .await;
            processed += 1;
        }
        Ok(processed)
    }

    async fn wait_for_jobs(&self) {
        loop {
            if self.semaphore.available_permits() == self.config.max_concurrent_jobs {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Execute one claimed job and write back its next state.
    async fn execute_job(
        queue: JobQueue,
        handlers: Arc<HandlerRegistry>,
        retry: RetryConfig,
        job_timeout: Duration,
        job: Job,
    ) {
        let kind = job.kind.name().to_string();
        let logger = JobLogger::new(&job.id, &kind);
        logger.log_start(&format!("attempt {}/{}", job.attempts, job.max_attempts));

        let Some(handler) = handlers.get(&kind) else {
            logger.log_error("no handler registered for kind");
            let failed = job.fail_terminal(format!("No handler registered for kind: {kind}"));
            Self::finalize(&queue, &logger, failed).await;
            return;
        };

        let outcome = match tokio::time::timeout(job_timeout, handler.execute(&job)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(HandlerError::retryable(format!(
                "Handler timed out after {job_timeout:?}"
            ))),
        };

        match outcome {
            Ok(result) => {
                logger.log_completion("handler returned a result");
                Self::finalize(&queue, &logger, job.complete(result)).await;
            }
            Err(e) if e.is_retryable() => {
                logger.log_warning(&e.to_string());
                let failed = job.fail_recoverable(e.to_string());
                if failed.status == JobStatus::Pending {
                    // Hold the job out of the pending pool for the
                    // backoff window; the record is written back only
                    // once it is claimable again.
                    tokio::time::sleep(retry.delay_for_attempt(failed.attempts)).await;
                } else {
                    logger.log_error("attempt budget exhausted");
                }
                Self::finalize(&queue, &logger, failed).await;
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                Self::finalize(&queue, &logger, job.fail_terminal(e.to_string())).await;
            }
        }
    }

    /// Write the job's next state back to the queue.
    ///
    /// The write is conditional on the record still being in
    /// `processing`, the status this worker's claim put it in. A cancel
    /// landing mid-flight makes the write conflict and the outcome is
    /// discarded; no read-back is needed.
    async fn finalize(queue: &JobQueue, logger: &JobLogger, job: Job) {
        match queue.update(job, JobStatus::Processing).await {
            Ok(()) => {}
            Err(QueueError::UpdateConflict(_)) => {
                logger.log_warning("job left processing mid-flight; discarding outcome");
            }
            Err(QueueError::JobNotFound(_)) => {
                logger.log_warning("job record disappeared; discarding outcome");
            }
            Err(e) => {
                logger.log_error(&format!("failed to persist job state: {e}"));
            }
        }
    }
}
