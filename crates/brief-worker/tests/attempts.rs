//! Retry state machine tests: attempt budgets and terminal outcomes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use brief_models::{Job, JobKind, JobStatus};
use brief_queue::{JobQueue, MemoryJobStore};
use brief_worker::{
    HandlerError, HandlerRegistry, JobExecutor, JobHandler, RetryConfig, WorkerConfig,
};

/// Succeeds after a scripted number of failures.
struct FlakyHandler {
    kind: &'static str,
    failures_before_success: u32,
    calls: AtomicU32,
}

#[async_trait]
impl JobHandler for FlakyHandler {
    fn kind(&self) -> &str {
        self.kind
    }

    async fn execute(&self, _job: &Job) -> Result<serde_json::Value, HandlerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            Err(HandlerError::retryable("transient outage"))
        } else {
            Ok(serde_json::json!({"ok": true}))
        }
    }
}

struct FatalHandler;

#[async_trait]
impl JobHandler for FatalHandler {
    fn kind(&self) -> &str {
        "mix_audio"
    }

    async fn execute(&self, _job: &Job) -> Result<serde_json::Value, HandlerError> {
        Err(HandlerError::fatal("unsupported codec"))
    }
}

fn fast_config() -> WorkerConfig {
    WorkerConfig {
        retry: RetryConfig::default()
            .with_base_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(4)),
        ..WorkerConfig::default()
    }
}

/// A job with three attempts that fails twice and then succeeds must
/// end completed with exactly three recorded attempts.
#[tokio::test]
async fn third_attempt_success_completes_with_three_attempts() {
    let queue = JobQueue::new(MemoryJobStore::shared());
    let handler = Arc::new(FlakyHandler {
        kind: "render_scene",
        failures_before_success: 2,
        calls: AtomicU32::new(0),
    });
    let executor = JobExecutor::new(
        fast_config(),
        queue.clone(),
        HandlerRegistry::new().register(handler.clone()),
    );

    let ids = queue
        .enqueue(vec![Job::new(JobKind::RenderScene {
            scene_id: "s1".to_string(),
        })
        .with_max_attempts(3)])
        .await
        .unwrap();

    executor.run_until_idle().await.unwrap();

    let job = queue.get(&ids[0]).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.attempts, 3);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    assert!(job.result.is_some());
    // The last error stays on the record for operators.
    assert!(job.error.is_some());
}

/// Attempts never exceed the budget; exhaustion is terminal.
#[tokio::test]
async fn attempt_budget_is_a_hard_bound() {
    let queue = JobQueue::new(MemoryJobStore::shared());
    let handler = Arc::new(FlakyHandler {
        kind: "render_scene",
        failures_before_success: u32::MAX,
        calls: AtomicU32::new(0),
    });
    let executor = JobExecutor::new(
        fast_config(),
        queue.clone(),
        HandlerRegistry::new().register(handler.clone()),
    );

    let ids = queue
        .enqueue(vec![Job::new(JobKind::RenderScene {
            scene_id: "s1".to_string(),
        })
        .with_max_attempts(2)])
        .await
        .unwrap();

    executor.run_until_idle().await.unwrap();

    let job = queue.get(&ids[0]).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.attempts, 2);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
}

/// Fatal handler errors skip the retry budget entirely.
#[tokio::test]
async fn fatal_error_fails_on_first_attempt() {
    let queue = JobQueue::new(MemoryJobStore::shared());
    let executor = JobExecutor::new(
        fast_config(),
        queue.clone(),
        HandlerRegistry::new().register(Arc::new(FatalHandler)),
    );

    let ids = queue
        .enqueue(vec![Job::new(JobKind::MixAudio).with_max_attempts(5)])
        .await
        .unwrap();

    executor.run_until_idle().await.unwrap();

    let job = queue.get(&ids[0]).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.attempts, 1);
    assert_eq!(job.error.as_deref(), Some("Fatal: unsupported codec"));
}

/// Jobs with no registered handler fail terminally instead of looping.
#[tokio::test]
async fn missing_handler_is_terminal() {
    let queue = JobQueue::new(MemoryJobStore::shared());
    let executor = JobExecutor::new(fast_config(), queue.clone(), HandlerRegistry::new());

    let ids = queue
        .enqueue(vec![Job::new(JobKind::Upscale {
            asset_id: "a1".to_string(),
        })])
        .await
        .unwrap();

    executor.run_until_idle().await.unwrap();

    let job = queue.get(&ids[0]).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.as_deref().unwrap().contains("No handler"));
}

/// A cancellation racing a slow execution wins: the late completion is
/// discarded and the record stays cancelled.
#[tokio::test]
async fn cancellation_is_not_overwritten_by_late_completion() {
    struct SlowHandler;

    #[async_trait]
    impl JobHandler for SlowHandler {
        fn kind(&self) -> &str {
            "mix_audio"
        }

        async fn execute(&self, _job: &Job) -> Result<serde_json::Value, HandlerError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(serde_json::json!({"ok": true}))
        }
    }

    let queue = JobQueue::new(MemoryJobStore::shared());
    let executor = Arc::new(JobExecutor::new(
        fast_config(),
        queue.clone(),
        HandlerRegistry::new().register(Arc::new(SlowHandler)),
    ));

    let ids = queue
        .enqueue(vec![Job::new(JobKind::MixAudio)])
        .await
        .unwrap();

    let exec = Arc::clone(&executor);
    let drain = tokio::spawn(async move { exec.run_until_idle().await });

    // Cancel while the handler sleeps.
    tokio::time::sleep(Duration::from_millis(10)).await;
    queue.cancel(&ids[0]).await.unwrap();

    drain.await.unwrap().unwrap();

    let job = queue.get(&ids[0]).await.unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert!(job.result.is_none());
}
