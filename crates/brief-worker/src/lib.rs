//! Job executor for BriefForge.
//!
//! Claims jobs from the queue, dispatches them to handlers by kind,
//! and drives the retry state machine: recoverable failures re-queue
//! with exponential backoff while attempts remain, fatal failures and
//! exhausted budgets end terminally.

pub mod config;
pub mod error;
pub mod executor;
pub mod handler;
pub mod logging;
pub mod retry;

pub use config::WorkerConfig;
pub use error::{HandlerError, WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use handler::{HandlerRegistry, JobHandler, RemoteJobHandler};
pub use logging::JobLogger;
pub use retry::RetryConfig;
