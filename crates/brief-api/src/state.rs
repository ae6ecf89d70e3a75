//! Application state.

use std::sync::Arc;

use brief_engine::BriefEngine;
use brief_queue::JobQueue;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub engine: Arc<BriefEngine>,
    pub queue: JobQueue,
}

impl AppState {
    pub fn new(config: ApiConfig, engine: BriefEngine, queue: JobQueue) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            queue,
        }
    }
}
