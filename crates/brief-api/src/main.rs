//! Axum API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brief_api::{create_router, ApiConfig, AppState};
use brief_engine::{AnalysisFanout, AnalyzerRegistry, BriefEngine, FanoutConfig};
use brief_queue::{JobQueue, MemoryJobStore};
use brief_worker::{HandlerRegistry, JobExecutor, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("brief=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting brief-api");

    let config = ApiConfig::from_env();
    info!("API config: host={}, port={}", config.host, config.port);

    let client = reqwest::Client::new();

    let registry = AnalyzerRegistry::from_env(client.clone());
    let fanout = AnalysisFanout::new(registry, FanoutConfig::from_env());
    let engine = BriefEngine::new(fanout);

    let queue = JobQueue::new(MemoryJobStore::shared());

    // Single-process mode: the executor drains the same queue the API
    // fills. Deployments with a durable store run workers separately.
    let executor = if config.run_executor {
        let handlers = HandlerRegistry::from_env(&client);
        info!(kinds = ?handlers.kinds(), "Starting in-process job executor");
        let executor = Arc::new(JobExecutor::new(
            WorkerConfig::from_env(),
            queue.clone(),
            handlers,
        ));
        let runner = Arc::clone(&executor);
        tokio::spawn(async move {
            if let Err(e) = runner.run().await {
                tracing::error!("Job executor exited with error: {}", e);
            }
        });
        Some(executor)
    } else {
        None
    };

    let state = AppState::new(config.clone(), engine, queue);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    if let Some(executor) = executor {
        executor.shutdown();
    }

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
