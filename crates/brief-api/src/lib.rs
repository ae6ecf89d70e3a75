//! Axum HTTP API server.
//!
//! Exposes the full request-to-production surface: brief analysis,
//! manifest validation and job submission, and read-only job
//! inspection for the operations dashboard.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
