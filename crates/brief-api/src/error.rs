//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use brief_models::{ValidationIssue, ValidationReport};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Structural manifest rejection carrying every issue found.
    #[error("Manifest rejected")]
    ManifestRejected(ValidationReport),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Engine error: {0}")]
    Engine(#[from] brief_engine::EngineError),

    #[error("Queue error: {0}")]
    Queue(#[from] brief_queue::QueueError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ManifestRejected(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Engine(e) => match e {
                brief_engine::EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                brief_engine::EngineError::Cancelled => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Queue(brief_queue::QueueError::JobNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Queue(
                brief_queue::QueueError::UpdateConflict(_)
                | brief_queue::QueueError::EnqueueFailed(_),
            ) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<ValidationIssue>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::ManifestRejected(report) => ErrorResponse {
                detail: "Manifest failed structural validation".to_string(),
                issues: Some(report.issues),
            },
            ApiError::Engine(brief_engine::EngineError::Validation(errs)) => ErrorResponse {
                detail: errs.to_string(),
                issues: None,
            },
            // Don't expose internal error details in production
            ref e @ (ApiError::Internal(_) | ApiError::Queue(_) | ApiError::Engine(_))
                if status == StatusCode::INTERNAL_SERVER_ERROR =>
            {
                let detail =
                    if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                        "An internal error occurred".to_string()
                    } else {
                        e.to_string()
                    };
                ErrorResponse {
                    detail,
                    issues: None,
                }
            }
            other => ErrorResponse {
                detail: other.to_string(),
                issues: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
