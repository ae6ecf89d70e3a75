//! Engine error types.

use thiserror::Error;

use brief_models::ValidationErrors;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The fan-out was cancelled; no partial results are available.
    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Analysis task panicked: {0}")]
    Join(String),
}

impl EngineError {
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}
