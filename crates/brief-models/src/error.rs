//! Validation error types shared across the pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-qualified validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `scenes[2].duration_seconds`)
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A non-empty collection of validation errors.
///
/// Validation never stops at the first problem; callers get the full
/// list so they can report everything at once.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("validation failed with {} error(s)", errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// True if any error mentions the given field path fragment.
    pub fn mentions(&self, fragment: &str) -> bool {
        self.errors.iter().any(|e| e.field.contains(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions() {
        let errs = ValidationErrors::new(vec![ValidationError::new(
            "scenes[0].visuals",
            "must not be empty",
        )]);
        assert!(errs.mentions("scenes"));
        assert!(!errs.mentions("audio"));
    }
}
