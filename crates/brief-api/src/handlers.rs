//! Request handlers.

pub mod briefs;
pub mod health;
pub mod jobs;
pub mod manifests;

pub use health::health;
