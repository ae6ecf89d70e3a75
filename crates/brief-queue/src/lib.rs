//! Priority job queue with at-most-once claims.
//!
//! Jobs extracted from accepted manifests are persisted through a
//! pluggable [`JobStore`]; workers claim them one at a time through
//! [`JobQueue::claim_next`], which is atomic per store contract.

pub mod error;
pub mod extract;
pub mod queue;
pub mod store;

pub use error::{QueueError, QueueResult};
pub use extract::jobs_from_manifest;
pub use queue::JobQueue;
pub use store::{JobStore, MemoryJobStore};
