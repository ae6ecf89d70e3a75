//! Analysis fan-out and creative option synthesis for BriefForge.
//!
//! The engine takes a normalized creative request, fans its assets out
//! to remote AI analyzers with per-domain fallback chains, synthesizes
//! ranked creative options, and assembles everything into an immutable
//! `BriefPackage`.

pub mod analyzer;
pub mod assembler;
pub mod error;
pub mod fanout;
pub mod pipeline;
pub mod session;
pub mod synthesizer;

pub use analyzer::{Analyzer, AnalyzerFailure, AnalyzerRegistry, AnalyzerSet, RemoteAnalyzer};
pub use error::{EngineError, EngineResult};
pub use fanout::{AnalysisFanout, FanoutConfig};
pub use pipeline::BriefEngine;
pub use session::{CancelToken, SessionTracker};
