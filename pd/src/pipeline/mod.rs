//! Preset generation pipeline
//!
//! The orchestrator ties the passes together; the submodules are the
//! individually testable stages: splitting, scoring, the idempotency
//! signature, and the metric counters.

mod error;
pub mod metrics;
mod orchestrator;
pub mod scorer;
pub mod signature;
pub mod splitter;

pub use error::PipelineError;
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use orchestrator::PresetPipeline;
pub use scorer::{ActivityScore, ScoredPreset, score_preset};
pub use signature::request_signature;
pub use splitter::{split_activity, split_all};
