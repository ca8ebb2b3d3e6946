//! PresetDaemon - AI-assisted work-breakdown preset generation
//!
//! PresetDaemon turns a free-text project description into an estimable
//! work-breakdown preset using a two-pass generation pipeline: a low
//! temperature skeleton pass frames the activities, then an expand pass
//! fills in descriptions, acceptance criteria and technical hints. Every
//! candidate is schema-gated, mechanically split to an hour ceiling, and
//! scored for completeness before it is accepted; a static fallback preset
//! guarantees the caller always gets a usable result.
//!
//! # Core Concepts
//!
//! - **Always a preset**: generation failures degrade to a fallback, never
//!   to an error (an empty description is the one refusal)
//! - **Untrusted backend**: model output is plain text gated by a JSON
//!   schema before anything downstream touches it
//! - **Idempotent requests**: identical logical requests hit a TTL cache
//!   keyed by a content signature, not by request id
//!
//! # Modules
//!
//! - [`pipeline`] - Orchestrator, splitter, scorer, signature, metrics
//! - [`llm`] - LLM client trait and provider implementations
//! - [`validation`] - Preset contract schema gate
//! - [`domain`] - Preset, activity, request and result types
//! - [`prompts`] - Handlebars prompt templates for both passes
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod validation;

// Re-export commonly used types
pub use config::{CacheConfig, Config, LlmConfig, PipelineConfig, ScoringConfig};
pub use domain::{
    ActivityGroup, ActivityPriority, PipelineActivity, PipelineInput, PipelineMetadata, PipelineResult, Preset,
    Skeleton, SkeletonActivity, TechnicalDetail, fallback_preset,
};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client,
};
pub use pipeline::{
    ActivityScore, MetricsSnapshot, PipelineError, PipelineMetrics, PresetPipeline, ScoredPreset, request_signature,
    score_preset, split_activity, split_all,
};
pub use prompts::{PromptContext, PromptLoader};
pub use validation::SchemaValidator;
