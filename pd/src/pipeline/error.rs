//! Pipeline error type
//!
//! Most generation failures are absorbed internally by the retry and
//! fallback policy; `EmptyDescription` is the only variant a caller with
//! valid input will never see absorbed.

use thiserror::Error;

use crate::llm::LlmError;

/// Errors raised while running the generation pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request carried no usable description. Never absorbed: there is
    /// nothing meaningful to generate or fall back from.
    #[error("Request description must not be empty")]
    EmptyDescription,

    /// The generation backend call failed
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    /// A generation call exceeded the configured deadline
    #[error("{pass} pass timed out after {timeout_ms}ms")]
    Timeout { pass: &'static str, timeout_ms: u64 },

    /// The response text was not the JSON shape the pass asked for
    #[error("{pass} pass produced unparseable output: {message}")]
    Parse { pass: &'static str, message: String },

    /// The parsed candidate violated the preset contract
    #[error("Generated preset failed validation: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Every expand attempt parsed and validated but scored below threshold
    #[error("No candidate reached the completeness threshold after {attempts} attempts")]
    QualityExhausted { attempts: u32 },

    /// A prompt template failed to load or render
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),
}
