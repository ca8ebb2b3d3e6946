//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the two generation
//! passes (skeleton, expand).
//!
//! Template loading chain:
//! 1. `.presetdaemon/prompts/{name}.pmt` (user override)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{AnswerPair, PromptContext, PromptLoader};

/// System prompt for the skeleton pass
pub const SKELETON_SYSTEM: &str = "You are an experienced delivery planner. \
You break software projects into well-scoped activities. \
You respond with valid JSON only, no markdown fences, no commentary.";

/// System prompt for the expand passes
pub const EXPAND_SYSTEM: &str = "You are an experienced delivery planner. \
You turn coarse work-breakdown skeletons into complete, estimable presets \
with concrete descriptions and verifiable acceptance criteria. \
You respond with valid JSON only, no markdown fences, no commentary.";
