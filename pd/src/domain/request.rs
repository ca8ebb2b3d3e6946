//! Pipeline request and result types - the inbound/outbound JSON boundary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::preset::Preset;

/// Immutable request value driving one pipeline invocation
///
/// `answers` uses a BTreeMap so iteration order is deterministic, which keeps
/// the idempotency signature stable across re-submissions. `request_id` is
/// used for tracing only and deliberately not part of the signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInput {
    pub user_id: String,
    pub description: String,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "generate_request_id")]
    pub request_id: String,
}

fn generate_request_id() -> String {
    Uuid::now_v7().to_string()
}

impl PipelineInput {
    /// Build an input with a freshly generated request id
    pub fn new(user_id: impl Into<String>, description: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let description = description.into();
        debug!(%user_id, description_len = description.len(), "PipelineInput::new: called");
        Self {
            user_id,
            description,
            answers: BTreeMap::new(),
            category: None,
            request_id: generate_request_id(),
        }
    }

    /// With a technology category hint
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// With one structured answer
    pub fn with_answer(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.insert(key.into(), value.into());
        self
    }
}

/// Which passes ran, whether the cache served the result, and how long it took
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    pub cached: bool,
    pub model_passes: Vec<String>,
    pub attempts: u32,
    pub generation_time_ms: u64,
    pub fallback: bool,
}

impl PipelineMetadata {
    /// Metadata for a cache hit: no passes ran in this invocation
    pub fn cache_hit(original: &PipelineMetadata) -> Self {
        debug!("PipelineMetadata::cache_hit: called");
        Self {
            cached: true,
            model_passes: original.model_passes.clone(),
            attempts: original.attempts,
            generation_time_ms: 0,
            fallback: original.fallback,
        }
    }
}

/// Terminal outcome of one pipeline invocation
///
/// Constructed exactly once by the orchestrator; after return it is an
/// immutable value shared with callers and the cache. `success` is true even
/// for fallback outcomes: the caller always receives a schema-valid preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub success: bool,
    pub preset: Preset,
    pub metadata: PipelineMetadata,
}
