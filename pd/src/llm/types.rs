//! LLM request/response types
//!
//! Provider-agnostic; both the Anthropic and OpenAI clients translate these
//! into their respective wire formats.

use tracing::debug;

/// A completion request - everything needed for one generation call
///
/// Each pipeline pass is one independent request with fresh context; no
/// conversation state is carried between calls.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (rendered from a Handlebars template)
    pub system_prompt: String,

    /// The single user message for this pass
    pub user_prompt: String,

    /// Sampling temperature; retry attempts vary this to escape a
    /// low-quality local result
    pub temperature: f32,

    /// Max tokens for the response (from config)
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>, temperature: f32) -> Self {
        debug!(%temperature, "CompletionRequest::new: called");
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature,
            max_tokens: 8192,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content, expected (but not guaranteed) to parse as JSON
    pub content: Option<String>,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Response carrying plain text and no usage data (test helper shape)
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage for cost tracking
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = CompletionRequest::new("system", "user", 0.7).with_max_tokens(2048);
        assert_eq!(req.system_prompt, "system");
        assert_eq!(req.user_prompt, "user");
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, 2048);
    }

    #[test]
    fn test_response_text_helper() {
        let resp = CompletionResponse::text("{}");
        assert_eq!(resp.content.as_deref(), Some("{}"));
        assert_eq!(resp.usage.input_tokens, 0);
    }
}
