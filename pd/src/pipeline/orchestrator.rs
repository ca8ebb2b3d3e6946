//! Pipeline orchestrator
//!
//! Drives one request through the full generation sequence: cache lookup,
//! skeleton pass, expand attempts with a rising temperature ladder, schema
//! validation, mechanical splitting, completeness scoring, and the static
//! fallback when everything else is exhausted. The caller always receives a
//! schema-valid preset; only an empty description is refused outright.

use std::sync::Arc;
use std::time::{Duration, Instant};

use presetcache::TtlCache;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{PipelineInput, PipelineMetadata, PipelineResult, Preset, Skeleton, fallback_preset};
use crate::llm::{CompletionRequest, CompletionResponse, LlmClient};
use crate::prompts::{EXPAND_SYSTEM, PromptContext, PromptLoader, SKELETON_SYSTEM};
use crate::validation::SchemaValidator;

use super::error::PipelineError;
use super::metrics::PipelineMetrics;
use super::scorer::score_preset;
use super::signature::request_signature;
use super::splitter::split_all;

/// Strip a markdown code fence if the model wrapped its JSON in one
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// The preset generation pipeline
///
/// Holds the generation client behind its trait seam, the compiled schema
/// gate, the idempotency cache, and the shared metric counters. One instance
/// serves many concurrent requests; all state is either immutable or
/// internally synchronized.
pub struct PresetPipeline {
    client: Arc<dyn LlmClient>,
    validator: SchemaValidator,
    cache: Arc<TtlCache<PipelineResult>>,
    metrics: Arc<PipelineMetrics>,
    prompts: PromptLoader,
    config: Config,
}

impl PresetPipeline {
    /// Build a pipeline from a client and configuration
    pub fn new(client: Arc<dyn LlmClient>, config: Config) -> Self {
        debug!(provider = %config.llm.provider, "PresetPipeline::new: called");
        let validator = SchemaValidator::with_bounds(config.pipeline.min_activities, config.pipeline.max_activities);
        let cache = Arc::new(TtlCache::new(Duration::from_secs(config.cache.ttl_secs)));
        Self {
            client,
            validator,
            cache,
            metrics: Arc::new(PipelineMetrics::new()),
            prompts: PromptLoader::new("."),
            config,
        }
    }

    /// Replace the prompt loader (tests use the embedded-only loader)
    pub fn with_prompt_loader(mut self, prompts: PromptLoader) -> Self {
        self.prompts = prompts;
        self
    }

    /// Shared handle to the pipeline counters
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one request through the pipeline
    ///
    /// Generation failures of every kind degrade to the static fallback
    /// preset; the returned result always carries `success: true` and a
    /// schema-valid preset. Only an empty description is an error.
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineResult, PipelineError> {
        if input.description.trim().is_empty() {
            return Err(PipelineError::EmptyDescription);
        }

        self.metrics.record_request();
        let started = Instant::now();
        let signature = request_signature(&input);
        debug!(request_id = %input.request_id, %signature, "PresetPipeline::run: called");

        if self.config.cache.enabled
            && let Some(prior) = self.cache.get(&signature).await
        {
            self.metrics.record_cache_hit();
            info!(request_id = %input.request_id, "PresetPipeline::run: served from cache");
            return Ok(PipelineResult {
                success: prior.success,
                preset: prior.preset,
                metadata: PipelineMetadata::cache_hit(&prior.metadata),
            });
        }

        let mut passes: Vec<String> = Vec::new();
        let mut attempts = 0u32;

        let (preset, fallback) = match self.generate(&input, &mut passes, &mut attempts).await {
            Ok(preset) => (preset, false),
            Err(err) => {
                warn!(request_id = %input.request_id, %err, "PresetPipeline::run: generation exhausted, serving fallback");
                self.metrics.record_fallback();
                (fallback_preset(), true)
            }
        };

        let generation_time_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_generation_time(generation_time_ms);

        let result = PipelineResult {
            success: true,
            preset,
            metadata: PipelineMetadata {
                cached: false,
                model_passes: passes,
                attempts,
                generation_time_ms,
                fallback,
            },
        };

        // Fallback results are cached too: an identical re-submission should
        // not burn more generation calls on a request we already failed.
        if self.config.cache.enabled {
            self.cache.insert(signature, result.clone()).await;
        }

        info!(
            request_id = %input.request_id,
            %fallback,
            %attempts,
            %generation_time_ms,
            "PresetPipeline::run: done"
        );
        Ok(result)
    }

    /// Skeleton pass plus the expand/validate/score attempt loop
    async fn generate(
        &self,
        input: &PipelineInput,
        passes: &mut Vec<String>,
        attempts: &mut u32,
    ) -> Result<Preset, PipelineError> {
        let skeleton = self.skeleton_pass(input, passes).await?;
        debug!(
            skeleton_activities = %skeleton.activities.len(),
            "PresetPipeline::generate: skeleton ready"
        );

        for attempt in 1..=self.config.pipeline.max_attempts {
            *attempts = attempt;
            match self.expand_pass(input, &skeleton, attempt, passes).await {
                Ok(preset) => {
                    let activities = split_all(preset.activities, self.config.pipeline.max_activity_hours);
                    let preset = Preset { activities, ..preset };

                    let scored = score_preset(preset, &input.description, &self.config.scoring);
                    if scored.average_completeness >= self.config.scoring.completeness_threshold {
                        self.metrics.record_accepted();
                        info!(
                            %attempt,
                            average_completeness = %scored.average_completeness,
                            "PresetPipeline::generate: candidate accepted"
                        );
                        return Ok(scored.preset);
                    }
                    debug!(
                        %attempt,
                        average_completeness = %scored.average_completeness,
                        threshold = %self.config.scoring.completeness_threshold,
                        "PresetPipeline::generate: candidate below threshold"
                    );
                }
                Err(err) => {
                    warn!(%attempt, %err, "PresetPipeline::generate: expand attempt failed");
                }
            }
        }

        Err(PipelineError::QualityExhausted {
            attempts: self.config.pipeline.max_attempts,
        })
    }

    /// First pass: coarse activity frame, low temperature
    async fn skeleton_pass(&self, input: &PipelineInput, passes: &mut Vec<String>) -> Result<Skeleton, PipelineError> {
        let context = PromptContext::skeleton(input, &self.config.pipeline);
        let user_prompt = self
            .prompts
            .render("skeleton", &context)
            .map_err(|e| PipelineError::Prompt(e.to_string()))?;

        let request = CompletionRequest::new(SKELETON_SYSTEM, user_prompt, self.config.pipeline.skeleton_temperature)
            .with_max_tokens(self.config.llm.max_tokens);

        self.metrics.record_skeleton_call();
        let response = self.complete_with_deadline("skeleton", request).await?;
        passes.push("skeleton".to_string());

        let raw = response.content.ok_or_else(|| {
            self.metrics.record_parse_failure();
            PipelineError::Parse {
                pass: "skeleton",
                message: "response carried no text".to_string(),
            }
        })?;

        let skeleton: Skeleton = serde_json::from_str(extract_json(&raw)).map_err(|e| {
            self.metrics.record_parse_failure();
            PipelineError::Parse {
                pass: "skeleton",
                message: e.to_string(),
            }
        })?;

        if skeleton.activities.is_empty() {
            self.metrics.record_parse_failure();
            return Err(PipelineError::Parse {
                pass: "skeleton",
                message: "skeleton contained no activities".to_string(),
            });
        }

        Ok(skeleton)
    }

    /// One expand attempt: full preset from the skeleton, schema-gated
    async fn expand_pass(
        &self,
        input: &PipelineInput,
        skeleton: &Skeleton,
        attempt: u32,
        passes: &mut Vec<String>,
    ) -> Result<Preset, PipelineError> {
        let temperature = self.config.pipeline.temperature_for_attempt(attempt);
        let context = PromptContext::expand(
            input,
            skeleton.to_prompt_json(),
            &self.config.pipeline,
            self.config.scoring.min_criteria,
        );
        let user_prompt = self
            .prompts
            .render("expand", &context)
            .map_err(|e| PipelineError::Prompt(e.to_string()))?;

        let request = CompletionRequest::new(EXPAND_SYSTEM, user_prompt, temperature)
            .with_max_tokens(self.config.llm.max_tokens);

        self.metrics.record_expand_attempt();
        let response = self.complete_with_deadline("expand", request).await?;
        passes.push(format!("expand@t={}", temperature));

        let raw = response.content.ok_or_else(|| {
            self.metrics.record_parse_failure();
            PipelineError::Parse {
                pass: "expand",
                message: "response carried no text".to_string(),
            }
        })?;

        let candidate: serde_json::Value = serde_json::from_str(extract_json(&raw)).map_err(|e| {
            self.metrics.record_parse_failure();
            PipelineError::Parse {
                pass: "expand",
                message: e.to_string(),
            }
        })?;

        if let Err(errors) = self.validator.validate(&candidate) {
            self.metrics.record_validation_failure();
            return Err(PipelineError::Validation(errors));
        }

        // Schema-valid JSON maps onto the domain type; a failure here means
        // the schema and the type drifted apart
        serde_json::from_value(candidate).map_err(|e| {
            self.metrics.record_parse_failure();
            PipelineError::Parse {
                pass: "expand",
                message: e.to_string(),
            }
        })
    }

    /// Run one generation call under the configured deadline
    async fn complete_with_deadline(
        &self,
        pass: &'static str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, PipelineError> {
        let deadline = Duration::from_millis(self.config.llm.timeout_ms);
        match timeout(deadline, self.client.complete(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(PipelineError::Timeout {
                pass,
                timeout_ms: self.config.llm.timeout_ms,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use serde_json::json;

    const DESCRIPTION: &str = "Employee onboarding portal with document signing and training tracking for new hires";

    fn sample_input() -> PipelineInput {
        PipelineInput::new("user-1", DESCRIPTION).with_category("web-application")
    }

    fn skeleton_json() -> String {
        json!({
            "activities": [
                {"title": "Requirements workshop", "group": "analysis", "estimatedHours": 6, "priority": "core"},
                {"title": "Portal backend", "group": "development", "estimatedHours": 8, "priority": "core"},
                {"title": "Portal frontend", "group": "development", "estimatedHours": 8, "priority": "core"},
                {"title": "Test plan and execution", "group": "test", "estimatedHours": 6, "priority": "core"},
                {"title": "Deployment setup", "group": "operations", "estimatedHours": 4, "priority": "recommended"}
            ]
        })
        .to_string()
    }

    fn rich_activity(title: &str, group: &str) -> serde_json::Value {
        json!({
            "title": title,
            "group": group,
            "estimatedHours": 6.0,
            "priority": "core",
            "description": "Deliver this slice of the employee onboarding portal covering document signing and training tracking.\n- build the screens and persistence for onboarding data\n- wire document signing with audit records\n- surface training tracking progress to managers so employee onboarding status stays visible",
            "acceptanceCriteria": [
                "New employees can sign required documents from the portal",
                "Training completion is tracked and visible to managers",
                "An audit record exists for every signing event"
            ],
            "technicalDetail": {
                "suggestedFiles": ["src/onboarding.rs"],
                "suggestedCommands": ["cargo test"],
                "suggestedDependencies": ["axum"]
            }
        })
    }

    /// Schema-valid, scores well above the acceptance threshold
    fn good_expand_json() -> String {
        json!({
            "name": "Employee onboarding portal",
            "shortDescription": "Onboarding portal with signing and training tracking",
            "description": "Delivery of an employee onboarding portal",
            "category": "web-application",
            "activities": [
                rich_activity("Requirements workshop", "analysis"),
                rich_activity("Portal backend", "development"),
                rich_activity("Portal frontend", "development"),
                rich_activity("Test plan and execution", "test"),
                rich_activity("Deployment setup", "operations")
            ],
            "driverDefaults": {"complexity": 1.1},
            "riskDefaults": ["unclear-requirements"],
            "reasoning": "Standard web delivery breakdown",
            "confidence": 0.8
        })
        .to_string()
    }

    /// Schema-valid but bare: no descriptions, no criteria, scores near zero
    fn shallow_expand_json() -> String {
        json!({
            "name": "Thin preset",
            "shortDescription": "Bare activities",
            "description": "Minimal output",
            "category": "web-application",
            "activities": [
                {"title": "Plan", "group": "analysis", "estimatedHours": 4, "priority": "core"},
                {"title": "Build", "group": "development", "estimatedHours": 8, "priority": "core"},
                {"title": "Style", "group": "development", "estimatedHours": 4, "priority": "optional"},
                {"title": "Check", "group": "test", "estimatedHours": 4, "priority": "core"},
                {"title": "Ship", "group": "operations", "estimatedHours": 2, "priority": "core"}
            ],
            "reasoning": "minimal",
            "confidence": 0.3
        })
        .to_string()
    }

    fn pipeline_with_replies(replies: Vec<MockReply>) -> (Arc<MockLlmClient>, PresetPipeline) {
        let client = Arc::new(MockLlmClient::new(replies));
        let pipeline = PresetPipeline::new(Arc::clone(&client) as Arc<dyn LlmClient>, Config::default())
            .with_prompt_loader(PromptLoader::embedded_only());
        (client, pipeline)
    }

    #[test]
    fn test_extract_json_strips_fences() {
        assert_eq!(extract_json("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_happy_path_accepts_first_attempt() {
        let (client, pipeline) = pipeline_with_replies(vec![
            MockReply::Text(skeleton_json()),
            MockReply::Text(good_expand_json()),
        ]);

        let result = pipeline.run(sample_input()).await.unwrap();

        assert!(result.success);
        assert!(!result.metadata.cached);
        assert!(!result.metadata.fallback);
        assert_eq!(result.metadata.attempts, 1);
        assert_eq!(result.metadata.model_passes, vec!["skeleton", "expand@t=0.2"]);
        assert_eq!(result.preset.activities.len(), 5);
        assert_eq!(client.call_count(), 2);

        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.fallbacks, 0);
    }

    #[tokio::test]
    async fn test_identical_request_served_from_cache() {
        let (client, pipeline) = pipeline_with_replies(vec![
            MockReply::Text(skeleton_json()),
            MockReply::Text(good_expand_json()),
        ]);

        let first = pipeline.run(sample_input()).await.unwrap();
        assert!(!first.metadata.cached);

        // Same logical request, fresh request id
        let second = pipeline.run(sample_input()).await.unwrap();
        assert!(second.metadata.cached);
        assert_eq!(second.metadata.generation_time_ms, 0);
        assert_eq!(second.metadata.model_passes, first.metadata.model_passes);
        assert_eq!(second.preset, first.preset);

        // No further generation calls were made
        assert_eq!(client.call_count(), 2);
        assert_eq!(pipeline.metrics().snapshot().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_empty_description_rejected() {
        let (client, pipeline) = pipeline_with_replies(vec![]);
        let result = pipeline.run(PipelineInput::new("user-1", "   ")).await;

        assert!(matches!(result, Err(PipelineError::EmptyDescription)));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_shallow_candidate_retried_then_accepted() {
        let (client, pipeline) = pipeline_with_replies(vec![
            MockReply::Text(skeleton_json()),
            MockReply::Text(shallow_expand_json()),
            MockReply::Text(good_expand_json()),
        ]);

        let result = pipeline.run(sample_input()).await.unwrap();

        assert!(!result.metadata.fallback);
        assert_eq!(result.metadata.attempts, 2);
        assert_eq!(
            result.metadata.model_passes,
            vec!["skeleton", "expand@t=0.2", "expand@t=0.7"]
        );
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fallback_after_exhausting_attempts() {
        let (client, pipeline) = pipeline_with_replies(vec![
            MockReply::Text(skeleton_json()),
            MockReply::Text(shallow_expand_json()),
            MockReply::Text(shallow_expand_json()),
        ]);

        let result = pipeline.run(sample_input()).await.unwrap();

        // Still a success from the caller's perspective
        assert!(result.success);
        assert!(result.metadata.fallback);
        assert_eq!(result.metadata.attempts, 2);
        assert_eq!(result.preset, fallback_preset());
        assert_eq!(client.call_count(), 3);
        assert_eq!(pipeline.metrics().snapshot().fallbacks, 1);
    }

    #[tokio::test]
    async fn test_unparseable_skeleton_falls_back() {
        let (client, pipeline) =
            pipeline_with_replies(vec![MockReply::Text("I cannot produce JSON today".to_string())]);

        let result = pipeline.run(sample_input()).await.unwrap();

        assert!(result.metadata.fallback);
        assert_eq!(result.metadata.attempts, 0);
        assert_eq!(result.metadata.model_passes, vec!["skeleton"]);
        assert_eq!(client.call_count(), 1);
        assert_eq!(pipeline.metrics().snapshot().parse_failures, 1);
    }

    #[tokio::test]
    async fn test_schema_violation_consumes_an_attempt() {
        let mut invalid: serde_json::Value = serde_json::from_str(&good_expand_json()).unwrap();
        invalid["hallucinated"] = json!("extra field");

        let (client, pipeline) = pipeline_with_replies(vec![
            MockReply::Text(skeleton_json()),
            MockReply::Text(invalid.to_string()),
            MockReply::Text(good_expand_json()),
        ]);

        let result = pipeline.run(sample_input()).await.unwrap();

        assert!(!result.metadata.fallback);
        assert_eq!(result.metadata.attempts, 2);
        assert_eq!(client.call_count(), 3);
        assert_eq!(pipeline.metrics().snapshot().validation_failures, 1);
    }

    #[tokio::test]
    async fn test_backend_error_consumes_an_attempt() {
        use crate::llm::LlmError;

        let (client, pipeline) = pipeline_with_replies(vec![
            MockReply::Text(skeleton_json()),
            MockReply::Fail(LlmError::RateLimited {
                retry_after: Duration::from_secs(1),
            }),
            MockReply::Text(good_expand_json()),
        ]);

        let result = pipeline.run(sample_input()).await.unwrap();

        assert!(!result.metadata.fallback);
        assert_eq!(result.metadata.attempts, 2);
        // Failed attempt made the call but recorded no completed pass
        assert_eq!(result.metadata.model_passes, vec!["skeleton", "expand@t=0.7"]);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_oversized_activities_are_split() {
        let mut oversized: serde_json::Value = serde_json::from_str(&good_expand_json()).unwrap();
        oversized["activities"][1]["estimatedHours"] = json!(12.0);

        let (_, pipeline) = pipeline_with_replies(vec![
            MockReply::Text(skeleton_json()),
            MockReply::Text(oversized.to_string()),
        ]);

        let result = pipeline.run(sample_input()).await.unwrap();

        let max = Config::default().pipeline.max_activity_hours;
        assert!(result.preset.activities.iter().all(|a| a.estimated_hours <= max));
        assert!(result.preset.activities.len() > 5);
        let total: f64 = result.preset.activities.iter().map(|a| a.estimated_hours).sum();
        assert!((total - 36.0).abs() < 1e-9);
    }
}
