//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::domain::PipelineInput;

use super::embedded;

/// One requester answer, flattened for template rendering
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPair {
    pub key: String,
    pub value: String,
}

/// Context for rendering prompt templates
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    /// Free-text project description
    pub description: String,
    /// Technology category, if the requester supplied one
    pub category: Option<String>,
    /// Structured answers, sorted by key
    pub answers: Vec<AnswerPair>,
    /// Conditional-rendering booleans
    pub has_category: bool,
    pub has_answers: bool,
    /// Activity count bounds from the pipeline config
    pub min_activities: usize,
    pub max_activities: usize,
    /// Expand pass only: skeleton JSON from the first pass
    pub skeleton_json: Option<String>,
    /// Expand pass only: splitting ceiling in hours
    pub max_hours: f64,
    /// Expand pass only: acceptance criteria floor
    pub min_criteria: usize,
}

impl PromptContext {
    /// Create a context for the skeleton pass
    pub fn skeleton(input: &PipelineInput, config: &PipelineConfig) -> Self {
        debug!(
            description_len = input.description.len(),
            "PromptContext::skeleton: called"
        );
        Self {
            description: input.description.clone(),
            category: input.category.clone(),
            answers: Self::answer_pairs(input),
            has_category: input.category.is_some(),
            has_answers: !input.answers.is_empty(),
            min_activities: config.min_activities,
            max_activities: config.max_activities,
            skeleton_json: None,
            max_hours: config.max_activity_hours,
            min_criteria: 0,
        }
    }

    /// Create a context for an expand pass
    pub fn expand(
        input: &PipelineInput,
        skeleton_json: String,
        config: &PipelineConfig,
        min_criteria: usize,
    ) -> Self {
        debug!(
            skeleton_len = skeleton_json.len(),
            "PromptContext::expand: called"
        );
        Self {
            skeleton_json: Some(skeleton_json),
            min_criteria,
            ..Self::skeleton(input, config)
        }
    }

    fn answer_pairs(input: &PipelineInput) -> Vec<AnswerPair> {
        input
            .answers
            .iter()
            .map(|(key, value)| AnswerPair {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.presetdaemon/prompts/`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at the given directory
    ///
    /// User overrides live in `{root}/.presetdaemon/prompts/{name}.pmt`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let user_dir = root.as_ref().join(".presetdaemon/prompts");
        let user_dir_exists = user_dir.exists();
        debug!(?user_dir, %user_dir_exists, "PromptLoader::new: called");

        Self {
            hbs: Handlebars::new(),
            user_dir: if user_dir_exists { Some(user_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Handlebars::new(),
            user_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks the user override directory first, then the embedded defaults.
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in user override");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> PipelineInput {
        PipelineInput::new("user-1", "Build an employee onboarding portal")
            .with_category("web-application")
            .with_answer("team-size", "4")
            .with_answer("deadline", "Q2")
    }

    #[test]
    fn test_skeleton_context() {
        let ctx = PromptContext::skeleton(&sample_input(), &PipelineConfig::default());
        assert!(ctx.has_category);
        assert!(ctx.has_answers);
        assert_eq!(ctx.answers.len(), 2);
        assert!(ctx.skeleton_json.is_none());
        assert_eq!(ctx.min_activities, 5);
        assert_eq!(ctx.max_activities, 20);
    }

    #[test]
    fn test_expand_context_carries_skeleton() {
        let ctx = PromptContext::expand(
            &sample_input(),
            r#"{"activities":[]}"#.to_string(),
            &PipelineConfig::default(),
            3,
        );
        assert_eq!(ctx.skeleton_json.as_deref(), Some(r#"{"activities":[]}"#));
        assert_eq!(ctx.min_criteria, 3);
    }

    #[test]
    fn test_render_skeleton_prompt() {
        let loader = PromptLoader::embedded_only();
        let ctx = PromptContext::skeleton(&sample_input(), &PipelineConfig::default());
        let rendered = loader.render("skeleton", &ctx).unwrap();
        assert!(rendered.contains("Build an employee onboarding portal"));
        assert!(rendered.contains("web-application"));
        assert!(rendered.contains("team-size: 4"));
        assert!(rendered.contains("5 to 20 activities"));
    }

    #[test]
    fn test_render_expand_prompt() {
        let loader = PromptLoader::embedded_only();
        let ctx = PromptContext::expand(
            &sample_input(),
            r#"{"activities":[{"title":"Discovery"}]}"#.to_string(),
            &PipelineConfig::default(),
            3,
        );
        let rendered = loader.render("expand", &ctx).unwrap();
        assert!(rendered.contains(r#"{"activities":[{"title":"Discovery"}]}"#));
        assert!(rendered.contains("at least 3 verifiable acceptance criteria"));
    }

    #[test]
    fn test_render_omits_empty_sections() {
        let loader = PromptLoader::embedded_only();
        let input = PipelineInput::new("user-1", "Migrate a billing database");
        let ctx = PromptContext::skeleton(&input, &PipelineConfig::default());
        let rendered = loader.render("skeleton", &ctx).unwrap();
        assert!(!rendered.contains("Target technology category"));
        assert!(!rendered.contains("Structured answers"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
