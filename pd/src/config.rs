//! Presetdaemon configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main presetdaemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Pipeline policy knobs (attempts, ceilings, temperatures)
    pub pipeline: PipelineConfig,

    /// Completeness scoring policy
    pub scoring: ScoringConfig,

    /// Idempotency cache settings
    pub cache: CacheConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.pipeline.max_attempts == 0 {
            return Err(eyre::eyre!("pipeline.max-attempts must be at least 1"));
        }
        if self.pipeline.max_activity_hours <= 0.0 {
            return Err(eyre::eyre!("pipeline.max-activity-hours must be positive"));
        }
        if !(0.0..=1.0).contains(&self.scoring.completeness_threshold) {
            return Err(eyre::eyre!("scoring.completeness-threshold must be within [0,1]"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .presetdaemon.yml
        let local_config = PathBuf::from(".presetdaemon.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/presetdaemon/presetdaemon.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("presetdaemon").join("presetdaemon.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("anthropic" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds; a timed-out call consumes one
    /// pipeline attempt
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .context(format!("API key environment variable {} not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            timeout_ms: 60_000,
        }
    }
}

/// Pipeline policy knobs
///
/// The retry threshold, hour ceiling and temperature ladder are tunable
/// policy rather than structure, so they live in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum expand attempts before falling back
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Sampling temperature per attempt; attempts beyond the ladder reuse
    /// the last entry
    pub temperatures: Vec<f32>,

    /// Temperature for the skeleton pass
    #[serde(rename = "skeleton-temperature")]
    pub skeleton_temperature: f32,

    /// Per-activity effort ceiling in hours; larger activities get split
    #[serde(rename = "max-activity-hours")]
    pub max_activity_hours: f64,

    /// Minimum activity count requested from the model
    #[serde(rename = "min-activities")]
    pub min_activities: usize,

    /// Maximum activity count requested from the model
    #[serde(rename = "max-activities")]
    pub max_activities: usize,
}

impl PipelineConfig {
    /// Temperature to use for the given 1-based expand attempt
    pub fn temperature_for_attempt(&self, attempt: u32) -> f32 {
        let idx = (attempt.max(1) - 1) as usize;
        self.temperatures
            .get(idx)
            .or_else(|| self.temperatures.last())
            .copied()
            .unwrap_or(0.2)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            temperatures: vec![0.2, 0.7],
            skeleton_temperature: 0.2,
            max_activity_hours: 8.0,
            min_activities: 5,
            max_activities: 20,
        }
    }
}

/// Completeness scoring policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Accept threshold on average completeness
    #[serde(rename = "completeness-threshold")]
    pub completeness_threshold: f64,

    /// Weight of the coherence sub-score
    #[serde(rename = "coherence-weight")]
    pub coherence_weight: f64,

    /// Weight of the depth sub-score
    #[serde(rename = "depth-weight")]
    pub depth_weight: f64,

    /// Weight of the actionable sub-score
    #[serde(rename = "actionable-weight")]
    pub actionable_weight: f64,

    /// Acceptance criteria count at which actionable saturates to 1
    #[serde(rename = "min-criteria")]
    pub min_criteria: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            completeness_threshold: 0.65,
            coherence_weight: 0.4,
            depth_weight: 0.3,
            actionable_weight: 0.3,
            min_criteria: 3,
        }
    }
}

/// Idempotency cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether the idempotency cache is consulted at all
    pub enabled: bool,

    /// Entry TTL in seconds
    #[serde(rename = "ttl-secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
        }
    }
}
