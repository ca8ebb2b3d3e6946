//! Preset - the pipeline's output artifact - and the coarse skeleton shape

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::activity::{ActivityGroup, ActivityPriority, PipelineActivity};

/// A complete work-breakdown preset
///
/// Activity count is bounded (5-20) by the schema; `driver_defaults` maps
/// driver codes to their default values and `risk_defaults` lists default
/// risk codes, both consumed by the downstream estimation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub category: String,
    pub activities: Vec<PipelineActivity>,
    #[serde(default)]
    pub driver_defaults: BTreeMap<String, f64>,
    #[serde(default)]
    pub risk_defaults: Vec<String>,
    pub reasoning: String,
    pub confidence: f64,
}

impl Preset {
    /// Sum of estimated hours across all activities
    pub fn total_hours(&self) -> f64 {
        debug!(activity_count = %self.activities.len(), "Preset::total_hours: called");
        self.activities.iter().map(|a| a.estimated_hours).sum()
    }

    /// Largest single-activity effort, 0.0 for an empty preset
    pub fn max_activity_hours(&self) -> f64 {
        self.activities.iter().map(|a| a.estimated_hours).fold(0.0, f64::max)
    }
}

/// One coarse activity from the skeleton pass: no prose, just the frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonActivity {
    pub title: String,
    pub group: ActivityGroup,
    pub estimated_hours: f64,
    pub priority: ActivityPriority,
}

/// The skeleton pass output: a bare activity list anchoring the expand pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub activities: Vec<SkeletonActivity>,
}

impl Skeleton {
    /// Render the skeleton as compact JSON for inclusion in the expand prompt
    pub fn to_prompt_json(&self) -> String {
        debug!(activity_count = %self.activities.len(), "Skeleton::to_prompt_json: called");
        serde_json::to_string(self).unwrap_or_else(|_| "{\"activities\":[]}".to_string())
    }
}
