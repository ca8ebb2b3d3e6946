//! Completeness scorer
//!
//! Heuristic 0-1 quality measure per activity, aggregated into the preset's
//! average completeness. This average is the only signal the orchestrator
//! consults for its retry decision; generation-backend metadata is never
//! inspected.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScoringConfig;
use crate::domain::{PipelineActivity, Preset};

/// Per-activity quality sub-scores, each in [0,1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityScore {
    /// Lexical overlap between activity text and the project description
    pub coherence: f64,
    /// Structural richness of the supporting text
    pub depth: f64,
    /// Presence of concrete, verifiable acceptance criteria
    pub actionable: f64,
    /// Weighted aggregate of the three sub-scores
    pub completeness: f64,
}

/// A preset decorated with its quality scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPreset {
    pub preset: Preset,
    pub activity_scores: Vec<ActivityScore>,
    pub average_completeness: f64,
}

/// Words too generic to signal topical coherence
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "are", "was", "were", "will", "shall", "should",
    "must", "can", "could", "has", "have", "had", "been", "being", "its", "their", "our", "your", "all", "any", "each",
    "per", "via", "also", "not", "but", "when", "then", "than", "them", "they", "there", "which", "while", "where",
    "what", "how", "who", "whom", "such", "some", "more", "most", "other", "based", "using", "use", "used", "new",
    "system", "project", "implement", "implementation", "create", "build", "setup", "set",
];

/// Tokenize into lowercase alphanumeric words, stopword-filtered
fn significant_tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Topical coherence: overlap ratio of activity vocabulary against the
/// project description, scaled so a half-overlapping activity saturates
fn coherence_score(activity: &PipelineActivity, description_tokens: &HashSet<String>) -> f64 {
    let mut text = activity.title.clone();
    if let Some(ref desc) = activity.description {
        text.push(' ');
        text.push_str(desc);
    }
    let activity_tokens = significant_tokens(&text);
    if activity_tokens.is_empty() || description_tokens.is_empty() {
        return 0.0;
    }

    let matches = activity_tokens.intersection(description_tokens).count() as f64;
    let ratio = matches / activity_tokens.len() as f64;
    (ratio * 2.0).min(1.0)
}

/// Structural depth: description length tiers, multi-line or bulleted
/// structure, and populated technical-detail lists
fn depth_score(activity: &PipelineActivity) -> f64 {
    let mut score: f64 = 0.0;

    if let Some(ref desc) = activity.description {
        let trimmed = desc.trim();
        if trimmed.len() >= 200 {
            score += 0.3;
        } else if trimmed.len() >= 80 {
            score += 0.15;
        }
        if trimmed.contains('\n') || trimmed.contains("- ") || trimmed.contains("* ") {
            score += 0.2;
        }
    }

    if let Some(ref detail) = activity.technical_detail {
        score += detail.populated_fields() as f64 * (0.5 / 3.0);
    }

    score.min(1.0)
}

/// A criterion counts only when it is long enough to be checkable
fn is_concrete_criterion(criterion: &str) -> bool {
    criterion.trim().len() >= 10
}

/// Actionable: saturates at `min_criteria` concrete criteria, interpolates
/// for partial lists, zero when absent or trivial
fn actionable_score(activity: &PipelineActivity, min_criteria: usize) -> f64 {
    let concrete = activity
        .acceptance_criteria
        .iter()
        .filter(|c| is_concrete_criterion(c))
        .count();
    if concrete == 0 {
        return 0.0;
    }
    (concrete as f64 / min_criteria.max(1) as f64).min(1.0)
}

/// Score one activity against the project description
pub fn score_activity(
    activity: &PipelineActivity,
    description_tokens: &HashSet<String>,
    config: &ScoringConfig,
) -> ActivityScore {
    let coherence = coherence_score(activity, description_tokens);
    let depth = depth_score(activity);
    let actionable = actionable_score(activity, config.min_criteria);

    let weight_sum = config.coherence_weight + config.depth_weight + config.actionable_weight;
    let completeness = if weight_sum > 0.0 {
        (coherence * config.coherence_weight + depth * config.depth_weight + actionable * config.actionable_weight)
            / weight_sum
    } else {
        0.0
    };

    debug!(title = %activity.title, %coherence, %depth, %actionable, %completeness, "score_activity: scored");

    ActivityScore {
        coherence,
        depth,
        actionable,
        completeness,
    }
}

/// Score every activity and aggregate the preset-level average
pub fn score_preset(preset: Preset, project_description: &str, config: &ScoringConfig) -> ScoredPreset {
    debug!(activity_count = %preset.activities.len(), "score_preset: called");
    let description_tokens = significant_tokens(project_description);

    let activity_scores: Vec<ActivityScore> = preset
        .activities
        .iter()
        .map(|activity| score_activity(activity, &description_tokens, config))
        .collect();

    let average_completeness = if activity_scores.is_empty() {
        0.0
    } else {
        activity_scores.iter().map(|s| s.completeness).sum::<f64>() / activity_scores.len() as f64
    };

    debug!(%average_completeness, "score_preset: done");

    ScoredPreset {
        preset,
        activity_scores,
        average_completeness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityGroup, ActivityPriority, TechnicalDetail};
    use std::collections::BTreeMap;

    const HR_DESCRIPTION: &str = "HR dashboard with real-time employee metrics, attendance tracking, \
                                  vacation planning and payroll export for mid-sized companies";

    fn preset_with(activities: Vec<PipelineActivity>) -> Preset {
        Preset {
            name: "Test".to_string(),
            short_description: "t".to_string(),
            description: "t".to_string(),
            category: "web".to_string(),
            activities,
            driver_defaults: BTreeMap::new(),
            risk_defaults: vec![],
            reasoning: "t".to_string(),
            confidence: 0.8,
        }
    }

    fn rich_activity() -> PipelineActivity {
        PipelineActivity {
            title: "Employee metrics dashboard".to_string(),
            group: ActivityGroup::Development,
            estimated_hours: 8.0,
            priority: ActivityPriority::Core,
            description: Some(
                "Build the real-time employee metrics dashboard with attendance tracking widgets.\n\
                 - Wire the metrics API to live attendance data\n\
                 - Render vacation planning summaries per employee\n\
                 - Add payroll export triggers from the dashboard\n\
                 The dashboard refreshes employee metrics every minute and supports drill-down."
                    .to_string(),
            ),
            acceptance_criteria: vec![
                "Dashboard shows live attendance within 60 seconds".to_string(),
                "Vacation planning view lists remaining days per employee".to_string(),
                "Payroll export produces a valid CSV file".to_string(),
                "Dashboard loads in under two seconds".to_string(),
            ],
            technical_detail: Some(TechnicalDetail {
                suggested_files: vec!["src/dashboard.rs".to_string()],
                suggested_commands: vec!["cargo test".to_string()],
                suggested_dependencies: vec!["axum".to_string()],
            }),
            confidence: Some(0.85),
        }
    }

    fn thin_activity() -> PipelineActivity {
        PipelineActivity {
            title: "Do the work".to_string(),
            group: ActivityGroup::Development,
            estimated_hours: 8.0,
            priority: ActivityPriority::Core,
            description: Some("Do stuff.".to_string()),
            acceptance_criteria: vec![],
            technical_detail: None,
            confidence: None,
        }
    }

    #[test]
    fn test_low_bound_thin_activity() {
        let scored = score_preset(preset_with(vec![thin_activity()]), HR_DESCRIPTION, &ScoringConfig::default());

        assert!(scored.average_completeness < 0.65);
        assert_eq!(scored.activity_scores[0].actionable, 0.0);
    }

    #[test]
    fn test_high_bound_rich_activity() {
        let scored = score_preset(preset_with(vec![rich_activity()]), HR_DESCRIPTION, &ScoringConfig::default());

        let score = &scored.activity_scores[0];
        assert!(score.coherence > 0.5, "coherence was {}", score.coherence);
        assert!(
            scored.average_completeness >= 0.65,
            "average was {}",
            scored.average_completeness
        );
    }

    #[test]
    fn test_coherence_sensitivity_unrelated_stack() {
        let unrelated = PipelineActivity {
            title: "Train convolutional neural network classifier".to_string(),
            group: ActivityGroup::Development,
            estimated_hours: 8.0,
            priority: ActivityPriority::Core,
            description: Some(
                "Prepare labelled image corpus, tune hyperparameters, run GPU training jobs \
                 and evaluate the resulting CUDA kernels against the benchmark suite."
                    .to_string(),
            ),
            acceptance_criteria: vec![],
            technical_detail: None,
            confidence: None,
        };

        let scored = score_preset(preset_with(vec![unrelated]), HR_DESCRIPTION, &ScoringConfig::default());
        assert!(
            scored.activity_scores[0].coherence < 0.3,
            "coherence was {}",
            scored.activity_scores[0].coherence
        );
    }

    #[test]
    fn test_actionable_interpolates() {
        let config = ScoringConfig::default();
        let mut activity = thin_activity();

        activity.acceptance_criteria = vec!["Dashboard loads correctly every time".to_string()];
        let partial = actionable_score(&activity, config.min_criteria);
        assert!(partial > 0.0 && partial < 1.0);

        activity.acceptance_criteria = vec![
            "Dashboard loads correctly every time".to_string(),
            "Exports validate against the schema".to_string(),
            "Errors are shown to the operator".to_string(),
        ];
        assert_eq!(actionable_score(&activity, config.min_criteria), 1.0);
    }

    #[test]
    fn test_trivial_criteria_do_not_count() {
        let mut activity = thin_activity();
        activity.acceptance_criteria = vec!["ok".to_string(), "done".to_string()];
        assert_eq!(actionable_score(&activity, 3), 0.0);
    }

    #[test]
    fn test_depth_rewards_structure_and_detail() {
        let thin = depth_score(&thin_activity());
        let rich = depth_score(&rich_activity());
        assert!(rich > thin);
        assert!(rich > 0.8);
    }

    #[test]
    fn test_average_over_mixed_activities() {
        let scored = score_preset(
            preset_with(vec![rich_activity(), thin_activity()]),
            HR_DESCRIPTION,
            &ScoringConfig::default(),
        );

        let rich = scored.activity_scores[0].completeness;
        let thin = scored.activity_scores[1].completeness;
        let expected = (rich + thin) / 2.0;
        assert!((scored.average_completeness - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_description_scores_zero_coherence() {
        let scored = score_preset(preset_with(vec![rich_activity()]), "", &ScoringConfig::default());
        assert_eq!(scored.activity_scores[0].coherence, 0.0);
    }
}
