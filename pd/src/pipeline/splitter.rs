//! Task splitter - decomposes over-ceiling activities
//!
//! An activity whose effort exceeds the configured ceiling becomes
//! `ceil(hours / ceiling)` sub-activities titled from per-group stage
//! templates, so the split stays human-legible instead of mechanically
//! numbered.

use tracing::debug;

use crate::domain::{ActivityGroup, PipelineActivity};

/// Splitting a task is itself evidence of uncertainty in the original
/// estimate, so children carry a reduced confidence.
const CONFIDENCE_DECAY: f64 = 0.85;

/// Canonical sub-task stage titles per group
fn stage_titles(group: ActivityGroup) -> &'static [&'static str] {
    match group {
        ActivityGroup::Analysis => &["scoping", "detailed analysis", "review and sign-off"],
        ActivityGroup::Development => &["foundation", "core implementation", "integration and polish"],
        ActivityGroup::Test => &["test planning", "test case authoring", "test execution and reporting"],
        ActivityGroup::Operations => &["environment preparation", "rollout", "monitoring and handover"],
        ActivityGroup::Governance => &["preparation", "execution", "documentation"],
    }
}

/// Split one activity so every resulting part fits under `max_hours`
///
/// Identity case: effort at or below the ceiling returns the activity
/// unchanged as a single element. Otherwise hours are redistributed with
/// earlier parts quarter-hour rounded and the final part taking the exact
/// remainder, so the sum reconstructs the original and every part stays
/// within the ceiling.
pub fn split_activity(activity: PipelineActivity, max_hours: f64) -> Vec<PipelineActivity> {
    debug!(title = %activity.title, hours = %activity.estimated_hours, %max_hours, "split_activity: called");

    if activity.estimated_hours <= max_hours {
        debug!("split_activity: within ceiling, identity");
        return vec![activity];
    }

    let parts = (activity.estimated_hours / max_hours).ceil() as usize;
    let stages = stage_titles(activity.group);
    let child_confidence = activity.confidence.map(|c| (c * CONFIDENCE_DECAY).clamp(0.0, 1.0));

    debug!(%parts, "split_activity: decomposing");

    let mut children = Vec::with_capacity(parts);
    let mut remaining = activity.estimated_hours;

    for i in 0..parts {
        let parts_left = (parts - i) as f64;
        let hours = if i == parts - 1 {
            // Exact remainder; bounded by the ceiling because every earlier
            // part took at least its even share
            remaining
        } else {
            let share = ((remaining / parts_left) * 4.0).ceil() / 4.0;
            share.min(max_hours)
        };
        remaining -= hours;

        let stage = if parts <= stages.len() {
            stages[i].to_string()
        } else {
            // More parts than stages: cycle the vocabulary with a round number
            format!("{} {}", stages[i % stages.len()], i / stages.len() + 1)
        };

        children.push(PipelineActivity {
            title: format!("{}: {}", activity.title, stage),
            group: activity.group,
            estimated_hours: hours,
            priority: activity.priority,
            // Parent prose describes the whole; carried on the first part only
            description: if i == 0 { activity.description.clone() } else { None },
            acceptance_criteria: if i == 0 {
                activity.acceptance_criteria.clone()
            } else {
                Vec::new()
            },
            technical_detail: if i == 0 { activity.technical_detail.clone() } else { None },
            confidence: child_confidence,
        });
    }

    children
}

/// Run the splitter over every activity of an expanded preset
pub fn split_all(activities: Vec<PipelineActivity>, max_hours: f64) -> Vec<PipelineActivity> {
    debug!(count = %activities.len(), %max_hours, "split_all: called");
    activities
        .into_iter()
        .flat_map(|activity| split_activity(activity, max_hours))
        .collect()
}
