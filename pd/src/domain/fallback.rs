//! Static fallback preset
//!
//! Returned when generation cannot reach the quality bar within the attempt
//! budget. Hand-authored, always schema-valid (guarded by test), every
//! activity within the default hour ceiling.

use std::collections::BTreeMap;

use tracing::debug;

use super::activity::{ActivityGroup, ActivityPriority, PipelineActivity, TechnicalDetail};
use super::preset::Preset;

/// Build the static fallback preset
///
/// A fresh value each call; the orchestrator treats results as immutable so
/// sharing a cached instance would buy nothing.
pub fn fallback_preset() -> Preset {
    debug!("fallback_preset: called");

    let activities = vec![
        PipelineActivity {
            title: "Requirements workshop".to_string(),
            group: ActivityGroup::Analysis,
            estimated_hours: 6.0,
            priority: ActivityPriority::Core,
            description: Some(
                "Clarify scope, stakeholders and constraints with the requester.\n\
                 - Collect functional requirements\n\
                 - Identify integration points and data sources"
                    .to_string(),
            ),
            acceptance_criteria: vec![
                "Requirements document reviewed by the requester".to_string(),
                "Open questions list triaged".to_string(),
                "Scope boundary agreed in writing".to_string(),
            ],
            technical_detail: None,
            confidence: Some(0.9),
        },
        PipelineActivity {
            title: "Solution design".to_string(),
            group: ActivityGroup::Analysis,
            estimated_hours: 6.0,
            priority: ActivityPriority::Core,
            description: Some(
                "Translate requirements into a component design and data model.\n\
                 - Sketch module boundaries\n\
                 - Define the external interfaces"
                    .to_string(),
            ),
            acceptance_criteria: vec![
                "Design document exists".to_string(),
                "Data model covers all requirements".to_string(),
                "Interfaces reviewed by one peer".to_string(),
            ],
            technical_detail: None,
            confidence: Some(0.85),
        },
        PipelineActivity {
            title: "Core implementation".to_string(),
            group: ActivityGroup::Development,
            estimated_hours: 8.0,
            priority: ActivityPriority::Core,
            description: Some(
                "Implement the primary feature set against the agreed design.\n\
                 - Build domain logic first\n\
                 - Wire the external interfaces last"
                    .to_string(),
            ),
            acceptance_criteria: vec![
                "All designed components implemented".to_string(),
                "Code reviewed and merged".to_string(),
                "No known blocking defects".to_string(),
            ],
            technical_detail: Some(TechnicalDetail {
                suggested_files: vec!["src/".to_string()],
                suggested_commands: vec!["cargo build".to_string()],
                suggested_dependencies: vec![],
            }),
            confidence: Some(0.8),
        },
        PipelineActivity {
            title: "Test planning and execution".to_string(),
            group: ActivityGroup::Test,
            estimated_hours: 8.0,
            priority: ActivityPriority::Core,
            description: Some(
                "Plan and run functional tests for the implemented scope.\n\
                 - Derive cases from acceptance criteria\n\
                 - Track defects to closure"
                    .to_string(),
            ),
            acceptance_criteria: vec![
                "Test plan covers every requirement".to_string(),
                "All planned cases executed".to_string(),
                "Critical defects fixed and retested".to_string(),
            ],
            technical_detail: None,
            confidence: Some(0.85),
        },
        PipelineActivity {
            title: "Deployment preparation".to_string(),
            group: ActivityGroup::Operations,
            estimated_hours: 4.0,
            priority: ActivityPriority::Recommended,
            description: Some("Prepare environments, rollout steps and rollback procedure.".to_string()),
            acceptance_criteria: vec![
                "Deployment runbook written".to_string(),
                "Rollback procedure tested once".to_string(),
                "Monitoring endpoints defined".to_string(),
            ],
            technical_detail: None,
            confidence: Some(0.8),
        },
        PipelineActivity {
            title: "Project documentation".to_string(),
            group: ActivityGroup::Governance,
            estimated_hours: 4.0,
            priority: ActivityPriority::Recommended,
            description: Some("Produce handover documentation and record decisions.".to_string()),
            acceptance_criteria: vec![
                "README covers setup and operation".to_string(),
                "Decision log up to date".to_string(),
                "Handover session held".to_string(),
            ],
            technical_detail: None,
            confidence: Some(0.9),
        },
    ];

    Preset {
        name: "Baseline delivery".to_string(),
        short_description: "Generic delivery breakdown".to_string(),
        description: "Conservative baseline work breakdown used when generation could not \
                      produce a sufficiently specific preset for this project."
            .to_string(),
        category: "general".to_string(),
        activities,
        driver_defaults: BTreeMap::from([
            ("complexity".to_string(), 1.0),
            ("team-experience".to_string(), 1.0),
            ("requirements-stability".to_string(), 1.1),
        ]),
        risk_defaults: vec!["unclear-requirements".to_string(), "estimation-uncertainty".to_string()],
        reasoning: "Static fallback: generation did not reach the completeness threshold, \
                    so a generic but safe breakdown is returned."
            .to_string(),
        confidence: 0.5,
    }
}
