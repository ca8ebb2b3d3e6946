//! Activity types - the individual work items inside a preset

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which phase of delivery an activity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityGroup {
    Analysis,
    Development,
    Test,
    Operations,
    Governance,
}

impl ActivityGroup {
    /// Wire-format name of this group
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Development => "development",
            Self::Test => "test",
            Self::Operations => "operations",
            Self::Governance => "governance",
        }
    }

    /// All groups, in preset ordering convention
    pub fn all() -> [ActivityGroup; 5] {
        [
            Self::Analysis,
            Self::Development,
            Self::Test,
            Self::Operations,
            Self::Governance,
        ]
    }
}

impl std::fmt::Display for ActivityGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How essential an activity is to the breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityPriority {
    Core,
    Recommended,
    Optional,
}

impl ActivityPriority {
    /// Wire-format name of this priority
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Recommended => "recommended",
            Self::Optional => "optional",
        }
    }
}

impl std::fmt::Display for ActivityPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Implementation hints attached to an expanded activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalDetail {
    /// Files likely touched by this activity
    pub suggested_files: Vec<String>,
    /// Commands worth running while working on it
    pub suggested_commands: Vec<String>,
    /// Dependencies it is expected to pull in
    pub suggested_dependencies: Vec<String>,
}

impl TechnicalDetail {
    /// How many of the three hint lists carry content
    pub fn populated_fields(&self) -> usize {
        debug!("TechnicalDetail::populated_fields: called");
        [
            !self.suggested_files.is_empty(),
            !self.suggested_commands.is_empty(),
            !self.suggested_dependencies.is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// A single work item within a preset
///
/// The skeleton pass produces these with only the four required fields; the
/// expand pass fills in description, criteria, technical detail and
/// confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineActivity {
    pub title: String,
    pub group: ActivityGroup,
    pub estimated_hours: f64,
    pub priority: ActivityPriority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_detail: Option<TechnicalDetail>,

    /// Model self-confidence in [0,1], when the expand pass reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl PipelineActivity {
    /// Bare activity with just the required fields (skeleton shape)
    pub fn new(
        title: impl Into<String>,
        group: ActivityGroup,
        estimated_hours: f64,
        priority: ActivityPriority,
    ) -> Self {
        let title = title.into();
        debug!(%title, %group, %estimated_hours, "PipelineActivity::new: called");
        Self {
            title,
            group,
            estimated_hours,
            priority,
            description: None,
            acceptance_criteria: Vec::new(),
            technical_detail: None,
            confidence: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_roundtrip() {
        for group in ActivityGroup::all() {
            let json = serde_json::to_string(&group).unwrap();
            let back: ActivityGroup = serde_json::from_str(&json).unwrap();
            assert_eq!(group, back);
        }
    }

    #[test]
    fn test_group_wire_names_lowercase() {
        assert_eq!(serde_json::to_string(&ActivityGroup::Test).unwrap(), "\"test\"");
        assert_eq!(
            serde_json::to_string(&ActivityPriority::Recommended).unwrap(),
            "\"recommended\""
        );
    }

    #[test]
    fn test_unknown_group_rejected() {
        let result: Result<ActivityGroup, _> = serde_json::from_str("\"marketing\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_activity_camel_case_wire_format() {
        let activity = PipelineActivity::new("Set up CI", ActivityGroup::Operations, 4.0, ActivityPriority::Core);
        let json = serde_json::to_value(&activity).unwrap();

        assert_eq!(json["estimatedHours"], 4.0);
        assert_eq!(json["group"], "operations");
        // Empty optional fields stay off the wire
        assert!(json.get("acceptanceCriteria").is_none());
        assert!(json.get("technicalDetail").is_none());
    }

    #[test]
    fn test_technical_detail_populated_fields() {
        let empty = TechnicalDetail::default();
        assert_eq!(empty.populated_fields(), 0);

        let partial = TechnicalDetail {
            suggested_files: vec!["src/api.rs".to_string()],
            suggested_commands: vec![],
            suggested_dependencies: vec!["axum".to_string()],
        };
        assert_eq!(partial.populated_fields(), 2);
    }
}
