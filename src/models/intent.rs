use serde::{Deserialize, Serialize};

use super::status::ArtifactStatus;
use crate::engine::status::aggregate_status;

/// A feature or capability being built, the root of the intent hierarchy.
///
/// Intents own an ordered list of [`Unit`]s. Unless the intent's own record
/// declares a status, its status is rolled up from its units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    /// Number prefix, e.g. `"001"`.
    pub number: String,
    /// Folder name without the number prefix.
    pub name: String,
    pub path: String,
    pub status: ArtifactStatus,
    pub units: Vec<Unit>,
}

impl Intent {
    /// Build an intent, deriving its status from its units when the record
    /// declares none.
    pub fn build(input: CreateIntentInput) -> Self {
        let status = input.declared_status.unwrap_or_else(|| {
            aggregate_status(input.units.iter().map(|u| u.status))
        });

        Self {
            number: input.number,
            name: input.name,
            path: input.path,
            status,
            units: input.units,
        }
    }

    /// Index key, `"{number}-{name}"`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.number, self.name)
    }

    /// Whether a bolt's `intent` reference points at this intent.
    ///
    /// Bolts may name their intent by number, by name, or by the combined
    /// `"{number}-{name}"` form.
    pub fn matches(&self, reference: &str) -> bool {
        self.number == reference || self.name == reference || self.key() == reference
    }

    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.units.iter().flat_map(|u| u.stories.iter())
    }
}

/// A deliverable slice of an intent, grouping related stories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    pub name: String,
    /// Parent intent folder name.
    pub intent_name: String,
    pub path: String,
    pub status: ArtifactStatus,
    pub stories: Vec<Story>,
}

impl Unit {
    /// Build a unit, deriving its status from its stories when the record
    /// declares none.
    pub fn build(input: CreateUnitInput) -> Self {
        let status = input.declared_status.unwrap_or_else(|| {
            aggregate_status(input.stories.iter().map(|s| s.status))
        });

        Self {
            name: input.name,
            intent_name: input.intent_name,
            path: input.path,
            status,
            stories: input.stories,
        }
    }

    /// Index key, `"{intent_name}/{name}"`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.intent_name, self.name)
    }
}

/// A single requirement inside a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    /// Story number, e.g. `"001"`.
    pub id: String,
    pub title: String,
    pub unit_name: String,
    pub intent_name: String,
    pub path: String,
    pub status: ArtifactStatus,
    #[serde(default)]
    pub priority: StoryPriority,
}

impl Story {
    /// Index key, `"{intent_name}/{unit_name}/{id}"`.
    ///
    /// Story numbers restart in every unit, so the id alone is not unique.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.intent_name, self.unit_name, self.id)
    }
}

/// MoSCoW priority of a story.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoryPriority {
    Must,
    #[default]
    Should,
    Could,
}

impl StoryPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Must => "must",
            Self::Should => "should",
            Self::Could => "could",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "must" => Some(Self::Must),
            "should" => Some(Self::Should),
            "could" => Some(Self::Could),
            _ => None,
        }
    }
}

/// Input for building an [`Intent`].
#[derive(Debug, Clone, Default)]
pub struct CreateIntentInput {
    pub number: String,
    pub name: String,
    pub path: String,
    /// Status written in the intent's own record. `None` rolls up from units.
    pub declared_status: Option<ArtifactStatus>,
    pub units: Vec<Unit>,
}

/// Input for building a [`Unit`].
#[derive(Debug, Clone, Default)]
pub struct CreateUnitInput {
    pub name: String,
    pub intent_name: String,
    pub path: String,
    /// Status written in the unit's own record. `None` rolls up from stories.
    pub declared_status: Option<ArtifactStatus>,
    pub stories: Vec<Story>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, status: ArtifactStatus) -> Story {
        Story {
            id: id.to_string(),
            title: format!("Story {id}"),
            unit_name: "parser".to_string(),
            intent_name: "001-dashboard".to_string(),
            path: String::new(),
            status,
            priority: StoryPriority::default(),
        }
    }

    #[test]
    fn test_unit_rolls_up_story_statuses() {
        let unit = Unit::build(CreateUnitInput {
            name: "parser".to_string(),
            intent_name: "001-dashboard".to_string(),
            stories: vec![
                story("001", ArtifactStatus::Complete),
                story("002", ArtifactStatus::Draft),
            ],
            ..Default::default()
        });
        assert_eq!(unit.status, ArtifactStatus::InProgress);
    }

    #[test]
    fn test_declared_status_wins() {
        let unit = Unit::build(CreateUnitInput {
            name: "parser".to_string(),
            declared_status: Some(ArtifactStatus::Complete),
            stories: vec![story("001", ArtifactStatus::Draft)],
            ..Default::default()
        });
        assert_eq!(unit.status, ArtifactStatus::Complete);

        let intent = Intent::build(CreateIntentInput {
            number: "001".to_string(),
            name: "dashboard".to_string(),
            units: vec![unit],
            ..Default::default()
        });
        assert_eq!(intent.status, ArtifactStatus::Complete);
    }

    #[test]
    fn test_intent_without_units_is_unknown() {
        let intent = Intent::build(CreateIntentInput {
            number: "002".to_string(),
            name: "empty".to_string(),
            ..Default::default()
        });
        assert_eq!(intent.status, ArtifactStatus::Unknown);
    }

    #[test]
    fn test_intent_matches_any_reference_form() {
        let intent = Intent::build(CreateIntentInput {
            number: "007".to_string(),
            name: "installer-analytics".to_string(),
            ..Default::default()
        });
        assert!(intent.matches("007"));
        assert!(intent.matches("installer-analytics"));
        assert!(intent.matches("007-installer-analytics"));
        assert!(!intent.matches("008"));
    }

    #[test]
    fn test_story_priority_defaults_to_should() {
        let json = r#"{"id":"001","title":"t","unit_name":"u","intent_name":"i","path":"","status":"draft"}"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.priority, StoryPriority::Should);
    }
}
