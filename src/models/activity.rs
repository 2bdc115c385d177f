use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synthetic event reconstructed from bolt timestamps.
///
/// Events are never persisted; the feed is rebuilt from the bolt collection
/// on every recompute. Relative time labels are attached only when a
/// snapshot is rendered for a given `now`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: ActivityEventType,
    pub text: String,
    /// Display name of the bolt the event concerns.
    pub target: String,
    pub target_id: String,
    pub tag: ActivityTag,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityEventType {
    BoltCreated,
    BoltStart,
    StageComplete,
    BoltComplete,
}

impl ActivityEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoltCreated => "bolt-created",
            Self::BoltStart => "bolt-start",
            Self::StageComplete => "stage-complete",
            Self::BoltComplete => "bolt-complete",
        }
    }

    /// Ordering rank among events sharing a timestamp. Lower sorts first.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::BoltComplete => 0,
            Self::StageComplete => 1,
            Self::BoltStart => 2,
            Self::BoltCreated => 3,
        }
    }

    pub fn tag(&self) -> ActivityTag {
        match self {
            Self::StageComplete => ActivityTag::Stage,
            _ => ActivityTag::Bolt,
        }
    }
}

/// Coarse event category used by the feed filters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTag {
    Bolt,
    Stage,
}

/// Activity feed filter selected in the UI.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityFilter {
    #[default]
    All,
    Stages,
    Bolts,
}

impl ActivityFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Stages => "stages",
            Self::Bolts => "bolts",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "stages" => Some(Self::Stages),
            "bolts" => Some(Self::Bolts),
            _ => None,
        }
    }

    pub fn accepts(&self, tag: ActivityTag) -> bool {
        match self {
            Self::All => true,
            Self::Stages => tag == ActivityTag::Stage,
            Self::Bolts => tag == ActivityTag::Bolt,
        }
    }
}
