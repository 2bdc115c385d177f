use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::ArtifactStatus;

/// A construction session that moves a set of stories through ordered stages.
///
/// Bolts form a dependency graph through `requires_bolts`. The derived
/// fields `is_blocked`, `blocked_by` and `unblocks_count` are owned by the
/// dependency resolver ([`crate::engine::dependencies`]) and are recomputed
/// over the whole collection whenever any bolt changes. Parsers should leave
/// them at their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Bolt {
    /// Bolt id, e.g. `"bolt-artifact-parser-1"`.
    pub id: String,
    /// Owning unit name.
    pub unit: String,
    /// Owning intent reference (number, name, or `"{number}-{name}"`).
    pub intent: String,
    /// Bolt type, which selects the stage template.
    #[serde(rename = "type")]
    pub bolt_type: String,
    pub status: ArtifactStatus,
    /// Stage currently being worked, `None` if not started.
    pub current_stage: Option<String>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    /// Names of completed stages, as written in the bolt record.
    #[serde(default)]
    pub stages_completed: Vec<String>,
    /// Story ids included in this bolt.
    #[serde(default)]
    pub stories: Vec<String>,
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// Bolts that must complete before this one can start.
    #[serde(default)]
    pub requires_bolts: Vec<String>,
    /// Bolts this one is declared to enable. Informational only.
    #[serde(default)]
    pub enables_bolts: Vec<String>,

    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub blocked_by: Vec<String>,
    #[serde(default)]
    pub unblocks_count: usize,
}

impl Bolt {
    /// Whether the bolt has not started and is not finished.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, ArtifactStatus::Draft | ArtifactStatus::Blocked)
    }

    pub fn stages_complete(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.status == ArtifactStatus::Complete)
            .count()
    }

    /// Most recent lifecycle timestamp, if any.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        [self.completed_at, self.started_at, self.created_at]
            .into_iter()
            .flatten()
            .max()
    }
}

/// One step of a bolt's stage template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub name: String,
    /// 1-based position within the template.
    pub order: u32,
    pub status: ArtifactStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Artifact produced by the stage, if recorded.
    #[serde(default)]
    pub artifact: Option<String>,
}
