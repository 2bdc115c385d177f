use serde::{Deserialize, Serialize};

/// Normalized status shared by every tracked artifact.
///
/// Raw frontmatter uses many spellings for the same state (`wip`, `done`,
/// `todo`, ...). [`ArtifactStatus::normalize`] folds them into this set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactStatus {
    Draft,
    InProgress,
    Complete,
    Blocked,
    #[default]
    Unknown,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
            Self::Blocked => "blocked",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "in-progress" => Some(Self::InProgress),
            "complete" => Some(Self::Complete),
            "blocked" => Some(Self::Blocked),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Fold a raw, user-written status string into a known status.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Missing or unrecognized values become `Unknown`.
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };

        match raw.trim().to_lowercase().as_str() {
            "draft" | "pending" | "planned" | "todo" | "new" => Self::Draft,
            "in-progress" | "in_progress" | "inprogress" | "in progress" | "active"
            | "started" | "wip" | "working" => Self::InProgress,
            "complete" | "completed" | "done" | "finished" | "closed" | "resolved" => {
                Self::Complete
            }
            "blocked" | "on-hold" | "on_hold" | "waiting" => Self::Blocked,
            _ => Self::Unknown,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
