//! State shapes held by the [`super::StateStore`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::*;

// ============================================================
// UI state
// ============================================================

/// Sidebar tab.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TabId {
    #[default]
    Bolts,
    Specs,
    Overview,
}

/// Presentation state. The store keeps it but never derives anything from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiState {
    pub active_tab: TabId,
    pub expanded_intents: BTreeSet<String>,
    pub expanded_units: BTreeSet<String>,
    pub expanded_bolts: BTreeSet<String>,
    pub activity_filter: ActivityFilter,
    /// `"all"` or any raw status string.
    pub specs_filter: String,
    /// Activity section height in pixels.
    pub activity_section_height: u32,
    pub focus_card_expanded: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_tab: TabId::Bolts,
            expanded_intents: BTreeSet::new(),
            expanded_units: BTreeSet::new(),
            expanded_bolts: BTreeSet::new(),
            activity_filter: ActivityFilter::All,
            specs_filter: "all".to_string(),
            activity_section_height: 200,
            focus_card_expanded: false,
        }
    }
}

/// Partial UI update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUiStateInput {
    pub active_tab: Option<TabId>,
    pub expanded_intents: Option<BTreeSet<String>>,
    pub expanded_units: Option<BTreeSet<String>>,
    pub expanded_bolts: Option<BTreeSet<String>>,
    pub activity_filter: Option<ActivityFilter>,
    pub specs_filter: Option<String>,
    pub activity_section_height: Option<u32>,
    pub focus_card_expanded: Option<bool>,
}

impl UiState {
    pub(crate) fn apply(&mut self, input: UpdateUiStateInput) {
        if let Some(tab) = input.active_tab {
            self.active_tab = tab;
        }
        if let Some(expanded) = input.expanded_intents {
            self.expanded_intents = expanded;
        }
        if let Some(expanded) = input.expanded_units {
            self.expanded_units = expanded;
        }
        if let Some(expanded) = input.expanded_bolts {
            self.expanded_bolts = expanded;
        }
        if let Some(filter) = input.activity_filter {
            self.activity_filter = filter;
        }
        if let Some(filter) = input.specs_filter {
            self.specs_filter = filter;
        }
        if let Some(height) = input.activity_section_height {
            self.activity_section_height = height;
        }
        if let Some(expanded) = input.focus_card_expanded {
            self.focus_card_expanded = expanded;
        }
    }
}

// ============================================================
// Computed state
// ============================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressMetrics {
    pub total_intents: usize,
    pub total_units: usize,
    pub total_stories: usize,
    pub total_bolts: usize,
    pub completed_stories: usize,
    pub completed_bolts: usize,
    /// Story completion, rounded to a whole percent.
    pub overall_percent: u32,
}

/// Bolt counts per dashboard bucket. The four buckets partition the bolts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoltStats {
    pub active: usize,
    pub queued: usize,
    pub done: usize,
    pub blocked: usize,
}

impl BoltStats {
    pub fn total(&self) -> usize {
        self.active + self.queued + self.done + self.blocked
    }
}

/// Why the current intent was picked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentContext {
    /// It owns an in-progress bolt.
    Active,
    /// It owns the next bolt ready to start.
    Queued,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NextActionType {
    ContinueBolt,
    StartBolt,
    CompleteStage,
    UnblockBolt,
    ReviewStories,
    CreateBolt,
    Celebrate,
}

/// A suggested next step for the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NextAction {
    #[serde(rename = "type")]
    pub action_type: NextActionType,
    /// 1 is the most urgent.
    pub priority: u8,
    pub title: String,
    pub description: String,
    pub target_id: Option<String>,
    pub target_name: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Everything derived from the entity indices.
///
/// Replaced as a whole by [`super::StateStore::recompute`]; never edited in
/// place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComputedState {
    pub current_intent: Option<Intent>,
    pub current_intent_context: IntentContext,
    /// In-progress bolts, most recently started first.
    pub active_bolts: Vec<Bolt>,
    /// Not-started bolts in up-next order.
    pub pending_bolts: Vec<Bolt>,
    pub completed_bolts: Vec<Bolt>,
    pub activity_feed: Vec<ActivityEvent>,
    pub overall_progress: ProgressMetrics,
    pub bolt_stats: BoltStats,
    pub next_actions: Vec<NextAction>,
}

// ============================================================
// Root state
// ============================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub name: String,
    pub path: String,
    pub memory_bank_path: String,
    pub is_project: bool,
}

/// The single source of truth for the dashboard.
///
/// Entities are indexed by stable keys (see the `key()` methods on the
/// models); `BTreeMap` keeps iteration order deterministic. Intents also
/// remember the order they were declared in, since key order is not number
/// order for unpadded numbers (`"10-b"` sorts before `"9-a"`).
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BoardState {
    pub workspace: WorkspaceContext,
    pub intents: BTreeMap<String, Intent>,
    #[serde(skip)]
    intent_order: Vec<String>,
    pub units: BTreeMap<String, Unit>,
    pub stories: BTreeMap<String, Story>,
    pub bolts: BTreeMap<String, Bolt>,
    pub standards: BTreeMap<String, Standard>,
    pub computed: ComputedState,
    pub ui: UiState,
}

impl BoardState {
    /// Intents in declaration order.
    pub fn ordered_intents(&self) -> impl Iterator<Item = &Intent> {
        self.intent_order.iter().filter_map(|key| self.intents.get(key))
    }

    /// Replace the intent index, remembering the order of `intents`. A
    /// repeated key keeps its first position and its last value.
    pub(crate) fn replace_intents(&mut self, intents: Vec<Intent>) {
        let mut order: Vec<String> = Vec::with_capacity(intents.len());
        for key in intents.iter().map(Intent::key) {
            if !order.contains(&key) {
                order.push(key);
            }
        }
        self.intents = super::selectors::index_intents(intents);
        order.retain(|key| self.intents.contains_key(key));
        self.intent_order = order;
    }
}

/// Top-level state keys reported in change notifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StatePath {
    Workspace,
    Intents,
    Units,
    Stories,
    Bolts,
    Standards,
    Computed,
    Ui,
}

impl StatePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Intents => "intents",
            Self::Units => "units",
            Self::Stories => "stories",
            Self::Bolts => "bolts",
            Self::Standards => "standards",
            Self::Computed => "computed",
            Self::Ui => "ui",
        }
    }
}

/// Delivered to listeners after every mutating store call.
#[derive(Debug, Clone, Copy)]
pub struct StateChangeEvent<'a> {
    pub state: &'a BoardState,
    pub changed_paths: &'a [StatePath],
}

impl StateChangeEvent<'_> {
    pub fn changed(&self, path: StatePath) -> bool {
        self.changed_paths.contains(&path)
    }
}

/// Entity replacement for [`super::StateStore::set_entities`]. Each `Some`
/// collection replaces its index wholesale.
#[derive(Debug, Clone, Default)]
pub struct SetEntitiesInput {
    pub intents: Option<Vec<Intent>>,
    pub units: Option<Vec<Unit>>,
    pub stories: Option<Vec<Story>>,
    pub bolts: Option<Vec<Bolt>>,
    pub standards: Option<Vec<Standard>>,
}
