//! Render-ready view of the store for the dashboard webview.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::*;
use crate::engine::activity::{filter_activity_events, format_relative_time};
use crate::models::*;

/// Flattened dashboard state, ready to serialize to the rendering layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebviewSnapshot {
    pub is_project: bool,
    pub workspace_name: String,
    pub current_intent: Option<IntentSummary>,
    pub current_intent_context: IntentContext,
    pub stats: BoltStats,
    pub progress: ProgressMetrics,
    pub active_bolts: Vec<ActiveBoltView>,
    pub up_next_queue: Vec<QueuedBoltView>,
    pub completed_bolts: Vec<CompletedBoltView>,
    pub activity_events: Vec<ActivityEventView>,
    pub intents: Vec<IntentView>,
    pub standards: Vec<Standard>,
    pub next_actions: Vec<NextAction>,
    pub ui: UiState,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IntentSummary {
    pub number: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StageView {
    pub name: String,
    pub status: ArtifactStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BoltStoryView {
    pub id: String,
    pub title: String,
    pub status: ArtifactStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActiveBoltView {
    pub id: String,
    /// Human readable bolt type, e.g. `"DDD Construction"`.
    #[serde(rename = "type")]
    pub bolt_type: String,
    pub current_stage: Option<String>,
    pub stages_complete: usize,
    pub stages_total: usize,
    pub stories_complete: usize,
    pub stories_total: usize,
    pub stages: Vec<StageView>,
    pub stories: Vec<BoltStoryView>,
    pub started: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueuedBoltView {
    pub id: String,
    #[serde(rename = "type")]
    pub bolt_type: String,
    pub stories_count: usize,
    pub is_blocked: bool,
    pub blocked_by: Vec<String>,
    pub unblocks_count: usize,
    pub stages: Vec<StageView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompletedBoltView {
    pub id: String,
    #[serde(rename = "type")]
    pub bolt_type: String,
    pub completed: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivityEventView {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: ActivityEventType,
    pub text: String,
    pub target: String,
    pub tag: ActivityTag,
    pub relative_time: String,
    pub exact_time: String,
    /// Folder of the bolt the event concerns, if still known.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IntentView {
    pub number: String,
    pub name: String,
    pub path: String,
    pub status: ArtifactStatus,
    pub stories_complete: usize,
    pub stories_total: usize,
    pub units: Vec<UnitView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnitView {
    pub name: String,
    pub path: String,
    pub status: ArtifactStatus,
    pub stories_complete: usize,
    pub stories_total: usize,
    pub stories: Vec<Story>,
}

/// Limits applied while building a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotLimits {
    pub up_next: usize,
    pub activity: usize,
    pub next_actions: usize,
}

impl Default for SnapshotLimits {
    fn default() -> Self {
        Self {
            up_next: 5,
            activity: 10,
            next_actions: 5,
        }
    }
}

/// Build the snapshot for `state` as seen at `now`.
pub fn build_webview_snapshot(
    state: &BoardState,
    limits: SnapshotLimits,
    now: DateTime<Utc>,
) -> WebviewSnapshot {
    let ui = state.ui.clone();

    if !state.workspace.is_project {
        return WebviewSnapshot {
            is_project: false,
            workspace_name: state.workspace.name.clone(),
            current_intent: None,
            current_intent_context: IntentContext::None,
            stats: BoltStats::default(),
            progress: ProgressMetrics::default(),
            active_bolts: Vec::new(),
            up_next_queue: Vec::new(),
            completed_bolts: Vec::new(),
            activity_events: Vec::new(),
            intents: Vec::new(),
            standards: Vec::new(),
            next_actions: Vec::new(),
            ui,
        };
    }

    let computed = &state.computed;

    let activity_events = filter_activity_events(&computed.activity_feed, ui.activity_filter)
        .into_iter()
        .take(limits.activity)
        .map(|event| activity_view(state, event, now))
        .collect();

    WebviewSnapshot {
        is_project: true,
        workspace_name: state.workspace.name.clone(),
        current_intent: computed.current_intent.as_ref().map(|intent| IntentSummary {
            number: intent.number.clone(),
            name: intent.name.clone(),
        }),
        current_intent_context: computed.current_intent_context,
        stats: computed.bolt_stats,
        progress: computed.overall_progress,
        active_bolts: computed
            .active_bolts
            .iter()
            .map(|bolt| active_bolt_view(state, bolt, now))
            .collect(),
        up_next_queue: computed
            .pending_bolts
            .iter()
            .take(limits.up_next)
            .map(queued_bolt_view)
            .collect(),
        completed_bolts: computed
            .completed_bolts
            .iter()
            .map(|bolt| CompletedBoltView {
                id: bolt.id.clone(),
                bolt_type: format_bolt_type(&bolt.bolt_type),
                completed: bolt.completed_at.map(|at| format_relative_time(at, now)),
            })
            .collect(),
        activity_events,
        intents: state.ordered_intents().map(intent_view).collect(),
        standards: state.standards.values().cloned().collect(),
        next_actions: computed
            .next_actions
            .iter()
            .take(limits.next_actions)
            .cloned()
            .collect(),
        ui,
    }
}

/// `"ddd-construction-bolt"` → `"DDD Construction"`.
pub fn format_bolt_type(bolt_type: &str) -> String {
    bolt_type
        .trim_end_matches("-bolt")
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| match word {
            "ddd" | "adr" | "tdd" => word.to_uppercase(),
            _ => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn stage_views(bolt: &Bolt) -> Vec<StageView> {
    bolt.stages
        .iter()
        .map(|stage| StageView {
            name: stage.name.clone(),
            status: stage.status,
        })
        .collect()
}

fn active_bolt_view(state: &BoardState, bolt: &Bolt, now: DateTime<Utc>) -> ActiveBoltView {
    let stories: Vec<BoltStoryView> = bolt
        .stories
        .iter()
        .map(|id| {
            let story = state
                .stories
                .values()
                .find(|s| s.id == *id && s.unit_name == bolt.unit);
            BoltStoryView {
                id: id.clone(),
                title: story.map_or_else(|| id.clone(), |s| s.title.clone()),
                status: story.map_or(ArtifactStatus::Unknown, |s| s.status),
            }
        })
        .collect();

    ActiveBoltView {
        id: bolt.id.clone(),
        bolt_type: format_bolt_type(&bolt.bolt_type),
        current_stage: bolt.current_stage.clone(),
        stages_complete: bolt.stages_complete(),
        stages_total: bolt.stages.len(),
        stories_complete: stories.iter().filter(|s| s.status.is_complete()).count(),
        stories_total: stories.len(),
        stages: stage_views(bolt),
        stories,
        started: bolt.started_at.map(|at| format_relative_time(at, now)),
    }
}

fn queued_bolt_view(bolt: &Bolt) -> QueuedBoltView {
    QueuedBoltView {
        id: bolt.id.clone(),
        bolt_type: format_bolt_type(&bolt.bolt_type),
        stories_count: bolt.stories.len(),
        is_blocked: bolt.is_blocked,
        blocked_by: bolt.blocked_by.clone(),
        unblocks_count: bolt.unblocks_count,
        stages: stage_views(bolt),
    }
}

fn activity_view(
    state: &BoardState,
    event: ActivityEvent,
    now: DateTime<Utc>,
) -> ActivityEventView {
    ActivityEventView {
        path: state.bolts.get(&event.target_id).map(|b| b.path.clone()),
        relative_time: format_relative_time(event.timestamp, now),
        exact_time: event.timestamp.format("%a, %b %-d, %Y %H:%M:%S UTC").to_string(),
        id: event.id,
        event_type: event.event_type,
        text: event.text,
        target: event.target,
        tag: event.tag,
    }
}

fn intent_view(intent: &Intent) -> IntentView {
    let units: Vec<UnitView> = intent
        .units
        .iter()
        .map(|unit| UnitView {
            name: unit.name.clone(),
            path: unit.path.clone(),
            status: unit.status,
            stories_complete: unit.stories.iter().filter(|s| s.status.is_complete()).count(),
            stories_total: unit.stories.len(),
            stories: unit.stories.clone(),
        })
        .collect();

    IntentView {
        number: intent.number.clone(),
        name: intent.name.clone(),
        path: intent.path.clone(),
        status: intent.status,
        stories_complete: units.iter().map(|u| u.stories_complete).sum(),
        stories_total: units.iter().map(|u| u.stories_total).sum(),
        units,
    }
}
