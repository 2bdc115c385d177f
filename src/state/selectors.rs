//! Pure selectors computing the `computed` state from entity collections.

use std::collections::{BTreeMap, HashMap};

use serde_json::json;

use super::types::*;
use crate::engine::activity::{build_activity_feed, filter_activity_events};
use crate::engine::dependencies::{compute_bolt_dependencies, get_up_next_bolts};
use crate::models::*;

// ============================================================
// Current intent selection
// ============================================================

/// Picks the intent the dashboard should focus on.
pub type IntentSelectionStrategy =
    for<'a, 'b> fn(&'a [Intent], &'b [Bolt]) -> Option<&'a Intent>;

/// Picks and orders the bolts shown as active.
pub type BoltSelectionStrategy = fn(&[Bolt]) -> Vec<Bolt>;

fn owning_intent<'a>(intents: &'a [Intent], bolt: &Bolt) -> Option<&'a Intent> {
    intents.iter().find(|intent| intent.matches(&bolt.intent))
}

/// Intent of the most recently started in-progress bolt.
pub fn select_intent_by_active_bolt<'a>(
    intents: &'a [Intent],
    bolts: &[Bolt],
) -> Option<&'a Intent> {
    select_active_bolts_default(bolts)
        .iter()
        .find_map(|bolt| owning_intent(intents, bolt))
}

/// Intent of the first unblocked bolt in up-next order.
pub fn select_intent_by_queued_bolt<'a>(
    intents: &'a [Intent],
    bolts: &[Bolt],
) -> Option<&'a Intent> {
    get_up_next_bolts(bolts)
        .iter()
        .filter(|bolt| bolt.status == ArtifactStatus::Draft && !bolt.is_blocked)
        .find_map(|bolt| owning_intent(intents, bolt))
}

/// Where work is happening now, else where it should start next.
///
/// Returns `None` when nothing is in progress or ready. There is no
/// "first intent" fallback: no signal means no current focus.
pub fn select_current_intent_default<'a>(
    intents: &'a [Intent],
    bolts: &[Bolt],
) -> Option<&'a Intent> {
    select_intent_by_active_bolt(intents, bolts)
        .or_else(|| select_intent_by_queued_bolt(intents, bolts))
}

/// Intent owning the most non-complete bolts. Ties go to the earlier intent.
pub fn select_current_intent_by_pending_bolts<'a>(
    intents: &'a [Intent],
    bolts: &[Bolt],
) -> Option<&'a Intent> {
    let mut best: Option<(&Intent, usize)> = None;

    for intent in intents {
        let count = bolts
            .iter()
            .filter(|b| !b.status.is_complete() && intent.matches(&b.intent))
            .count();

        if best.map_or(true, |(_, max)| count > max) {
            best = Some((intent, count));
        }
    }

    best.map(|(intent, _)| intent)
}

/// How `intent` relates to the current work.
pub fn intent_context(intent: Option<&Intent>, bolts: &[Bolt]) -> IntentContext {
    let Some(intent) = intent else {
        return IntentContext::None;
    };

    let owned: Vec<&Bolt> = bolts.iter().filter(|b| intent.matches(&b.intent)).collect();

    if owned.iter().any(|b| b.status == ArtifactStatus::InProgress) {
        IntentContext::Active
    } else if owned
        .iter()
        .any(|b| b.status == ArtifactStatus::Draft && !b.is_blocked)
    {
        IntentContext::Queued
    } else {
        IntentContext::None
    }
}

// ============================================================
// Bolt categorization
// ============================================================

/// In-progress bolts, most recently started first.
pub fn select_active_bolts_default(bolts: &[Bolt]) -> Vec<Bolt> {
    let mut active: Vec<Bolt> = bolts
        .iter()
        .filter(|b| b.status == ArtifactStatus::InProgress)
        .cloned()
        .collect();
    active.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    active
}

/// Not-started bolts in up-next order.
pub fn select_pending_bolts(bolts: &[Bolt]) -> Vec<Bolt> {
    get_up_next_bolts(bolts)
}

pub fn select_completed_bolts(bolts: &[Bolt]) -> Vec<Bolt> {
    bolts
        .iter()
        .filter(|b| b.status.is_complete())
        .cloned()
        .collect()
}

/// Count bolts per bucket.
///
/// A bolt with an incomplete prerequisite counts as blocked whatever its own
/// status says. Everything else is bucketed by status; `Unknown` counts as
/// queued since it has not visibly started.
pub fn select_bolt_stats(bolts: &[Bolt]) -> BoltStats {
    let mut stats = BoltStats::default();

    for bolt in bolts {
        if bolt.is_blocked {
            stats.blocked += 1;
            continue;
        }

        match bolt.status {
            ArtifactStatus::InProgress => stats.active += 1,
            ArtifactStatus::Draft | ArtifactStatus::Unknown => stats.queued += 1,
            ArtifactStatus::Complete => stats.done += 1,
            ArtifactStatus::Blocked => stats.blocked += 1,
        }
    }

    stats
}

// ============================================================
// Next actions
// ============================================================

/// Suggested next steps, most urgent first.
pub fn select_next_actions(bolts: &[Bolt], intents: &[Intent]) -> Vec<NextAction> {
    let mut actions = Vec::new();

    let active_bolt = bolts.iter().find(|b| b.status == ArtifactStatus::InProgress);
    if let Some(bolt) = active_bolt {
        let stage = bolt.current_stage.as_deref();
        let remaining = bolt
            .stages
            .iter()
            .filter(|s| !s.status.is_complete())
            .count();

        actions.push(NextAction {
            action_type: NextActionType::ContinueBolt,
            priority: 1,
            title: "Continue Current Bolt".to_string(),
            description: format!(
                "Continue working on {} - currently in {} stage",
                bolt.id,
                stage.unwrap_or("unknown")
            ),
            target_id: Some(bolt.id.clone()),
            target_name: Some(bolt.id.clone()),
            metadata: json!({ "current_stage": stage, "stages_remaining": remaining }),
        });

        if let Some(stage) = stage {
            actions.push(NextAction {
                action_type: NextActionType::CompleteStage,
                priority: 2,
                title: format!("Complete {} Stage", stage),
                description: format!("Finish the {} stage to progress the bolt", stage),
                target_id: Some(bolt.id.clone()),
                target_name: Some(bolt.id.clone()),
                metadata: json!({ "stage": stage }),
            });
        }
    }

    let up_next = get_up_next_bolts(bolts);

    if active_bolt.is_none() {
        if let Some(next) = up_next.iter().find(|b| !b.is_blocked) {
            let detail = if next.unblocks_count > 0 {
                format!("enables {} other bolt(s)", next.unblocks_count)
            } else {
                "ready to begin".to_string()
            };

            actions.push(NextAction {
                action_type: NextActionType::StartBolt,
                priority: 1,
                title: "Start Next Bolt".to_string(),
                description: format!("Start {} - {}", next.id, detail),
                target_id: Some(next.id.clone()),
                target_name: Some(next.id.clone()),
                metadata: json!({ "unblocks_count": next.unblocks_count }),
            });
        }
    }

    if let Some((blocker, waiting)) = best_unblocker(bolts, &up_next) {
        if waiting > 1 {
            actions.push(NextAction {
                action_type: NextActionType::UnblockBolt,
                priority: 3,
                title: "Unblock Multiple Bolts".to_string(),
                description: format!(
                    "Complete {} to unblock {} waiting bolt(s)",
                    blocker.id, waiting
                ),
                target_id: Some(blocker.id.clone()),
                target_name: Some(blocker.id.clone()),
                metadata: json!({ "unblocks_count": waiting }),
            });
        }
    }

    for intent in intents {
        if intent.status.is_complete() {
            continue;
        }

        let has_open_bolts = bolts.iter().any(|b| {
            intent.matches(&b.intent)
                && matches!(b.status, ArtifactStatus::Draft | ArtifactStatus::InProgress)
        });
        if has_open_bolts {
            continue;
        }

        let pending_stories = intent.stories().filter(|s| !s.status.is_complete()).count();
        if pending_stories > 0 {
            actions.push(NextAction {
                action_type: NextActionType::CreateBolt,
                priority: 4,
                title: "Create Bolt for Pending Work".to_string(),
                description: format!(
                    "{} has {} pending stories without assigned bolts",
                    intent.name, pending_stories
                ),
                target_id: Some(intent.number.clone()),
                target_name: Some(intent.name.clone()),
                metadata: json!({ "pending_stories": pending_stories }),
            });
        }
    }

    let all_bolts_done = !bolts.is_empty() && bolts.iter().all(|b| b.status.is_complete());
    let all_intents_done = !intents.is_empty() && intents.iter().all(|i| i.status.is_complete());
    if all_bolts_done && all_intents_done {
        actions.push(NextAction {
            action_type: NextActionType::Celebrate,
            priority: 1,
            title: "All Work Complete!".to_string(),
            description: "Congratulations! All bolts and intents are complete.".to_string(),
            target_id: None,
            target_name: None,
            metadata: json!({ "total_bolts": bolts.len(), "total_intents": intents.len() }),
        });
    }

    actions.sort_by_key(|a| a.priority);
    actions
}

/// The incomplete blocker named by the most blocked up-next bolts.
fn best_unblocker<'a>(bolts: &'a [Bolt], up_next: &[Bolt]) -> Option<(&'a Bolt, usize)> {
    let blocked: Vec<&Bolt> = up_next.iter().filter(|b| b.is_blocked).collect();

    let mut waiting: BTreeMap<&str, usize> = BTreeMap::new();
    for bolt in &blocked {
        for blocker in &bolt.blocked_by {
            *waiting.entry(blocker.as_str()).or_default() += 1;
        }
    }

    let by_id: HashMap<&str, &Bolt> = bolts.iter().map(|b| (b.id.as_str(), b)).collect();

    let mut best: Option<(&'a Bolt, usize)> = None;
    for (id, count) in waiting {
        let Some(blocker) = by_id.get(id).copied() else {
            continue;
        };
        if blocker.status.is_complete() {
            continue;
        }
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((blocker, count));
        }
    }
    best
}

pub fn select_top_next_action(bolts: &[Bolt], intents: &[Intent]) -> Option<NextAction> {
    select_next_actions(bolts, intents).into_iter().next()
}

// ============================================================
// Activity feed
// ============================================================

pub fn select_activity_feed(bolts: &[Bolt], filter: ActivityFilter) -> Vec<ActivityEvent> {
    let events = build_activity_feed(bolts);
    match filter {
        ActivityFilter::All => events,
        _ => filter_activity_events(&events, filter),
    }
}

// ============================================================
// Progress metrics
// ============================================================

pub fn select_progress_metrics(
    intents: &[Intent],
    units: &[Unit],
    stories: &[Story],
    bolts: &[Bolt],
) -> ProgressMetrics {
    let total_stories = stories.len();
    let completed_stories = stories.iter().filter(|s| s.status.is_complete()).count();
    let completed_bolts = bolts.iter().filter(|b| b.status.is_complete()).count();

    let overall_percent = if total_stories > 0 {
        (completed_stories as f64 / total_stories as f64 * 100.0).round() as u32
    } else {
        0
    };

    ProgressMetrics {
        total_intents: intents.len(),
        total_units: units.len(),
        total_stories,
        total_bolts: bolts.len(),
        completed_stories,
        completed_bolts,
        overall_percent,
    }
}

// ============================================================
// Specs tree filtering
// ============================================================

/// Specs tree status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentFilter {
    All,
    Active,
    Complete,
    Pending,
}

impl IntentFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "complete" => Some(Self::Complete),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

pub fn select_filtered_intents(intents: &[Intent], filter: IntentFilter) -> Vec<Intent> {
    intents
        .iter()
        .filter(|intent| match filter {
            IntentFilter::All => true,
            IntentFilter::Active => intent.status == ArtifactStatus::InProgress,
            IntentFilter::Complete => intent.status.is_complete(),
            IntentFilter::Pending => {
                matches!(intent.status, ArtifactStatus::Draft | ArtifactStatus::Unknown)
            }
        })
        .cloned()
        .collect()
}

// ============================================================
// Main computation
// ============================================================

/// Strategies used by [`compute_state`].
#[derive(Clone, Copy)]
pub struct ComputeConfig {
    pub intent_selector: IntentSelectionStrategy,
    pub bolt_selector: BoltSelectionStrategy,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            intent_selector: select_current_intent_default,
            bolt_selector: select_active_bolts_default,
        }
    }
}

/// Derive the full computed state from raw entities.
///
/// Bolt dependencies are resolved first, so callers may pass bolts with
/// stale or default derived fields.
pub fn compute_state(
    intents: &[Intent],
    units: &[Unit],
    stories: &[Story],
    bolts: &[Bolt],
    config: &ComputeConfig,
) -> ComputedState {
    let bolts = compute_bolt_dependencies(bolts);

    let current_intent = (config.intent_selector)(intents, &bolts);
    let current_intent_context = intent_context(current_intent, &bolts);

    ComputedState {
        current_intent: current_intent.cloned(),
        current_intent_context,
        active_bolts: (config.bolt_selector)(&bolts),
        pending_bolts: select_pending_bolts(&bolts),
        completed_bolts: select_completed_bolts(&bolts),
        activity_feed: select_activity_feed(&bolts, ActivityFilter::All),
        overall_progress: select_progress_metrics(intents, units, stories, &bolts),
        bolt_stats: select_bolt_stats(&bolts),
        next_actions: select_next_actions(&bolts, intents),
    }
}

// ============================================================
// Indexing
// ============================================================

/// Index entities by `key`. Entities with an empty key are skipped; later
/// duplicates replace earlier ones.
pub fn index_by<T, F>(entities: impl IntoIterator<Item = T>, key: F) -> BTreeMap<String, T>
where
    F: Fn(&T) -> String,
{
    entities
        .into_iter()
        .filter_map(|entity| {
            let k = key(&entity);
            (!k.is_empty()).then_some((k, entity))
        })
        .collect()
}

pub fn index_intents(intents: Vec<Intent>) -> BTreeMap<String, Intent> {
    index_by(intents, Intent::key)
}

pub fn index_units(units: Vec<Unit>) -> BTreeMap<String, Unit> {
    index_by(units, Unit::key)
}

pub fn index_stories(stories: Vec<Story>) -> BTreeMap<String, Story> {
    index_by(stories, Story::key)
}

pub fn index_bolts(bolts: Vec<Bolt>) -> BTreeMap<String, Bolt> {
    index_by(bolts, |b| b.id.clone())
}

pub fn index_standards(standards: Vec<Standard>) -> BTreeMap<String, Standard> {
    index_by(standards, |s| s.name.clone())
}
