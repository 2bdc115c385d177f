//! Activity feed reconstructed from bolt lifecycle timestamps.

use chrono::{DateTime, Utc};

use super::bolt_types::stage_matches;
use crate::models::{ActivityEvent, ActivityEventType, ActivityFilter, Bolt};

/// Build the activity feed for a bolt collection, most recent first.
///
/// Each bolt contributes one event per lifecycle timestamp it carries and one
/// `stage-complete` event per completed stage whose stage record has a
/// completion time. Events sharing a timestamp are ordered
/// complete > stage-complete > start > created, then by id.
pub fn build_activity_feed(bolts: &[Bolt]) -> Vec<ActivityEvent> {
    let mut events = Vec::new();

    for bolt in bolts {
        if let Some(created_at) = bolt.created_at {
            events.push(event(
                bolt,
                ActivityEventType::BoltCreated,
                format!("{}-created", bolt.id),
                "Created bolt".to_string(),
                created_at,
            ));
        }

        if let Some(started_at) = bolt.started_at {
            events.push(event(
                bolt,
                ActivityEventType::BoltStart,
                format!("{}-started", bolt.id),
                "Started bolt".to_string(),
                started_at,
            ));
        }

        for completed in &bolt.stages_completed {
            let finished_at = bolt
                .stages
                .iter()
                .find(|stage| stage_matches(&stage.name, completed))
                .and_then(|stage| stage.completed_at);

            if let Some(finished_at) = finished_at {
                events.push(event(
                    bolt,
                    ActivityEventType::StageComplete,
                    format!("{}-stage-{}", bolt.id, completed),
                    format!("Completed {} stage", completed),
                    finished_at,
                ));
            }
        }

        if let Some(completed_at) = bolt.completed_at {
            events.push(event(
                bolt,
                ActivityEventType::BoltComplete,
                format!("{}-completed", bolt.id),
                "Completed bolt".to_string(),
                completed_at,
            ));
        }
    }

    events.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.event_type.rank().cmp(&b.event_type.rank()))
            .then_with(|| a.id.cmp(&b.id))
    });
    events
}

fn event(
    bolt: &Bolt,
    event_type: ActivityEventType,
    id: String,
    text: String,
    timestamp: DateTime<Utc>,
) -> ActivityEvent {
    ActivityEvent {
        id,
        event_type,
        text,
        target: bolt.id.clone(),
        target_id: bolt.id.clone(),
        tag: event_type.tag(),
        timestamp,
    }
}

/// Keep only the events the filter accepts.
pub fn filter_activity_events(
    events: &[ActivityEvent],
    filter: ActivityFilter,
) -> Vec<ActivityEvent> {
    events
        .iter()
        .filter(|e| filter.accepts(e.tag))
        .cloned()
        .collect()
}

/// First `limit` events.
pub fn limit_activity_events(events: &[ActivityEvent], limit: usize) -> Vec<ActivityEvent> {
    events.iter().take(limit).cloned().collect()
}

/// Coarse "how long ago" label for `timestamp` as seen from `now`.
///
/// Timestamps in the future read as `"just now"`. Anything a week or older
/// is shown as an absolute date.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);

    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = elapsed.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    timestamp.format("%b %-d, %Y").to_string()
}
