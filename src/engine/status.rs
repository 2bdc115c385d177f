//! Status roll-up from children to parents.

use crate::models::ArtifactStatus;

/// Reduce child statuses to a single parent status.
///
/// Rules, first match wins:
/// 1. no children → `Unknown`
/// 2. any child `InProgress` → `InProgress`
/// 3. every child `Complete` → `Complete`
/// 4. every child `Draft` or `Unknown` → `Draft`
/// 5. anything else (e.g. some done, some not started) → `InProgress`
pub fn aggregate_status<I>(statuses: I) -> ArtifactStatus
where
    I: IntoIterator<Item = ArtifactStatus>,
{
    let statuses: Vec<ArtifactStatus> = statuses.into_iter().collect();

    if statuses.is_empty() {
        return ArtifactStatus::Unknown;
    }

    if statuses.contains(&ArtifactStatus::InProgress) {
        return ArtifactStatus::InProgress;
    }

    if statuses.iter().all(|s| *s == ArtifactStatus::Complete) {
        return ArtifactStatus::Complete;
    }

    if statuses
        .iter()
        .all(|s| matches!(s, ArtifactStatus::Draft | ArtifactStatus::Unknown))
    {
        return ArtifactStatus::Draft;
    }

    ArtifactStatus::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;
    use ArtifactStatus::*;

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(aggregate_status([]), Unknown);
    }

    #[test]
    fn test_all_complete() {
        assert_eq!(aggregate_status([Complete, Complete]), Complete);
    }

    #[test]
    fn test_mixed_complete_and_draft_is_in_progress() {
        assert_eq!(aggregate_status([Complete, Draft]), InProgress);
    }

    #[test]
    fn test_draft_and_unknown_is_draft() {
        assert_eq!(aggregate_status([Draft, Unknown]), Draft);
        assert_eq!(aggregate_status([Unknown]), Draft);
    }

    #[test]
    fn test_in_progress_dominates() {
        assert_eq!(aggregate_status([Complete, InProgress, Draft]), InProgress);
    }

    #[test]
    fn test_blocked_child_counts_as_started_work() {
        assert_eq!(aggregate_status([Blocked, Draft]), InProgress);
        assert_eq!(aggregate_status([Complete, Blocked]), InProgress);
    }
}
