//! Bolt dependency resolution.
//!
//! Bolts declare prerequisites through `requires_bolts`. From those edges and
//! the status of each referenced bolt this module derives:
//!
//! - `blocked_by`: prerequisites that are not complete yet
//! - `is_blocked`: whether `blocked_by` is non-empty
//! - `unblocks_count`: how many incomplete bolts are waiting on this one
//!
//! A reference to an id that is not in the collection stays blocking, so a
//! mistyped id shows up as a permanently blocked bolt instead of silently
//! letting work start early. Self references are ignored.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::{ArtifactStatus, Bolt};

/// Annotate every bolt with its blocking facts.
///
/// The result has the same order as the input. Any previously set derived
/// fields are overwritten.
pub fn compute_bolt_dependencies(bolts: &[Bolt]) -> Vec<Bolt> {
    let statuses: HashMap<&str, ArtifactStatus> =
        bolts.iter().map(|b| (b.id.as_str(), b.status)).collect();

    let mut waiting: HashMap<&str, usize> = HashMap::new();
    for bolt in bolts.iter().filter(|b| !b.status.is_complete()) {
        for required in distinct_requirements(bolt) {
            *waiting.entry(required).or_default() += 1;
        }
    }

    bolts
        .iter()
        .map(|bolt| {
            let blocked_by: Vec<String> = distinct_requirements(bolt)
                .filter(|id| !is_resolved(&statuses, id))
                .map(str::to_string)
                .collect();

            let unblocks_count = if bolt.status.is_complete() {
                0
            } else {
                waiting.get(bolt.id.as_str()).copied().unwrap_or(0)
            };

            Bolt {
                is_blocked: !blocked_by.is_empty(),
                blocked_by,
                unblocks_count,
                ..bolt.clone()
            }
        })
        .collect()
}

/// Bolts that have not started yet, best candidates first.
///
/// Keeps `Draft` and `Blocked` bolts and orders them: unblocked before
/// blocked, then by `unblocks_count` descending, then by id.
pub fn get_up_next_bolts(bolts: &[Bolt]) -> Vec<Bolt> {
    let mut pending: Vec<Bolt> = bolts.iter().filter(|b| b.is_pending()).cloned().collect();
    pending.sort_by(compare_up_next);
    pending
}

fn compare_up_next(a: &Bolt, b: &Bolt) -> Ordering {
    a.is_blocked
        .cmp(&b.is_blocked)
        .then_with(|| b.unblocks_count.cmp(&a.unblocks_count))
        .then_with(|| a.id.cmp(&b.id))
}

/// Whether `bolt` has an incomplete prerequisite in `all`.
pub fn is_bolt_blocked(bolt: &Bolt, all: &[Bolt]) -> bool {
    !get_blocking_bolts(bolt, all).is_empty()
}

/// Ids of `bolt`'s prerequisites that are not complete in `all`.
pub fn get_blocking_bolts(bolt: &Bolt, all: &[Bolt]) -> Vec<String> {
    let statuses: HashMap<&str, ArtifactStatus> =
        all.iter().map(|b| (b.id.as_str(), b.status)).collect();

    distinct_requirements(bolt)
        .filter(|id| !is_resolved(&statuses, id))
        .map(str::to_string)
        .collect()
}

/// Number of other incomplete bolts in `all` that require `bolt`.
pub fn count_unblocks(bolt: &Bolt, all: &[Bolt]) -> usize {
    if bolt.status.is_complete() {
        return 0;
    }

    all.iter()
        .filter(|other| other.id != bolt.id && !other.status.is_complete())
        .filter(|other| other.requires_bolts.iter().any(|id| *id == bolt.id))
        .count()
}

/// `requires_bolts` without self references or repeats, in declaration order.
fn distinct_requirements(bolt: &Bolt) -> impl Iterator<Item = &str> {
    let mut seen = HashSet::new();
    bolt.requires_bolts
        .iter()
        .map(String::as_str)
        .filter(move |id| *id != bolt.id && seen.insert(*id))
}

fn is_resolved(statuses: &HashMap<&str, ArtifactStatus>, id: &str) -> bool {
    statuses.get(id).is_some_and(ArtifactStatus::is_complete)
}
