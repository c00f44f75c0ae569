use std::collections::BTreeSet;

use crate::roster::Roster;

/// Outcome of comparing a freshly fetched roster against the persisted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterDiff {
    Unchanged,
    Changed,
}

/// Compare rosters by institution-id set only.
///
/// Display-name edits and ordering differences do not count as a change;
/// a missing prior snapshot always reports `Changed` (first run).
pub fn diff_rosters(previous: Option<&Roster>, fresh: &Roster) -> RosterDiff {
    let Some(previous) = previous else {
        return RosterDiff::Changed;
    };
    let old_ids: BTreeSet<&str> = previous.keys().map(String::as_str).collect();
    let new_ids: BTreeSet<&str> = fresh.keys().map(String::as_str).collect();
    if old_ids == new_ids {
        RosterDiff::Unchanged
    } else {
        RosterDiff::Changed
    }
}
