pub mod diff;
pub mod fetch;
pub mod snapshot;

use std::collections::BTreeMap;

pub use diff::{diff_rosters, RosterDiff};
pub use fetch::fetch_roster;
pub use snapshot::RosterSnapshot;

/// Partner-school roster: institution id mapped to its display name.
///
/// Ids are the stable external identifiers from the partner sheet; display
/// names are the sheet's custom names, which may differ from the names the
/// statistics provider reports.
pub type Roster = BTreeMap<String, String>;
