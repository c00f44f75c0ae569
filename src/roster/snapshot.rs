use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roster::Roster;

/// Last-known roster, persisted between runs so the diff guard can decide
/// whether anything needs regenerating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub year: i32,
    pub fetched_at: DateTime<Utc>,
    pub schools: Roster,
}

impl RosterSnapshot {
    pub fn new(year: i32, schools: &Roster) -> Self {
        Self {
            year,
            fetched_at: Utc::now(),
            schools: schools.clone(),
        }
    }

    /// Load the persisted snapshot, or `None` on a first run.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading roster snapshot: {}", path.display()))?;
        let snapshot: Self = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing roster snapshot: {}", path.display()))?;
        Ok(Some(snapshot))
    }

    /// Overwrite the snapshot on disk, creating the data directory if needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating snapshot directory: {}", parent.display())
            })?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("failed writing roster snapshot: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::RosterSnapshot;
    use crate::roster::Roster;

    fn roster(pairs: &[(&str, &str)]) -> Roster {
        pairs
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("hemac_schools.json");

        let snapshot = RosterSnapshot::new(2023, &roster(&[("1001", "Example College")]));
        snapshot.write(&path).unwrap();

        let loaded = RosterSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded.year, 2023);
        assert_eq!(loaded.schools, snapshot.schools);
    }

    #[test]
    fn load_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(RosterSnapshot::load(&path).unwrap().is_none());
    }

    #[test]
    fn write_overwrites_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hemac_schools.json");

        RosterSnapshot::new(2022, &roster(&[("1001", "Example College")]))
            .write(&path)
            .unwrap();
        RosterSnapshot::new(2023, &roster(&[("2002", "Sample University")]))
            .write(&path)
            .unwrap();

        let loaded = RosterSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded.year, 2023);
        assert!(loaded.schools.contains_key("2002"));
        assert!(!loaded.schools.contains_key("1001"));
    }
}
