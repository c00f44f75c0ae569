use std::collections::BTreeSet;

use crate::dataset::records::SubjectRow;
use crate::roster::Roster;

/// Keep only rows whose institution is on the partner roster.
pub fn restrict_to_roster<R: SubjectRow>(mut rows: Vec<R>, roster: &Roster) -> Vec<R> {
    rows.retain(|row| roster.contains_key(row.institution_id()));
    rows
}

/// Keep only rows from institutions present in the most recent year.
///
/// Computes the maximal year in the set, collects the institution ids with a
/// row in that year, and restricts all years to that id set. Institutions
/// that existed earlier but dropped out of the latest year are removed
/// entirely, so the surviving series are continuous through the latest year.
/// Applying the filter twice yields the same rows.
pub fn restrict_to_latest_cohort<R: SubjectRow>(mut rows: Vec<R>) -> Vec<R> {
    let Some(latest) = rows.iter().map(SubjectRow::year).max() else {
        return rows;
    };
    let cohort: BTreeSet<String> = rows
        .iter()
        .filter(|row| row.year() == latest)
        .map(|row| row.institution_id().to_string())
        .collect();
    rows.retain(|row| cohort.contains(row.institution_id()));
    rows
}

/// Keep only rows from a single reporting year.
pub fn restrict_to_year<R: SubjectRow>(mut rows: Vec<R>, year: i32) -> Vec<R> {
    rows.retain(|row| row.year() == year);
    rows
}

#[cfg(test)]
mod tests {
    use super::{restrict_to_latest_cohort, restrict_to_roster, restrict_to_year};
    use crate::dataset::records::SubjectRow;
    use crate::roster::Roster;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        year: i32,
    }

    impl SubjectRow for Row {
        fn institution_id(&self) -> &str {
            self.id
        }

        fn year(&self) -> i32 {
            self.year
        }
    }

    fn row(id: &'static str, year: i32) -> Row {
        Row { id, year }
    }

    #[test]
    fn roster_filter_drops_unknown_institutions() {
        let roster: Roster = [("1001".to_string(), "Example College".to_string())]
            .into_iter()
            .collect();
        let rows = vec![row("1001", 2023), row("9999", 2023)];
        let filtered = restrict_to_roster(rows, &roster);
        assert_eq!(filtered, vec![row("1001", 2023)]);
    }

    #[test]
    fn latest_cohort_drops_institutions_absent_in_max_year() {
        let rows = vec![
            row("1001", 2021),
            row("1001", 2023),
            row("1002", 2021),
            // 1002 has no 2023 row: its whole series goes
        ];
        let filtered = restrict_to_latest_cohort(rows);
        assert_eq!(filtered, vec![row("1001", 2021), row("1001", 2023)]);
    }

    #[test]
    fn latest_cohort_is_idempotent() {
        let rows = vec![
            row("1001", 2021),
            row("1001", 2023),
            row("1002", 2021),
            row("1003", 2023),
        ];
        let once = restrict_to_latest_cohort(rows);
        let twice = restrict_to_latest_cohort(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn latest_cohort_of_empty_set_is_empty() {
        let filtered = restrict_to_latest_cohort(Vec::<Row>::new());
        assert!(filtered.is_empty());
    }

    #[test]
    fn year_filter_keeps_single_year() {
        let rows = vec![row("1001", 2021), row("1001", 2023)];
        assert_eq!(restrict_to_year(rows, 2023), vec![row("1001", 2023)]);
    }
}
