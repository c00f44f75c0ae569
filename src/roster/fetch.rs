use std::io::Read;

use anyhow::{anyhow, Context, Result};

use crate::config::RosterConfig;
use crate::dataset::source::fetch_text;
use crate::roster::Roster;

/// Fetch the current partner roster from the spreadsheet CSV export.
///
/// Propagates any network or decode failure; an unreachable or malformed
/// sheet aborts the run.
pub async fn fetch_roster(config: &RosterConfig) -> Result<Roster> {
    let body = fetch_text(&config.sheet_url)
        .await
        .with_context(|| format!("failed fetching roster sheet: {}", config.sheet_url))?;
    parse_roster_csv(body.as_bytes(), &config.id_column, &config.name_column)
}

pub fn parse_roster_csv<R: Read>(reader: R, id_column: &str, name_column: &str) -> Result<Roster> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .context("roster sheet has no header row")?
        .clone();
    let id_idx = column_index(&headers, id_column)?;
    let name_idx = column_index(&headers, name_column)?;

    let mut roster = Roster::new();
    for record in csv_reader.records() {
        let record = record.context("failed reading roster row")?;
        let id = record
            .get(id_idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("roster row is missing an institution id"))?;
        let name = record
            .get(name_idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("roster row for {id} is missing a partner name"))?;
        roster.insert(id.to_string(), name.to_string());
    }

    if roster.is_empty() {
        return Err(anyhow!("roster sheet contained no institutions"));
    }
    Ok(roster)
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or_else(|| anyhow!("roster sheet is missing the '{column}' column"))
}

#[cfg(test)]
mod tests {
    use super::parse_roster_csv;

    #[test]
    fn parses_id_name_pairs() {
        let sheet = "hemac_id,partner_name\n1001,Example College\n1002,Sample University\n";
        let roster = parse_roster_csv(sheet.as_bytes(), "hemac_id", "partner_name").unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster["1001"], "Example College");
        assert_eq!(roster["1002"], "Sample University");
    }

    #[test]
    fn rejects_missing_columns() {
        let sheet = "id,name\n1001,Example College\n";
        let err = parse_roster_csv(sheet.as_bytes(), "hemac_id", "partner_name").unwrap_err();
        assert!(err.to_string().contains("hemac_id"));
    }

    #[test]
    fn rejects_empty_roster() {
        let sheet = "hemac_id,partner_name\n";
        assert!(parse_roster_csv(sheet.as_bytes(), "hemac_id", "partner_name").is_err());
    }

    #[test]
    fn trims_whitespace_around_cells() {
        let sheet = "hemac_id,partner_name\n 1001 , Example College \n";
        let roster = parse_roster_csv(sheet.as_bytes(), "hemac_id", "partner_name").unwrap();
        assert_eq!(roster["1001"], "Example College");
    }
}
