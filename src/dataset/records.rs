use serde::{Deserialize, Serialize};

use crate::dataset::{DegreeLevel, StudentLevel};

/// Row-level access shared by every subject record.
pub trait SubjectRow {
    fn institution_id(&self) -> &str;
    fn year(&self) -> i32;
}

/// Institutional characteristics: location, address, geocoordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacteristicsRecord {
    pub id: String,
    pub year: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub webaddress: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Yearly admissions counts and rates, men's columns raw and women's derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionsRecord {
    pub id: String,
    pub year: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tot_applied: Option<f64>,
    #[serde(default)]
    pub men_applied: Option<f64>,
    #[serde(default)]
    pub tot_admitted: Option<f64>,
    #[serde(default)]
    pub men_admitted: Option<f64>,
    #[serde(default)]
    pub tot_enrolled: Option<f64>,
    #[serde(default)]
    pub men_enrolled: Option<f64>,
    #[serde(default)]
    pub accept_rate_men: Option<f64>,
    #[serde(default)]
    pub accept_rate_women: Option<f64>,
    #[serde(default)]
    pub yield_rate_men: Option<f64>,
    #[serde(default)]
    pub yield_rate_women: Option<f64>,
}

impl AdmissionsRecord {
    pub fn women_applied(&self) -> Option<f64> {
        subtract(self.tot_applied, self.men_applied)
    }

    pub fn women_admitted(&self) -> Option<f64> {
        subtract(self.tot_admitted, self.men_admitted)
    }

    pub fn women_enrolled(&self) -> Option<f64> {
        subtract(self.tot_enrolled, self.men_enrolled)
    }
}

/// Yearly enrollment totals with demographic breakdowns, per student level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: String,
    pub year: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "studentlevel")]
    pub student_level: StudentLevel,
    #[serde(default)]
    pub totmen: Option<f64>,
    #[serde(default)]
    pub totwomen: Option<f64>,
    #[serde(default)]
    pub totmen_share: Option<f64>,
    #[serde(default)]
    pub wtmen: Option<f64>,
    #[serde(default)]
    pub wtwomen: Option<f64>,
    #[serde(default)]
    pub bkmen: Option<f64>,
    #[serde(default)]
    pub bkwomen: Option<f64>,
    #[serde(default)]
    pub asnmen: Option<f64>,
    #[serde(default)]
    pub asnwomen: Option<f64>,
    #[serde(default)]
    pub hspmen: Option<f64>,
    #[serde(default)]
    pub hspwomen: Option<f64>,
}

impl EnrollmentRecord {
    /// Residual demographic bucket: total minus the four reported groups.
    /// Absent when any component is missing.
    pub fn other_men(&self) -> Option<f64> {
        Some(self.totmen? - self.wtmen? - self.bkmen? - self.hspmen? - self.asnmen?)
    }

    pub fn other_women(&self) -> Option<f64> {
        Some(self.totwomen? - self.wtwomen? - self.bkwomen? - self.hspwomen? - self.asnwomen?)
    }
}

/// Graduation cohort outcomes per degree level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraduationRecord {
    pub id: String,
    pub year: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "deglevel")]
    pub degree_level: DegreeLevel,
    #[serde(default)]
    pub totmen: Option<f64>,
    #[serde(default)]
    pub totwomen: Option<f64>,
    #[serde(default)]
    pub totmen_graduated: Option<f64>,
    #[serde(default)]
    pub totwomen_graduated: Option<f64>,
    #[serde(default)]
    pub gradrate_totmen: Option<f64>,
    #[serde(default)]
    pub gradrate_totwomen: Option<f64>,
}

/// Degree completions per field of study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: String,
    pub year: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "deglevel")]
    pub degree_level: DegreeLevel,
    #[serde(default)]
    pub cip: Option<String>,
    #[serde(default)]
    pub cip_description: Option<String>,
    #[serde(default)]
    pub totmen: Option<f64>,
    #[serde(default)]
    pub totwomen: Option<f64>,
    #[serde(default)]
    pub totmen_share: Option<f64>,
}

fn subtract(total: Option<f64>, men: Option<f64>) -> Option<f64> {
    Some(total? - men?)
}

macro_rules! impl_subject_row {
    ($($record:ty),+ $(,)?) => {
        $(impl SubjectRow for $record {
            fn institution_id(&self) -> &str {
                &self.id
            }

            fn year(&self) -> i32 {
                self.year
            }
        })+
    };
}

impl_subject_row!(
    CharacteristicsRecord,
    AdmissionsRecord,
    EnrollmentRecord,
    GraduationRecord,
    CompletionRecord,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn admissions(tot: Option<f64>, men: Option<f64>) -> AdmissionsRecord {
        AdmissionsRecord {
            id: "1001".to_string(),
            year: 2023,
            name: None,
            tot_applied: tot,
            men_applied: men,
            tot_admitted: None,
            men_admitted: None,
            tot_enrolled: None,
            men_enrolled: None,
            accept_rate_men: None,
            accept_rate_women: None,
            yield_rate_men: None,
            yield_rate_women: None,
        }
    }

    #[test]
    fn derived_split_subtracts_men_from_total() {
        let record = admissions(Some(100.0), Some(50.0));
        assert_eq!(record.women_applied(), Some(50.0));
    }

    #[test]
    fn derived_split_absent_without_denominator() {
        assert_eq!(admissions(None, Some(50.0)).women_applied(), None);
        assert_eq!(admissions(Some(100.0), None).women_applied(), None);
        assert_eq!(admissions(Some(100.0), Some(50.0)).women_admitted(), None);
    }

    #[test]
    fn other_bucket_requires_every_component() {
        let mut record = EnrollmentRecord {
            id: "1001".to_string(),
            year: 2023,
            name: None,
            city: None,
            state: None,
            student_level: StudentLevel::Undergrad,
            totmen: Some(500.0),
            totwomen: Some(520.0),
            totmen_share: Some(49.0),
            wtmen: Some(300.0),
            wtwomen: Some(310.0),
            bkmen: Some(80.0),
            bkwomen: Some(90.0),
            asnmen: Some(50.0),
            asnwomen: Some(40.0),
            hspmen: Some(40.0),
            hspwomen: Some(50.0),
        };
        assert_eq!(record.other_men(), Some(30.0));
        assert_eq!(record.other_women(), Some(30.0));

        record.asnmen = None;
        assert_eq!(record.other_men(), None);
    }
}
