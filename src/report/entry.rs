use thiserror::Error;

use crate::dataset::records::{AdmissionsRecord, CharacteristicsRecord, EnrollmentRecord, GraduationRecord};

/// Required input data was absent. The roster guarantees a canonical name
/// for every institution; the provider must supply a characteristics row
/// with geocoordinates. Anything else missing is optional and degrades to
/// an omitted block instead of an error.
#[derive(Debug, Error)]
pub enum PreconditionViolation {
    #[error("institution {id} has no characteristics row for the reporting year")]
    MissingCharacteristics { id: String },
    #[error("institution {id} ({name}) has no geocoordinates")]
    MissingCoordinates { id: String, name: String },
}

/// Head fields present for every institution.
#[derive(Debug, Clone)]
pub struct SchoolHead {
    pub name: String,
    pub city: String,
    pub state: String,
    pub web_address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct AdmissionsBlock {
    pub men_applied: i64,
    pub women_applied: i64,
    pub men_admitted: i64,
    pub women_admitted: i64,
    pub men_enrolled: i64,
    pub women_enrolled: i64,
    pub accept_rate_men: i64,
    pub yield_rate_men: i64,
    pub accept_rate_women: Option<i64>,
    pub yield_rate_women: Option<i64>,
}

impl AdmissionsBlock {
    /// Counts for both genders and the men's rates must be present; the
    /// women's rates alone may be missing and render as `NA`.
    pub fn from_record(record: &AdmissionsRecord) -> Option<Self> {
        Some(Self {
            men_applied: record.men_applied? as i64,
            women_applied: record.women_applied()? as i64,
            men_admitted: record.men_admitted? as i64,
            women_admitted: record.women_admitted()? as i64,
            men_enrolled: record.men_enrolled? as i64,
            women_enrolled: record.women_enrolled()? as i64,
            accept_rate_men: record.accept_rate_men? as i64,
            yield_rate_men: record.yield_rate_men? as i64,
            accept_rate_women: record.accept_rate_women.map(|v| v as i64),
            yield_rate_women: record.yield_rate_women.map(|v| v as i64),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EnrollmentBlock {
    pub men: i64,
    pub women: i64,
    pub men_share: i64,
}

impl EnrollmentBlock {
    pub fn from_record(record: &EnrollmentRecord) -> Option<Self> {
        Some(Self {
            men: record.totmen? as i64,
            women: record.totwomen? as i64,
            men_share: record.totmen_share? as i64,
        })
    }
}

/// Graduation outcome for one gender's cohort.
#[derive(Debug, Clone)]
pub struct CohortOutcome {
    pub cohort: i64,
    pub graduated: i64,
    pub rate: i64,
}

#[derive(Debug, Clone)]
pub struct GraduationBlock {
    pub men: CohortOutcome,
    /// Absent as a unit when the provider omits the women's columns;
    /// renders as `NA`.
    pub women: Option<CohortOutcome>,
}

impl GraduationBlock {
    pub fn from_record(record: &GraduationRecord) -> Option<Self> {
        let men = CohortOutcome {
            cohort: record.totmen? as i64,
            graduated: record.totmen_graduated? as i64,
            rate: record.gradrate_totmen? as i64,
        };
        let women = match (record.totwomen, record.totwomen_graduated, record.gradrate_totwomen) {
            (Some(cohort), Some(graduated), Some(rate)) => Some(CohortOutcome {
                cohort: cohort as i64,
                graduated: graduated as i64,
                rate: rate as i64,
            }),
            _ => None,
        };
        Some(Self { men, women })
    }
}

/// One institution's assembled report data: head fields from
/// characteristics, plus whichever data blocks the subjects had rows for.
#[derive(Debug, Clone)]
pub struct SchoolReportEntry {
    pub id: String,
    pub head: SchoolHead,
    pub admissions: Option<AdmissionsBlock>,
    pub enrollment_undergrad: Option<EnrollmentBlock>,
    pub enrollment_grad: Option<EnrollmentBlock>,
    pub graduation_two_year: Option<GraduationBlock>,
    pub graduation_four_year: Option<GraduationBlock>,
}

impl SchoolReportEntry {
    /// Merge one institution's rows across subjects. `display_name` is the
    /// roster's custom name, which wins over the provider's.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        id: &str,
        display_name: &str,
        characteristics: &[CharacteristicsRecord],
        admissions: &[AdmissionsRecord],
        enrollment_undergrad: &[EnrollmentRecord],
        enrollment_grad: &[EnrollmentRecord],
        graduation_two_year: &[GraduationRecord],
        graduation_four_year: &[GraduationRecord],
    ) -> Result<Self, PreconditionViolation> {
        let character = characteristics
            .iter()
            .find(|row| row.id == id)
            .ok_or_else(|| PreconditionViolation::MissingCharacteristics { id: id.to_string() })?;
        let (latitude, longitude) = match (character.latitude, character.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(PreconditionViolation::MissingCoordinates {
                    id: id.to_string(),
                    name: display_name.to_string(),
                })
            }
        };

        let head = SchoolHead {
            name: display_name.to_string(),
            city: character.city.clone().unwrap_or_default(),
            state: character.state.clone().unwrap_or_default(),
            web_address: character.webaddress.as_deref().map(normalize_web_address),
            latitude,
            longitude,
        };

        Ok(Self {
            id: id.to_string(),
            head,
            admissions: admissions
                .iter()
                .find(|row| row.id == id)
                .and_then(AdmissionsBlock::from_record),
            enrollment_undergrad: enrollment_undergrad
                .iter()
                .find(|row| row.id == id)
                .and_then(EnrollmentBlock::from_record),
            enrollment_grad: enrollment_grad
                .iter()
                .find(|row| row.id == id)
                .and_then(EnrollmentBlock::from_record),
            graduation_two_year: graduation_two_year
                .iter()
                .find(|row| row.id == id)
                .and_then(GraduationBlock::from_record),
            graduation_four_year: graduation_four_year
                .iter()
                .find(|row| row.id == id)
                .and_then(GraduationBlock::from_record),
        })
    }
}

/// Provider web addresses are stored bare; force an https scheme so popup
/// links resolve off-site.
pub fn normalize_web_address(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("https://{rest}")
    } else {
        format!("https://{trimmed}")
    }
}
