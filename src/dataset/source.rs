use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::dataset::records::{
    AdmissionsRecord, CharacteristicsRecord, CompletionRecord, EnrollmentRecord, GraduationRecord,
};
use crate::dataset::{DegreeLevel, StudentLevel, Subject, YearRange};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("hemac-atlas/0.1")
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

/// One-shot GET returning the body as text. No retries: a failed fetch
/// aborts the whole run.
pub async fn fetch_text(url: &str) -> Result<String> {
    let response = HTTP_CLIENT
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed GET request: {url}"))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed reading response body: {url}"))?;
    if !status.is_success() {
        let preview: String = body.chars().take(180).collect();
        return Err(anyhow!("GET {url} returned {status}: {preview}"));
    }
    Ok(body)
}

/// Access to the external statistics provider, one method per subject.
///
/// Implementations return raw rows for the requested years; roster and
/// cohort filtering happen downstream in [`crate::dataset::filter`].
#[async_trait]
pub trait SubjectSource: Send + Sync {
    async fn characteristics(&self, years: YearRange) -> Result<Vec<CharacteristicsRecord>>;
    async fn admissions(&self, years: YearRange) -> Result<Vec<AdmissionsRecord>>;
    async fn enrollment(
        &self,
        level: StudentLevel,
        years: YearRange,
    ) -> Result<Vec<EnrollmentRecord>>;
    async fn graduation(
        &self,
        level: DegreeLevel,
        years: YearRange,
    ) -> Result<Vec<GraduationRecord>>;
    async fn completion(
        &self,
        level: DegreeLevel,
        years: YearRange,
    ) -> Result<Vec<CompletionRecord>>;
}

/// CSV-over-HTTP statistics provider.
///
/// Each subject-year is served as `<base>/<subject>/<year>.csv`, with the
/// sub-level (student or degree level) passed as a query parameter.
pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn subject_url(&self, subject: Subject, year: i32, level: Option<&str>) -> String {
        let mut url = format!("{}/{}/{year}.csv", self.base_url, subject.as_slug());
        if let Some(level) = level {
            url.push_str("?level=");
            url.push_str(level);
        }
        url
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        subject: Subject,
        years: YearRange,
        level: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        for year in years.years() {
            let url = self.subject_url(subject, year, level);
            let body = fetch_text(&url).await?;
            rows.extend(decode_rows(&body, &url)?);
        }
        Ok(rows)
    }
}

#[async_trait]
impl SubjectSource for HttpSource {
    async fn characteristics(&self, years: YearRange) -> Result<Vec<CharacteristicsRecord>> {
        self.fetch_rows(Subject::Characteristics, years, None).await
    }

    async fn admissions(&self, years: YearRange) -> Result<Vec<AdmissionsRecord>> {
        self.fetch_rows(Subject::Admissions, years, None).await
    }

    async fn enrollment(
        &self,
        level: StudentLevel,
        years: YearRange,
    ) -> Result<Vec<EnrollmentRecord>> {
        self.fetch_rows(Subject::Enrollment, years, Some(level.as_slug()))
            .await
    }

    async fn graduation(
        &self,
        level: DegreeLevel,
        years: YearRange,
    ) -> Result<Vec<GraduationRecord>> {
        self.fetch_rows(Subject::Graduation, years, Some(level.as_slug()))
            .await
    }

    async fn completion(
        &self,
        level: DegreeLevel,
        years: YearRange,
    ) -> Result<Vec<CompletionRecord>> {
        self.fetch_rows(Subject::Completion, years, Some(level.as_slug()))
            .await
    }
}

fn decode_rows<T: DeserializeOwned>(body: &str, url: &str) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.with_context(|| format!("malformed subject row from {url}"))?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{decode_rows, HttpSource};
    use crate::dataset::records::{AdmissionsRecord, CompletionRecord, EnrollmentRecord};
    use crate::dataset::{DegreeLevel, StudentLevel, Subject};

    #[test]
    fn subject_urls_include_year_and_level() {
        let source = HttpSource::new("https://data.campusmetrics.org/v1/");
        assert_eq!(
            source.subject_url(Subject::Characteristics, 2023, None),
            "https://data.campusmetrics.org/v1/characteristics/2023.csv"
        );
        assert_eq!(
            source.subject_url(Subject::Enrollment, 2021, Some("grad")),
            "https://data.campusmetrics.org/v1/enrollment/2021.csv?level=grad"
        );
    }

    #[test]
    fn decodes_admissions_rows_with_gaps() {
        let body = "id,year,tot_applied,men_applied,accept_rate_men,accept_rate_women\n\
                    1001,2023,100,50,40,\n";
        let rows: Vec<AdmissionsRecord> = decode_rows(body, "test").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tot_applied, Some(100.0));
        assert_eq!(rows[0].accept_rate_women, None);
    }

    #[test]
    fn decodes_enrollment_student_level() {
        let body = "id,year,studentlevel,totmen,totwomen\n1001,2023,undergrad,500,520\n";
        let rows: Vec<EnrollmentRecord> = decode_rows(body, "test").unwrap();
        assert_eq!(rows[0].student_level, StudentLevel::Undergrad);
    }

    #[test]
    fn decodes_completion_degree_level() {
        let body = "id,year,deglevel,cip,cip_description,totmen,totwomen\n\
                    1001,2023,bach,27.01,Mathematics,12,15\n";
        let rows: Vec<CompletionRecord> = decode_rows(body, "test").unwrap();
        assert_eq!(rows[0].degree_level, DegreeLevel::Bachelor);
        assert_eq!(rows[0].cip.as_deref(), Some("27.01"));
    }

    #[test]
    fn rejects_malformed_rows() {
        let body = "id,year\n1001,not-a-year\n";
        let result: anyhow::Result<Vec<AdmissionsRecord>> = decode_rows(body, "test");
        assert!(result.is_err());
    }
}
