pub mod filter;
pub mod records;
pub mod source;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use filter::{restrict_to_latest_cohort, restrict_to_roster, restrict_to_year};
pub use records::{
    AdmissionsRecord, CharacteristicsRecord, CompletionRecord, EnrollmentRecord, GraduationRecord,
    SubjectRow,
};
pub use source::{HttpSource, SubjectSource};

/// The five statistical categories the provider serves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Characteristics,
    Admissions,
    Enrollment,
    Graduation,
    Completion,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Characteristics,
        Subject::Admissions,
        Subject::Enrollment,
        Subject::Graduation,
        Subject::Completion,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Characteristics => "characteristics",
            Self::Admissions => "admissions",
            Self::Enrollment => "enrollment",
            Self::Graduation => "graduation",
            Self::Completion => "completion",
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown subject: {0}")]
pub struct ParseSubjectError(String);

impl FromStr for Subject {
    type Err = ParseSubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "characteristics" => Ok(Self::Characteristics),
            "admissions" => Ok(Self::Admissions),
            "enrollment" => Ok(Self::Enrollment),
            "graduation" => Ok(Self::Graduation),
            "completion" => Ok(Self::Completion),
            other => Err(ParseSubjectError(other.to_string())),
        }
    }
}

/// Enrollment sub-level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StudentLevel {
    Undergrad,
    Grad,
}

impl StudentLevel {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Undergrad => "undergrad",
            Self::Grad => "grad",
        }
    }

    /// Human label used in tables and chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Undergrad => "Undergraduate",
            Self::Grad => "Graduate",
        }
    }
}

impl Display for StudentLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

/// Degree sub-level for graduation and completion records.
///
/// Graduation cohorts track Associate degrees over a two-year window and
/// Bachelor degrees over a four-year window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DegreeLevel {
    #[serde(rename = "assc")]
    Associate,
    #[serde(rename = "bach")]
    Bachelor,
    #[serde(rename = "mast")]
    Master,
    #[serde(rename = "doct")]
    Doctoral,
}

impl DegreeLevel {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Associate => "assc",
            Self::Bachelor => "bach",
            Self::Master => "mast",
            Self::Doctoral => "doct",
        }
    }
}

impl Display for DegreeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

/// A single reporting year, or an inclusive stepped range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearRange {
    Single(i32),
    Stepped { start: i32, end: i32, step: u32 },
}

impl YearRange {
    pub fn single(year: i32) -> Self {
        Self::Single(year)
    }

    pub fn stepped(start: i32, end: i32, step: u32) -> Self {
        Self::Stepped {
            start,
            end,
            step: step.max(1),
        }
    }

    /// Concrete years the range covers, ascending.
    pub fn years(&self) -> Vec<i32> {
        match *self {
            Self::Single(year) => vec![year],
            Self::Stepped { start, end, step } => (start..=end)
                .step_by(step.max(1) as usize)
                .collect(),
        }
    }

    /// Final (most recent) year of the range.
    pub fn end(&self) -> i32 {
        match *self {
            Self::Single(year) => year,
            Self::Stepped { end, .. } => end,
        }
    }
}
