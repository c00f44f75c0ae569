//! Render [`SchoolReportEntry`] values into popup HTML through the theme's
//! label templates. Data assembly stays in `entry`; this module only fills
//! named placeholders.

use crate::report::entry::{
    AdmissionsBlock, EnrollmentBlock, GraduationBlock, SchoolHead, SchoolReportEntry,
};
use crate::report::theme::{
    LABEL_ADMISSIONS, LABEL_ENROLL_GRAD, LABEL_ENROLL_UNDERGRAD, LABEL_FOOT,
    LABEL_GRADUATION_FOUR_YEAR, LABEL_GRADUATION_TWO_YEAR, LABEL_HEAD, LABEL_SIMPLE_FOOT,
};

/// Substitute `{name}`-style placeholders with the given values.
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

fn optional_percent(value: Option<i64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| v.to_string())
}

pub fn head_label(head: &SchoolHead) -> String {
    let weblink = head
        .web_address
        .as_deref()
        .map(|addr| {
            format!(r#"<a target="_blank" rel="noopener noreferrer" href="{addr}">{addr}</a>"#)
        })
        .unwrap_or_default();
    fill(
        LABEL_HEAD,
        &[
            ("name", head.name.clone()),
            ("city", head.city.clone()),
            ("state", head.state.clone()),
            ("weblink", weblink),
        ],
    )
}

pub fn admissions_label(name: &str, block: &AdmissionsBlock) -> String {
    fill(
        LABEL_ADMISSIONS,
        &[
            ("name", name.to_string()),
            ("male_applied", block.men_applied.to_string()),
            ("female_applied", block.women_applied.to_string()),
            ("male_admitted", block.men_admitted.to_string()),
            ("female_admitted", block.women_admitted.to_string()),
            ("male_enrolled", block.men_enrolled.to_string()),
            ("female_enrolled", block.women_enrolled.to_string()),
            ("male_accept", block.accept_rate_men.to_string()),
            ("male_yield", block.yield_rate_men.to_string()),
            ("female_accept", optional_percent(block.accept_rate_women)),
            ("female_yield", optional_percent(block.yield_rate_women)),
        ],
    )
}

pub fn enrollment_label(template: &str, block: &EnrollmentBlock) -> String {
    fill(
        template,
        &[
            ("totmen_enroll", block.men.to_string()),
            ("totwomen_enroll", block.women.to_string()),
            ("totmen_share", block.men_share.to_string()),
        ],
    )
}

pub fn graduation_label(template: &str, block: &GraduationBlock) -> String {
    let (women_cohort, women_graduated, women_rate) = match &block.women {
        Some(women) => (
            women.cohort.to_string(),
            women.graduated.to_string(),
            women.rate.to_string(),
        ),
        None => ("NA".to_string(), "NA".to_string(), "NA".to_string()),
    };
    fill(
        template,
        &[
            ("totmen", block.men.cohort.to_string()),
            ("totmen_graduated", block.men.graduated.to_string()),
            ("gradrate_men", block.men.rate.to_string()),
            ("totwomen", women_cohort),
            ("totwomen_graduated", women_graduated),
            ("gradrate_women", women_rate),
        ],
    )
}

/// Full popup: head always, data blocks only where the entry carries them.
pub fn popup_label(entry: &SchoolReportEntry) -> String {
    let mut label = head_label(&entry.head);
    if let Some(block) = &entry.admissions {
        label.push_str(&admissions_label(&entry.head.name, block));
    }
    if let Some(block) = &entry.enrollment_undergrad {
        label.push_str(&enrollment_label(LABEL_ENROLL_UNDERGRAD, block));
    }
    if let Some(block) = &entry.enrollment_grad {
        label.push_str(&enrollment_label(LABEL_ENROLL_GRAD, block));
    }
    if let Some(block) = &entry.graduation_two_year {
        label.push_str(&graduation_label(LABEL_GRADUATION_TWO_YEAR, block));
    }
    if let Some(block) = &entry.graduation_four_year {
        label.push_str(&graduation_label(LABEL_GRADUATION_FOUR_YEAR, block));
    }
    label.push_str(LABEL_FOOT);
    label
}

/// Simplified popup: head block only.
pub fn simple_popup_label(head: &SchoolHead) -> String {
    let mut label = head_label(head);
    label.push_str(LABEL_SIMPLE_FOOT);
    label
}

/// Marker hover tooltip.
pub fn tooltip_label(head: &SchoolHead) -> String {
    format!(
        "<b>{}</b><br>({}, {})",
        head.name, head.city, head.state
    )
}
