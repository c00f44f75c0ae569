use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::dataset::records::{AdmissionsRecord, EnrollmentRecord, GraduationRecord};
use crate::dataset::{
    restrict_to_latest_cohort, restrict_to_roster, DegreeLevel, StudentLevel, SubjectRow,
    YearRange,
};
use crate::report::theme::{
    BODY_FONT, DEMOGRAPHIC_SERIES, HOVER_INK, MEN_COLOR, NAVY, TITLE_FONT, WOMEN_COLOR,
};
use crate::report::{embed_json, Artifact, ReportBuilder, ReportContext};

/// The provider's demographic totals for this year are unreliable; the
/// enrollment-demographics chart skips it. Every other chart type keeps
/// the year.
pub const DEMOGRAPHICS_EXCLUDED_YEAR: i32 = 2009;

/// Per-school Plotly chart documents, one subdirectory per school.
pub struct ChartSetBuilder;

#[async_trait]
impl ReportBuilder for ChartSetBuilder {
    fn name(&self) -> &'static str {
        "charts"
    }

    async fn build(&self, ctx: &ReportContext<'_>) -> Result<Vec<Artifact>> {
        let short = YearRange::stepped(ctx.report.short_series_start, ctx.year, ctx.report.series_step);
        let long = YearRange::stepped(ctx.report.long_series_start, ctx.year, ctx.report.series_step);

        let admissions = restrict_to_latest_cohort(restrict_to_roster(
            ctx.source.admissions(short).await?,
            ctx.roster,
        ));
        let enrollment_undergrad = restrict_to_latest_cohort(restrict_to_roster(
            ctx.source.enrollment(StudentLevel::Undergrad, long).await?,
            ctx.roster,
        ));
        let enrollment_grad = restrict_to_latest_cohort(restrict_to_roster(
            ctx.source.enrollment(StudentLevel::Grad, long).await?,
            ctx.roster,
        ));
        let graduation_two = restrict_to_latest_cohort(restrict_to_roster(
            ctx.source.graduation(DegreeLevel::Associate, short).await?,
            ctx.roster,
        ));
        let graduation_four = restrict_to_latest_cohort(restrict_to_roster(
            ctx.source.graduation(DegreeLevel::Bachelor, short).await?,
            ctx.roster,
        ));

        let mut artifacts = Vec::new();
        for (id, display_name) in ctx.roster {
            let dir = format!("{id}_plots");

            let rows = school_rows(&admissions, id);
            if !rows.is_empty() {
                let html = admissions_chart(&chart_name(&rows, display_name), &rows);
                artifacts.push(Artifact::new(format!("{dir}/admissions.html"), html?));
            }

            for (level, records) in [
                (StudentLevel::Undergrad, &enrollment_undergrad),
                (StudentLevel::Grad, &enrollment_grad),
            ] {
                let rows = school_rows(records, id);
                if rows.is_empty() {
                    continue;
                }
                let name = chart_name(&rows, display_name);
                artifacts.push(Artifact::new(
                    format!("{dir}/enrollment_{}.html", level.as_slug()),
                    enrollment_chart(&name, level, &rows)?,
                ));
                artifacts.push(Artifact::new(
                    format!("{dir}/enrollment_demographics_{}.html", level.as_slug()),
                    demographics_chart(&name, &rows)?,
                ));
            }

            for (window, records) in [
                ("two_year", &graduation_two),
                ("four_year", &graduation_four),
            ] {
                let rows = school_rows(records, id);
                if rows.is_empty() {
                    continue;
                }
                let name = chart_name(&rows, display_name);
                artifacts.push(Artifact::new(
                    format!("{dir}/graduation_{window}.html"),
                    graduation_chart(&name, window, &rows)?,
                ));
            }

            info!("{id} plots completed");
        }
        Ok(artifacts)
    }
}

/// One school's rows, ascending by year.
fn school_rows<R: SubjectRow + Clone>(records: &[R], id: &str) -> Vec<R> {
    let mut rows: Vec<R> = records
        .iter()
        .filter(|row| row.institution_id() == id)
        .cloned()
        .collect();
    rows.sort_by_key(SubjectRow::year);
    rows
}

/// Chart titles use the provider's institution name when present, else the
/// roster's display name.
fn chart_name<R: HasName>(rows: &[R], display_name: &str) -> String {
    rows.iter()
        .find_map(HasName::record_name)
        .unwrap_or_else(|| display_name.to_string())
}

trait HasName {
    fn record_name(&self) -> Option<String>;
}

impl HasName for AdmissionsRecord {
    fn record_name(&self) -> Option<String> {
        self.name.clone()
    }
}

impl HasName for EnrollmentRecord {
    fn record_name(&self) -> Option<String> {
        self.name.clone()
    }
}

impl HasName for GraduationRecord {
    fn record_name(&self) -> Option<String> {
        self.name.clone()
    }
}

fn fmt_count(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| (v as i64).to_string())
}

fn year_span<R: SubjectRow>(rows: &[R]) -> (i32, i32) {
    let min = rows.iter().map(SubjectRow::year).min().unwrap_or(0);
    let max = rows.iter().map(SubjectRow::year).max().unwrap_or(0);
    (min - 1, max + 1)
}

fn gender_trace(name: &str, color: &str, years: &[i32], values: Vec<Option<f64>>, labels: Vec<String>) -> Value {
    json!({
        "name": format!("<b>{name}</b>"),
        "x": years,
        "y": values,
        "mode": "lines+markers",
        "text": labels,
        "hovertemplate": "%{text}<extra></extra>",
        "marker": { "size": 15, "color": color },
        "line": { "width": 6 }
    })
}

fn base_layout(title: &str, x_range: (i32, i32), y_range: Option<(f64, f64)>) -> Value {
    let mut layout = json!({
        "font": { "color": NAVY, "family": BODY_FONT },
        "title": {
            "text": title,
            "font": { "family": TITLE_FONT, "size": 24, "weight": "bold" },
            "x": 0.2
        },
        "plot_bgcolor": "#ffffff",
        "paper_bgcolor": "#ffffff",
        "showlegend": true,
        "hoverlabel": {
            "bgcolor": "#ffffff",
            "align": "left",
            "bordercolor": "black",
            "font": { "color": HOVER_INK }
        },
        "xaxis": { "range": [x_range.0, x_range.1] }
    });
    if let Some((lo, hi)) = y_range {
        layout["yaxis"] = json!({ "range": [lo, hi] });
    }
    layout
}

fn admissions_chart(name: &str, rows: &[AdmissionsRecord]) -> Result<String> {
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    let mut traces = Vec::new();
    for (gender, color) in [("Men", MEN_COLOR), ("Women", WOMEN_COLOR)] {
        let men = gender == "Men";
        let rates: Vec<Option<f64>> = rows
            .iter()
            .map(|r| if men { r.accept_rate_men } else { r.accept_rate_women })
            .collect();
        let labels: Vec<String> = rows
            .iter()
            .map(|r| {
                let (applied, admitted, enrolled, accept, yield_rate) = if men {
                    (r.men_applied, r.men_admitted, r.men_enrolled, r.accept_rate_men, r.yield_rate_men)
                } else {
                    (r.women_applied(), r.women_admitted(), r.women_enrolled(), r.accept_rate_women, r.yield_rate_women)
                };
                format!(
                    "<u><b>{}</b></u> ({gender})<br><b># Applied</b>: {}<br><b># Admitted</b>: {}<br><b># Enrolled</b>: {}<br><b>% Acceptance Rate</b>: {}%<br><b>% Yield Rate</b>: {}%",
                    r.year,
                    fmt_count(applied),
                    fmt_count(admitted),
                    fmt_count(enrolled),
                    fmt_count(accept),
                    fmt_count(yield_rate),
                )
            })
            .collect();
        traces.push(gender_trace(gender, color, &years, rates, labels));
    }
    let title = format!("Acceptance Rates over time at {name}");
    let layout = base_layout(&title, year_span(rows), Some((0.0, 100.0)));
    chart_document(&title, &traces, &layout)
}

fn enrollment_chart(name: &str, level: StudentLevel, rows: &[EnrollmentRecord]) -> Result<String> {
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    let mut traces = Vec::new();
    for (gender, color) in [("Men", MEN_COLOR), ("Women", WOMEN_COLOR)] {
        let men = gender == "Men";
        let totals: Vec<Option<f64>> = rows
            .iter()
            .map(|r| if men { r.totmen } else { r.totwomen })
            .collect();
        let labels: Vec<String> = rows
            .iter()
            .map(|r| {
                let total = if men { r.totmen } else { r.totwomen };
                format!(
                    "<u><b>{}</b></u> ({gender})<br><b># Total {gender} Enrolled</b>: {}<br><b>% Male Enrollment Share</b>: {}%",
                    r.year,
                    fmt_count(total),
                    fmt_count(r.totmen_share),
                )
            })
            .collect();
        traces.push(gender_trace(gender, color, &years, totals, labels));
    }
    let title = format!("{} Enrollment rates over time at {name}", level.label());
    let layout = base_layout(&title, year_span(rows), None);
    chart_document(&title, &traces, &layout)
}

/// Stacked area chart of demographic enrollment shares, normalized to
/// percent-of-total per year. [`DEMOGRAPHICS_EXCLUDED_YEAR`] is dropped
/// from this chart type only.
fn demographics_chart(name: &str, rows: &[EnrollmentRecord]) -> Result<String> {
    let rows: Vec<&EnrollmentRecord> = rows
        .iter()
        .filter(|r| r.year != DEMOGRAPHICS_EXCLUDED_YEAR)
        .collect();
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();

    type Accessor = fn(&EnrollmentRecord) -> Option<f64>;
    let accessors: [Accessor; 10] = [
        |r| r.wtmen,
        |r| r.wtwomen,
        |r| r.bkmen,
        |r| r.bkwomen,
        |r| r.hspmen,
        |r| r.hspwomen,
        |r| r.asnmen,
        |r| r.asnwomen,
        |r| r.other_men(),
        |r| r.other_women(),
    ];

    let mut traces = Vec::new();
    for (series, accessor) in DEMOGRAPHIC_SERIES.iter().zip(accessors) {
        let values: Vec<Option<f64>> = rows.iter().map(|&r| accessor(r)).collect();
        let labels: Vec<String> = rows
            .iter()
            .map(|&r| format!("# <b>{}</b>: {}", series.label, fmt_count(accessor(r))))
            .collect();
        traces.push(json!({
            "name": format!("<b>{}</b>", series.label),
            "line": { "color": series.color },
            "stackgroup": "one",
            "groupnorm": "percent",
            "x": years,
            "y": values,
            "text": labels,
            "hovertemplate": "%{text}<extra></extra>"
        }));
    }

    let title = format!("Enrollment demographics over time at {name}");
    let x_range = {
        let min = years.iter().min().copied().unwrap_or(0);
        let max = years.iter().max().copied().unwrap_or(0);
        (min - 1, max + 1)
    };
    let mut layout = base_layout(&title, x_range, Some((0.0, 100.0)));
    layout["hovermode"] = json!("x unified");
    chart_document(&title, &traces, &layout)
}

fn graduation_chart(name: &str, window: &str, rows: &[GraduationRecord]) -> Result<String> {
    let window_title = match window {
        "two_year" => "Two-Year",
        _ => "Four-Year",
    };
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    let mut traces = Vec::new();
    for (gender, color) in [("Men", MEN_COLOR), ("Women", WOMEN_COLOR)] {
        let men = gender == "Men";
        let rates: Vec<Option<f64>> = rows
            .iter()
            .map(|r| if men { r.gradrate_totmen } else { r.gradrate_totwomen })
            .collect();
        let labels: Vec<String> = rows
            .iter()
            .map(|r| {
                let (cohort, graduated, rate) = if men {
                    (r.totmen, r.totmen_graduated, r.gradrate_totmen)
                } else {
                    (r.totwomen, r.totwomen_graduated, r.gradrate_totwomen)
                };
                format!(
                    "<u><b>{}</b></u> ({gender})<br><b># Total {gender} in cohort</b>: {}<br><b># Total {gender} graduated</b>: {}<br><b>% {gender} grad. rate</b>: {}%",
                    r.year,
                    fmt_count(cohort),
                    fmt_count(graduated),
                    fmt_count(rate),
                )
            })
            .collect();
        traces.push(gender_trace(gender, color, &years, rates, labels));
    }
    let title = format!("{window_title} Graduation rates over time at {name}");
    let layout = base_layout(&title, year_span(rows), Some((0.0, 100.0)));
    chart_document(&title, &traces, &layout)
}

fn chart_document(title: &str, traces: &[Value], layout: &Value) -> Result<String> {
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.32.0.min.js" charset="utf-8"></script>
</head>
<body>
<div id="chart" class="plotly-graph-div" style="height:100vh;width:100vw;"></div>
<script>
Plotly.newPlot("chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
        title = title,
        data = embed_json(&traces)?,
        layout = embed_json(layout)?,
    ))
}
