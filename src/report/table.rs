use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::dataset::records::EnrollmentRecord;
use crate::dataset::{restrict_to_roster, restrict_to_year, StudentLevel, YearRange};
use crate::report::labels::fill;
use crate::report::theme::{ACCENT_DARK, MALE_SHARE_SCALE, NAVY};
use crate::report::{escape_html, Artifact, ReportBuilder, ReportContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableVariant {
    /// School / City / State.
    Simple,
    /// Adds the student level and male-enrollment-share columns.
    Full,
}

/// Landing-page table: sortable, searchable, exportable list of partner
/// schools.
pub struct TableBuilder {
    variant: TableVariant,
}

impl TableBuilder {
    pub fn simple() -> Self {
        Self {
            variant: TableVariant::Simple,
        }
    }

    pub fn full() -> Self {
        Self {
            variant: TableVariant::Full,
        }
    }
}

#[async_trait]
impl ReportBuilder for TableBuilder {
    fn name(&self) -> &'static str {
        match self.variant {
            TableVariant::Simple => "simple-table",
            TableVariant::Full => "table",
        }
    }

    async fn build(&self, ctx: &ReportContext<'_>) -> Result<Vec<Artifact>> {
        let (file, table) = match self.variant {
            TableVariant::Simple => ("table/simple_landing_table.html", self.simple_rows(ctx).await?),
            TableVariant::Full => ("table/landing_table.html", self.full_rows(ctx).await?),
        };
        Ok(vec![Artifact::new(file, table_document(&table))])
    }
}

impl TableBuilder {
    async fn simple_rows(&self, ctx: &ReportContext<'_>) -> Result<String> {
        let year = YearRange::single(ctx.year);
        let characteristics = restrict_to_year(
            restrict_to_roster(ctx.source.characteristics(year).await?, ctx.roster),
            ctx.year,
        );

        let mut body = String::new();
        for (id, display_name) in ctx.roster {
            let Some(row) = characteristics.iter().find(|r| &r.id == id) else {
                warn!("no characteristics row for {id}; dropped from landing table");
                continue;
            };
            body.push_str(&render_row(&[
                escape_html(display_name),
                escape_html(row.city.as_deref().unwrap_or_default()),
                escape_html(row.state.as_deref().unwrap_or_default()),
            ]));
        }
        Ok(render_table(&["School", "City", "State"], &body))
    }

    /// One row per school, preferring the undergraduate enrollment record
    /// and falling back to the graduate one. Schools with neither record
    /// contribute no row.
    async fn full_rows(&self, ctx: &ReportContext<'_>) -> Result<String> {
        let year = YearRange::single(ctx.year);
        let undergrad = restrict_to_year(
            restrict_to_roster(
                ctx.source.enrollment(StudentLevel::Undergrad, year).await?,
                ctx.roster,
            ),
            ctx.year,
        );
        let grad = restrict_to_year(
            restrict_to_roster(
                ctx.source.enrollment(StudentLevel::Grad, year).await?,
                ctx.roster,
            ),
            ctx.year,
        );

        let mut body = String::new();
        for (id, display_name) in ctx.roster {
            let row = undergrad
                .iter()
                .find(|r| &r.id == id)
                .or_else(|| grad.iter().find(|r| &r.id == id));
            let Some(row) = row else {
                warn!("no enrollment rows for {id}; dropped from landing table");
                continue;
            };
            body.push_str(&render_row(&[
                escape_html(display_name),
                escape_html(row.city.as_deref().unwrap_or_default()),
                escape_html(row.state.as_deref().unwrap_or_default()),
                row.student_level.label().to_string(),
                share_badge(row),
            ]));
        }
        Ok(render_table(
            &["School", "City", "State", "Level", "MenEnrolled"],
            &body,
        ))
    }
}

/// Male-share cell, tinted along the gender scale: women's color at 0%,
/// men's at 100%.
fn share_badge(row: &EnrollmentRecord) -> String {
    match row.totmen_share {
        Some(share) => {
            let color = MALE_SHARE_SCALE.sample(share / 100.0);
            format!(
                r#"<span class="share-badge" style="background-color:{color};">{}%</span>"#,
                share as i64
            )
        }
        None => String::new(),
    }
}

fn render_row(cells: &[String]) -> String {
    let mut row = String::from("<tr>");
    for cell in cells {
        row.push_str("<td>");
        row.push_str(cell);
        row.push_str("</td>");
    }
    row.push_str("</tr>\n");
    row
}

fn render_table(columns: &[&str], body: &str) -> String {
    let mut head = String::new();
    for column in columns {
        head.push_str("<th>");
        head.push_str(column);
        head.push_str("</th>");
    }
    format!(
        "<table id=\"hemac_schools\" class=\"cell-border display compact hover table table-striped\">\n\
         <thead><tr>{head}</tr></thead>\n<tbody>\n{body}</tbody>\n</table>"
    )
}

const TABLE_CSS: &str = r#"
/* ==== Pagination ==== */
.dataTables_wrapper .dataTables_paginate .pagination .page-item.active .page-link {
  background-color: {navy} !important;
  border-color:     {navy} !important;
  color:            #fff  !important;
}
.dataTables_wrapper .dataTables_paginate .pagination .page-item .page-link:hover {
  background-color: {accent} !important;
  border-color:     {accent} !important;
  color:            #fff  !important;
}

/* ==== Export Buttons ==== */
.btn-dt-teal {
  background-color: {navy} !important;
  border-color:     {navy} !important;
  color:            #fff  !important;
}
.btn-dt-teal:hover,
.btn-dt-teal:focus {
  background-color: {accent} !important;
  border-color:     {accent} !important;
  color:            #fff  !important;
}

/* ==== Table styling ==== */
table.dataTable th,
table.dataTable td {
  font-family: 'Helvetica';
  color: #000000;
}
table.dataTable th:first-child,
table.dataTable td:first-child {
  position: sticky;
  left: 0;
  z-index: 2;
}
table.dataTable .share-badge {
  border-radius: 4px;
  color: #fff;
  padding: 1px 6px;
}

/* Override Bootstrap pagination styling */
.pagination .page-item .page-link {
  background-color: {navy} !important;
  border-color: #333333 !important;
  color: #ffffff !important;
}
.pagination .page-item.active .page-link {
  background-color: {navy} !important;
  border-color: #333333 !important;
  color: #AAC9B8 !important;
  z-index: 3;
}
.pagination .page-item .page-link:hover {
  background-color: {navy} !important;
  border-color: #333333 !important;
  color: #ffffff !important;
}
.pagination .page-item.disabled .page-link {
  background-color: {navy} !important;
  border-color: #333333 !important;
  color: #666666 !important;
}
"#;

const TABLE_JS: &str = r#"
$(function () {
  $('#hemac_schools').DataTable({
    dom: 'Bfrtip',
    language: {
      search: "",
      searchPlaceholder: "Search a school",
    },
    buttons: [
      { extend: 'copy',  className: 'btn btn-sm btn-dt-teal' },
      { extend: 'csv',   className: 'btn btn-sm btn-dt-teal' },
      { extend: 'excel', className: 'btn btn-sm btn-dt-teal' }
    ],
    responsive: true,
    scrollY: true
  });
});
"#;

fn table_document(table: &str) -> String {
    let css = fill(
        TABLE_CSS,
        &[("navy", NAVY.to_string()), ("accent", ACCENT_DARK.to_string())],
    );
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>HEMAC Schools</title>

<!-- Bootstrap CSS -->
<link
    href="https://cdnjs.cloudflare.com/ajax/libs/twitter-bootstrap/5.3.0/css/bootstrap.min.css"
    rel="stylesheet"
/>

<!-- DataTables + Buttons CSS -->
<link
    href="https://cdn.datatables.net/v/bs5/dt-2.3.1/r-3.0.4/b-3.2.3/b-html5-3.2.3/b-print-3.2.3/datatables.min.css"
    rel="stylesheet"
/>
<style>{css}</style>
</head>
<body class="p-4">
{table}

<!-- JS dependencies at end for faster load -->
<script src="https://code.jquery.com/jquery-3.7.0.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/twitter-bootstrap/5.3.0/js/bootstrap.bundle.min.js"></script>
<script src="https://cdn.datatables.net/v/bs5/dt-2.3.1/b-3.2.3/b-html5-3.2.3/b-print-3.2.3/datatables.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/pdfmake/0.2.7/pdfmake.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/pdfmake/0.2.7/vfs_fonts.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/jszip/3.10.1/jszip.min.js"></script>

<script>{js}</script>
</body>
</html>
"#,
        css = css,
        table = table,
        js = TABLE_JS,
    )
}

#[cfg(test)]
mod tests {
    use super::TableBuilder;
    use crate::dataset::records::{CharacteristicsRecord, EnrollmentRecord};
    use crate::dataset::StudentLevel;
    use crate::report::testing::{report_config, StubSource};
    use crate::report::{ReportBuilder, ReportContext};
    use crate::roster::Roster;

    fn enrollment(id: &str, level: StudentLevel, share: f64) -> EnrollmentRecord {
        EnrollmentRecord {
            id: id.to_string(),
            year: 2023,
            name: None,
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            student_level: level,
            totmen: Some(500.0),
            totwomen: Some(520.0),
            totmen_share: Some(share),
            wtmen: None,
            wtwomen: None,
            bkmen: None,
            bkwomen: None,
            asnmen: None,
            asnwomen: None,
            hspmen: None,
            hspwomen: None,
        }
    }

    fn roster(ids: &[(&str, &str)]) -> Roster {
        ids.iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn full_table_falls_back_to_graduate_level() {
        let source = StubSource {
            enrollment_grad: vec![enrollment("1001", StudentLevel::Grad, 46.0)],
            ..StubSource::default()
        };
        let config = report_config();
        let roster = roster(&[("1001", "Example College")]);
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };

        let html = TableBuilder::full().build(&ctx).await.unwrap()[0].html.clone();
        assert_eq!(html.matches("<tr><td>").count(), 1);
        assert!(html.contains("<td>Graduate</td>"));
        assert!(html.contains("46%"));
    }

    #[tokio::test]
    async fn full_table_prefers_undergraduate_level() {
        let source = StubSource {
            enrollment_undergrad: vec![enrollment("1001", StudentLevel::Undergrad, 52.0)],
            enrollment_grad: vec![enrollment("1001", StudentLevel::Grad, 46.0)],
            ..StubSource::default()
        };
        let config = report_config();
        let roster = roster(&[("1001", "Example College")]);
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };

        let html = TableBuilder::full().build(&ctx).await.unwrap()[0].html.clone();
        assert_eq!(html.matches("<tr><td>").count(), 1);
        assert!(html.contains("<td>Undergraduate</td>"));
        assert!(html.contains("52%"));
    }

    #[tokio::test]
    async fn school_with_no_enrollment_contributes_no_row() {
        let source = StubSource {
            enrollment_undergrad: vec![enrollment("1001", StudentLevel::Undergrad, 52.0)],
            ..StubSource::default()
        };
        let config = report_config();
        let roster = roster(&[("1001", "Example College"), ("2002", "Sample University")]);
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };

        let html = TableBuilder::full().build(&ctx).await.unwrap()[0].html.clone();
        assert_eq!(html.matches("<tr><td>").count(), 1);
        assert!(!html.contains("Sample University"));
    }

    #[tokio::test]
    async fn simple_table_lists_every_school_with_characteristics() {
        let chars = |id: &str, city: &str| CharacteristicsRecord {
            id: id.to_string(),
            year: 2023,
            name: None,
            city: Some(city.to_string()),
            state: Some("IL".to_string()),
            webaddress: None,
            latitude: Some(39.8),
            longitude: Some(-89.6),
        };
        let source = StubSource {
            characteristics: vec![chars("1001", "Springfield"), chars("2002", "Peoria")],
            ..StubSource::default()
        };
        let config = report_config();
        let roster = roster(&[("1001", "Example College"), ("2002", "Sample University")]);
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };

        let artifacts = TableBuilder::simple().build(&ctx).await.unwrap();
        assert_eq!(
            artifacts[0].path.to_str(),
            Some("table/simple_landing_table.html")
        );
        let html = &artifacts[0].html;
        assert_eq!(html.matches("<tr><td>").count(), 2);
        assert!(html.contains("Example College"));
        assert!(html.contains("Peoria"));
        assert!(!html.contains("MenEnrolled"));
    }

    #[tokio::test]
    async fn table_shell_is_interactive() {
        let source = StubSource::default();
        let config = report_config();
        let roster = roster(&[]);
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };
        let html = TableBuilder::simple().build(&ctx).await.unwrap()[0].html.clone();
        assert!(html.contains("DataTable"));
        assert!(html.contains("Search a school"));
        assert!(html.contains("datatables.min.js"));
    }
}
