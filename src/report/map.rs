use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::dataset::{
    restrict_to_roster, restrict_to_year, DegreeLevel, StudentLevel, SubjectRow, YearRange,
};
use crate::roster::Roster;
use crate::report::labels::{popup_label, simple_popup_label, tooltip_label};
use crate::report::theme;
use crate::report::{embed_json, Artifact, ReportBuilder, ReportContext, SchoolReportEntry};

const US_CENTER: (f64, f64) = (39.8097343, -98.5556199);
const INITIAL_ZOOM: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapVariant {
    /// Characteristics-only popups.
    Simple,
    /// Popups with conditional admissions/enrollment/graduation blocks.
    Full,
}

/// Landing-page map: one searchable marker per partner school.
pub struct MapBuilder {
    variant: MapVariant,
}

impl MapBuilder {
    pub fn simple() -> Self {
        Self {
            variant: MapVariant::Simple,
        }
    }

    pub fn full() -> Self {
        Self {
            variant: MapVariant::Full,
        }
    }
}

#[derive(Debug, Serialize)]
struct MapMarker {
    name: String,
    lat: f64,
    lon: f64,
    tooltip: String,
    popup: String,
}

#[async_trait]
impl ReportBuilder for MapBuilder {
    fn name(&self) -> &'static str {
        match self.variant {
            MapVariant::Simple => "simple-map",
            MapVariant::Full => "map",
        }
    }

    async fn build(&self, ctx: &ReportContext<'_>) -> Result<Vec<Artifact>> {
        let year = YearRange::single(ctx.year);

        let characteristics = snapshot(
            ctx.source.characteristics(year).await?,
            ctx.roster,
            ctx.year,
        );

        let (admissions, enrollment_undergrad, enrollment_grad, graduation_two, graduation_four) =
            match self.variant {
                MapVariant::Simple => Default::default(),
                MapVariant::Full => (
                    snapshot(ctx.source.admissions(year).await?, ctx.roster, ctx.year),
                    snapshot(
                        ctx.source.enrollment(StudentLevel::Undergrad, year).await?,
                        ctx.roster,
                        ctx.year,
                    ),
                    snapshot(
                        ctx.source.enrollment(StudentLevel::Grad, year).await?,
                        ctx.roster,
                        ctx.year,
                    ),
                    snapshot(
                        ctx.source.graduation(DegreeLevel::Associate, year).await?,
                        ctx.roster,
                        ctx.year,
                    ),
                    snapshot(
                        ctx.source.graduation(DegreeLevel::Bachelor, year).await?,
                        ctx.roster,
                        ctx.year,
                    ),
                ),
            };

        let mut markers = Vec::with_capacity(ctx.roster.len());
        for (id, display_name) in ctx.roster {
            let entry = SchoolReportEntry::assemble(
                id,
                display_name,
                &characteristics,
                &admissions,
                &enrollment_undergrad,
                &enrollment_grad,
                &graduation_two,
                &graduation_four,
            )?;
            let popup = match self.variant {
                MapVariant::Simple => simple_popup_label(&entry.head),
                MapVariant::Full => popup_label(&entry),
            };
            markers.push(MapMarker {
                name: entry.head.name.clone(),
                lat: entry.head.latitude,
                lon: entry.head.longitude,
                tooltip: tooltip_label(&entry.head),
                popup,
            });
        }

        let file = match self.variant {
            MapVariant::Simple => "map/simple_landing_map.html",
            MapVariant::Full => "map/landing_map.html",
        };
        Ok(vec![Artifact::new(file, map_document(&embed_json(&markers)?))])
    }
}

/// Roster-restricted, single-year view of a subject's rows.
fn snapshot<R: SubjectRow>(rows: Vec<R>, roster: &Roster, year: i32) -> Vec<R> {
    restrict_to_year(restrict_to_roster(rows, roster), year)
}

fn map_document(markers_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>HEMAC Partner Schools</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<link rel="stylesheet" href="https://unpkg.com/leaflet.fullscreen@3.0.2/Control.FullScreen.css"/>
<link rel="stylesheet" href="https://unpkg.com/leaflet-search@4.0.0/dist/leaflet-search.min.css"/>
<link rel="stylesheet" href="https://fonts.googleapis.com/css2?family=Merriweather:wght@700&family=Source+Sans+Pro:wght@400;600&display=swap"/>
<style>{css}</style>
</head>
<body>
<div id="map"></div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.fullscreen@3.0.2/Control.FullScreen.js"></script>
<script src="https://unpkg.com/leaflet-search@4.0.0/dist/leaflet-search.min.js"></script>
<script>
const SCHOOLS = {markers};
{js}
</script>
</body>
</html>
"#,
        css = map_css(),
        markers = markers_json,
        js = map_js(),
    )
}

fn map_css() -> String {
    format!(
        r#"html, body {{ margin: 0; height: 100%; }}
#map {{ height: 100vh; width: 100vw; }}
.hemac-marker {{
  background-color: {marker_bg};
  border-radius: 50% 50% 50% 0;
  transform: rotate(-45deg);
  width: 28px;
  height: 28px;
  display: flex;
  align-items: center;
  justify-content: center;
}}
.hemac-marker span {{
  transform: rotate(45deg);
  color: white;
  font-size: 14px;
}}
.hemac-tooltip {{
  color: {navy};
  font-family: '{body_font}';
  font-size: 13px;
  text-align: center;
}}
.leaflet-control-search .search-button {{ border-color: {search_accent}; }}"#,
        marker_bg = theme::MARKER_BACKGROUND,
        navy = theme::NAVY,
        body_font = theme::BODY_FONT,
        search_accent = theme::SEARCH_ACCENT,
    )
}

fn map_js() -> String {
    format!(
        r#"const map = L.map('map', {{ zoomControl: false }}).setView([{lat}, {lon}], {zoom});
L.control.zoom({{ position: 'topright' }}).addTo(map);
L.tileLayer('https://{{s}}.basemaps.cartocdn.com/rastertiles/voyager/{{z}}/{{x}}/{{y}}{{r}}.png', {{
  attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors &copy; <a href="https://carto.com/attributions">CARTO</a>',
  subdomains: 'abcd',
  maxZoom: 20
}}).addTo(map);
map.attributionControl.setPrefix('');
L.control.fullscreen({{ position: 'topright' }}).addTo(map);

const schoolLayer = L.featureGroup().addTo(map);
for (const school of SCHOOLS) {{
  const icon = L.divIcon({{
    className: '',
    html: '<div class="hemac-marker"><span>&#127963;</span></div>',
    iconSize: [28, 28],
    iconAnchor: [14, 28],
    popupAnchor: [0, -28]
  }});
  const marker = L.marker([school.lat, school.lon], {{ icon: icon, title: school.name }});
  marker.feature = {{ type: 'Feature', properties: {{ name: school.name }} }};
  marker.bindPopup(school.popup, {{ maxWidth: 420 }});
  marker.bindTooltip(school.tooltip, {{ direction: 'top', className: 'hemac-tooltip' }});
  marker.addTo(schoolLayer);
}}

new L.Control.Search({{
  layer: schoolLayer,
  propertyName: 'name',
  initial: false,
  marker: false,
  textPlaceholder: 'Search by HEMAC school name/location',
  moveToLocation: function (latlng, title, map) {{ map.setView(latlng, 10); }}
}}).addTo(map);"#,
        lat = US_CENTER.0,
        lon = US_CENTER.1,
        zoom = INITIAL_ZOOM,
    )
}

#[cfg(test)]
mod tests {
    use super::MapBuilder;
    use crate::dataset::records::{AdmissionsRecord, CharacteristicsRecord};
    use crate::report::testing::{report_config, StubSource};
    use crate::report::{ReportBuilder, ReportContext};
    use crate::roster::Roster;

    fn roster() -> Roster {
        [("1001".to_string(), "Example College".to_string())]
            .into_iter()
            .collect()
    }

    fn characteristics() -> CharacteristicsRecord {
        CharacteristicsRecord {
            id: "1001".to_string(),
            year: 2023,
            name: Some("Example College of the Provider".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            webaddress: Some("www.example.edu".to_string()),
            latitude: Some(39.8),
            longitude: Some(-89.6),
        }
    }

    fn admissions() -> AdmissionsRecord {
        AdmissionsRecord {
            id: "1001".to_string(),
            year: 2023,
            name: None,
            tot_applied: Some(100.0),
            men_applied: Some(50.0),
            tot_admitted: Some(40.0),
            men_admitted: Some(20.0),
            tot_enrolled: Some(20.0),
            men_enrolled: Some(10.0),
            accept_rate_men: Some(40.0),
            accept_rate_women: Some(40.0),
            yield_rate_men: Some(20.0),
            yield_rate_women: Some(25.0),
        }
    }

    #[tokio::test]
    async fn full_map_popup_has_only_available_blocks() {
        let source = StubSource {
            characteristics: vec![characteristics()],
            admissions: vec![admissions()],
            ..StubSource::default()
        };
        let config = report_config();
        let roster = roster();
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };

        let artifacts = MapBuilder::full().build(&ctx).await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path.to_str(), Some("map/landing_map.html"));

        let html = &artifacts[0].html;
        assert!(html.contains("Example College"));
        assert!(html.contains("Admissions"));
        assert!(!html.contains("Enrollment (Undergraduate)"));
        assert!(!html.contains("Enrollment (Graduate)"));
        assert!(!html.contains("Graduation"));
    }

    #[tokio::test]
    async fn full_map_has_search_and_fullscreen_controls() {
        let source = StubSource {
            characteristics: vec![characteristics()],
            ..StubSource::default()
        };
        let config = report_config();
        let roster = roster();
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };

        let html = MapBuilder::full().build(&ctx).await.unwrap()[0].html.clone();
        assert!(html.contains("L.Control.Search"));
        assert!(html.contains("Search by HEMAC school name/location"));
        assert!(html.contains("L.control.fullscreen"));
        assert!(html.contains("attributionControl.setPrefix('')"));
    }

    #[tokio::test]
    async fn simple_map_uses_characteristics_only() {
        let source = StubSource {
            characteristics: vec![characteristics()],
            admissions: vec![admissions()],
            ..StubSource::default()
        };
        let config = report_config();
        let roster = roster();
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };

        let artifacts = MapBuilder::simple().build(&ctx).await.unwrap();
        assert_eq!(
            artifacts[0].path.to_str(),
            Some("map/simple_landing_map.html")
        );
        let html = &artifacts[0].html;
        assert!(html.contains("Example College"));
        assert!(html.contains("https://www.example.edu"));
        assert!(!html.contains("Admissions"));
    }

    #[tokio::test]
    async fn missing_characteristics_row_fails_the_build() {
        let source = StubSource::default();
        let config = report_config();
        let roster = roster();
        let ctx = ReportContext {
            roster: &roster,
            year: 2023,
            source: &source,
            report: &config,
        };
        assert!(MapBuilder::full().build(&ctx).await.is_err());
    }
}
