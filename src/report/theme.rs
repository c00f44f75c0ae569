//! Process-wide, read-only style registry: brand colors, gender-pair and
//! demographic palettes, fonts, and the popup label templates. Nothing here
//! mutates after initialization; builders only read.

/// Brand navy used for body text, table accents, and tooltips.
pub const NAVY: &str = "#001A50";
/// Darker accent for hover states in the table shell.
pub const ACCENT_DARK: &str = "#05292C";
/// Accent for the map search control.
pub const SEARCH_ACCENT: &str = "#06474D";
/// Marker pin background (navy with alpha).
pub const MARKER_BACKGROUND: &str = "#001950B1";
/// Chart hover-label text color.
pub const HOVER_INK: &str = "#1e4a4a";

/// Fixed two-color gender encoding, used consistently across every chart
/// type and the table's share badge.
pub const MEN_COLOR: &str = "#0B8569";
pub const WOMEN_COLOR: &str = "#9657A5";

pub const TITLE_FONT: &str = "Merriweather";
pub const BODY_FONT: &str = "Source Sans Pro";

/// One stacked series of the enrollment-demographics chart.
#[derive(Debug, Clone, Copy)]
pub struct DemographicSeries {
    pub label: &'static str,
    pub color: &'static str,
}

/// Ordered stack for the demographics chart: men's shade paired with the
/// lighter women's shade per group, residual bucket last.
pub const DEMOGRAPHIC_SERIES: [DemographicSeries; 10] = [
    DemographicSeries { label: "White Men", color: "#0B8569" },
    DemographicSeries { label: "White Women", color: "#AAC9B8" },
    DemographicSeries { label: "Black Men", color: "#9657A5" },
    DemographicSeries { label: "Black Women", color: "#CFBCD0" },
    DemographicSeries { label: "Hispanic Men", color: "#4575D6" },
    DemographicSeries { label: "Hispanic Women", color: "#C9D3E8" },
    DemographicSeries { label: "Asian Men", color: "#C55300" },
    DemographicSeries { label: "Asian Women", color: "#F4A26B" },
    DemographicSeries { label: "Other Men", color: "#d7c015" },
    DemographicSeries { label: "Other Women", color: "#f4ebad" },
];

/// Named color scale: ordered `(fraction, color)` stops sampled by linear
/// interpolation in RGB.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    pub name: &'static str,
    pub stops: &'static [(f64, &'static str)],
}

/// Scale behind the full table's male-enrollment-share badge: women's color
/// at 0, neutral at the midpoint, men's color at 1.
pub const MALE_SHARE_SCALE: ColorScale = ColorScale {
    name: "male_share",
    stops: &[(0.0, WOMEN_COLOR), (0.5, "#C9D3E8"), (1.0, MEN_COLOR)],
};

impl ColorScale {
    /// Sample the scale at `fraction` (clamped to `[0, 1]`).
    pub fn sample(&self, fraction: f64) -> String {
        let fraction = fraction.clamp(0.0, 1.0);
        let mut lower = self.stops[0];
        let mut upper = self.stops[self.stops.len() - 1];
        for window in self.stops.windows(2) {
            if fraction >= window[0].0 && fraction <= window[1].0 {
                lower = window[0];
                upper = window[1];
                break;
            }
        }
        let (lo_frac, lo_color) = lower;
        let (hi_frac, hi_color) = upper;
        let span = hi_frac - lo_frac;
        let t = if span <= f64::EPSILON {
            0.0
        } else {
            (fraction - lo_frac) / span
        };
        let lo = parse_hex(lo_color);
        let hi = parse_hex(hi_color);
        let mix = |a: u8, b: u8| -> u8 { (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8 };
        format!("#{:02X}{:02X}{:02X}", mix(lo[0], hi[0]), mix(lo[1], hi[1]), mix(lo[2], hi[2]))
    }
}

fn parse_hex(color: &str) -> [u8; 3] {
    let hex = color.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(hex.get(range).unwrap_or("0"), 16).unwrap_or(0)
    };
    [channel(0..2), channel(2..4), channel(4..6)]
}

/// Popup head block, always present.
pub const LABEL_HEAD: &str = concat!(
    r#"<html><div style="color:#001A50;">"#,
    r#"<div style="font-size:18px;font-family:Source Sans Pro;"><b>{name}</b></div>"#,
    r#"<div style="font-size:13px;"><i>{city}, {state}</i></div>"#,
    r#"<div style="font-size:13px;">{weblink}</div>"#,
    "<br>"
);

pub const LABEL_ADMISSIONS: &str = r#"
<div style="font-size:15px;font-family:Source Sans Pro;"><b><u>Admissions</u></b>:</div>
<div style="color:black;font-size:13px;font-family:Source Sans Pro;">
<span>{name} recieved  <b>{male_applied} applications from men</b> and <b>{female_applied} applications from women</b>.
Of these applications, <b>{male_admitted} men</b> and <b>{female_admitted} women were admitted</b>, and
<b>{male_enrolled} men</b> and <b>{female_enrolled} women ultimately enrolled</b>. Overall, <b>{male_accept}% of men</b>
were admitted and <b>{male_yield}%</b> ultimately enrolled, compared to <b>{female_accept}% of female</b> applicants being accepted
and <b>{female_yield}%</b> ultimately enrolling.
</div><br>"#;

pub const LABEL_ENROLL_UNDERGRAD: &str = r#"
<div style="font-size:15px;font-family:Source Sans Pro;"><b><u>Enrollment (Undergraduate)</u></b>:</div>
<div style="color:black;font-size:13px;font-family:Source Sans Pro;">
<span>At the undergraduate level, a total of <b>{totmen_enroll} men</b> and <b>{totwomen_enroll} women</b> were enrolled,
meaning a <b>male enrollment share</b> of <b>{totmen_share}%</b>.</span>
</div><br>"#;

pub const LABEL_ENROLL_GRAD: &str = r#"
<div style="font-size:15px;font-family:Source Sans Pro;"><b><u>Enrollment (Graduate)</u></b>:</div>
<div style="color:black;font-size:13px;font-family:Source Sans Pro;">
<span>At the graduate level, a total of <b>{totmen_enroll} men</b> and <b>{totwomen_enroll} women</b> were enrolled,
meaning a <b>male enrollment share</b> of <b>{totmen_share}%</b>.</span>
</div><br>"#;

pub const LABEL_GRADUATION_TWO_YEAR: &str = r#"
<div style="font-size:15px;font-family:Source Sans Pro;"><b><u>Three-Year Graduation (Associate's)</u></b>:</div>
<div style="color:black;font-size:13px;font-family:Source Sans Pro;">
<span>Tracking a cohort of <b>{totmen} men</b> and <b>{totwomen} women</b>, three years later,
<b>{totmen_graduated} men</b> and <b>{totwomen_graduated} women graduated</b>, meaning a
<b>male graduation rate</b> of <b>{gradrate_men}%</b>  and <b>female graduation rate</b> of <b>{gradrate_women}%</b>.</span>
</div><br>"#;

pub const LABEL_GRADUATION_FOUR_YEAR: &str = r#"
<div style="font-size:15px;font-family:Source Sans Pro;"><b><u>Six-Year Graduation (Bachelor's)</u></b>:</div>
<div style="color:black;font-size:13px;font-family:Source Sans Pro;">
<span>Tracking a cohort of <b>{totmen} men</b> and <b>{totwomen} women</b>, six years later,
<b>{totmen_graduated} men</b> and <b>{totwomen_graduated} women graduated</b>, meaning a
<b>male graduation rate</b> of <b>{gradrate_men}%</b>  and <b>female graduation rate</b> of <b>{gradrate_women}%</b>.</span>
</div>"#;

/// Faint separator keeping popups a consistent width, plus document close.
pub const LABEL_FOOT: &str = r#"<div style="font-size:14px;color:white">_____________________________________________________________________</div></div></html>"#;

/// Close for the simplified popup, which carries no data blocks.
pub const LABEL_SIMPLE_FOOT: &str = "</div></html>";
