use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_sheet_url")]
    pub sheet_url: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_reporting_year")]
    pub reporting_year: i32,
    #[serde(default = "default_short_series_start")]
    pub short_series_start: i32,
    #[serde(default = "default_long_series_start")]
    pub long_series_start: i32,
    #[serde(default = "default_series_step")]
    pub series_step: u32,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/hemac-atlas/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_out_dir(&self) -> PathBuf {
        expand_tilde(&self.output.out_dir)
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.output.data_dir)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.resolved_data_dir().join("hemac_schools.json")
    }

    pub fn default_template() -> String {
        let template = r#"[roster]
sheet_url = "https://docs.google.com/spreadsheets/d/1pbANvK-nxuUVHaD6w2f-01wzDgYwXAYxapSGXsH1VAs/gviz/tq?tqx=out:csv&sheet=hemac"
id_column = "hemac_id"
name_column = "partner_name"

[dataset]
base_url = "https://data.campusmetrics.org/v1"

[output]
out_dir = "docs"
data_dir = "data"

[report]
reporting_year = 2023
short_series_start = 2003
long_series_start = 1993
series_step = 2
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            sheet_url: default_sheet_url(),
            id_column: default_id_column(),
            name_column: default_name_column(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reporting_year: default_reporting_year(),
            short_series_start: default_short_series_start(),
            long_series_start: default_long_series_start(),
            series_step: default_series_step(),
        }
    }
}

fn default_sheet_url() -> String {
    "https://docs.google.com/spreadsheets/d/1pbANvK-nxuUVHaD6w2f-01wzDgYwXAYxapSGXsH1VAs/gviz/tq?tqx=out:csv&sheet=hemac".to_string()
}

fn default_id_column() -> String {
    "hemac_id".to_string()
}

fn default_name_column() -> String {
    "partner_name".to_string()
}

fn default_base_url() -> String {
    "https://data.campusmetrics.org/v1".to_string()
}

fn default_out_dir() -> String {
    "docs".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_reporting_year() -> i32 {
    2023
}

fn default_short_series_start() -> i32 {
    2003
}

fn default_long_series_start() -> i32 {
    1993
}

fn default_series_step() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let config = Config::default();
        assert_eq!(config.report.reporting_year, 2023);
        assert_eq!(config.output.out_dir, "docs");
        assert_eq!(config.roster.id_column, "hemac_id");
        assert_eq!(config.report.series_step, 2);
    }

    #[test]
    fn template_parses_back() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template parses");
        assert_eq!(parsed.report.long_series_start, 1993);
        assert_eq!(parsed.output.data_dir, "data");
    }
}
