pub mod charts;
pub mod entry;
pub mod labels;
pub mod map;
pub mod table;
pub mod theme;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::ReportConfig;
use crate::dataset::SubjectSource;
use crate::roster::Roster;

pub use charts::ChartSetBuilder;
pub use entry::{PreconditionViolation, SchoolReportEntry};
pub use map::MapBuilder;
pub use table::TableBuilder;

/// One rendered HTML document, addressed relative to the output root.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub html: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, html: String) -> Self {
        Self {
            path: path.into(),
            html,
        }
    }
}

/// Shared, read-only inputs every builder works from. Builders hold no
/// mutable state of their own; each `build` call assembles its documents
/// from scratch.
pub struct ReportContext<'a> {
    pub roster: &'a Roster,
    pub year: i32,
    pub source: &'a dyn SubjectSource,
    pub report: &'a ReportConfig,
}

#[async_trait]
pub trait ReportBuilder: Send + Sync {
    fn name(&self) -> &'static str;
    async fn build(&self, ctx: &ReportContext<'_>) -> Result<Vec<Artifact>>;
}

/// Which artifact set a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Characteristics-only map and table.
    Simple,
    /// Data-rich map and table plus per-school charts.
    Full,
}

pub fn builders_for(mode: ReportMode) -> Vec<Box<dyn ReportBuilder>> {
    match mode {
        ReportMode::Simple => vec![
            Box::new(MapBuilder::simple()),
            Box::new(TableBuilder::simple()),
        ],
        ReportMode::Full => vec![
            Box::new(MapBuilder::full()),
            Box::new(TableBuilder::full()),
            Box::new(ChartSetBuilder),
        ],
    }
}

/// Write artifacts under the output root, overwriting whatever a previous
/// run left there.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        let path = out_dir.join(&artifact.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating artifact directory: {}", parent.display())
            })?;
        }
        fs::write(&path, &artifact.html)
            .with_context(|| format!("failed writing artifact: {}", path.display()))?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

/// Serialize a value for embedding inside a `<script>` tag. `</` is escaped
/// so popup HTML inside the payload cannot terminate the tag early.
pub(crate) fn embed_json<T: Serialize>(value: &T) -> Result<String> {
    let raw = serde_json::to_string(value)?;
    Ok(raw.replace("</", "<\\/"))
}

/// Minimal HTML escaping for text landing in markup we generate.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}


#[cfg(test)]
mod tests {
    use super::{builders_for, embed_json, escape_html, ReportMode};

    #[test]
    fn mode_selects_builder_set() {
        let simple: Vec<_> = builders_for(ReportMode::Simple)
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(simple, vec!["simple-map", "simple-table"]);

        let full: Vec<_> = builders_for(ReportMode::Full)
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(full, vec!["map", "table", "charts"]);
    }

    #[test]
    fn embedded_json_cannot_close_script_tags() {
        let html = "<div></div></script>";
        let embedded = embed_json(&html).unwrap();
        assert!(!embedded.contains("</script>"));
        assert!(embedded.contains("<\\/script>"));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_html("A & B <C>"), "A &amp; B &lt;C&gt;");
    }
}
