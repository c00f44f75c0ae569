use anyhow::Result;
use clap::Parser;
use hemac_atlas::config::Config;
use hemac_atlas::dataset::HttpSource;
use hemac_atlas::report::{builders_for, write_artifacts, ReportContext, ReportMode};
use hemac_atlas::roster::{diff_rosters, fetch_roster, RosterDiff, RosterSnapshot};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "hemac-atlas",
    about = "Landing-page map, tables, and per-school charts for HEMAC partner schools"
)]
struct Cli {
    /// Regenerate artifacts even when the roster is unchanged.
    #[arg(long)]
    force: bool,
    /// Build the full report set (data popups, enrollment table, per-school
    /// charts) instead of the simplified map and table.
    #[arg(long)]
    full: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = Config::load(None)?;

    let snapshot_path = config.snapshot_path();
    let previous = RosterSnapshot::load(&snapshot_path)?;
    let roster = fetch_roster(&config.roster).await?;
    RosterSnapshot::new(config.report.reporting_year, &roster).write(&snapshot_path)?;
    info!("fetched roster with {} partner schools", roster.len());

    let diff = diff_rosters(previous.as_ref().map(|s| &s.schools), &roster);
    if diff == RosterDiff::Unchanged && !cli.force {
        info!("roster unchanged since last pull, nothing to regenerate");
        return Ok(());
    }

    let mode = if cli.full {
        ReportMode::Full
    } else {
        ReportMode::Simple
    };
    let source = HttpSource::new(config.dataset.base_url.clone());
    let ctx = ReportContext {
        roster: &roster,
        year: config.report.reporting_year,
        source: &source,
        report: &config.report,
    };

    let out_dir = config.resolved_out_dir();
    for builder in builders_for(mode) {
        let artifacts = builder.build(&ctx).await?;
        write_artifacts(&out_dir, &artifacts)?;
        info!("{}: {} artifact(s)", builder.name(), artifacts.len());
    }
    Ok(())
}
