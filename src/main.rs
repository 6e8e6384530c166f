use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use village_census::{
    history::CsvHistoryDir, map::MapExport, report::ReportOutcome, CensusBuilder, CensusConfig,
    CensusSettings, RunStamp,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Village census and inactive player tracker")]
struct Cli {
    /// Path to a YAML config file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Map export JSON to ingest
    #[arg(long)]
    map: Option<PathBuf>,

    /// Directory holding player_stats_*.csv snapshots
    #[arg(long)]
    history_dir: Option<PathBuf>,

    /// Inactivity report output path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Minimum non-growth streak to report
    #[arg(long)]
    min_inactive_days: Option<u32>,

    /// Run stamp (YYYYMMDD_HHMMSS) instead of the current local time
    #[arg(long)]
    timestamp: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => CensusConfig::load(path)?,
        None => CensusConfig::default(),
    };
    if let Some(map) = cli.map {
        config.map_path = map;
    }
    if let Some(dir) = cli.history_dir {
        config.history_dir = dir;
    }
    if let Some(report) = cli.report {
        config.report_path = report;
    }
    if let Some(days) = cli.min_inactive_days {
        config.min_inactive_days = days;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let stamp = match cli.timestamp.as_deref() {
        Some(text) => RunStamp::parse(text)?,
        None => RunStamp::now(),
    };

    let source = MapExport::new(&config.map_path);
    let history = CsvHistoryDir::new(&config.history_dir);
    info!(
        %stamp,
        map = %source.path().display(),
        history_dir = %history.dir().display(),
        "starting census run"
    );

    let settings = CensusSettings::new(stamp, &config.report_path);
    let mut census = CensusBuilder::new(settings, source, history)
        .with_min_inactive_days(config.min_inactive_days)
        .with_preview_rows(config.preview_rows)
        .build();

    let summary = census
        .run()
        .with_context(|| format!("Census run {stamp} failed"))?;

    match summary.outcome {
        ReportOutcome::Written { path, rows } => println!(
            "Run {}: {} players snapshotted, {} inactive written to {}",
            summary.stamp,
            summary.players,
            rows,
            path.display()
        ),
        ReportOutcome::NothingToReport => println!(
            "Run {}: {} players snapshotted, no inactive players yet ({}+ runs without growth)",
            summary.stamp,
            summary.players,
            census.settings().min_inactive_days
        ),
    }
    Ok(())
}
