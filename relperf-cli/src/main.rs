//! relperf CLI: refresh the relative-performance chart.
//!
//! Resolves each configured ticker (sample directory, live Yahoo Finance
//! fetch, or cached fallback copy), normalizes every series against the base
//! date, and writes a self-contained HTML chart.

mod logging;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use relperf_core::data::{PriceProvider, SourcePlan, StdoutProgress, YahooProvider};
use relperf_runner::{
    check_schedule, run_to_file, ChartConfig, Report, ScheduleDecision, ScheduleSkip,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "relperf",
    about = "Chart Malaysian bank share prices relative to a base date"
)]
struct Cli {
    /// Run even outside the weekday evening refresh window.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Read every ticker from <DIR>/<ticker>.csv instead of the network.
    #[arg(long, value_name = "DIR")]
    sample_data: Option<PathBuf>,

    /// Output HTML file.
    #[arg(long, default_value = "top_10_malaysian_banks.html")]
    output: PathBuf,

    /// Mirror each fetched document into <DIR>/<ticker>.csv.
    #[arg(long, value_name = "DIR")]
    write_sample_data: Option<PathBuf>,

    /// Directory of cached documents used when a fetch fails.
    /// Defaults to the --write-sample-data directory.
    #[arg(long, value_name = "DIR")]
    fallback_sample_data: Option<PathBuf>,

    /// TOML file overriding the built-in chart settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP timeout per fetch, in seconds. Overrides the config file.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn source_plan(&self) -> SourcePlan {
        SourcePlan::from_dirs(
            self.sample_data.as_deref(),
            self.write_sample_data.as_deref(),
            self.fallback_sample_data.as_deref(),
        )
    }
}

/// What a run did. Both outcomes exit 0.
#[derive(Debug)]
enum Outcome {
    Skipped(ScheduleSkip),
    Updated(Report),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    match run(&cli, Utc::now())? {
        Outcome::Skipped(reason) => println!("{reason}"),
        Outcome::Updated(report) => print_summary(&report, &cli.output),
    }
    Ok(())
}

/// One invocation at `now`: schedule guard, then refresh.
fn run(cli: &Cli, now: DateTime<Utc>) -> Result<Outcome> {
    let config = load_config(cli)?;

    if !cli.force {
        if let ScheduleDecision::Skip(reason) = check_schedule(now, &config.schedule)? {
            return Ok(Outcome::Skipped(reason));
        }
    }

    refresh(cli, &config, now).map(Outcome::Updated)
}

/// Built-in defaults, then the config file, then CLI flags.
fn load_config(cli: &Cli) -> Result<ChartConfig> {
    let mut config = match &cli.config {
        Some(path) => ChartConfig::from_file(path)?,
        None => ChartConfig::default(),
    };
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

fn refresh(cli: &Cli, config: &ChartConfig, now: DateTime<Utc>) -> Result<Report> {
    let plan = cli.source_plan();
    let provider = YahooProvider::new(config.timeout())?;

    tracing::info!(
        provider = provider.name(),
        tickers = config.instruments.len(),
        network = plan.uses_network(),
        base_date = %config.base_date,
        "refreshing chart"
    );
    if let SourcePlan::NetworkWithFallback { fallback, .. } = &plan {
        if fallback.is_empty() {
            tracing::warn!("no fallback directory; a failed download aborts the run");
        } else {
            let dirs: Vec<String> = fallback.dirs().map(|d| d.display().to_string()).collect();
            tracing::info!(?dirs, "fallback directories in lookup order");
        }
    }

    Ok(run_to_file(
        config,
        &plan,
        &provider,
        &StdoutProgress,
        now,
        &cli.output,
    )?)
}

fn print_summary(report: &Report, output: &Path) {
    let counts = report.source_counts();
    println!();
    println!("Chart updated -> {}", output.display());
    println!(
        "Sources: {} network, {} sample, {} fallback",
        counts.network, counts.sample, counts.fallback
    );

    let skipped: usize = report.sources.iter().map(|s| s.skipped_rows).sum();
    if skipped > 0 {
        println!("Skipped {skipped} unusable row(s)");
    }
}
