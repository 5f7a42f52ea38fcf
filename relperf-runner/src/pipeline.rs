//! Run pipeline: resolve sources, normalize, assemble, render, write.
//!
//! Two entry points:
//! - `build_report()`: everything up to the rendered page, no output file. Used by tests.
//! - `run_to_file()`: builds the report and writes it atomically. Used by the CLI.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use relperf_core::data::{
    resolve_all, DocumentSource, FetchWindow, PriceProvider, ResolveError, ResolveProgress,
    SourcePlan,
};
use relperf_core::{compute_relative, RelativeError, RelativeSet};

use crate::config::{ChartConfig, ConfigError};
use crate::reporting::{render_html, write_page, ChartPayload, Palette};

/// Errors that abort a run. No partial report is ever written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Relative(#[from] RelativeError),
    #[error("failed to serialize chart data: {0}")]
    Render(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Provenance of one ticker's data in a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub ticker: String,
    pub source: DocumentSource,
    /// Distinct trading days parsed from the document.
    pub rows: usize,
    /// Rows dropped by the parser.
    pub skipped_rows: usize,
}

/// How many tickers came from each kind of source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub network: usize,
    pub sample: usize,
    pub fallback: usize,
}

/// A rendered report and what went into it.
#[derive(Debug, Clone)]
pub struct Report {
    pub html: String,
    pub payload: ChartPayload,
    pub relative: RelativeSet,
    pub sources: Vec<SourceRecord>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn source_counts(&self) -> SourceCounts {
        self.sources
            .iter()
            .fold(SourceCounts::default(), |mut counts, record| {
                match record.source {
                    DocumentSource::Network => counts.network += 1,
                    DocumentSource::Sample => counts.sample += 1,
                    DocumentSource::Fallback { .. } => counts.fallback += 1,
                }
                counts
            })
    }
}

/// Resolve every instrument, compute relative series, and render the page.
///
/// `now` is both the end of the live fetch window and the page timestamp.
pub fn build_report(
    config: &ChartConfig,
    plan: &SourcePlan,
    provider: &dyn PriceProvider,
    progress: &dyn ResolveProgress,
    now: DateTime<Utc>,
) -> Result<Report, PipelineError> {
    let universe = config.universe()?;
    let palette = Palette::new(config.palette.clone())
        .ok_or_else(|| ConfigError::Invalid("palette must not be empty".into()))?;
    let window = FetchWindow::new(config.base_date, now);

    let resolved = resolve_all(&universe.instruments, plan, provider, &window, progress)?;

    let relative = compute_relative(
        resolved
            .iter()
            .map(|r| (r.ticker.as_str(), &r.parsed.series)),
        config.base_date,
    )?;

    let payload = ChartPayload::assemble(&relative, &universe, &palette, config.y_title());
    let html = render_html(&payload, &config.title(), now)?;

    let sources = resolved
        .into_iter()
        .map(|r| SourceRecord {
            rows: r.parsed.series.len(),
            skipped_rows: r.parsed.skipped_count(),
            ticker: r.ticker,
            source: r.source,
        })
        .collect();

    Ok(Report {
        html,
        payload,
        relative,
        sources,
        generated_at: now,
    })
}

/// Build the report and write it to `output`.
pub fn run_to_file(
    config: &ChartConfig,
    plan: &SourcePlan,
    provider: &dyn PriceProvider,
    progress: &dyn ResolveProgress,
    now: DateTime<Utc>,
    output: &Path,
) -> Result<Report, PipelineError> {
    let report = build_report(config, plan, provider, progress, now)?;

    write_page(output, &report.html).map_err(|source| PipelineError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    let counts = report.source_counts();
    info!(
        output = %output.display(),
        network = counts.network,
        sample = counts.sample,
        fallback = counts.fallback,
        "chart written"
    );

    Ok(report)
}
