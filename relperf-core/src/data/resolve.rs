//! Source resolution: where each ticker's raw document comes from.
//!
//! Implements the per-run source policy:
//! 1. `SampleOnly` -> read `{sample_dir}/{TICKER}.csv`, never touch the network
//! 2. `NetworkWithFallback` -> live fetch; on success mirror the document
//! 3. On fetch failure -> first cache directory in precedence order holding the ticker
//! 4. Otherwise -> fail the whole run naming the ticker
//!
//! Tickers are resolved one at a time in instrument order. The first fatal
//! error stops the loop; documents mirrored for earlier tickers stay on disk.

use super::cache::{CacheError, CachePrecedence, DocumentCache};
use super::parse::{parse_series, ParsedSeries};
use super::provider::{
    DataError, DocumentSource, FetchWindow, PriceProvider, RawDocument, ResolveProgress,
};
use crate::domain::Instrument;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort source resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("missing sample data file for {ticker}: {}", .path.display())]
    MissingSampleFile { ticker: String, path: PathBuf },

    #[error("failed to download data for {ticker}: {cause}. No fallback file present")]
    FetchFailedNoFallback {
        ticker: String,
        #[source]
        cause: DataError,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// How every ticker's document is obtained for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePlan {
    /// Read every document from a local directory. No network access.
    SampleOnly { sample_dir: PathBuf },
    /// Fetch live, optionally mirroring to `mirror_dir`, and fall back to
    /// cached documents when a fetch fails.
    NetworkWithFallback {
        mirror_dir: Option<PathBuf>,
        fallback: CachePrecedence,
    },
}

impl SourcePlan {
    /// Build the plan from the three optional directories a run can be given.
    ///
    /// A sample directory wins over everything else. The fallback directory
    /// defaults to the mirror directory when unset.
    pub fn from_dirs(
        sample_dir: Option<&Path>,
        mirror_dir: Option<&Path>,
        fallback_dir: Option<&Path>,
    ) -> Self {
        match sample_dir {
            Some(dir) => SourcePlan::SampleOnly {
                sample_dir: dir.to_path_buf(),
            },
            None => SourcePlan::NetworkWithFallback {
                mirror_dir: mirror_dir.map(Path::to_path_buf),
                fallback: CachePrecedence::new(fallback_dir.or(mirror_dir), mirror_dir),
            },
        }
    }

    pub fn uses_network(&self) -> bool {
        matches!(self, SourcePlan::NetworkWithFallback { .. })
    }
}

/// A ticker's parsed series and where its document came from.
#[derive(Debug, Clone)]
pub struct ResolvedSeries {
    pub ticker: String,
    pub source: DocumentSource,
    pub parsed: ParsedSeries,
}

/// Resolve one ticker's raw document according to the plan.
pub fn resolve_document(
    ticker: &str,
    plan: &SourcePlan,
    provider: &dyn PriceProvider,
    window: &FetchWindow,
) -> Result<RawDocument, ResolveError> {
    match plan {
        SourcePlan::SampleOnly { sample_dir } => {
            let cache = DocumentCache::new(sample_dir);
            let text = cache
                .read(ticker)?
                .ok_or_else(|| ResolveError::MissingSampleFile {
                    ticker: ticker.to_string(),
                    path: cache.path_for(ticker),
                })?;
            Ok(RawDocument {
                ticker: ticker.to_string(),
                text,
                source: DocumentSource::Sample,
            })
        }
        SourcePlan::NetworkWithFallback {
            mirror_dir,
            fallback,
        } => {
            let doc = match provider.fetch(ticker, window) {
                Ok(text) => RawDocument {
                    ticker: ticker.to_string(),
                    text,
                    source: DocumentSource::Network,
                },
                Err(cause) => match fallback.lookup(ticker)? {
                    Some((path, text)) => {
                        warn!(
                            ticker,
                            error = %cause,
                            path = %path.display(),
                            "download failed, falling back to cached data"
                        );
                        RawDocument {
                            ticker: ticker.to_string(),
                            text,
                            source: DocumentSource::Fallback { path },
                        }
                    }
                    None => {
                        return Err(ResolveError::FetchFailedNoFallback {
                            ticker: ticker.to_string(),
                            cause,
                        })
                    }
                },
            };

            if let Some(dir) = mirror_dir {
                let path = DocumentCache::new(dir).write(ticker, &doc.text)?;
                debug!(ticker, path = %path.display(), "mirrored document");
            }

            Ok(doc)
        }
    }
}

/// Resolve and parse every instrument, in order. Stops at the first fatal error.
pub fn resolve_all(
    instruments: &[Instrument],
    plan: &SourcePlan,
    provider: &dyn PriceProvider,
    window: &FetchWindow,
    progress: &dyn ResolveProgress,
) -> Result<Vec<ResolvedSeries>, ResolveError> {
    let total = instruments.len();
    let mut resolved = Vec::with_capacity(total);

    for (i, inst) in instruments.iter().enumerate() {
        progress.on_start(&inst.ticker, i, total);

        let doc = resolve_document(&inst.ticker, plan, provider, window)?;
        let parsed = parse_series(&doc.text);

        if !parsed.skipped.is_empty() {
            debug!(
                ticker = %inst.ticker,
                skipped = parsed.skipped_count(),
                "dropped unparsable rows"
            );
        }
        info!(
            ticker = %inst.ticker,
            source = doc.source.label(),
            rows = parsed.series.len(),
            "resolved price series"
        );
        progress.on_resolved(&inst.ticker, i, total, &doc.source);

        resolved.push(ResolvedSeries {
            ticker: doc.ticker,
            source: doc.source,
            parsed,
        });
    }

    progress.on_batch_complete(total);
    Ok(resolved)
}
