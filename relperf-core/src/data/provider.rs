//! Price provider trait, raw documents, and fetch error types.
//!
//! The PriceProvider trait abstracts over live data sources so the resolver
//! can be driven by a scripted provider in tests. Providers only fetch; the
//! cache and fallback policy sit above this trait in `resolve`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a live fetch. Any of these triggers the cache fallback.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} for {ticker}")]
    HttpStatus { ticker: String, status: u16 },

    #[error("failed to read response body for {ticker}: {reason}")]
    Body { ticker: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Where a raw document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentSource {
    /// Read from an explicit local sample directory.
    Sample,
    /// Fetched live from the provider.
    Network,
    /// Read from a cache directory after a failed live fetch.
    Fallback { path: PathBuf },
}

impl DocumentSource {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentSource::Sample => "sample",
            DocumentSource::Network => "network",
            DocumentSource::Fallback { .. } => "fallback",
        }
    }
}

/// Raw provider text for one ticker, tagged with its origin.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub ticker: String,
    pub text: String,
    pub source: DocumentSource,
}

/// Date range requested from a live provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// First trading day of interest, requested from midnight UTC.
    pub start: NaiveDate,
    /// End of the range, normally "now".
    pub end: DateTime<Utc>,
}

impl FetchWindow {
    pub fn new(start: NaiveDate, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end.timestamp()
    }
}

/// Trait for live price providers.
///
/// Implementations return the provider's document verbatim; parsing happens
/// later so the exact bytes can be mirrored to the cache.
pub trait PriceProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the daily price document for one ticker.
    fn fetch(&self, ticker: &str, window: &FetchWindow) -> Result<String, DataError>;
}

/// Progress callback for the per-ticker resolution loop.
pub trait ResolveProgress {
    /// Called before a ticker is resolved.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called once the ticker has a document.
    fn on_resolved(&self, ticker: &str, index: usize, total: usize, source: &DocumentSource);

    /// Called when every ticker has been resolved.
    fn on_batch_complete(&self, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl ResolveProgress for StdoutProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        println!("[{}/{}] Resolving {ticker}...", index + 1, total);
    }

    fn on_resolved(&self, ticker: &str, _index: usize, _total: usize, source: &DocumentSource) {
        match source {
            DocumentSource::Fallback { path } => {
                println!("  CACHED: {ticker} ({})", path.display())
            }
            other => println!("  OK: {ticker} ({})", other.label()),
        }
    }

    fn on_batch_complete(&self, total: usize) {
        println!("Resolved {total} ticker(s)");
    }
}

/// Progress reporter that prints nothing.
pub struct SilentProgress;

impl ResolveProgress for SilentProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}
    fn on_resolved(&self, _ticker: &str, _index: usize, _total: usize, _source: &DocumentSource) {}
    fn on_batch_complete(&self, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_start_is_midnight_utc() {
        let window = FetchWindow::new(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 2, 12, 0, 0).unwrap(),
        );
        assert_eq!(window.start_timestamp(), 1_719_792_000);
        assert_eq!(window.end_timestamp(), 1_719_792_000 + 36 * 3600);
    }

    #[test]
    fn source_labels() {
        assert_eq!(DocumentSource::Network.label(), "network");
        assert_eq!(DocumentSource::Sample.label(), "sample");
        assert_eq!(
            DocumentSource::Fallback {
                path: PathBuf::from("cache/X.csv")
            }
            .label(),
            "fallback"
        );
    }
}
