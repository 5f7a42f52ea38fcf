//! End-to-end tests for the report pipeline.
//!
//! Sample-directory runs use the frozen fixtures under `tests/fixtures/sample_data`
//! (one Yahoo-format CSV per default bank). Network runs use a scripted provider.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use relperf_core::data::{
    DataError, DocumentCache, DocumentSource, FetchWindow, PriceProvider, ResolveError,
    SilentProgress, SourcePlan,
};
use relperf_core::domain::Instrument;
use relperf_core::{RelativeError, RelativePoint};
use relperf_runner::{build_report, run_to_file, ChartConfig, PipelineError, SourceCounts};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_data")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 12, 30, 0).unwrap()
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Provider that must never be reached.
struct NoNetwork {
    calls: Cell<usize>,
}

impl NoNetwork {
    fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl PriceProvider for NoNetwork {
    fn name(&self) -> &str {
        "no_network"
    }

    fn fetch(&self, ticker: &str, _window: &FetchWindow) -> Result<String, DataError> {
        self.calls.set(self.calls.get() + 1);
        Err(DataError::NetworkUnreachable(format!("offline: {ticker}")))
    }
}

/// Provider serving canned documents.
struct Canned(HashMap<String, String>);

impl PriceProvider for Canned {
    fn name(&self) -> &str {
        "canned"
    }

    fn fetch(&self, ticker: &str, _window: &FetchWindow) -> Result<String, DataError> {
        self.0
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataError::HttpStatus {
                ticker: ticker.to_string(),
                status: 404,
            })
    }
}

fn abc_config(tickers: &[&str]) -> ChartConfig {
    ChartConfig {
        instruments: tickers
            .iter()
            .map(|t| Instrument::new(format!("Bank {t}"), *t))
            .collect(),
        ..ChartConfig::default()
    }
}

fn write_abc_samples(dir: &Path) {
    let cache = DocumentCache::new(dir);
    cache
        .write("A", "Date,Adj Close\n2024-07-01,100\n2024-07-02,110\n")
        .unwrap();
    cache
        .write("B", "Date,Adj Close\n2024-06-28,45\n2024-07-03,50\n")
        .unwrap();
    cache
        .write("C", "Date,Adj Close\n2024-06-27,10\n2024-06-28,11\n")
        .unwrap();
}

#[test]
fn default_banks_from_frozen_samples() {
    let config = ChartConfig::default();
    let samples = fixture_dir();
    let plan = SourcePlan::from_dirs(Some(samples.as_path()), None, None);
    let provider = NoNetwork::new();

    let report = build_report(&config, &plan, &provider, &SilentProgress, now()).unwrap();

    assert_eq!(provider.calls.get(), 0);
    assert_eq!(report.relative.len(), 10);
    assert_eq!(report.payload.datasets.len(), 10);
    assert_eq!(
        report.source_counts(),
        SourceCounts {
            sample: 10,
            ..SourceCounts::default()
        }
    );

    // Order, labels and colors follow the instrument list.
    assert_eq!(
        report.payload.datasets[0].label,
        "Malayan Banking Berhad (Maybank)"
    );
    assert_eq!(report.payload.datasets[0].border_color, "#1f77b4");
    assert_eq!(report.payload.datasets[9].label, "Affin Bank Berhad");
    assert_eq!(report.payload.datasets[9].border_color, "#17becf");

    for series in &report.relative {
        assert_eq!(series.points[0].ratio, 1.0);
        assert!(series.points.iter().all(|p| p.date >= config.base_date));
        assert!(series.points.windows(2).all(|w| w[0].date < w[1].date));
    }

    // Affin has no row on the base date: its base is the next trading day.
    let affin = &report.relative[9];
    assert_eq!(affin.ticker, "5185.KL");
    assert_eq!(affin.base_date, d("2024-07-02"));

    // MBSB's null row is skipped, not fatal.
    let mbsb = report.sources.iter().find(|s| s.ticker == "1171.KL").unwrap();
    assert_eq!(mbsb.skipped_rows, 1);
    assert!(!report.relative[8].points.iter().any(|p| p.date == d("2024-07-15")));

    assert!(report.html.contains("Top 10 Malaysian Banks Performance with base 1 Jul 2024"));
    assert!(report.html.contains("Last updated: 02 Sep 2024 12:30 UTC"));
    assert!(report.html.contains("Relative Price (1 Jul 2024 = 1.0)"));
}

#[test]
fn ticker_entirely_before_base_aborts_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    write_abc_samples(tmp.path());
    let output = tmp.path().join("out/chart.html");

    let err = run_to_file(
        &abc_config(&["A", "B", "C"]),
        &SourcePlan::from_dirs(Some(tmp.path()), None, None),
        &NoNetwork::new(),
        &SilentProgress,
        now(),
        &output,
    )
    .unwrap_err();

    match err {
        PipelineError::Relative(RelativeError::NoDataOnOrAfterBase { ticker, base_date }) => {
            assert_eq!(ticker, "C");
            assert_eq!(base_date, d("2024-07-01"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn base_date_gap_and_exact_match_produce_expected_points() {
    let tmp = tempfile::tempdir().unwrap();
    write_abc_samples(tmp.path());

    let report = build_report(
        &abc_config(&["A", "B"]),
        &SourcePlan::from_dirs(Some(tmp.path()), None, None),
        &NoNetwork::new(),
        &SilentProgress,
        now(),
    )
    .unwrap();

    assert_eq!(
        report.relative[0].points,
        vec![
            RelativePoint {
                date: d("2024-07-01"),
                ratio: 1.0
            },
            RelativePoint {
                date: d("2024-07-02"),
                ratio: 1.1
            },
        ]
    );
    assert_eq!(
        report.relative[1].points,
        vec![RelativePoint {
            date: d("2024-07-03"),
            ratio: 1.0
        }]
    );
}

#[test]
fn network_run_mirrors_and_writes_page() {
    let tmp = tempfile::tempdir().unwrap();
    let mirror = tmp.path().join("mirror");
    let output = tmp.path().join("chart.html");
    let provider = Canned(HashMap::from([
        (
            "A".to_string(),
            "Date,Adj Close\n2024-07-01,100\n2024-07-02,110\n".to_string(),
        ),
        ("B".to_string(), "Date,Adj Close\n2024-07-03,50\n".to_string()),
    ]));

    let report = run_to_file(
        &abc_config(&["A", "B"]),
        &SourcePlan::from_dirs(None, Some(mirror.as_path()), None),
        &provider,
        &SilentProgress,
        now(),
        &output,
    )
    .unwrap();

    assert_eq!(report.source_counts().network, 2);
    assert!(mirror.join("A.csv").is_file());
    assert!(mirror.join("B.csv").is_file());
    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, report.html);
    assert!(written.contains(r#""label": "Bank A""#));
}

#[test]
fn offline_run_recovers_from_mirror_cache() {
    let tmp = tempfile::tempdir().unwrap();
    let mirror = tmp.path().join("mirror");
    write_abc_samples(&mirror);

    let report = build_report(
        &abc_config(&["A", "B"]),
        &SourcePlan::from_dirs(None, Some(mirror.as_path()), None),
        &NoNetwork::new(),
        &SilentProgress,
        now(),
    )
    .unwrap();

    assert_eq!(report.source_counts().fallback, 2);
    assert_eq!(
        report.sources[0].source,
        DocumentSource::Fallback {
            path: mirror.join("A.csv")
        }
    );
}

#[test]
fn offline_run_without_cache_fails_naming_first_ticker() {
    let tmp = tempfile::tempdir().unwrap();
    let mirror = tmp.path().join("mirror");
    let output = tmp.path().join("chart.html");

    let err = run_to_file(
        &abc_config(&["A", "B"]),
        &SourcePlan::from_dirs(None, Some(mirror.as_path()), None),
        &NoNetwork::new(),
        &SilentProgress,
        now(),
        &output,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Resolve(ResolveError::FetchFailedNoFallback { ref ticker, .. }) if ticker == "A"
    ));
    assert!(!output.exists());
}

#[test]
fn page_heading_follows_configured_base_date() {
    let tmp = tempfile::tempdir().unwrap();
    write_abc_samples(tmp.path());
    let config = ChartConfig {
        base_date: d("2024-07-02"),
        ..abc_config(&["A", "B"])
    };

    let report = build_report(
        &config,
        &SourcePlan::from_dirs(Some(tmp.path()), None, None),
        &NoNetwork::new(),
        &SilentProgress,
        now(),
    )
    .unwrap();

    assert!(report
        .html
        .contains("<h1>Top 10 Malaysian Banks Performance with base 2 Jul 2024</h1>"));
    assert!(report.html.contains("Relative Price (2 Jul 2024 = 1.0)"));
}
