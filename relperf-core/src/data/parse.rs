//! Series parser: provider CSV text -> date-keyed closing prices.
//!
//! The document has a header row with a `Date` column (`YYYY-MM-DD`) and an
//! adjusted-close column spelled either `Adj Close` or `Adj Close*`. Rows that
//! cannot produce a (date, price) pair are skipped, never fatal. Skips are
//! returned alongside the series so callers can report them.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Closing price per trading day. Iteration order is ascending by date.
pub type PriceSeries = BTreeMap<NaiveDate, f64>;

pub const DATE_COLUMN: &str = "Date";
/// Accepted adjusted-close header spellings, in lookup order.
pub const PRICE_COLUMNS: [&str; 2] = ["Adj Close", "Adj Close*"];
pub const NULL_MARKER: &str = "null";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a data row contributed nothing to the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Row has no date value.
    MissingDate,
    /// Price column absent or empty.
    MissingPrice,
    /// Price is the provider's `null` marker.
    NullPrice,
    /// Price is not a finite decimal number.
    InvalidPrice,
    /// Date does not match `YYYY-MM-DD`.
    InvalidDate,
    /// The CSV reader could not decode the row.
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the document (header is line 1).
    pub line: u64,
    pub reason: SkipReason,
}

/// Parser output: the series plus every row that was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSeries {
    pub series: PriceSeries,
    pub skipped: Vec<SkippedRow>,
}

impl ParsedSeries {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Parse one provider document. Later rows overwrite earlier rows for the same date.
pub fn parse_series(raw: &str) -> ParsedSeries {
    let mut out = ParsedSeries::default();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw.as_bytes());

    let columns = match reader.headers() {
        Ok(headers) => Columns::locate(headers),
        Err(_) => return out,
    };

    for (i, record) in reader.records().enumerate() {
        let line = record
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line())
            .unwrap_or(i as u64 + 2);

        let outcome = match record {
            Ok(record) => parse_row(&record, &columns),
            Err(_) => Err(SkipReason::Malformed),
        };

        match outcome {
            Ok((date, price)) => {
                out.series.insert(date, price);
            }
            Err(reason) => out.skipped.push(SkippedRow { line, reason }),
        }
    }

    out
}

/// Header positions of the columns the parser reads.
struct Columns {
    date: Option<usize>,
    prices: Vec<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Self {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}'))
            .collect();
        let find = |wanted: &str| names.iter().position(|name| *name == wanted);

        Self {
            date: find(DATE_COLUMN),
            prices: PRICE_COLUMNS.iter().filter_map(|c| find(*c)).collect(),
        }
    }
}

fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<(NaiveDate, f64), SkipReason> {
    let date_field = columns
        .date
        .and_then(|i| record.get(i))
        .filter(|d| !d.is_empty())
        .ok_or(SkipReason::MissingDate)?;

    // First non-empty spelling wins.
    let price_field = columns
        .prices
        .iter()
        .filter_map(|&i| record.get(i))
        .find(|p| !p.is_empty())
        .ok_or(SkipReason::MissingPrice)?;

    if price_field == NULL_MARKER {
        return Err(SkipReason::NullPrice);
    }

    let price: f64 = price_field
        .trim()
        .parse()
        .map_err(|_| SkipReason::InvalidPrice)?;
    if !price.is_finite() {
        return Err(SkipReason::InvalidPrice);
    }

    let date = NaiveDate::parse_from_str(date_field, DATE_FORMAT)
        .map_err(|_| SkipReason::InvalidDate)?;

    Ok((date, price))
}
