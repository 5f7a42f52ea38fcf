//! Relative performance: rescale each price series against its base price.
//!
//! For every ticker the series is cut to dates on or after the base date and
//! divided by the first remaining price. That first price is the base, so
//! the first ratio is exactly 1.0 even when the market was closed on the
//! base date itself.

use crate::data::parse::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RelativeError {
    #[error("no data found on or after {base_date} for {ticker}")]
    NoDataOnOrAfterBase { ticker: String, base_date: NaiveDate },

    #[error("invalid base price {price} for {ticker} on {date}: must be positive")]
    InvalidBasePrice {
        ticker: String,
        date: NaiveDate,
        price: f64,
    },
}

/// One point of a relative series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativePoint {
    pub date: NaiveDate,
    pub ratio: f64,
}

/// A ticker's prices expressed as multiples of its base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeSeries {
    pub ticker: String,
    /// Date of the first point, the earliest trading day on or after the base date.
    pub base_date: NaiveDate,
    pub base_price: f64,
    /// Ascending by date, never empty.
    pub points: Vec<RelativePoint>,
}

impl RelativeSeries {
    /// Build the relative series for one ticker.
    pub fn compute(
        ticker: &str,
        series: &PriceSeries,
        base_date: NaiveDate,
    ) -> Result<Self, RelativeError> {
        let mut on_or_after = series.range(base_date..);

        let (&first_date, &base_price) =
            on_or_after.next().ok_or_else(|| RelativeError::NoDataOnOrAfterBase {
                ticker: ticker.to_string(),
                base_date,
            })?;

        if !(base_price.is_finite() && base_price > 0.0) {
            return Err(RelativeError::InvalidBasePrice {
                ticker: ticker.to_string(),
                date: first_date,
                price: base_price,
            });
        }

        let points = std::iter::once((&first_date, &base_price))
            .chain(on_or_after)
            .map(|(&date, &price)| RelativePoint {
                date,
                ratio: price / base_price,
            })
            .collect();

        Ok(Self {
            ticker: ticker.to_string(),
            base_date: first_date,
            base_price,
            points,
        })
    }

    pub fn first(&self) -> Option<&RelativePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&RelativePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Relative series for every ticker, in input order.
pub type RelativeSet = Vec<RelativeSeries>;

/// Compute relative series for `(ticker, series)` pairs, failing on the first bad ticker.
pub fn compute_relative<'a, I>(
    series_by_ticker: I,
    base_date: NaiveDate,
) -> Result<RelativeSet, RelativeError>
where
    I: IntoIterator<Item = (&'a str, &'a PriceSeries)>,
{
    series_by_ticker
        .into_iter()
        .map(|(ticker, series)| RelativeSeries::compute(ticker, series, base_date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(rows: &[(&str, f64)]) -> PriceSeries {
        rows.iter().map(|(date, p)| (d(date), *p)).collect()
    }

    #[test]
    fn ratio_against_exact_base_date() {
        let s = series(&[("2024-06-28", 90.0), ("2024-07-01", 100.0), ("2024-07-02", 110.0)]);
        let rel = RelativeSeries::compute("A", &s, d("2024-07-01")).unwrap();

        assert_eq!(rel.base_date, d("2024-07-01"));
        assert_eq!(rel.base_price, 100.0);
        assert_eq!(
            rel.points,
            vec![
                RelativePoint { date: d("2024-07-01"), ratio: 1.0 },
                RelativePoint { date: d("2024-07-02"), ratio: 1.1 },
            ]
        );
    }

    #[test]
    fn base_falls_forward_to_next_trading_day() {
        let s = series(&[("2024-06-28", 40.0), ("2024-07-03", 50.0), ("2024-07-04", 45.0)]);
        let rel = RelativeSeries::compute("B", &s, d("2024-07-01")).unwrap();

        assert_eq!(rel.base_date, d("2024-07-03"));
        assert_eq!(rel.first().unwrap().ratio, 1.0);
        assert_eq!(rel.last().unwrap().ratio, 0.9);
    }

    #[test]
    fn all_dates_before_base_is_an_error() {
        let s = series(&[("2024-06-27", 10.0), ("2024-06-28", 11.0)]);
        let err = RelativeSeries::compute("C", &s, d("2024-07-01")).unwrap_err();
        assert_eq!(
            err,
            RelativeError::NoDataOnOrAfterBase {
                ticker: "C".into(),
                base_date: d("2024-07-01"),
            }
        );
        assert_eq!(err.to_string(), "no data found on or after 2024-07-01 for C");
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = RelativeSeries::compute("E", &PriceSeries::new(), d("2024-07-01")).unwrap_err();
        assert!(matches!(err, RelativeError::NoDataOnOrAfterBase { .. }));
    }

    #[test]
    fn zero_or_negative_base_price_is_rejected() {
        for bad in [0.0, -1.0] {
            let s = series(&[("2024-07-01", bad), ("2024-07-02", 5.0)]);
            let err = RelativeSeries::compute("Z", &s, d("2024-07-01")).unwrap_err();
            assert!(matches!(err, RelativeError::InvalidBasePrice { price, .. } if price == bad));
        }
    }

    #[test]
    fn compute_relative_preserves_order_and_stops_on_error() {
        let a = series(&[("2024-07-01", 100.0)]);
        let c = series(&[("2024-06-01", 1.0)]);
        let b = series(&[("2024-07-03", 50.0)]);

        let ok = compute_relative([("A", &a), ("B", &b)], d("2024-07-01")).unwrap();
        let tickers: Vec<&str> = ok.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["A", "B"]);

        let err = compute_relative([("A", &a), ("C", &c), ("B", &b)], d("2024-07-01")).unwrap_err();
        assert!(matches!(err, RelativeError::NoDataOnOrAfterBase { ticker, .. } if ticker == "C"));
    }
}
