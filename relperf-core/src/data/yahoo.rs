//! Yahoo Finance CSV download provider.
//!
//! Fetches the v7 "download" document (`Date,Open,High,Low,Close,Adj Close,Volume`)
//! for a ticker. The body is returned verbatim so it can be mirrored to disk
//! before parsing.
//!
//! Yahoo Finance has no official API. Every failure here is surfaced as a
//! `DataError` and the resolver falls back to cached documents.

use super::provider::{DataError, FetchWindow, PriceProvider};
use std::time::Duration;
use tracing::debug;

const DOWNLOAD_BASE: &str = "https://query1.finance.yahoo.com/v7/finance/download";

/// Yahoo Finance download provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    /// Build a provider whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Build the download URL for a ticker and window.
    pub fn download_url(ticker: &str, window: &FetchWindow) -> String {
        format!(
            "{DOWNLOAD_BASE}/{ticker}?period1={start}&period2={end}&interval=1d\
             &events=history&includeAdjustedClose=true",
            ticker = urlencoding::encode(ticker),
            start = window.start_timestamp(),
            end = window.end_timestamp(),
        )
    }

    fn fetch_with_retry(&self, ticker: &str, window: &FetchWindow) -> Result<String, DataError> {
        let url = Self::download_url(ticker, window);
        debug!(%url, "requesting price document");
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        return Err(DataError::HttpStatus {
                            ticker: ticker.to_string(),
                            status: status.as_u16(),
                        });
                    }
                    return resp.text().map_err(|e| DataError::Body {
                        ticker: ticker.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) if e.is_timeout() => {
                    last_error = Some(DataError::Timeout(e.to_string()));
                }
                Err(e) if e.is_connect() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, ticker: &str, window: &FetchWindow) -> Result<String, DataError> {
        self.fetch_with_retry(ticker, window)
    }
}
