use serde::{Deserialize, Serialize};

/// A tracked ticker and the name shown for it in the chart legend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Instrument {
    pub name: String,
    pub ticker: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }

    /// File name of this instrument's raw document inside a cache directory.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.ticker)
    }
}

/// Look up the display name for a ticker, falling back to the ticker itself.
pub fn display_name<'a>(instruments: &'a [Instrument], ticker: &'a str) -> &'a str {
    instruments
        .iter()
        .find(|i| i.ticker == ticker)
        .map(|i| i.name.as_str())
        .unwrap_or(ticker)
}
