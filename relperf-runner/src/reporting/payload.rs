//! Chart payload: the JSON object embedded in the report page.
//!
//! Field names follow Chart.js dataset conventions so the page script can
//! hand `datasets` straight to the chart.

use relperf_core::data::Universe;
use relperf_core::domain::display_name;
use relperf_core::RelativeSeries;
use serde::{Deserialize, Serialize};

/// Decimal places kept for ratios in the payload.
pub const RATIO_DECIMALS: i32 = 4;

/// Round a ratio for display. Computation always uses full precision.
pub fn round_ratio(ratio: f64) -> f64 {
    let scale = 10f64.powi(RATIO_DECIMALS);
    (ratio * scale).round() / scale
}

/// Non-empty list of line colors, assigned cyclically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<String>);

impl Palette {
    /// `None` when `colors` is empty.
    pub fn new(colors: Vec<String>) -> Option<Self> {
        (!colors.is_empty()).then_some(Self(colors))
    }

    pub fn color(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// ISO-8601 date.
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub border_color: String,
    pub background_color: String,
    pub fill: bool,
    pub data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub datasets: Vec<Dataset>,
    pub y_title: String,
}

impl ChartPayload {
    /// One dataset per relative series, in the order given.
    ///
    /// Labels come from the universe (raw ticker when unknown). Colors are
    /// picked by the ticker's position in the universe so a ticker keeps its
    /// color across runs; tickers outside the universe use their position in
    /// `relative` instead.
    pub fn assemble(
        relative: &[RelativeSeries],
        universe: &Universe,
        palette: &Palette,
        y_title: impl Into<String>,
    ) -> Self {
        let datasets = relative
            .iter()
            .enumerate()
            .map(|(i, series)| {
                let slot = universe.position(&series.ticker).unwrap_or(i);
                let color = palette.color(slot).to_string();
                Dataset {
                    label: display_name(&universe.instruments, &series.ticker).to_string(),
                    border_color: color.clone(),
                    background_color: color,
                    fill: false,
                    data: series
                        .points
                        .iter()
                        .map(|p| ChartPoint {
                            x: p.date.format("%Y-%m-%d").to_string(),
                            y: round_ratio(p.ratio),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            datasets,
            y_title: y_title.into(),
        }
    }

    /// Pretty-printed JSON, as embedded in the page.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
