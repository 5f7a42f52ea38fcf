//! Serializable chart configuration.
//!
//! Every field has a default reproducing the built-in Malaysian banks chart,
//! so a config file only needs the keys it overrides:
//!
//! ```toml
//! base_date = "2024-07-01"
//! title = "Top 10 Malaysian Banks Performance with base 1 Jul 2024"
//!
//! [schedule]
//! utc_offset_hours = 8
//! not_before_hour = 20
//! ```

use chrono::{FixedOffset, NaiveDate};
use relperf_core::data::{Universe, UniverseError};
use relperf_core::domain::Instrument;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid instrument list: {0}")]
    Universe(#[from] UniverseError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tableau 10, assigned cyclically by instrument position.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Complete configuration for one chart run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Date every series is normalized against.
    pub base_date: NaiveDate,

    /// Page title and heading. Derived from the base date when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Line colors, reused cyclically.
    pub palette: Vec<String>,

    /// HTTP timeout for each live fetch.
    pub timeout_secs: u64,

    /// When unattended runs are allowed to refresh the chart.
    pub schedule: ScheduleConfig,

    /// Tracked instruments, in resolution and color order.
    pub instruments: Vec<Instrument>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let base_date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or_default();
        Self {
            base_date,
            title: None,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            timeout_secs: 30,
            schedule: ScheduleConfig::default(),
            instruments: Universe::malaysian_banks().instruments,
        }
    }
}

impl ChartConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.universe()?;
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        self.schedule.validate()
    }

    /// The instrument list as a validated universe.
    pub fn universe(&self) -> Result<Universe, ConfigError> {
        Ok(Universe::new(self.instruments.clone())?)
    }

    /// Page title, e.g. "Top 10 Malaysian Banks Performance with base 1 Jul 2024".
    pub fn title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!(
                "Top 10 Malaysian Banks Performance with base {}",
                display_date(self.base_date)
            ),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Y axis caption, e.g. "Relative Price (1 Jul 2024 = 1.0)".
    pub fn y_title(&self) -> String {
        format!("Relative Price ({} = 1.0)", display_date(self.base_date))
    }
}

/// Schedule guard settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Offset of the local market clock from UTC (Singapore/Kuala Lumpur: +8).
    pub utc_offset_hours: i32,
    /// Earliest local hour (0-23) a weekday refresh may run.
    pub not_before_hour: u32,
    /// Skip Saturdays and Sundays.
    pub skip_weekends: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            not_before_hour: 20,
            skip_weekends: true,
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.not_before_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "schedule.not_before_hour must be 0-23, got {}",
                self.not_before_hour
            )));
        }
        self.offset()?;
        Ok(())
    }

    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "schedule.utc_offset_hours out of range: {}",
                self.utc_offset_hours
            ))
        })
    }
}

/// "1 Jul 2024" style date used in titles and captions.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}
