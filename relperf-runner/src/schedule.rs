//! Schedule guard for unattended runs.
//!
//! The chart refreshes after the local market closes on weekdays. Outside
//! that window a run is a deliberate no-op, not a failure.

use crate::config::{ConfigError, ScheduleConfig};
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use std::fmt;

/// Why a run was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSkip {
    Weekend(Weekday),
    TooEarly { local_hour: u32, not_before_hour: u32 },
}

impl fmt::Display for ScheduleSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleSkip::Weekend(day) => {
                write!(f, "Weekend detected ({day}). Skipping refresh.")
            }
            ScheduleSkip::TooEarly {
                not_before_hour, ..
            } => write!(
                f,
                "It is not yet {not_before_hour:02}:00 local market time. Skipping refresh."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDecision {
    Run,
    Skip(ScheduleSkip),
}

/// Decide whether a run at `now` may refresh the chart.
pub fn check_schedule(
    now: DateTime<Utc>,
    config: &ScheduleConfig,
) -> Result<ScheduleDecision, ConfigError> {
    let local = now.with_timezone(&config.offset()?);

    let weekday = local.weekday();
    if config.skip_weekends && matches!(weekday, Weekday::Sat | Weekday::Sun) {
        return Ok(ScheduleDecision::Skip(ScheduleSkip::Weekend(weekday)));
    }

    if local.hour() < config.not_before_hour {
        return Ok(ScheduleDecision::Skip(ScheduleSkip::TooEarly {
            local_hour: local.hour(),
            not_before_hour: config.not_before_hour,
        }));
    }

    Ok(ScheduleDecision::Run)
}
