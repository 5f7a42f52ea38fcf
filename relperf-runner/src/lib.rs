//! relperf runner: configuration, schedule guard, and the report pipeline.
//!
//! This crate builds on `relperf-core` to provide:
//! - TOML chart configuration with built-in defaults
//! - The weekday-evening schedule guard
//! - Chart payload assembly and the self-contained HTML page
//! - The end-to-end pipeline used by the CLI

pub mod config;
pub mod pipeline;
pub mod reporting;
pub mod schedule;

pub use config::{ChartConfig, ConfigError, ScheduleConfig};
pub use pipeline::{build_report, run_to_file, PipelineError, Report, SourceCounts, SourceRecord};
pub use reporting::{ChartPayload, Palette};
pub use schedule::{check_schedule, ScheduleDecision, ScheduleSkip};
