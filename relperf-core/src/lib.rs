//! relperf core: instruments, price-series acquisition, and relative performance.
//!
//! This crate holds the logic of the pipeline:
//! - Domain types (instruments)
//! - Provider CSV parsing with per-row skip reporting
//! - Source resolution (sample directory, live fetch, cache fallback, mirroring)
//! - Relative-performance computation against a base date

pub mod data;
pub mod domain;
pub mod relative;

pub use relative::{compute_relative, RelativeError, RelativePoint, RelativeSeries, RelativeSet};
