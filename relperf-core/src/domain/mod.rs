//! Domain types for relperf

pub mod instrument;

pub use instrument::{display_name, Instrument};
