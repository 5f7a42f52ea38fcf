//! Price-data acquisition: providers, cache directories, parsing, resolution.

pub mod cache;
pub mod parse;
pub mod provider;
pub mod resolve;
pub mod universe;
pub mod yahoo;

pub use cache::{CacheError, CachePrecedence, DocumentCache};
pub use parse::{parse_series, ParsedSeries, PriceSeries, SkipReason, SkippedRow};
pub use provider::{
    DataError, DocumentSource, FetchWindow, PriceProvider, RawDocument, ResolveProgress,
    SilentProgress, StdoutProgress,
};
pub use resolve::{resolve_all, resolve_document, ResolveError, ResolvedSeries, SourcePlan};
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooProvider;
