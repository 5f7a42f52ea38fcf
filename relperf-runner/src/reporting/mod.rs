//! Report assembly: chart payload, HTML page, and output file.

pub mod export;
pub mod html;
pub mod payload;

pub use export::write_page;
pub use html::{format_updated_at, render_html};
pub use payload::{round_ratio, ChartPayload, ChartPoint, Dataset, Palette};
