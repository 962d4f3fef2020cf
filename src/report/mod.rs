//! Plain-text run summaries printed after `fetch` and `chart`.

pub mod format;

pub use format::{format_chart_summary, format_fetch_summary};
