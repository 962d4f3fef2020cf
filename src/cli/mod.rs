//! Command-line parsing for the South African indicator tools.
//!
//! Parsing and dispatch stay separate from the loading, fetching and rendering code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::app::presets::ChartPreset;
use crate::data::{DEFAULT_TIMEOUT, SourceKind};

pub const DEFAULT_START: &str = "2015-01-01";
pub const DEFAULT_END: &str = "2025-03-31";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sai",
    version,
    about = "South African economic indicators: fetch source data and chart it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download Brent crude and SA PPI series and write them to CSV.
    ///
    /// API keys are read from ALPHAVANTAGE_API_KEY and TRADING_ECONOMICS_API_KEY
    /// (a `.env` file in the working directory is honoured).
    Fetch(FetchArgs),
    /// Load the indicator CSVs, align them and write an interactive HTML chart.
    Chart(ChartArgs),
}

/// Inclusive date window shared by both subcommands.
#[derive(Debug, Args, Clone)]
pub struct WindowArgs {
    /// First date kept (YYYY-MM-DD).
    #[arg(long, default_value = DEFAULT_START)]
    pub start: NaiveDate,

    /// Last date kept (YYYY-MM-DD).
    #[arg(long, default_value = DEFAULT_END)]
    pub end: NaiveDate,
}

#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Directory the CSV files are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// HTTP timeout per request, in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Fetch only these sources (repeatable). Defaults to all.
    #[arg(long = "source", value_enum)]
    pub sources: Vec<SourceKind>,

    /// Exit with an error if any source fails.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Directory holding the input CSV files.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// HTML file to write.
    #[arg(short, long, default_value = "sa_economic_indicators.html")]
    pub output: PathBuf,

    /// Which chart to draw.
    #[arg(long, value_enum, default_value_t = ChartPreset::Indicators)]
    pub preset: ChartPreset,

    /// Also write the windowed series, outer-joined on date, to this CSV.
    #[arg(long = "export-aligned", value_name = "CSV")]
    pub export_aligned: Option<PathBuf>,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 1400)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 700)]
    pub height: u32,
}
