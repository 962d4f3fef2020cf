//! Built-in chart configurations.
//!
//! A preset turns a data directory and a date window into the series to load
//! and the chart to draw from them.

use std::path::Path;

use clap::ValueEnum;

use crate::data::sources::{BRENT_OUTPUT_FILE, PPI_OUTPUT_FILE};
use crate::domain::{
    AxisSlot, AxisSpec, ChartSpec, DashStyle, DateWindow, Frequency, Rgb, SeriesSpec, TraceSpec,
};
use crate::error::ConfigError;

pub const CPI_FILE: &str = "sa_cpi_monthly_yoy.csv";
pub const USD_ZAR_FILE: &str = "USD_ZAR Historical Data.csv";
pub const EUR_ZAR_FILE: &str = "EUR_ZAR Historical Data.csv";

/// Date format of the exchange-rate exports.
const FX_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartPreset {
    /// CPI, PPI, Brent crude and USD/EUR against ZAR on four axes.
    Indicators,
    /// ZAR/USD and ZAR/EUR (reciprocal rates) against CPI on two axes.
    ZarCpi,
}

/// Series to load plus the chart that draws them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub series: Vec<SeriesSpec>,
    pub chart: ChartSpec,
}

impl ChartPreset {
    pub fn plan(
        self,
        data_dir: &Path,
        window: &DateWindow,
        width: u32,
        height: u32,
    ) -> Result<ChartPlan, ConfigError> {
        let period = window_label(window);
        let plan = match self {
            ChartPreset::Indicators => ChartPlan {
                series: vec![
                    cpi(data_dir)?,
                    fx(data_dir, USD_ZAR_FILE, "USD_ZAR", false)?,
                    fx(data_dir, EUR_ZAR_FILE, "EUR_ZAR", false)?,
                    SeriesSpec::builder(data_dir.join(PPI_OUTPUT_FILE))
                        .date_column("Data_Date")
                        .value_column("Actual_Percent")
                        .output_name("PPI_Actual_Percent")
                        .build()?,
                    SeriesSpec::builder(data_dir.join(BRENT_OUTPUT_FILE))
                        .value_column("Price_USD_per_Barrel")
                        .output_name("Brent_Oil_USD")
                        .resample(Frequency::MonthEnd)
                        .build()?,
                ],
                chart: ChartSpec {
                    title: format!(
                        "South African Economic Indicators: CPI, PPI, Oil & Key Exchange Rates ({period})"
                    ),
                    x_title: "Date".to_string(),
                    axes: vec![
                        axis(AxisSlot::Left, "Exchange Rate (ZAR)"),
                        axis(AxisSlot::Right, "CPI YoY Change (%)"),
                        axis(AxisSlot::LeftOuter, "Brent Crude (USD/Barrel)"),
                        axis(AxisSlot::RightOuter, "PPI Change (%)"),
                    ],
                    traces: vec![
                        trace("USD_ZAR", "USD/ZAR Exchange Rate", Rgb(0, 191, 255), DashStyle::Solid, 2, AxisSlot::Left),
                        trace("EUR_ZAR", "EUR/ZAR Exchange Rate", Rgb(60, 179, 113), DashStyle::Dash, 2, AxisSlot::Left),
                        trace(
                            "Brent_Oil_USD",
                            "Brent Crude Oil (USD/Barrel)",
                            Rgb(139, 69, 19),
                            DashStyle::Dot,
                            3,
                            AxisSlot::LeftOuter,
                        ),
                        trace("CPI_YOY_Change", "SA CPI YoY Change (%)", Rgb(250, 128, 114), DashStyle::Dot, 3, AxisSlot::Right),
                        trace(
                            "PPI_Actual_Percent",
                            "SA PPI Actual Change (%)",
                            Rgb(148, 0, 211),
                            DashStyle::DashDot,
                            3,
                            AxisSlot::RightOuter,
                        ),
                    ],
                    width,
                    height,
                },
            },
            ChartPreset::ZarCpi => ChartPlan {
                series: vec![
                    fx(data_dir, USD_ZAR_FILE, "ZAR_USD", true)?,
                    fx(data_dir, EUR_ZAR_FILE, "ZAR_EUR", true)?,
                    cpi(data_dir)?,
                ],
                chart: ChartSpec {
                    title: format!("South African CPI YoY Change, ZAR/USD, and ZAR/EUR Exchange Rates ({period})"),
                    x_title: "Date".to_string(),
                    axes: vec![
                        axis(AxisSlot::Left, "Exchange Rate (ZAR/USD, ZAR/EUR)"),
                        axis(AxisSlot::Right, "CPI YoY Change (%)"),
                    ],
                    traces: vec![
                        trace("ZAR_USD", "ZAR/USD Exchange Rate", Rgb(0, 0, 255), DashStyle::Solid, 2, AxisSlot::Left),
                        trace("ZAR_EUR", "ZAR/EUR Exchange Rate", Rgb(0, 128, 0), DashStyle::Solid, 2, AxisSlot::Left),
                        trace("CPI_YOY_Change", "CPI YoY Change (%)", Rgb(255, 0, 0), DashStyle::Solid, 2, AxisSlot::Right),
                    ],
                    width,
                    height,
                },
            },
        };
        Ok(plan)
    }
}

/// `Jan 2015 - Mar 2025`
pub fn window_label(window: &DateWindow) -> String {
    format!(
        "{} - {}",
        window.start().format("%b %Y"),
        window.end().format("%b %Y")
    )
}

/// CPI is stored as a fraction (0.044); charts show percent.
fn cpi(data_dir: &Path) -> Result<SeriesSpec, ConfigError> {
    SeriesSpec::builder(data_dir.join(CPI_FILE))
        .value_column("CPI_YOY_Change")
        .output_name("CPI_YOY_Change")
        .multiply(100.0)
        .build()
}

fn fx(data_dir: &Path, file: &str, name: &str, reciprocal: bool) -> Result<SeriesSpec, ConfigError> {
    SeriesSpec::builder(data_dir.join(file))
        .value_column("Price")
        .output_name(name)
        .date_format(FX_DATE_FORMAT)
        .resample(Frequency::MonthEnd)
        .reciprocal(reciprocal)
        .build()
}

fn axis(slot: AxisSlot, title: &str) -> AxisSpec {
    AxisSpec {
        slot,
        title: title.to_string(),
    }
}

fn trace(series: &str, label: &str, color: Rgb, dash: DashStyle, width: u32, axis: AxisSlot) -> TraceSpec {
    TraceSpec {
        series: series.to_string(),
        label: label.to_string(),
        color,
        dash,
        width,
        axis,
    }
}
