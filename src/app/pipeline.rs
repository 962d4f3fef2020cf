//! Shared workflows behind the `fetch` and `chart` subcommands.
//!
//! Chart: load every series -> align to the window -> render SVG -> wrap in HTML.
//! Fetch: one independent download per planned source; a failure is logged and
//! the run moves on to the next source.

use std::path::Path;

use log::{error, info};

use crate::app::presets::ChartPlan;
use crate::data::{FetchError, FetchOutcome, RemoteSource, SourceKind, Transport, fetch_source};
use crate::domain::{DateWindow, Series};
use crate::error::AppError;
use crate::io::{LoadedSeries, load_all};
use crate::plot::{RenderedChart, render_html, render_svg};
use crate::series::align;

/// All computed outputs of a single `sai chart` run.
#[derive(Debug, Clone)]
pub struct ChartRun {
    pub loaded: Vec<LoadedSeries>,
    pub aligned: Vec<Series>,
    pub chart: RenderedChart,
    pub html: String,
}

/// Execute the chart pipeline. Any loader failure aborts the run.
pub fn run_chart(plan: &ChartPlan, window: &DateWindow) -> Result<ChartRun, AppError> {
    let loaded = load_all(&plan.series)?;
    let aligned = align(loaded.iter().map(|l| l.series.clone()).collect(), window);

    for s in aligned.iter().filter(|s| s.is_empty()) {
        info!("{}: no observations between {} and {}", s.name, window.start(), window.end());
    }

    let chart = render_svg(&aligned, &plan.chart, window)?;
    let html = render_html(&chart, &plan.chart, &aligned)?;

    Ok(ChartRun {
        loaded,
        aligned,
        chart,
        html,
    })
}

/// A source ready to fetch, or the reason it cannot be.
#[derive(Debug)]
pub struct PlannedFetch {
    pub name: String,
    pub source: Result<RemoteSource, FetchError>,
}

/// Resolve API keys for `kinds` through `key_lookup` (the environment in production).
pub fn plan_fetch(
    kinds: &[SourceKind],
    out_dir: &Path,
    key_lookup: impl Fn(&str) -> Option<String>,
) -> Vec<PlannedFetch> {
    kinds
        .iter()
        .map(|kind| {
            let var = kind.key_var();
            let source = match key_lookup(var).filter(|k| !k.trim().is_empty()) {
                Some(key) => Ok(kind.descriptor(key.trim(), out_dir)),
                None => Err(FetchError::MissingApiKey { var: var.to_string() }),
            };
            PlannedFetch {
                name: kind.name().to_string(),
                source,
            }
        })
        .collect()
}

/// Fetch every planned source in order.
pub fn run_fetch(transport: &dyn Transport, planned: Vec<PlannedFetch>, window: &DateWindow) -> Vec<FetchOutcome> {
    planned
        .into_iter()
        .map(|p| {
            let result = p.source.and_then(|source| fetch_source(transport, &source, window));
            if let Err(err) = &result {
                error!("{}: {err}", p.name);
            }
            FetchOutcome {
                source: p.name,
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::presets::ChartPreset;
    use crate::data::HttpResponse;
    use crate::domain::{AxisSlot, AxisSpec, ChartSpec, DashStyle, Rgb, SeriesSpec, TraceSpec};
    use chrono::{Months, NaiveDate};
    use std::fs;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn default_window() -> DateWindow {
        DateWindow::new(d(2015, 1, 1), d(2025, 3, 31)).unwrap()
    }

    fn cpi_plan(dir: &Path) -> ChartPlan {
        ChartPlan {
            series: vec![
                SeriesSpec::builder(dir.join("sa_cpi_monthly_yoy.csv"))
                    .value_column("CPI_YOY_Change")
                    .output_name("CPI_YOY_Change")
                    .multiply(100.0)
                    .build()
                    .unwrap(),
            ],
            chart: ChartSpec {
                title: "CPI".to_string(),
                x_title: "Date".to_string(),
                axes: vec![AxisSpec {
                    slot: AxisSlot::Right,
                    title: "CPI YoY Change (%)".to_string(),
                }],
                traces: vec![TraceSpec {
                    series: "CPI_YOY_Change".to_string(),
                    label: "CPI".to_string(),
                    color: Rgb(255, 0, 0),
                    dash: DashStyle::Solid,
                    width: 2,
                    axis: AxisSlot::Right,
                }],
                width: 800,
                height: 400,
            },
        }
    }

    /// Month-end rows from 2014-06 through 2025-06, value 0.044 each.
    fn write_cpi_csv(dir: &Path) {
        let mut text = String::from("Date,CPI_YOY_Change\n");
        for i in 1..=133 {
            let month_end = d(2014, 6, 1)
                .checked_add_months(Months::new(i))
                .and_then(|first| first.pred_opt())
                .unwrap();
            text.push_str(&format!("{},0.044\n", month_end.format("%Y-%m-%d")));
        }
        fs::write(dir.join("sa_cpi_monthly_yoy.csv"), text).unwrap();
    }

    #[test]
    fn cpi_end_to_end_scales_and_windows() {
        let dir = TempDir::new().unwrap();
        write_cpi_csv(dir.path());

        let run = run_chart(&cpi_plan(dir.path()), &default_window()).unwrap();
        let cpi = &run.aligned[0];
        assert_eq!(cpi.len(), 123);
        assert_eq!(cpi.first_date(), Some(d(2015, 1, 31)));
        assert_eq!(cpi.last_date(), Some(d(2025, 3, 31)));
        assert!(cpi.points.iter().all(|p| (p.value.unwrap() - 4.4).abs() < 1e-9));

        assert_eq!(run.loaded[0].rows_read, 133);
        assert!(run.html.contains("<svg"));
        assert!(run.html.contains("CPI YoY Change (%)"));
    }

    #[test]
    fn missing_input_aborts_chart_run() {
        let dir = TempDir::new().unwrap();
        let plan = ChartPreset::Indicators
            .plan(dir.path(), &default_window(), 800, 400)
            .unwrap();
        let err = run_chart(&plan, &default_window()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("sa_cpi_monthly_yoy.csv"));
    }

    struct Canned(u16, &'static str);

    impl Transport for Canned {
        fn get(&self, _url: &str) -> Result<HttpResponse, FetchError> {
            Ok(HttpResponse {
                status: self.0,
                body: self.1.to_string(),
            })
        }
    }

    #[test]
    fn missing_key_is_reported_without_stopping_other_sources() {
        let dir = TempDir::new().unwrap();
        let planned = plan_fetch(&SourceKind::ALL, dir.path(), |var| {
            (var == "ALPHAVANTAGE_API_KEY").then(|| "KEY".to_string())
        });
        let transport = Canned(200, "timestamp,value\n2020-01-02,66.25\n");

        let outcomes = run_fetch(&transport, planned, &default_window());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_ok());
        assert!(matches!(
            &outcomes[1].result,
            Err(FetchError::MissingApiKey { var }) if var == "TRADING_ECONOMICS_API_KEY"
        ));
        assert!(dir.path().join("brent_crude_oil_prices.csv").exists());
        assert!(!dir.path().join("sa_ppi_data.csv").exists());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let planned = plan_fetch(&[SourceKind::Ppi], Path::new("."), |_| Some("  ".to_string()));
        assert!(matches!(planned[0].source, Err(FetchError::MissingApiKey { .. })));
    }

    #[test]
    fn server_error_is_isolated_per_source() {
        let dir = TempDir::new().unwrap();
        let planned = plan_fetch(&SourceKind::ALL, dir.path(), |_| Some("KEY".to_string()));
        let outcomes = run_fetch(&Canned(500, "oops"), planned, &default_window());
        assert!(outcomes.iter().all(|o| matches!(o.result, Err(FetchError::Http { status: 500, .. }))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
