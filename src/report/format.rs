//! Terminal tables.
//!
//! Formatting lives here so pipeline code only returns data and output changes
//! stay in one place.

use std::path::Path;

use crate::data::FetchOutcome;
use crate::domain::Series;
use crate::io::LoadedSeries;

/// Loaded vs. windowed counts and the plotted range of every series.
pub fn format_chart_summary(loaded: &[LoadedSeries], aligned: &[Series], output: &Path) -> String {
    let mut out = String::new();
    out.push_str("=== sai - chart ===\n");
    push_row(
        &mut out,
        format!(
            "{:<20} {:>6} {:>6} {:>7} {:<10} {:<10} {:>10} {:>10}",
            "series", "rows", "nulls", "window", "first", "last", "min", "max"
        ),
    );
    push_row(
        &mut out,
        format!(
            "{:-<20} {:-<6} {:-<6} {:-<7} {:-<10} {:-<10} {:-<10} {:-<10}",
            "", "", "", "", "", "", "", ""
        ),
    );

    for (l, s) in loaded.iter().zip(aligned) {
        let (min, max) = match s.value_range() {
            Some((lo, hi)) => (format!("{lo:.2}"), format!("{hi:.2}")),
            None => ("-".to_string(), "-".to_string()),
        };
        let flag = if l.all_null { "  (all null)" } else { "" };
        push_row(
            &mut out,
            format!(
                "{:<20} {:>6} {:>6} {:>7} {:<10} {:<10} {:>10} {:>10}{flag}",
                truncate(&s.name, 20),
                l.rows_read,
                l.null_values,
                s.len(),
                fmt_date(s.first_date()),
                fmt_date(s.last_date()),
                min,
                max,
            ),
        );
    }

    out.push_str(&format!("\nChart written to {}\n", output.display()));
    out
}

/// One line per source: rows written or the error category.
pub fn format_fetch_summary(outcomes: &[FetchOutcome]) -> String {
    let mut out = String::new();
    out.push_str("=== sai - fetch ===\n");
    push_row(
        &mut out,
        format!(
            "{:<20} {:<8} {:>8} {:>8} {:>8}  {}",
            "source", "status", "received", "dropped", "written", "output"
        ),
    );
    push_row(
        &mut out,
        format!("{:-<20} {:-<8} {:-<8} {:-<8} {:-<8}  {:-<6}", "", "", "", "", "", ""),
    );

    for o in outcomes {
        let row = match &o.result {
            Ok(r) => format!(
                "{:<20} {:<8} {:>8} {:>8} {:>8}  {}",
                truncate(&o.source, 20),
                "ok",
                r.rows_received,
                r.rows_dropped,
                r.rows_written,
                r.output_path.display()
            ),
            Err(e) => format!(
                "{:<20} {:<8} {:>8} {:>8} {:>8}  {e}",
                truncate(&o.source, 20),
                e.category(),
                "-",
                "-",
                "-"
            ),
        };
        push_row(&mut out, row);
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        out.push_str(&format!("\n{failed} of {} source(s) failed.\n", outcomes.len()));
    }
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FetchError, FetchReport};
    use crate::domain::Observation;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn chart_summary_lists_each_series() {
        let series = Series::new(
            "Brent_Oil_USD",
            vec![
                Observation::new(d(2020, 3, 31), Some(32.5)),
                Observation::new(d(2020, 4, 30), Some(18.25)),
            ],
        );
        let loaded = vec![LoadedSeries {
            series: series.clone(),
            source: PathBuf::from("brent_crude_oil_prices.csv"),
            rows_read: 44,
            rows_skipped: 0,
            null_values: 1,
            all_null: false,
        }];

        let text = format_chart_summary(&loaded, &[series], Path::new("out.html"));
        let row = text.lines().find(|l| l.starts_with("Brent_Oil_USD")).unwrap();
        assert!(row.contains("44"));
        assert!(row.contains("2020-03-31"));
        assert!(row.contains("18.25"));
        assert!(row.contains("32.50"));
        assert!(text.ends_with("Chart written to out.html\n"));
    }

    #[test]
    fn fetch_summary_shows_failures() {
        let outcomes = vec![
            FetchOutcome {
                source: "Brent crude oil".to_string(),
                result: Ok(FetchReport {
                    source: "Brent crude oil".to_string(),
                    output_path: PathBuf::from("brent_crude_oil_prices.csv"),
                    rows_received: 10,
                    rows_dropped: 1,
                    rows_outside_window: 2,
                    rows_written: 7,
                }),
            },
            FetchOutcome {
                source: "South Africa PPI".to_string(),
                result: Err(FetchError::Http {
                    status: 403,
                    url: "https://example.invalid".to_string(),
                }),
            },
        ];

        let text = format_fetch_summary(&outcomes);
        assert!(text.lines().any(|l| l.starts_with("Brent crude oil") && l.contains(" ok ")));
        assert!(text.lines().any(|l| l.starts_with("South Africa PPI") && l.contains("http")));
        assert!(text.contains("1 of 2 source(s) failed."));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
