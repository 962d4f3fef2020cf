//! Series alignment: sorting, windowing and the optional outer-join frame.
//!
//! Alignment is visual: every series is sorted and truncated to the same window
//! independently, and the renderer puts them on a shared x axis. Nothing is
//! interpolated or gap-filled.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;

use crate::domain::{DateWindow, Observation, Series};

pub mod resample;

pub use resample::resample_mean;

/// Sort ascending by date (stable) and collapse duplicate dates, keeping the
/// last occurrence. Returns the number of rows dropped as duplicates.
pub fn sort_by_date(series: &mut Series) -> usize {
    series.points.sort_by_key(|p| p.date);

    let before = series.points.len();
    let mut deduped: Vec<Observation> = Vec::with_capacity(before);
    for p in series.points.drain(..) {
        match deduped.last_mut() {
            Some(last) if last.date == p.date => *last = p,
            _ => deduped.push(p),
        }
    }
    series.points = deduped;
    before - series.points.len()
}

/// Rows whose date falls inside the inclusive window, order preserved.
pub fn window(series: &Series, window: &DateWindow) -> Series {
    Series::new(
        series.name.clone(),
        series
            .points
            .iter()
            .filter(|p| window.contains(p.date))
            .copied()
            .collect(),
    )
}

/// Sort each series, then truncate it to `date_window`.
pub fn align(series: Vec<Series>, date_window: &DateWindow) -> Vec<Series> {
    series
        .into_iter()
        .map(|mut s| {
            let dropped = sort_by_date(&mut s);
            if dropped > 0 {
                warn!("{}: collapsed {dropped} duplicate date(s), keeping the last value", s.name);
            }
            window(&s, date_window)
        })
        .collect()
}

/// Outer join of several series on the union of their dates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFrame {
    pub columns: Vec<String>,
    pub rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

impl AlignedFrame {
    pub fn outer_join(series: &[Series]) -> Self {
        let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for (col, s) in series.iter().enumerate() {
            for p in &s.points {
                let row = rows.entry(p.date).or_insert_with(|| vec![None; series.len()]);
                row[col] = p.value;
            }
        }

        Self {
            columns: series.iter().map(|s| s.name.clone()).collect(),
            rows: rows.into_iter().collect(),
        }
    }

    /// Rows where every column has a value.
    pub fn complete_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|(_, values)| values.iter().all(Option::is_some))
            .count()
    }
}
