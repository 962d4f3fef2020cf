//! Series-level domain types.
//!
//! A `Series` is the unit every stage passes around: the loader produces one
//! per input file, the aligner sorts and windows it, and the renderer draws it.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One dated observation. `value` is `None` when numeric coercion failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// A named, date-indexed sequence of observations for one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<Observation>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<Observation>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn non_null_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    /// True when the series has rows but none of them carry a value.
    pub fn is_all_null(&self) -> bool {
        !self.points.is_empty() && self.non_null_count() == 0
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).max()
    }

    /// Min/max over finite values, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in self.points.iter().filter_map(|p| p.value) {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if lo.is_finite() && hi.is_finite() {
            Some((lo, hi))
        } else {
            None
        }
    }

    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .iter()
            .rev()
            .find(|p| p.date == date)
            .and_then(|p| p.value)
    }
}

/// Inclusive `[start, end]` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Target frequency for mean resampling. Buckets are labelled with the last
/// calendar day of their period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    MonthEnd,
    QuarterEnd,
    YearEnd,
}

impl Frequency {
    /// The label date of the bucket containing `date`.
    pub fn bucket_end(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::MonthEnd => month_end(date.year(), date.month()),
            Frequency::QuarterEnd => {
                let quarter_last_month = ((date.month() - 1) / 3 + 1) * 3;
                month_end(date.year(), quarter_last_month)
            }
            Frequency::YearEnd => NaiveDate::from_ymd_opt(date.year(), 12, 31),
        }
    }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

/// Column selection descriptor for one input CSV.
///
/// Build it with [`SeriesSpec::builder`]; `build()` validates every field so the
/// loader never sees a half-configured spec.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub path: PathBuf,
    pub date_column: String,
    /// Column holding the values. `None` means "the only non-date column".
    pub value_column: Option<String>,
    /// Name of the resulting series. Falls back to the value column header.
    pub output_name: Option<String>,
    /// chrono `strftime` format for the date column; `None` tries common formats.
    pub date_format: Option<String>,
    pub resample: Option<Frequency>,
    pub multiplier: Option<f64>,
    /// Replace each value `x` with `1/x` before scaling (e.g. USD/ZAR -> ZAR/USD).
    pub reciprocal: bool,
}

impl SeriesSpec {
    pub const DEFAULT_DATE_COLUMN: &'static str = "Date";

    pub fn builder(path: impl Into<PathBuf>) -> SeriesSpecBuilder {
        SeriesSpecBuilder {
            spec: SeriesSpec {
                path: path.into(),
                date_column: Self::DEFAULT_DATE_COLUMN.to_string(),
                value_column: None,
                output_name: None,
                date_format: None,
                resample: None,
                multiplier: None,
                reciprocal: false,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct SeriesSpecBuilder {
    spec: SeriesSpec,
}

impl SeriesSpecBuilder {
    pub fn date_column(mut self, name: impl Into<String>) -> Self {
        self.spec.date_column = name.into();
        self
    }

    pub fn value_column(mut self, name: impl Into<String>) -> Self {
        self.spec.value_column = Some(name.into());
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.spec.output_name = Some(name.into());
        self
    }

    pub fn date_format(mut self, fmt: impl Into<String>) -> Self {
        self.spec.date_format = Some(fmt.into());
        self
    }

    pub fn resample(mut self, freq: Frequency) -> Self {
        self.spec.resample = Some(freq);
        self
    }

    pub fn multiply(mut self, factor: f64) -> Self {
        self.spec.multiplier = Some(factor);
        self
    }

    pub fn reciprocal(mut self, on: bool) -> Self {
        self.spec.reciprocal = on;
        self
    }

    pub fn build(self) -> Result<SeriesSpec, ConfigError> {
        let spec = self.spec;
        let invalid = |reason: &str| ConfigError::InvalidSpec {
            path: spec.path.display().to_string(),
            reason: reason.to_string(),
        };

        if spec.path.as_os_str().is_empty() {
            return Err(invalid("path is empty"));
        }
        if spec.date_column.trim().is_empty() {
            return Err(invalid("date column name is empty"));
        }
        if spec.value_column.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(invalid("value column name is empty"));
        }
        if spec.output_name.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(invalid("output name is empty"));
        }
        if spec.date_format.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(invalid("date format is empty"));
        }
        if let Some(m) = spec.multiplier {
            if !m.is_finite() || m == 0.0 {
                return Err(invalid("multiplier must be finite and non-zero"));
            }
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_rejects_inverted_range() {
        assert!(DateWindow::new(d(2025, 1, 1), d(2024, 1, 1)).is_err());
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 1)).unwrap();
        assert!(w.contains(d(2024, 1, 1)));
        assert!(!w.contains(d(2024, 1, 2)));
    }

    #[test]
    fn bucket_end_handles_leap_years_and_quarters() {
        assert_eq!(Frequency::MonthEnd.bucket_end(d(2024, 2, 10)), Some(d(2024, 2, 29)));
        assert_eq!(Frequency::MonthEnd.bucket_end(d(2023, 12, 1)), Some(d(2023, 12, 31)));
        assert_eq!(Frequency::QuarterEnd.bucket_end(d(2023, 5, 17)), Some(d(2023, 6, 30)));
        assert_eq!(Frequency::YearEnd.bucket_end(d(2023, 5, 17)), Some(d(2023, 12, 31)));
    }

    #[test]
    fn builder_validates_fields() {
        let spec = SeriesSpec::builder("cpi.csv")
            .value_column("CPI_YOY_Change")
            .multiply(100.0)
            .build()
            .unwrap();
        assert_eq!(spec.date_column, "Date");
        assert_eq!(spec.multiplier, Some(100.0));

        assert!(SeriesSpec::builder("x.csv").multiply(0.0).build().is_err());
        assert!(SeriesSpec::builder("x.csv").date_column(" ").build().is_err());
        assert!(SeriesSpec::builder("x.csv").output_name("").build().is_err());
        assert!(SeriesSpec::builder("").build().is_err());
    }

    #[test]
    fn all_null_requires_rows() {
        let empty = Series::new("x", vec![]);
        assert!(!empty.is_all_null());
        let nulls = Series::new("x", vec![Observation::new(d(2024, 1, 1), None)]);
        assert!(nulls.is_all_null());
        assert_eq!(nulls.value_range(), None);
    }
}
