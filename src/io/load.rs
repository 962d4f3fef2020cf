//! CSV series loader.
//!
//! Turns one heterogeneous CSV export (different column names, date formats and
//! frequencies) into a single named `Series`, following its `SeriesSpec`:
//!
//! - **Strict schema**: missing/ambiguous columns and unparseable dates are hard errors
//! - **Lenient values**: unparseable numbers become nulls; an all-null result only warns
//! - **Deterministic**: no inference beyond a fixed list of date formats

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{debug, warn};
use thiserror::Error;

use crate::domain::{Observation, Series, SeriesSpec};
use crate::io::dates::{parse_date, parse_number};
use crate::series::resample_mean;

/// Name used when neither `SeriesSpec::output_name` nor the header provides one.
pub const DEFAULT_VALUE_NAME: &str = "Value";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: '{}'", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("no data rows in '{}'", .path.display())]
    EmptyInput { path: PathBuf },

    #[error("column '{column}' not found in '{}' (columns: {})", .path.display(), .available.join(", "))]
    MissingColumn {
        path: PathBuf,
        column: String,
        available: Vec<String>,
    },

    #[error(
        "cannot pick a value column in '{}': expected exactly one non-date column, found [{}]",
        .path.display(),
        .candidates.join(", ")
    )]
    AmbiguousColumn { path: PathBuf, candidates: Vec<String> },

    #[error("invalid date '{value}' at line {line} of '{}'{}", .path.display(), format_hint(.format.as_deref()))]
    DateParse {
        path: PathBuf,
        line: usize,
        value: String,
        format: Option<String>,
    },

    #[error("failed to parse CSV '{}': {message}", .path.display())]
    Csv { path: PathBuf, message: String },

    #[error("failed to open '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

fn format_hint(format: Option<&str>) -> String {
    match format {
        Some(f) => format!(" (expected format '{f}')"),
        None => String::new(),
    }
}

impl LoadError {
    pub fn exit_code(&self) -> u8 {
        match self {
            LoadError::FileNotFound { .. }
            | LoadError::MissingColumn { .. }
            | LoadError::AmbiguousColumn { .. }
            | LoadError::Io { .. } => 2,
            LoadError::EmptyInput { .. } | LoadError::DateParse { .. } | LoadError::Csv { .. } => 3,
        }
    }
}

/// Loader output: the series plus what happened while producing it.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    pub source: PathBuf,
    /// Data rows read from the file (excluding the header).
    pub rows_read: usize,
    /// Rows skipped because their date cell was empty.
    pub rows_skipped: usize,
    /// Values that failed numeric coercion (before resampling).
    pub null_values: usize,
    /// Every value was null after coercion. Flagged, not fatal.
    pub all_null: bool,
}

/// Load one CSV file into a named series according to `spec`.
pub fn load_series(spec: &SeriesSpec) -> Result<LoadedSeries, LoadError> {
    let path = spec.path();
    if !path.is_file() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    let header_names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if header_names.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let records: Vec<StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| csv_error(path, e))?;
    if records.is_empty() {
        return Err(LoadError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let header_map = build_header_map(&header_names);
    let date_idx = *header_map
        .get(spec.date_column.as_str())
        .ok_or_else(|| missing_column(path, &spec.date_column, &header_names))?;

    let (value_idx, value_header) = resolve_value_column(spec, path, &header_map, &header_names, date_idx)?;

    let mut points = Vec::with_capacity(records.len());
    let mut rows_skipped = 0usize;
    let mut null_values = 0usize;

    for (idx, record) in records.iter().enumerate() {
        // Quoted fields may span lines, so prefer the reader's own position.
        let line = record.position().map_or(idx + 2, |pos| pos.line() as usize);
        let raw_date = record.get(date_idx).unwrap_or("");
        if raw_date.is_empty() {
            rows_skipped += 1;
            continue;
        }
        let date = parse_date(raw_date, spec.date_format.as_deref()).ok_or_else(|| LoadError::DateParse {
            path: path.to_path_buf(),
            line,
            value: raw_date.to_string(),
            format: spec.date_format.clone(),
        })?;

        let value = record.get(value_idx).and_then(parse_number);
        if value.is_none() {
            null_values += 1;
        }
        points.push(Observation::new(date, value));
    }

    if rows_skipped > 0 {
        debug!("{}: skipped {rows_skipped} row(s) with an empty date", path.display());
    }

    let all_null = !points.is_empty() && points.iter().all(|p| p.value.is_none());
    if all_null {
        warn!(
            "{}: column '{}' has no numeric values after coercion; the series is entirely null",
            path.display(),
            value_header
        );
    }

    apply_transforms(&mut points, spec);

    let points = match spec.resample {
        Some(freq) => resample_mean(&points, freq),
        None => points,
    };

    let name = resolve_output_name(spec, &value_header);

    Ok(LoadedSeries {
        series: Series::new(name, points),
        source: path.to_path_buf(),
        rows_read: records.len(),
        rows_skipped,
        null_values,
        all_null,
    })
}

/// Load every spec in order, stopping at the first failure.
pub fn load_all(specs: &[SeriesSpec]) -> Result<Vec<LoadedSeries>, LoadError> {
    specs.iter().map(load_series).collect()
}

fn apply_transforms(points: &mut [Observation], spec: &SeriesSpec) {
    if spec.reciprocal {
        for p in points.iter_mut() {
            p.value = p.value.and_then(|v| if v == 0.0 { None } else { Some(1.0 / v) });
        }
    }
    if let Some(factor) = spec.multiplier {
        for p in points.iter_mut() {
            p.value = p.value.map(|v| v * factor);
        }
    }
}

fn resolve_value_column(
    spec: &SeriesSpec,
    path: &Path,
    header_map: &HashMap<&str, usize>,
    header_names: &[String],
    date_idx: usize,
) -> Result<(usize, String), LoadError> {
    if let Some(column) = &spec.value_column {
        let idx = *header_map
            .get(column.as_str())
            .ok_or_else(|| missing_column(path, column, header_names))?;
        return Ok((idx, column.clone()));
    }

    let candidates: Vec<(usize, &String)> = header_names
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_idx)
        .collect();

    match candidates.as_slice() {
        [(idx, name)] => Ok((*idx, (*name).clone())),
        _ => Err(LoadError::AmbiguousColumn {
            path: path.to_path_buf(),
            candidates: candidates.iter().map(|(_, n)| (*n).clone()).collect(),
        }),
    }
}

fn resolve_output_name(spec: &SeriesSpec, value_header: &str) -> String {
    if let Some(name) = &spec.output_name {
        return name.clone();
    }
    if value_header.is_empty() {
        DEFAULT_VALUE_NAME.to_string()
    } else {
        value_header.to_string()
    }
}

fn build_header_map(names: &[String]) -> HashMap<&str, usize> {
    // First occurrence wins for duplicated headers.
    let mut map = HashMap::new();
    for (idx, name) in names.iter().enumerate() {
        map.entry(name.as_str()).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM; left
    // in place it would make "Date" look missing.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn missing_column(path: &Path, column: &str, header_names: &[String]) -> LoadError {
    LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
        available: header_names.to_vec(),
    }
}

fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    LoadError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write_csv(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let spec = SeriesSpec::builder("/definitely/not/here.csv").build().unwrap();
        let err = load_series(&spec).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_and_header_only_files_are_empty_input() {
        let dir = TempDir::new().unwrap();
        for (name, body) in [("empty.csv", ""), ("header.csv", "Date,Price\n")] {
            let path = write_csv(&dir, name, body);
            let spec = SeriesSpec::builder(path).value_column("Price").build().unwrap();
            let err = load_series(&spec).unwrap_err();
            assert!(matches!(err, LoadError::EmptyInput { .. }), "{name}: {err}");
        }
    }

    #[test]
    fn missing_date_or_value_column_aborts() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "x.csv", "Day,Price\n2024-01-01,1\n");
        let spec = SeriesSpec::builder(&path).value_column("Price").build().unwrap();
        match load_series(&spec).unwrap_err() {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "Date"),
            other => panic!("unexpected error: {other}"),
        }

        let spec = SeriesSpec::builder(&path)
            .date_column("Day")
            .value_column("Close")
            .build()
            .unwrap();
        match load_series(&spec).unwrap_err() {
            LoadError::MissingColumn { column, available, .. } => {
                assert_eq!(column, "Close");
                assert_eq!(available, vec!["Day".to_string(), "Price".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unnamed_value_column_requires_single_candidate() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "two.csv", "Date,Open,Close\n2024-01-01,1,2\n");
        let spec = SeriesSpec::builder(&path).build().unwrap();
        assert!(matches!(
            load_series(&spec).unwrap_err(),
            LoadError::AmbiguousColumn { .. }
        ));

        let path = write_csv(&dir, "one.csv", "\u{feff}Date,Close\n2024-01-01,2\n");
        let spec = SeriesSpec::builder(&path).build().unwrap();
        let loaded = load_series(&spec).unwrap();
        assert_eq!(loaded.series.name, "Close");
        assert_eq!(loaded.series.points, vec![Observation::new(d(2024, 1, 1), Some(2.0))]);
    }

    #[test]
    fn unparseable_date_is_a_hard_error_with_line() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "fx.csv", "Date,Price\n01/02/2024,18.1\n2024-01-03,18.2\n");
        let spec = SeriesSpec::builder(&path)
            .value_column("Price")
            .date_format("%m/%d/%Y")
            .build()
            .unwrap();
        match load_series(&spec).unwrap_err() {
            LoadError::DateParse { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "2024-01-03");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn date_error_line_accounts_for_multiline_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "notes.csv",
            "Date,Price,Note\n2024-01-01,1,\"first\nsecond\"\nbogus,2,x\n",
        );
        let spec = SeriesSpec::builder(&path).value_column("Price").build().unwrap();
        match load_series(&spec).unwrap_err() {
            LoadError::DateParse { line, value, .. } => {
                assert_eq!(line, 4);
                assert_eq!(value, "bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fully_non_numeric_column_warns_but_loads() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "bad.csv", "Date,Price\n2024-01-01,n/a\n2024-02-01,-\n");
        let spec = SeriesSpec::builder(&path).value_column("Price").build().unwrap();
        let loaded = load_series(&spec).unwrap();
        assert!(loaded.all_null);
        assert_eq!(loaded.null_values, 2);
        assert_eq!(loaded.series.len(), 2);
        assert!(loaded.series.is_all_null());
    }

    #[test]
    fn transforms_apply_reciprocal_then_scale_then_resample() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "usd.csv",
            "Date,Price,Open\n\
             01/30/2024,20,0\n\
             01/31/2024,10,0\n\
             02/01/2024,0,0\n\
             02/02/2024,4,0\n\
             ,5,0\n",
        );
        let spec = SeriesSpec::builder(&path)
            .value_column("Price")
            .output_name("ZAR_USD")
            .date_format("%m/%d/%Y")
            .reciprocal(true)
            .multiply(100.0)
            .resample(Frequency::MonthEnd)
            .build()
            .unwrap();
        let loaded = load_series(&spec).unwrap();
        assert_eq!(loaded.rows_read, 5);
        assert_eq!(loaded.rows_skipped, 1);
        assert_eq!(loaded.series.name, "ZAR_USD");
        // January: mean(100/20, 100/10) = 7.5; February: 1/0 is null, so 100/4.
        let points = &loaded.series.points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d(2024, 1, 31));
        assert!((points[0].value.unwrap() - 7.5).abs() < 1e-9);
        assert_eq!(points[1].date, d(2024, 2, 29));
        assert!((points[1].value.unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn load_all_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let good = write_csv(&dir, "good.csv", "Date,Value\n2024-01-01,1\n");
        let specs = vec![
            SeriesSpec::builder(&good).build().unwrap(),
            SeriesSpec::builder(dir.path().join("missing.csv")).build().unwrap(),
        ];
        assert!(matches!(load_all(&specs), Err(LoadError::FileNotFound { .. })));
        assert_eq!(load_all(&specs[..1]).unwrap().len(), 1);
    }
}
