//! CSV exports.
//!
//! Dates are always written as `YYYY-MM-DD` so the files load back without a
//! date format.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::AppError;
use crate::series::AlignedFrame;

/// Write a two-column `date,value` CSV with the given header names.
///
/// Rows go to a sibling `.part` file that is renamed over `path` only once it
/// is complete, so a failed write never leaves a truncated file at `path`.
pub fn write_observations_csv(
    path: &Path,
    date_column: &str,
    value_column: &str,
    rows: &[(NaiveDate, f64)],
) -> Result<(), csv::Error> {
    let partial = partial_path(path);
    let written = write_rows(&partial, date_column, value_column, rows)
        .and_then(|()| fs::rename(&partial, path).map_err(csv::Error::from));
    if written.is_err() {
        let _ = fs::remove_file(&partial);
    }
    written
}

fn write_rows(path: &Path, date_column: &str, value_column: &str, rows: &[(NaiveDate, f64)]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([date_column, value_column])?;
    for (date, value) in rows {
        writer.write_record([date.format("%Y-%m-%d").to_string(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Write the outer-joined frame: `Date` followed by one column per series.
/// Missing values are left empty.
pub fn write_aligned_csv(path: &Path, frame: &AlignedFrame) -> Result<(), AppError> {
    let fail = |e: csv::Error| AppError::new(4, format!("Failed to write aligned CSV '{}': {e}", path.display()));

    let mut writer = csv::Writer::from_path(path).map_err(fail)?;

    let mut header = Vec::with_capacity(frame.columns.len() + 1);
    header.push("Date".to_string());
    header.extend(frame.columns.iter().cloned());
    writer.write_record(&header).map_err(fail)?;

    for (date, values) in &frame.rows {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(date.format("%Y-%m-%d").to_string());
        record.extend(values.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
        writer.write_record(&record).map_err(fail)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush aligned CSV '{}': {e}", path.display())))?;
    Ok(())
}
