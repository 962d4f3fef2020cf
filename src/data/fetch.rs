//! Fetch pipeline for one remote source:
//! URL -> GET -> parse (CSV or JSON records) -> coerce -> window -> sort -> CSV.
//!
//! Nothing is written unless every step before the write succeeded.

use std::path::PathBuf;

use chrono::NaiveDate;
use log::{debug, info};
use serde_json::Value;

use crate::data::http::{FetchError, Transport};
use crate::data::sources::{RemoteSource, ResponseFormat};
use crate::domain::DateWindow;
use crate::io::dates::{parse_date, parse_number};
use crate::io::write_observations_csv;

/// What a successful fetch did.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub source: String,
    pub output_path: PathBuf,
    /// Records in the response body.
    pub rows_received: usize,
    /// Records dropped for an unparseable date or value.
    pub rows_dropped: usize,
    /// Parseable records outside the date window.
    pub rows_outside_window: usize,
    pub rows_written: usize,
}

/// Result of one source within a fetch run; failures do not stop the run.
#[derive(Debug)]
pub struct FetchOutcome {
    pub source: String,
    pub result: Result<FetchReport, FetchError>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Rows recovered from a response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody {
    pub rows: Vec<(NaiveDate, f64)>,
    pub received: usize,
    pub dropped: usize,
}

/// Fetch `source`, keep rows inside `window`, and write them to its output path.
pub fn fetch_source(
    transport: &dyn Transport,
    source: &RemoteSource,
    window: &DateWindow,
) -> Result<FetchReport, FetchError> {
    let url = source.url()?;
    let shown_url = source.redacted_url();
    info!("Fetching {} from {shown_url}", source.name);

    let resp = transport.get(url.as_str())?;
    if !resp.is_success() {
        return Err(FetchError::Http {
            status: resp.status,
            url: shown_url,
        });
    }
    debug!("{}: received {} bytes", source.name, resp.body.len());

    let parsed = parse_body(source, &resp.body)?;

    let mut rows: Vec<(NaiveDate, f64)> = parsed
        .rows
        .iter()
        .copied()
        .filter(|(date, _)| window.contains(*date))
        .collect();
    let rows_outside_window = parsed.rows.len() - rows.len();
    rows.sort_by_key(|(date, _)| *date);

    write_observations_csv(
        &source.output_path,
        &source.output_date_column,
        &source.output_value_column,
        &rows,
    )
    .map_err(|e| FetchError::Io {
        path: source.output_path.display().to_string(),
        message: e.to_string(),
    })?;

    info!(
        "{}: wrote {} row(s) to '{}'",
        source.name,
        rows.len(),
        source.output_path.display()
    );

    Ok(FetchReport {
        source: source.name.clone(),
        output_path: source.output_path.clone(),
        rows_received: parsed.received,
        rows_dropped: parsed.dropped,
        rows_outside_window,
        rows_written: rows.len(),
    })
}

/// Parse a response body according to the source's format and field names.
pub fn parse_body(source: &RemoteSource, body: &str) -> Result<ParsedBody, FetchError> {
    match source.format {
        ResponseFormat::Csv => parse_csv_body(body, &source.date_field, &source.value_field),
        ResponseFormat::JsonRecords => parse_json_body(body, &source.date_field, &source.value_field),
    }
}

fn parse_csv_body(body: &str, date_field: &str, value_field: &str) -> Result<ParsedBody, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::MalformedResponse(format!("unreadable CSV header: {e}")))?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
    };
    let (Some(date_idx), Some(value_idx)) = (find(date_field), find(value_field)) else {
        // Providers answer quota/auth problems with a 200 and a JSON message.
        return Err(FetchError::UnexpectedFormat(format!(
            "expected CSV columns '{date_field}' and '{value_field}', got: {}",
            snippet(body)
        )));
    };

    let mut out = ParsedBody {
        rows: Vec::new(),
        received: 0,
        dropped: 0,
    };
    for record in reader.records() {
        let record = record.map_err(|e| FetchError::MalformedResponse(format!("bad CSV row: {e}")))?;
        out.received += 1;
        let date = record.get(date_idx).and_then(|s| parse_date(s, None));
        let value = record.get(value_idx).and_then(parse_number);
        match (date, value) {
            (Some(d), Some(v)) => out.rows.push((d, v)),
            _ => out.dropped += 1,
        }
    }
    Ok(out)
}

fn parse_json_body(body: &str, date_field: &str, value_field: &str) -> Result<ParsedBody, FetchError> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let Value::Array(records) = parsed else {
        return Err(FetchError::UnexpectedFormat(format!(
            "expected a JSON array of records, got: {}",
            snippet(body)
        )));
    };

    let mut out = ParsedBody {
        rows: Vec::new(),
        received: records.len(),
        dropped: 0,
    };
    let mut with_fields = 0usize;
    for record in &records {
        let (Some(raw_date), Some(raw_value)) = (record.get(date_field), record.get(value_field)) else {
            out.dropped += 1;
            continue;
        };
        with_fields += 1;
        let date = raw_date.as_str().and_then(|s| parse_date(s, None));
        let value = json_number(raw_value);
        match (date, value) {
            (Some(d), Some(v)) => out.rows.push((d, v)),
            _ => out.dropped += 1,
        }
    }

    if !records.is_empty() && with_fields == 0 {
        return Err(FetchError::UnexpectedFormat(format!(
            "no record carries both '{date_field}' and '{value_field}'"
        )));
    }
    Ok(out)
}

fn json_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => parse_number(s.trim().trim_end_matches('%')),
        _ => None,
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    let cut: String = trimmed.chars().take(120).collect();
    if cut.len() < trimmed.len() {
        format!("{cut}...")
    } else {
        cut
    }
}
