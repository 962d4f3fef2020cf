//! Date parsing shared by the loader and the fetchers.

use chrono::{NaiveDate, NaiveDateTime};

/// Formats tried, in order, when no explicit format is configured.
///
/// Month-first wins for slash dates (`03/31/2025`), matching the exports these
/// files usually come from.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%b %d, %Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse `raw` as a calendar date.
///
/// With an explicit `format`, it is tried both as a date and as a date-time
/// format (the time part is dropped). Without one, a fixed list of common
/// formats is tried.
pub fn parse_date(raw: &str, format: Option<&str>) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(fmt) = format {
        return NaiveDate::parse_from_str(s, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()));
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Lenient numeric coercion: empty, unparseable and non-finite inputs are `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn infers_common_formats() {
        assert_eq!(parse_date("2025-03-31", None), Some(d(2025, 3, 31)));
        assert_eq!(parse_date("03/31/2025", None), Some(d(2025, 3, 31)));
        assert_eq!(parse_date("Mar 31, 2025", None), Some(d(2025, 3, 31)));
        assert_eq!(parse_date("2025-03-31T00:00:00", None), Some(d(2025, 3, 31)));
        assert_eq!(parse_date("not a date", None), None);
        assert_eq!(parse_date("  ", None), None);
    }

    #[test]
    fn explicit_format_is_strict() {
        assert_eq!(parse_date("01/02/2020", Some("%m/%d/%Y")), Some(d(2020, 1, 2)));
        assert_eq!(parse_date("2020-01-02", Some("%m/%d/%Y")), None);
        assert_eq!(
            parse_date("2020-01-02 10:30", Some("%Y-%m-%d %H:%M")),
            Some(d(2020, 1, 2))
        );
    }

    #[test]
    fn numbers_coerce_to_none() {
        assert_eq!(parse_number(" 4.5 "), Some(4.5));
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1,234.5"), None);
    }
}
