//! Helpers for reading loosely typed survey payloads and formatting dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// Display format used for report dates (day first, as the field teams read them)
pub const REPORT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Read a scalar field as text.
///
/// Survey exports are inconsistent about types: the same column can arrive as
/// `"105"`, `105` or `105.0` depending on the form version. Numbers are
/// coerced to their shortest textual form, empty strings and nulls count as
/// absent.
pub fn field_str(raw: &Map<String, Value>, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some((f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            } else {
                Some(n.to_string())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a whole number, accepting float spellings such as `"3.0"`.
pub fn parse_whole_number(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

/// Parse a survey timestamp into a UTC naive datetime.
///
/// Handles RFC 3339 with offsets (the form `start` field), offset-less ISO
/// timestamps (`_submission_time`) and bare dates.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a calendar date written day-first (`31/12/2023`, `31-12-2023`),
/// falling back to ISO `2023-12-31`.
pub fn parse_day_first_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    const FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Format a date for the report header
pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_field_str_coerces_numbers() {
        let r = raw(json!({"a": "105", "b": 105, "c": 105.0, "d": 1.5, "e": "  ", "f": null}));
        assert_eq!(field_str(&r, "a").as_deref(), Some("105"));
        assert_eq!(field_str(&r, "b").as_deref(), Some("105"));
        assert_eq!(field_str(&r, "c").as_deref(), Some("105"));
        assert_eq!(field_str(&r, "d").as_deref(), Some("1.5"));
        assert_eq!(field_str(&r, "e"), None);
        assert_eq!(field_str(&r, "f"), None);
        assert_eq!(field_str(&r, "missing"), None);
    }

    #[test]
    fn test_parse_whole_number() {
        assert_eq!(parse_whole_number("3"), Some(3));
        assert_eq!(parse_whole_number("3.0"), Some(3));
        assert_eq!(parse_whole_number(" 12 "), Some(12));
        assert_eq!(parse_whole_number("3.5"), None);
        assert_eq!(parse_whole_number("abc"), None);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 1)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .unwrap();
        assert_eq!(parse_timestamp("2023-05-01T12:30:00.000+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01 10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-05-01"),
            NaiveDate::from_ymd_opt(2023, 5, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_day_first_date() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31);
        assert_eq!(parse_day_first_date("31/12/2023"), expected);
        assert_eq!(parse_day_first_date("31-12-2023"), expected);
        assert_eq!(parse_day_first_date("2023-12-31"), expected);
        assert_eq!(parse_day_first_date("12/31/2023"), None);
    }

    #[test]
    fn test_format_report_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_report_date(date), "07-03-2024");
    }
}
