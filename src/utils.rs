//! Shared utility functions for the field weather service
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Round to one decimal place, the precision every aggregated value is reported at
///
/// Negative zero is folded into `0.0` so API responses never show `-0.0`.
///
/// # Examples
///
/// ```
/// use field_weather_service::utils::round_to_tenth;
///
/// assert_eq!(round_to_tenth(57.54), 57.5);
/// assert_eq!(round_to_tenth(12.96), 13.0);
/// assert_eq!(round_to_tenth(-0.04), 0.0);
/// ```
pub fn round_to_tenth(value: f64) -> f64 {
    normalize_zero((value * 10.0).round() / 10.0)
}

/// Normalize -0.0 to 0.0
pub fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Parse a station date key into a calendar date
///
/// Station value maps are keyed by ISO dates, but the key is just a string on the
/// wire, so a handful of other common layouts are accepted too.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use field_weather_service::utils::parse_calendar_date;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 5, 3);
/// assert_eq!(parse_calendar_date("2025-05-03"), expected);
/// assert_eq!(parse_calendar_date("2025-05-03T00:00:00"), expected);
/// assert_eq!(parse_calendar_date("2025-05-03T06:00:00+03:00"), expected);
/// assert_eq!(parse_calendar_date("03.05.2025"), expected);
/// assert_eq!(parse_calendar_date("05/03/2025"), expected);
/// assert_eq!(parse_calendar_date("not a date"), None);
/// ```
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();

    for format in ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .map(|dt| dt.date())
        .ok()
}
