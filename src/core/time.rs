//! Timestamp helpers shared by the store, the filters and the console.
//!
//! All timestamps are naive local time truncated to whole seconds, which is
//! also what ends up in the `TIMESTAMP` columns.

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, ParseError, SubsecRound,
};

/// Display format for every timestamp column.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Non-digit positions of `YYYY-MM-DD HH:MM:SS` and its date prefix.
const DATETIME_SEPARATORS: [usize; 5] = [4, 7, 10, 13, 16];

/// Offset-suffixed column text written by other SQLite drivers.
const STORED_ZONED_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"];
const STORED_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Current local time, whole seconds.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

pub fn format_time(t: &NaiveDateTime) -> String {
    t.format(DISPLAY_FORMAT).to_string()
}

pub fn format_optional(t: Option<&NaiveDateTime>) -> String {
    t.map(format_time).unwrap_or_default()
}

/// Parses user supplied time.
///
/// Formats are tried in order: `YYYY-MM-DD HH:MM:SS`, `YYYY/MM/DD HH:MM:SS`,
/// `YYYY-MM-DD`, `YYYY/MM/DD`. Every field is fixed width, so `2024-1-2`
/// is not a date. Empty input is absent; anything that matches none of them
/// falls back to `now`.
pub fn parse_time(input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if fixed_width(input, 19) {
        for format in DATETIME_FORMATS {
            if let Ok(t) = NaiveDateTime::parse_from_str(input, format) {
                return Some(t);
            }
        }
    }
    if fixed_width(input, 10) {
        for format in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(input, format) {
                return Some(d.and_time(chrono::NaiveTime::MIN));
            }
        }
    }

    log::debug!("Unrecognised time '{}', using now", input);
    Some(now)
}

/// Digits everywhere except at the separator positions, `len` bytes long.
fn fixed_width(input: &str, len: usize) -> bool {
    input.len() == len
        && input
            .bytes()
            .enumerate()
            .all(|(i, b)| DATETIME_SEPARATORS.contains(&i) != b.is_ascii_digit())
}

/// Reads a `TIMESTAMP` column value.
///
/// Accepts what this crate writes (`YYYY-MM-DD HH:MM:SS`) as well as the
/// fractional, offset-suffixed text other drivers write, e.g.
/// `2024-01-02 13:14:15.123456789+08:00`. An offset is dropped, keeping the
/// wall clock as recorded. Sub-seconds are truncated.
pub fn parse_stored_time(text: &str) -> Result<NaiveDateTime, ParseError> {
    let text = text.trim();

    for format in STORED_ZONED_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(text, format) {
            return Ok(t.naive_local().trunc_subsecs(0));
        }
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(text, STORED_ISO_FORMAT) {
        return Ok(t.trunc_subsecs(0));
    }
    NaiveDateTime::parse_from_str(text, STORED_FORMAT).map(|t| t.trunc_subsecs(0))
}

/// Monday of the current week at the same time of day as `now`.
/// A Sunday belongs to the week that started six days earlier.
pub fn week_begin(now: NaiveDateTime) -> NaiveDateTime {
    let days_since_monday = now.weekday().num_days_from_monday();
    now - Duration::days(i64::from(days_since_monday))
}

/// First day of the current month at the same time of day as `now`.
pub fn month_begin(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::days(i64::from(now.day() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let now = at(2030, 5, 5, 12, 0, 0);
        assert_eq!(parse_time("2024-01-02", now), Some(at(2024, 1, 2, 0, 0, 0)));
        assert_eq!(parse_time("2024/01/02", now), Some(at(2024, 1, 2, 0, 0, 0)));
    }

    #[test]
    fn test_parse_full_datetime() {
        let now = at(2030, 5, 5, 12, 0, 0);
        assert_eq!(
            parse_time("2024-01-02 13:14:15", now),
            Some(at(2024, 1, 2, 13, 14, 15))
        );
        assert_eq!(
            parse_time("2024/01/02 13:14:15", now),
            Some(at(2024, 1, 2, 13, 14, 15))
        );
    }

    #[test]
    fn test_parse_garbage_falls_back_to_now() {
        let now = at(2030, 5, 5, 12, 0, 0);
        assert_eq!(parse_time("not-a-date", now), Some(now));
    }

    #[test]
    fn test_parse_empty_is_absent() {
        let now = at(2030, 5, 5, 12, 0, 0);
        assert_eq!(parse_time("", now), None);
        assert_eq!(parse_time("   ", now), None);
    }

    #[test]
    fn test_parse_rejects_unpadded_fields() {
        let now = at(2030, 5, 5, 12, 0, 0);
        assert_eq!(parse_time("2024-1-2", now), Some(now));
        assert_eq!(parse_time("2024/1/02", now), Some(now));
        assert_eq!(parse_time("2024-01-02 1:14:15", now), Some(now));
        assert_eq!(parse_time("02024-01-02", now), Some(now));
    }

    #[test]
    fn test_parse_stored_time_formats() {
        let expected = at(2024, 1, 2, 13, 14, 15);
        for text in [
            "2024-01-02 13:14:15",
            "2024-01-02 13:14:15.5",
            "2024-01-02T13:14:15",
            "2024-01-02 13:14:15.123456789+08:00",
            "2024-01-02 13:14:15-07:00",
            "2024-01-02T13:14:15.000+00:00",
        ] {
            assert_eq!(parse_stored_time(text), Ok(expected), "{text}");
        }
        assert!(parse_stored_time("yesterday").is_err());
    }

    #[test]
    fn test_week_begin_on_wednesday() {
        let wednesday = at(2024, 1, 3, 9, 30, 0);
        assert_eq!(wednesday.weekday(), Weekday::Wed);
        let begin = week_begin(wednesday);
        assert_eq!(begin, at(2024, 1, 1, 9, 30, 0));
        assert_eq!(begin.weekday(), Weekday::Mon);
        assert_eq!(begin.time(), wednesday.time());
    }

    #[test]
    fn test_week_begin_on_sunday_is_six_days_back() {
        let sunday = at(2024, 1, 7, 18, 0, 0);
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(week_begin(sunday), at(2024, 1, 1, 18, 0, 0));
    }

    #[test]
    fn test_week_begin_on_monday_is_today() {
        let monday = at(2024, 1, 1, 7, 0, 0);
        assert_eq!(week_begin(monday), monday);
    }

    #[test]
    fn test_month_begin() {
        assert_eq!(month_begin(at(2024, 2, 29, 8, 0, 0)), at(2024, 2, 1, 8, 0, 0));
        assert_eq!(month_begin(at(2024, 3, 1, 8, 0, 0)), at(2024, 3, 1, 8, 0, 0));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(&at(2024, 1, 2, 3, 4, 5)), "2024-01-02 03:04:05");
        assert_eq!(format_optional(None), "");
    }

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(now().and_utc().timestamp_subsec_nanos(), 0);
    }
}
