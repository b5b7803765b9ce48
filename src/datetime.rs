//! Calendar interface
//!
//! The narrow slice of date/time handling the expansion needs, wrapped
//! over `chrono`: seconds from midnight, the pivot-based service day
//! index, day-of-week masks and ISO timestamps at a fixed UTC offset.
//! Nothing else in the crate touches `chrono` types.

use anyhow::{anyhow, Result};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};

/// Service-day epoch; transit tiles date their schedules in days from
/// this pivot.
const PIVOT_YEAR: i32 = 2014;

fn pivot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(PIVOT_YEAR, 1, 1).unwrap()
}

fn parse(date_time: &str) -> Result<NaiveDateTime> {
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_time, fmt) {
            return Ok(dt);
        }
    }
    Err(anyhow!("unparseable date-time {date_time:?}"))
}

/// Seconds since local midnight of the given `YYYY-MM-DDTHH:MM[:SS]`
/// string.
pub fn seconds_from_midnight(date_time: &str) -> Result<u32> {
    let dt = parse(date_time)?;
    Ok(dt.time().num_seconds_from_midnight())
}

/// Whole days between the pivot date and the given date-time's date.
pub fn days_from_pivot_date(date_time: &str) -> Result<u32> {
    let dt = parse(date_time)?;
    let days = dt.date().signed_duration_since(pivot_date()).num_days();
    Ok(days.max(0) as u32)
}

/// One-bit-per-weekday mask for the given date-time (Sunday = bit 0).
pub fn day_of_week_mask(date_time: &str) -> Result<u8> {
    let dt = parse(date_time)?;
    Ok(dow_bit(dt.weekday()))
}

pub fn dow_bit(weekday: Weekday) -> u8 {
    match weekday {
        Weekday::Sun => 1 << 0,
        Weekday::Mon => 1 << 1,
        Weekday::Tue => 1 << 2,
        Weekday::Wed => 1 << 3,
        Weekday::Thu => 1 << 4,
        Weekday::Fri => 1 << 5,
        Weekday::Sat => 1 << 6,
    }
}

/// Current local time at a fixed UTC offset, formatted
/// `YYYY-MM-DDTHH:MM`. Used to resolve the literal origin date-time
/// `"current"` against the snapped node's time zone.
pub fn iso_date_time(utc_offset_secs: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_secs)
        .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
    Utc::now()
        .with_timezone(&offset)
        .format("%Y-%m-%dT%H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_from_midnight() {
        assert_eq!(seconds_from_midnight("2019-06-12T08:30").unwrap(), 30_600);
        assert_eq!(
            seconds_from_midnight("2019-06-12T08:30:15").unwrap(),
            30_615
        );
        assert!(seconds_from_midnight("not a date").is_err());
    }

    #[test]
    fn test_days_from_pivot() {
        assert_eq!(days_from_pivot_date("2014-01-01T00:00").unwrap(), 0);
        assert_eq!(days_from_pivot_date("2014-02-01T12:00").unwrap(), 31);
        // Dates before the pivot clamp rather than wrap
        assert_eq!(days_from_pivot_date("2013-12-31T00:00").unwrap(), 0);
    }

    #[test]
    fn test_day_of_week_mask() {
        // 2019-06-12 was a Wednesday
        assert_eq!(day_of_week_mask("2019-06-12T08:30").unwrap(), 1 << 3);
        // 2019-06-16 was a Sunday
        assert_eq!(day_of_week_mask("2019-06-16T08:30").unwrap(), 1 << 0);
    }

    #[test]
    fn test_iso_date_time_shape() {
        let s = iso_date_time(3600);
        assert_eq!(s.len(), 16);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], "T");
    }
}
