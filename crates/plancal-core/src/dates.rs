//! Calendar date arithmetic
//!
//! Every function works on `chrono::NaiveDate`: local calendar dates with no
//! time component, so no value ever passes through UTC and the displayed
//! day cannot shift.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::ValidationError;

/// Parse a strict `YYYY-MM-DD` calendar date
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = s.trim();
    let bytes = trimmed.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(ValidationError::InvalidDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Format as `YYYY-MM-DD`
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Offset a date by `n` days (negative moves backwards)
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// ISO week start: Sunday maps back 6 days, other weekdays back `weekday - 1`
pub fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    week_start_on_or_before(date, Weekday::Mon)
}

/// Most recent `week_start` on or before `date`
pub fn week_start_on_or_before(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    add_days(date, -i64::from(offset))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(date.day0()))
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    add_days(first, i64::from(days_in_month(first.year(), first.month())) - 1)
}

/// Number of days in a month (0 for an invalid month number)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 0,
    }
}

/// Move by whole months, clamping the day to the target month's length
pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + n;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Every date from `start` to `end` inclusive
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
