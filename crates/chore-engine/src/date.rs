//! Calendar-date helpers.
//!
//! Every date in this crate is a `chrono::NaiveDate`: year, month and day with
//! no time-of-day and no timezone. Parsing is strict `YYYY-MM-DD`, so a stored
//! date can never drift by a day through implicit timezone coercion.

use chrono::{Datelike, Duration, NaiveDate};

/// Storage and wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string: four-digit year, zero-padded month and day.
/// Surrounding whitespace is ignored. Unpadded fields, signed years and
/// anything that is not a real calendar date yield `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 10 || !has_digit_shape(s, &[4, 7]) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// ASCII digits everywhere except `-` at the given byte offsets.
fn has_digit_shape(s: &str, dashes: &[usize]) -> bool {
    s.bytes().enumerate().all(|(i, b)| {
        if dashes.contains(&i) {
            b == b'-'
        } else {
            b.is_ascii_digit()
        }
    })
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The Monday on or before `date` (ISO week start).
pub fn week_start_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// First and last day of a calendar month. `None` for an invalid month or a
/// year outside chrono's range.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Parse a `YYYY-MM` month string into `(year, month)`. The month must be
/// zero-padded.
pub fn parse_month(s: &str) -> Option<(i32, u32)> {
    let s = s.trim();
    if s.len() != 7 || !has_digit_shape(s, &[4]) {
        return None;
    }
    let (year, month) = s.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).map(|_| (year, month))
}
