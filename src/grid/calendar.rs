//! Date-key arithmetic. A date key addresses one 96-slot day by the calendar date it
//! starts on, written as `YYYY-MM-DD`.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
pub const DAYS_PER_WEEK: i64 = 7;

/// This is the standard way of converting a date to a key in slotday.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_KEY_FORMAT)
        .with_context(|| format!("{value} is not a YYYY-MM-DD date key"))
}

/// Moves `delta` days forward (or backward when negative) in the proleptic Gregorian calendar.
pub fn add_days(date: NaiveDate, delta: i64) -> NaiveDate {
    date + Duration::days(delta)
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    add_days(date, -(date.weekday().num_days_from_monday() as i64))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = month_start(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next_month
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(31)
}

/// Every date of the calendar month containing `date`, in order.
pub fn month_keys(date: NaiveDate) -> Vec<NaiveDate> {
    let first = month_start(date);
    (0..days_in_month(date) as i64)
        .map(|offset| add_days(first, offset))
        .collect()
}

/// The seven dates of the Monday-first week containing `date`.
pub fn week_keys(date: NaiveDate) -> Vec<NaiveDate> {
    let first = week_start(date);
    (0..DAYS_PER_WEEK).map(|offset| add_days(first, offset)).collect()
}

/// `count` dates ending with `date`, oldest first.
pub fn trailing_keys(date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (0..count as i64)
        .rev()
        .map(|offset| add_days(date, -offset))
        .collect()
}

/// Inclusive range of dates. Empty when `end` is before `start`.
pub fn range_keys(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}
