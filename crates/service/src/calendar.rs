//! Calendar arithmetic for the week and month views.
//!
//! Weeks start on Sunday. All grids are inclusive date lists.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Years the views and filters accept; wider values are rejected before any arithmetic.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("utc offset out of range: {0} minutes")]
    InvalidOffset(i32),
    #[error("unrecognized date/time: {0}")]
    Unparseable(String),
    #[error("date out of supported range: {0}")]
    OutOfRange(String),
}

fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate, CalendarError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| CalendarError::OutOfRange(date.to_string()))
}

fn check_year(year: i32) -> Result<(), CalendarError> {
    if SUPPORTED_YEARS.contains(&year) {
        Ok(())
    } else {
        Err(CalendarError::OutOfRange(format!("year {year}")))
    }
}

/// Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    shift(date, -(date.weekday().num_days_from_sunday() as i64))
}

/// The seven days Sunday..Saturday containing `date`.
pub fn week_of(date: NaiveDate) -> Result<[NaiveDate; 7], CalendarError> {
    check_year(date.year())?;
    let sunday = start_of_week(date)?;
    let mut week = [sunday; 7];
    for (i, day) in week.iter_mut().enumerate().skip(1) {
        *day = shift(sunday, i as i64)?;
    }
    Ok(week)
}

/// Sunday on/before the 1st through the Saturday on/after the month's last day.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<NaiveDate>, CalendarError> {
    check_year(year)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth { year, month })?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(CalendarError::InvalidMonth { year, month })?;
    let last = shift(next_first, -1)?;
    let last_saturday = shift(last, 6 - last.weekday().num_days_from_sunday() as i64)?;

    let mut days = Vec::with_capacity(42);
    let mut day = start_of_week(first)?;
    while day <= last_saturday {
        days.push(day);
        day = shift(day, 1)?;
    }
    Ok(days)
}

pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, CalendarError> {
    if !(-720..=840).contains(&minutes) {
        return Err(CalendarError::InvalidOffset(minutes));
    }
    FixedOffset::east_opt(minutes * 60).ok_or(CalendarError::InvalidOffset(minutes))
}

/// `[first 00:00, last 23:59:59.999999999]` in `offset`.
pub fn day_range(
    first: NaiveDate,
    last: NaiveDate,
    offset: FixedOffset,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), CalendarError> {
    let out_of_range = |naive: NaiveDateTime| CalendarError::OutOfRange(naive.to_string());
    let start = first.and_time(NaiveTime::MIN);
    let after = shift(last, 1)?.and_time(NaiveTime::MIN);
    let end = after.checked_sub_signed(Duration::nanoseconds(1)).ok_or_else(|| out_of_range(after))?;
    // local wall time -> UTC
    let to_instant = |naive: NaiveDateTime| {
        naive
            .checked_sub_signed(Duration::seconds(offset.local_minus_utc() as i64))
            .map(|utc| offset.from_utc_datetime(&utc))
            .ok_or_else(|| out_of_range(naive))
    };
    Ok((to_instant(start)?, to_instant(end)?))
}

/// Local calendar date of `instant` under `offset`.
pub fn local_date(instant: &DateTime<FixedOffset>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Parse RFC 3339, RFC 2822 (`Date.toUTCString()`), or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>, CalendarError> {
    let s = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).fixed_offset())
        })
        .ok_or_else(|| CalendarError::Unparseable(raw.to_string()))?;
    check_year(parsed.year())?;
    Ok(parsed)
}

/// A bare `YYYY-MM-DD` is taken as-is; anything else is an instant read in `offset`.
pub fn parse_local_date(raw: &str, offset: FixedOffset) -> Result<NaiveDate, CalendarError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        check_year(date.year())?;
        return Ok(date);
    }
    parse_instant(raw).map(|instant| local_date(&instant, offset))
}
