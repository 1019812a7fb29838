//! Date/time helpers
//!
//! Formulas represent instants as "hour buckets": the number of whole hours
//! elapsed since the Unix epoch, stored in a double. Calendar fields are
//! extracted in a caller-supplied fixed UTC offset.

use crate::error::{Error, Result};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};

const SECONDS_PER_HOUR: i64 = 3600;

/// Convert an instant to its hour bucket (whole hours since the epoch)
pub fn instant_to_double(instant: DateTime<Utc>) -> f64 {
    instant.timestamp().div_euclid(SECONDS_PER_HOUR) as f64
}

/// Convert an hour bucket back to an instant
///
/// Fractional hours are kept down to the second.
pub fn double_to_instant(value: f64) -> Result<DateTime<Utc>> {
    let seconds = (value * SECONDS_PER_HOUR as f64).floor();
    if !seconds.is_finite() || seconds.abs() > i64::MAX as f64 {
        return Err(Error::TimestampOutOfRange(value));
    }
    Utc.timestamp_opt(seconds as i64, 0)
        .single()
        .ok_or(Error::TimestampOutOfRange(value))
}

/// Current hour bucket
pub fn now() -> f64 {
    instant_to_double(Utc::now())
}

fn local(instant: DateTime<Utc>, zone: &FixedOffset) -> DateTime<FixedOffset> {
    instant.with_timezone(zone)
}

pub fn day_of_month(instant: DateTime<Utc>, zone: &FixedOffset) -> u32 {
    local(instant, zone).day()
}

pub fn month(instant: DateTime<Utc>, zone: &FixedOffset) -> u32 {
    local(instant, zone).month()
}

pub fn year(instant: DateTime<Utc>, zone: &FixedOffset) -> i32 {
    local(instant, zone).year()
}

pub fn hour(instant: DateTime<Utc>, zone: &FixedOffset) -> u32 {
    local(instant, zone).hour()
}

pub fn minute(instant: DateTime<Utc>, zone: &FixedOffset) -> u32 {
    local(instant, zone).minute()
}

pub fn second(instant: DateTime<Utc>, zone: &FixedOffset) -> u32 {
    local(instant, zone).second()
}

/// Week of the year counted in blocks of seven days starting on January 1st
pub fn aligned_week_of_year(instant: DateTime<Utc>, zone: &FixedOffset) -> u32 {
    local(instant, zone).ordinal0() / 7 + 1
}

fn start_of_day(date: NaiveDate, zone: &FixedOffset) -> Result<DateTime<Utc>> {
    local_to_utc(date.and_hms_opt(0, 0, 0), zone).ok_or(Error::InvalidDate {
        year: date.year(),
        month: date.month(),
        day: date.day(),
    })
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::InvalidDate { year, month, day })
}

fn local_to_utc(local: Option<NaiveDateTime>, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&local?)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Midnight of the current day in `zone`
pub fn today(zone: &FixedOffset) -> Result<DateTime<Utc>> {
    start_of_day(local(Utc::now(), zone).date_naive(), zone)
}

/// Midnight of the Monday strictly before the day of `instant`
pub fn previous_monday(instant: DateTime<Utc>, zone: &FixedOffset) -> Result<DateTime<Utc>> {
    let date = local(instant, zone).date_naive();
    let days_back = match date.weekday().num_days_from_monday() {
        0 => 7,
        n => n,
    };
    start_of_day(date - Duration::days(i64::from(days_back)), zone)
}

/// Midnight of the first day of the month of `instant`
pub fn start_of_month(instant: DateTime<Utc>, zone: &FixedOffset) -> Result<DateTime<Utc>> {
    let date = local(instant, zone).date_naive();
    let first = date.with_day(1).ok_or(Error::InvalidDate {
        year: date.year(),
        month: date.month(),
        day: 1,
    })?;
    start_of_day(first, zone)
}

/// Midnight of the last day of the month of `instant`
pub fn end_of_month(instant: DateTime<Utc>, zone: &FixedOffset) -> Result<DateTime<Utc>> {
    let date = local(instant, zone).date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let next_month = NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::InvalidDate {
        year,
        month,
        day: 1,
    })?;
    start_of_day(next_month - Duration::days(1), zone)
}

/// Midnight of the given calendar day in `zone`
pub fn date_at_midnight(
    year: i32,
    month: u32,
    day: u32,
    zone: &FixedOffset,
) -> Result<DateTime<Utc>> {
    start_of_day(calendar_date(year, month, day)?, zone)
}

/// The given wall-clock time in `zone`
pub fn date_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    zone: &FixedOffset,
) -> Result<DateTime<Utc>> {
    let date = calendar_date(year, month, day)?;
    let invalid_time = Error::InvalidTime {
        hour,
        minute,
        second,
    };
    local_to_utc(date.and_hms_opt(hour, minute, second), zone).ok_or(invalid_time)
}

/// Pattern tokens accepted by [`parse_date_time`], longest first
const PATTERN_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("yyyy", "%Y"),
    ("YY", "%y"),
    ("yy", "%y"),
    ("MM", "%m"),
    ("mm", "%m"),
    ("DD", "%d"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("hh", "%H"),
    ("MI", "%M"),
    ("mi", "%M"),
    ("SS", "%S"),
    ("ss", "%S"),
];

/// Translate an Oracle-style pattern (`DD-MM-YYYY HH:MI:SS`) to a chrono format string
pub fn translate_pattern(pattern: &str) -> String {
    let mut format = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    'scan: while let Some(c) = rest.chars().next() {
        for (token, spec) in PATTERN_TOKENS {
            if rest.starts_with(token) {
                format.push_str(spec);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }
        if c == '%' {
            format.push_str("%%");
        } else {
            format.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    format
}

/// Parse `text` with an Oracle-style `pattern`, interpreting it as wall-clock time in `zone`
///
/// Patterns without time fields produce midnight.
pub fn parse_date_time(text: &str, pattern: &str, zone: &FixedOffset) -> Result<DateTime<Utc>> {
    let format = translate_pattern(pattern);
    let text = text.trim();
    let unparsable = || Error::UnparsableDate {
        text: text.to_string(),
        pattern: pattern.to_string(),
    };

    let local = match NaiveDateTime::parse_from_str(text, &format) {
        Ok(dt) => dt,
        Err(_) => NaiveDate::parse_from_str(text, &format)
            .map_err(|_| unparsable())?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(unparsable)?,
    };

    local_to_utc(Some(local), zone).ok_or_else(unparsable)
}
