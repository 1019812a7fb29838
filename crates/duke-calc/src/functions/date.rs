//! Date built-ins
//!
//! Timestamps are hour buckets (see [`duke_calc_core::datetime`]). Calendar
//! fields are read in the engine time zone.

use super::Call;
use crate::error::{CalcResult, ErrorKind};
use chrono::{DateTime, FixedOffset, Utc};
use duke_calc_core::datetime;

fn zone(call: &Call) -> FixedOffset {
    call.engine.time_zone()
}

fn instant(call: &Call, index: usize) -> CalcResult<DateTime<Utc>> {
    datetime::double_to_instant(call.number(index)?)
        .map_err(|_| call.error(ErrorKind::FunctionError))
}

/// Floored non-negative calendar component
fn component(call: &Call, index: usize) -> CalcResult<u32> {
    let value = call.number(index)?.floor();
    if (0.0..=f64::from(u32::MAX)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(call.error(ErrorKind::FunctionError))
    }
}

fn year_component(call: &Call, index: usize) -> CalcResult<i32> {
    let value = call.number(index)?.floor();
    if (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&value) {
        Ok(value as i32)
    } else {
        Err(call.error(ErrorKind::FunctionError))
    }
}

fn field(call: &Call, extract: fn(DateTime<Utc>, &FixedOffset) -> u32) -> CalcResult<f64> {
    Ok(f64::from(extract(instant(call, 0)?, &zone(call))))
}

fn shifted(
    call: &Call,
    shift: fn(DateTime<Utc>, &FixedOffset) -> duke_calc_core::Result<DateTime<Utc>>,
) -> CalcResult<f64> {
    let moved =
        shift(instant(call, 0)?, &zone(call)).map_err(|_| call.error(ErrorKind::FunctionError))?;
    Ok(datetime::instant_to_double(moved))
}

pub fn fn_getday(call: &Call) -> CalcResult<f64> {
    field(call, datetime::day_of_month)
}

/// Week of the year counted from January 1st
pub fn fn_getweek(call: &Call) -> CalcResult<f64> {
    field(call, datetime::aligned_week_of_year)
}

pub fn fn_getmonth(call: &Call) -> CalcResult<f64> {
    field(call, datetime::month)
}

pub fn fn_getyear(call: &Call) -> CalcResult<f64> {
    Ok(f64::from(datetime::year(instant(call, 0)?, &zone(call))))
}

pub fn fn_gethour(call: &Call) -> CalcResult<f64> {
    field(call, datetime::hour)
}

pub fn fn_getminute(call: &Call) -> CalcResult<f64> {
    field(call, datetime::minute)
}

pub fn fn_getsecond(call: &Call) -> CalcResult<f64> {
    field(call, datetime::second)
}

pub fn fn_previousmonday(call: &Call) -> CalcResult<f64> {
    shifted(call, datetime::previous_monday)
}

pub fn fn_startofthemonth(call: &Call) -> CalcResult<f64> {
    shifted(call, datetime::start_of_month)
}

pub fn fn_endofthemonth(call: &Call) -> CalcResult<f64> {
    shifted(call, datetime::end_of_month)
}

/// TODATE(day, month, year), midnight in the engine zone
pub fn fn_todate(call: &Call) -> CalcResult<f64> {
    let day = component(call, 0)?;
    let month = component(call, 1)?;
    let year = year_component(call, 2)?;
    let date = datetime::date_at_midnight(year, month, day, &zone(call))
        .map_err(|_| call.error(ErrorKind::FunctionError))?;
    Ok(datetime::instant_to_double(date))
}

/// TODATETIME(day, month, year, hour, minute, second)
pub fn fn_todatetime(call: &Call) -> CalcResult<f64> {
    let day = component(call, 0)?;
    let month = component(call, 1)?;
    let year = year_component(call, 2)?;
    let hour = component(call, 3)?;
    let minute = component(call, 4)?;
    let second = component(call, 5)?;
    let moment = datetime::date_time(year, month, day, hour, minute, second, &zone(call))
        .map_err(|_| call.error(ErrorKind::FunctionError))?;
    Ok(datetime::instant_to_double(moment))
}

/// Hours elapsed since the timestamp
pub fn fn_distancefromnow(call: &Call) -> CalcResult<f64> {
    Ok(datetime::now() - call.number(0)?)
}

/// Whole hours between today's midnight and the timestamp
pub fn fn_distancefromtoday(call: &Call) -> CalcResult<f64> {
    let value = call.number(0)?;
    let today = datetime::today(&zone(call)).map_err(|_| call.error(ErrorKind::FunctionError))?;
    Ok((datetime::instant_to_double(today) - value).floor())
}

/// STRINGTODATETIME(text, pattern), e.g. `stringtodatetime('15-03-2024', 'DD-MM-YYYY')`
pub fn fn_stringtodatetime(call: &Call) -> CalcResult<f64> {
    let text = call.text(0)?;
    let pattern = call.text(1)?;
    match datetime::parse_date_time(&text, &pattern, &zone(call)) {
        Ok(moment) => Ok(datetime::instant_to_double(moment)),
        Err(_) => Err(call.error_with(ErrorKind::ParseError, text)),
    }
}
