//! String-result built-ins

use super::Call;
use crate::error::{CalcResult, ErrorKind};
use duke_calc_core::math::{double_is_equal_or_greater, format_double, round_half_up};

/// Largest string `replicate` may build, in bytes
pub const MAX_REPLICATED_LEN: usize = 16 * 1024 * 1024;

/// Character count as a clamped `usize`
fn count(value: f64, limit: usize) -> usize {
    usize::try_from(round_half_up(value).max(0)).map_or(limit, |n| n.min(limit))
}

fn take_left(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn take_right(s: &str, n: usize) -> String {
    let len = s.chars().count();
    s.chars().skip(len.saturating_sub(n)).collect()
}

/// IF(condition, then, else); the condition holds when it is at least 1
pub fn fn_if(call: &Call) -> CalcResult<String> {
    if double_is_equal_or_greater(call.number(0)?, 1.0, call.decimal_numbers()) {
        call.text(1)
    } else {
        call.text(2)
    }
}

pub fn fn_concatenate(call: &Call) -> CalcResult<String> {
    let mut result = String::new();
    for index in 0..call.args.len() {
        result.push_str(&call.text(index)?);
    }
    Ok(result)
}

/// REPLICATE(text, n) appends `text` n more times to itself
///
/// Results longer than [`MAX_REPLICATED_LEN`] bytes are a FUNCTION_ERROR.
pub fn fn_replicate(call: &Call) -> CalcResult<String> {
    let value = call.text(0)?;
    let copies = usize::try_from(round_half_up(call.number(1)?).max(0))
        .ok()
        .and_then(|times| times.checked_add(1))
        .filter(|copies| {
            value
                .len()
                .checked_mul(*copies)
                .is_some_and(|total| total <= MAX_REPLICATED_LEN)
        })
        .ok_or_else(|| call.error(ErrorKind::FunctionError))?;
    Ok(value.repeat(copies))
}

pub fn fn_tostr(call: &Call) -> CalcResult<String> {
    Ok(format_double(call.number(0)?))
}

pub fn fn_uppercase(call: &Call) -> CalcResult<String> {
    Ok(call.text(0)?.to_uppercase())
}

pub fn fn_lowercase(call: &Call) -> CalcResult<String> {
    Ok(call.text(0)?.to_lowercase())
}

/// LEFT(text, n)
pub fn fn_left(call: &Call) -> CalcResult<String> {
    let value = call.text(0)?;
    let n = count(call.number(1)?, value.chars().count());
    Ok(take_left(&value, n))
}

/// RIGHT(text, n)
pub fn fn_right(call: &Call) -> CalcResult<String> {
    let value = call.text(0)?;
    let n = count(call.number(1)?, value.chars().count());
    Ok(take_right(&value, n))
}

/// SUBSTR(text, start, count) with a 0-based start
pub fn fn_substr(call: &Call) -> CalcResult<String> {
    let value = call.text(0)?;
    let len = value.chars().count();
    let start = count(call.number(1)?, len);
    let n = count(call.number(2)?, len - start);
    Ok(value.chars().skip(start).take(n).collect())
}
