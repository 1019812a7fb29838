//! Numeric-result built-ins

use super::{text, Call};
use crate::error::{CalcResult, ErrorKind};
use duke_calc_core::math::{
    bool_to_float, double_is_equal_or_greater, double_is_equal_or_less, float_to_bool,
    round_half_even, round_half_up, safe_div,
};

/// Parse a number written with either `.` or `,` as decimal separator
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse().ok()
}

fn parse_or_fail(call: &Call, value: String) -> CalcResult<f64> {
    parse_number(&value).ok_or_else(|| call.error_with(ErrorKind::ParseError, value))
}

/// Difference of the first differing characters, else of the lengths
fn compare_strings(a: &str, b: &str) -> f64 {
    let mut left = a.chars();
    let mut right = b.chars();
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x != y => return f64::from(x as u32) - f64::from(y as u32),
            (Some(_), Some(_)) => continue,
            _ => break,
        }
    }
    a.chars().count() as f64 - b.chars().count() as f64
}

/// IF(condition, then, else); only the chosen branch is evaluated
pub fn fn_if(call: &Call) -> CalcResult<f64> {
    if float_to_bool(call.number(0)?) {
        call.number(1)
    } else {
        call.number(2)
    }
}

/// AND(a, b, ...), stopping at the first false argument
pub fn fn_and(call: &Call) -> CalcResult<f64> {
    for index in 0..call.args.len() {
        if !float_to_bool(call.number(index)?) {
            return Ok(0.0);
        }
    }
    Ok(1.0)
}

/// OR(a, b, ...), stopping at the first true argument
pub fn fn_or(call: &Call) -> CalcResult<f64> {
    for index in 0..call.args.len() {
        if float_to_bool(call.number(index)?) {
            return Ok(1.0);
        }
    }
    Ok(0.0)
}

pub fn fn_not(call: &Call) -> CalcResult<f64> {
    Ok(bool_to_float(!float_to_bool(call.number(0)?)))
}

/// BETWEEN(value, low, high), inclusive at both ends
pub fn fn_between(call: &Call) -> CalcResult<f64> {
    let value = call.number(0)?;
    let low = call.number(1)?;
    let high = call.number(2)?;
    let digits = call.decimal_numbers();
    let above = double_is_equal_or_greater(value, low, digits);
    Ok(bool_to_float(above && double_is_equal_or_less(value, high, digits)))
}

/// RAISEERROR(message) always fails with USER_EXCEPTION
///
/// The message is the argument evaluated as a string, or its raw text when
/// it does not evaluate.
pub fn fn_raiseerror(call: &Call) -> CalcResult<f64> {
    let message = match call.text(0) {
        Ok(text) => text,
        Err(_) => call.arg(0)?.to_string(),
    };
    Err(call.error_with(ErrorKind::UserException, message))
}

pub fn fn_safediv(call: &Call) -> CalcResult<f64> {
    Ok(safe_div(call.number(0)?, call.number(1)?))
}

/// ROUND(value, places) with ties to even
pub fn fn_round(call: &Call) -> CalcResult<f64> {
    let value = call.number(0)?;
    let places = round_half_up(call.number(1)?)
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    Ok(round_half_even(value, places))
}

pub fn fn_ceil(call: &Call) -> CalcResult<f64> {
    Ok(call.number(0)?.ceil())
}

pub fn fn_floor(call: &Call) -> CalcResult<f64> {
    Ok(call.number(0)?.floor())
}

pub fn fn_todouble(call: &Call) -> CalcResult<f64> {
    let value = call.text(0)?;
    parse_or_fail(call, value)
}

/// EMPTY(text) is 1 when the text is blank
pub fn fn_empty(call: &Call) -> CalcResult<f64> {
    Ok(bool_to_float(call.text(0)?.trim().is_empty()))
}

pub fn fn_len(call: &Call) -> CalcResult<f64> {
    Ok(call.text(0)?.chars().count() as f64)
}

/// POS(needle, haystack): character index of the first match, or -1
pub fn fn_pos(call: &Call) -> CalcResult<f64> {
    let needle = call.text(0)?;
    let haystack = call.text(1)?;
    Ok(match haystack.find(&needle) {
        Some(byte_index) => haystack[..byte_index].chars().count() as f64,
        None => -1.0,
    })
}

pub fn fn_equals(call: &Call) -> CalcResult<f64> {
    Ok(bool_to_float(call.text(0)? == call.text(1)?))
}

pub fn fn_equalsignorecase(call: &Call) -> CalcResult<f64> {
    Ok(bool_to_float(call.text(0)?.to_lowercase() == call.text(1)?.to_lowercase()))
}

pub fn fn_compareto(call: &Call) -> CalcResult<f64> {
    Ok(compare_strings(&call.text(0)?, &call.text(1)?))
}

pub fn fn_comparetoignorecase(call: &Call) -> CalcResult<f64> {
    Ok(compare_strings(&call.text(0)?.to_lowercase(), &call.text(1)?.to_lowercase()))
}

pub fn fn_left(call: &Call) -> CalcResult<f64> {
    let value = text::fn_left(call)?;
    parse_or_fail(call, value)
}

pub fn fn_right(call: &Call) -> CalcResult<f64> {
    let value = text::fn_right(call)?;
    parse_or_fail(call, value)
}

pub fn fn_substr(call: &Call) -> CalcResult<f64> {
    let value = text::fn_substr(call)?;
    parse_or_fail(call, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("3,5"), Some(3.5));
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1.25"), Some(-1.25));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_compare_strings() {
        assert_eq!(compare_strings("abc", "abc"), 0.0);
        assert_eq!(compare_strings("abc", "abd"), -1.0);
        assert_eq!(compare_strings("b", "a"), 1.0);
        assert_eq!(compare_strings("ab", "abcd"), -2.0);
        assert_eq!(compare_strings("A", "a"), -32.0);
    }

    #[test]
    fn test_raiseerror_is_always_a_user_exception() {
        let engine = Engine::default();
        for (formula, message) in [
            ("raiseerror('stop')", "stop"),
            ("raiseerror(42)", "42"),
            ("raiseerror(oops)", "oops"),
        ] {
            let err = engine.calculate(formula).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UserException, "{formula}");
            assert_eq!(err.identifier(), Some(message), "{formula}");
        }
    }
}
