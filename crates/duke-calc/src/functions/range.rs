//! Aggregates and range navigation
//!
//! `sum`, `max`, `min`, `avg` and `count` either evaluate each argument, or,
//! when their single argument mentions a navigation keyword such as
//! `childs(amount)`, ask the providers for the values reached by that
//! navigation. Keywords are searched as substrings in a fixed order (see
//! [`RangeFunction::SEARCH_ORDER`]), so `parents(x)` is taken as `parent`
//! followed by `s(x)` and fails the parenthesis check.

use super::numeric::parse_number;
use super::Call;
use crate::error::{CalcResult, ErrorKind};
use duke_calc_core::math::format_double;
use duke_calc_core::{RangeFunction, RangeValue, ValueType};
use log::debug;

/// Text between the navigation keyword's parentheses
fn inside_braces<'t>(call: &Call, text: &'t str) -> CalcResult<&'t str> {
    let text = text.trim();
    if text.len() <= 2 || !text.starts_with('(') || !text.ends_with(')') {
        return Err(call.error(ErrorKind::SyntaxError));
    }
    Ok(text[1..text.len() - 1].trim())
}

/// Operand values of an aggregate call
pub fn collect(call: &Call, value_type: ValueType) -> CalcResult<Vec<RangeValue>> {
    if let [arg] = call.args {
        let arg = arg.trim();
        if let Some((range, end)) = RangeFunction::find_in(arg) {
            let inner = inside_braces(call, &arg[end..])?;
            debug!("{}: forwarding {}({}) to providers", call.name, range, inner);
            return call
                .engine
                .resolve_range(range, inner, value_type)?
                .ok_or_else(|| call.error_with(ErrorKind::FunctionError, range.keyword()));
        }
    }

    call.args
        .iter()
        .map(|arg| match value_type {
            ValueType::Numeric => call.engine.calculate(arg).map(RangeValue::Number),
            ValueType::Textual => call.engine.calculate_string(arg).map(RangeValue::Text),
        })
        .collect()
}

fn numbers(call: &Call) -> CalcResult<Vec<f64>> {
    collect(call, ValueType::Numeric)?
        .into_iter()
        .map(|value| match value {
            RangeValue::Number(n) => Ok(n),
            RangeValue::Text(text) => {
                parse_number(&text).ok_or_else(|| call.error_with(ErrorKind::ParseError, text))
            }
        })
        .collect()
}

fn strings(call: &Call) -> CalcResult<Vec<String>> {
    Ok(collect(call, ValueType::Textual)?
        .into_iter()
        .map(|value| match value {
            RangeValue::Number(n) => format_double(n),
            RangeValue::Text(text) => text,
        })
        .collect())
}

pub fn fn_sum(call: &Call) -> CalcResult<f64> {
    Ok(numbers(call)?.into_iter().sum())
}

/// Largest value; 0 when there is none
pub fn fn_max(call: &Call) -> CalcResult<f64> {
    Ok(numbers(call)?
        .into_iter()
        .reduce(|best, n| if n > best { n } else { best })
        .unwrap_or(0.0))
}

/// Smallest value; 0 when there is none
pub fn fn_min(call: &Call) -> CalcResult<f64> {
    Ok(numbers(call)?
        .into_iter()
        .reduce(|best, n| if n < best { n } else { best })
        .unwrap_or(0.0))
}

/// Arithmetic mean; 0 when there is no value
pub fn fn_avg(call: &Call) -> CalcResult<f64> {
    let values = numbers(call)?;
    if values.is_empty() {
        return Ok(0.0);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn fn_count(call: &Call) -> CalcResult<f64> {
    Ok(collect(call, ValueType::Numeric)?.len() as f64)
}

/// Concatenation of all values
pub fn fn_sum_text(call: &Call) -> CalcResult<String> {
    Ok(strings(call)?.concat())
}

/// Lexicographically largest value; "" when there is none
pub fn fn_max_text(call: &Call) -> CalcResult<String> {
    Ok(strings(call)?.into_iter().max().unwrap_or_default())
}

/// Lexicographically smallest value; "" when there is none
///
/// The comparison starts from the first value rather than from "", which
/// would make the minimum of any range the empty string.
pub fn fn_min_text(call: &Call) -> CalcResult<String> {
    Ok(strings(call)?.into_iter().min().unwrap_or_default())
}

pub fn fn_count_text(call: &Call) -> CalcResult<String> {
    Ok(collect(call, ValueType::Textual)?.len().to_string())
}
