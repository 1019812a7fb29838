//! Numeric helpers used by the evaluator
//!
//! Formula comparisons never test doubles for exact equality. Two values are
//! considered equal when they differ by less than a tolerance derived from a
//! number of decimal digits (the engine's "decimal numbers" setting).
//!
//! Rounding goes through [`rust_decimal`] so that ties are resolved on the
//! shortest decimal representation of the double, not on its binary expansion:
//! `round_to(2.675, 2, HalfEven)` sees `2.675`, not `2.67499999...`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Default number of decimal digits used by comparisons
pub const DEFAULT_DECIMAL_NUMBERS: u32 = 5;

/// Decimal rounding modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingMode {
    /// Away from zero
    Up,
    /// Toward zero
    Down,
    /// Toward positive infinity
    Ceiling,
    /// Toward negative infinity
    Floor,
    /// Nearest neighbour, ties away from zero
    HalfUp,
    /// Nearest neighbour, ties toward zero
    HalfDown,
    /// Nearest neighbour, ties to the even neighbour (banker's rounding)
    #[default]
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Round `value` to `places` decimal digits using `mode`
///
/// A negative `places` rounds to the left of the decimal point
/// (`round_to(1250.0, -2, HalfEven) == 1200.0`). Values that cannot be
/// represented as a decimal (non-finite or out of range) are returned unchanged.
pub fn round_to(value: f64, places: i32, mode: RoundingMode) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let Ok(decimal) = Decimal::from_str(&value.to_string()) else {
        return value;
    };

    let rounded = if places >= 0 {
        decimal.round_dp_with_strategy(places.unsigned_abs(), mode.strategy())
    } else {
        let mut factor = Decimal::ONE;
        for _ in 0..places.unsigned_abs() {
            match factor.checked_mul(Decimal::TEN) {
                Some(next) => factor = next,
                None => return 0.0,
            }
        }
        (decimal / factor).round_dp_with_strategy(0, mode.strategy()) * factor
    };

    rounded.to_f64().unwrap_or(value)
}

/// Round with ties to even
pub fn round_half_even(value: f64, places: i32) -> f64 {
    round_to(value, places, RoundingMode::HalfEven)
}

/// Round to the nearest integer, ties toward positive infinity
///
/// This is the rounding applied to counts and positions passed to text
/// functions (`left('abc', 1.5)` keeps two characters).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn tolerance(decimal_numbers: u32) -> f64 {
    let digits = decimal_numbers as i32;
    10f64.powi(-digits) - 10f64.powi(-(digits + 1)) - 10f64.powi(-(digits + 2))
}

/// `a == b` within `decimal_numbers` digits
pub fn doubles_are_equal(a: f64, b: f64, decimal_numbers: u32) -> bool {
    (a - b).abs() <= tolerance(decimal_numbers)
}

/// `a >= b` within `decimal_numbers` digits
pub fn double_is_equal_or_greater(a: f64, b: f64, decimal_numbers: u32) -> bool {
    doubles_are_equal(a, b, decimal_numbers) || a > b
}

/// `a <= b` within `decimal_numbers` digits
pub fn double_is_equal_or_less(a: f64, b: f64, decimal_numbers: u32) -> bool {
    doubles_are_equal(a, b, decimal_numbers) || a < b
}

/// `a > b` and not equal within `decimal_numbers` digits
pub fn double_is_greater(a: f64, b: f64, decimal_numbers: u32) -> bool {
    !doubles_are_equal(a, b, decimal_numbers) && a > b
}

/// `a < b` and not equal within `decimal_numbers` digits
pub fn double_is_less(a: f64, b: f64, decimal_numbers: u32) -> bool {
    !doubles_are_equal(a, b, decimal_numbers) && a < b
}

/// Division yielding 0 on a zero denominator
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Formula truthiness: the magnitude rounds to at least 1
pub fn float_to_bool(value: f64) -> bool {
    round_half_up(value.abs()) >= 1
}

pub fn bool_to_float(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Format a double the way formulas display numbers
///
/// Values in `[1e-3, 1e7)` are written in plain decimal notation with at least
/// one fractional digit (`4.0`, `3.25`); everything else uses scientific
/// notation with an upper-case exponent marker (`1.0E7`, `1.5E-5`).
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        }
    } else {
        let text = format!("{value:e}");
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exponent}")
        } else {
            format!("{mantissa}.0E{exponent}")
        }
    }
}
