//! Tests for formula evaluation without data providers

use chrono::{FixedOffset, TimeZone, Utc};
use duke_calc::{Engine, ErrorKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn calc(formula: &str) -> f64 {
    Engine::default()
        .calculate(formula)
        .unwrap_or_else(|e| panic!("{formula}: {e}"))
}

fn calc_str(formula: &str) -> String {
    Engine::default()
        .calculate_string(formula)
        .unwrap_or_else(|e| panic!("{formula}: {e}"))
}

fn calc_err(formula: &str) -> ErrorKind {
    Engine::default().calculate(formula).unwrap_err().kind()
}

fn hour_bucket(year: i32, month: u32, day: u32, hour: u32) -> f64 {
    (Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap().timestamp() / 3600) as f64
}

/// Test the basic arithmetic examples
#[test]
fn test_basic_formulas() {
    assert_eq!(calc("2 + 2"), 4.0);
    assert_eq!(calc("((21 * 2) - 1) - 20"), 21.0);
    assert_eq!(calc("IF(1, 0, 1)"), 0.0);
    assert_eq!(calc("  1 +\n 2\t"), 3.0);
}

/// Test banker's rounding
#[test]
fn test_round() {
    assert_eq!(calc("round(2.5, 0)"), 2.0);
    assert_eq!(calc("round(3.5, 0)"), 4.0);
    assert_eq!(calc("round(1.255, 2)"), 1.26);
    assert_eq!(calc("round(1250, -2)"), 1200.0);
    assert_eq!(calc("ceil(1.2)"), 2.0);
    assert_eq!(calc("floor(-1.2)"), -2.0);
}

/// Test logical functions
#[test]
fn test_logical_functions() {
    assert_eq!(calc("and(1, 1, 0)"), 0.0);
    assert_eq!(calc("and(1, 2)"), 1.0);
    assert_eq!(calc("or(0, 0, 1)"), 1.0);
    assert_eq!(calc("or(0, 0)"), 0.0);
    assert_eq!(calc("not(0)"), 1.0);
    assert_eq!(calc("not(0.4)"), 1.0);
    assert_eq!(calc("not(-3)"), 0.0);
    assert_eq!(calc("between(5, 1, 5)"), 1.0);
    assert_eq!(calc("between(5.1, 1, 5)"), 0.0);
    assert_eq!(calc("safediv(1, 0)"), 0.0);
    assert_eq!(calc("safediv(9, 3)"), 3.0);
}

/// Only the arguments that decide the result are evaluated
#[test]
fn test_lazy_arguments() {
    assert_eq!(calc("and(0, unknown)"), 0.0);
    assert_eq!(calc("or(1, unknown)"), 1.0);
    assert_eq!(calc("IF(0, unknown, 7)"), 7.0);
    assert_eq!(calc_str("IF(1, 'yes', unknown)"), "yes");
    assert_eq!(calc_err("IF(1, unknown, 7)"), ErrorKind::FunctionError);
}

/// Test numeric functions over strings
#[test]
fn test_string_inspection() {
    assert_eq!(calc("len('héllo')"), 5.0);
    assert_eq!(calc("empty('  ')"), 1.0);
    assert_eq!(calc("empty('a')"), 0.0);
    assert_eq!(calc("pos('lo', 'hello')"), 3.0);
    assert_eq!(calc("pos('z', 'hello')"), -1.0);
    assert_eq!(calc("equals('a', 'a')"), 1.0);
    assert_eq!(calc("equals('a', 'A')"), 0.0);
    assert_eq!(calc("equalsignorecase('a', 'A')"), 1.0);
    assert_eq!(calc("compareto('a', 'b')"), -1.0);
    assert_eq!(calc("comparetoignorecase('B', 'a')"), 1.0);
    assert_eq!(calc("todouble('3,25')"), 3.25);
    assert_eq!(calc("left('123abc', 3) + 1"), 124.0);
    assert_eq!(calc("right('abc42', 2)"), 42.0);
    assert_eq!(calc("substr('ab12cd', 2, 2)"), 12.0);
}

/// Text that is not a number is a parse error naming the text
#[test]
fn test_parse_errors() {
    let err = Engine::default().calculate("todouble('abc')").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseError);
    assert_eq!(err.identifier(), Some("abc"));

    assert_eq!(calc_err("left('abc', 2)"), ErrorKind::ParseError);
}

/// Test string functions
#[test]
fn test_string_functions() {
    assert_eq!(calc_str("concatenate('a,b', 'c')"), "a,bc");
    assert_eq!(calc_str("concatenate('a', 'b', 'c') + 'd'"), "abcd");
    assert_eq!(calc_str("replicate('ab', 2)"), "ababab");
    assert_eq!(calc_str("replicate('ab', 0)"), "ab");
    assert_eq!(calc_str("tostr(4)"), "4.0");
    assert_eq!(calc_str("tostr(10 / 4)"), "2.5");
    assert_eq!(calc_str("uppercase('abc')"), "ABC");
    assert_eq!(calc_str("lowercase('ABC')"), "abc");
    assert_eq!(calc_str("left('hello', 2)"), "he");
    assert_eq!(calc_str("right('hello', 10)"), "hello");
    assert_eq!(calc_str("substr('hello', 1, 3)"), "ell");
    assert_eq!(calc_str("substr('hello', 4, 10)"), "o");
    assert_eq!(calc_str("substr('hello', 9, 1)"), "");
}

/// String IF takes the first branch when the condition is at least 1
#[test]
fn test_string_if() {
    assert_eq!(calc_str("IF(1, 'yes', 'no')"), "yes");
    assert_eq!(calc_str("IF(0.9999999, 'yes', 'no')"), "yes");
    assert_eq!(calc_str("IF(0.5, 'yes', 'no')"), "no");
    assert_eq!(calc_str("IF(2 > 1, 'a' + 'b', 'c')"), "ab");
}

/// Test aggregates over explicit arguments
#[test]
fn test_aggregates() {
    assert_eq!(calc("sum(1, 2, 3)"), 6.0);
    assert_eq!(calc("max(1, 5, 3)"), 5.0);
    assert_eq!(calc("min(4, -2, 3)"), -2.0);
    assert_eq!(calc("avg(1, 2, 3, 4)"), 2.5);
    assert_eq!(calc("count(1, 2, 3)"), 3.0);
    assert_eq!(calc("sum(1 + 1, max(2, 3))"), 5.0);

    assert_eq!(calc_str("sum('a', 'b')"), "ab");
    assert_eq!(calc_str("max('pear', 'apple')"), "pear");
    assert_eq!(calc_str("min('pear', 'apple')"), "apple");
    assert_eq!(calc_str("count('a', 'b')"), "2");
}

/// Test argument count validation
#[test]
fn test_wrong_param_count() {
    assert_eq!(calc_err("IF(1,2)"), ErrorKind::WrongParamCount);
    assert_eq!(calc_err("and(1)"), ErrorKind::WrongParamCount);
    assert_eq!(calc_err("sum()"), ErrorKind::WrongParamCount);
    assert_eq!(calc_err("todatetime(1, 1, 2024)"), ErrorKind::WrongParamCount);

    let err = Engine::default().calculate_string("concatenate('a')").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongParamCount);
    assert_eq!(err.identifier(), Some("concatenate"));
}

/// A built-in used from the channel it does not support
#[test]
fn test_channel_mismatch() {
    assert_eq!(calc_err("concatenate('a', 'b')"), ErrorKind::FunctionUnknown);
    assert_eq!(calc_err("uppercase('a')"), ErrorKind::FunctionUnknown);

    let engine = Engine::default();
    assert_eq!(
        engine.calculate_string("len('a')").unwrap_err().kind(),
        ErrorKind::FunctionUnknown
    );
    assert_eq!(
        engine.calculate_string("avg(1)").unwrap_err().kind(),
        ErrorKind::FunctionUnknown
    );
}

/// Test raiseerror
#[test]
fn test_raiseerror() {
    let err = Engine::default().calculate("raiseerror('bad ' + 'input')").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserException);
    assert_eq!(err.identifier(), Some("bad input"));
    assert!(err.to_string().starts_with(
        "Error USER_EXCEPTION (description: User exception) while validating bad input"
    ));
}

/// raiseerror keeps the raw text of an argument that is not a string
#[test]
fn test_raiseerror_with_raw_argument() {
    let engine = Engine::default();

    let err = engine.calculate("raiseerror(42)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserException);
    assert_eq!(err.identifier(), Some("42"));

    let err = engine.calculate("IF(1, raiseerror(oops), 0)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserException);
    assert_eq!(err.identifier(), Some("oops"));
}

/// replicate refuses to build huge strings
#[test]
fn test_replicate_limit() {
    let err = Engine::default()
        .calculate_string("replicate('ab', 2147483647 * 2147483647 * 4)")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FunctionError);
    assert_eq!(err.identifier(), Some("replicate"));
    assert_eq!(calc("len(replicate('a', 999))"), 1000.0);
}

/// Double quotes do not protect commas from the argument splitter
#[test]
fn test_double_quoted_commas_split() {
    assert_eq!(calc("len(\"ab\")"), 2.0);
    assert_eq!(calc("len('a,b')"), 3.0);
    assert_eq!(calc_err("len(\"a,b\")"), ErrorKind::WrongParamCount);
}

/// Equality needs two equal signs
#[test]
fn test_single_equals_rejected() {
    assert_eq!(calc("1 == 1"), 1.0);
    assert_eq!(calc_err("1 = 1"), ErrorKind::SyntaxError);
}

/// Test error kinds for malformed input
#[test]
fn test_error_kinds() {
    assert_eq!(calc_err("'abc"), ErrorKind::InvalidString);
    assert_eq!(calc_err("foo"), ErrorKind::FunctionError);
    assert_eq!(calc_err("1 +"), ErrorKind::SyntaxError);
    assert_eq!(calc_err("sum(1, 'x)"), ErrorKind::FunctionError);
}

/// Errors inside an argument report the argument text
#[test]
fn test_nested_error_reports_argument() {
    let err = Engine::default().calculate("sum(1, 2 + missing)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FunctionError);
    assert_eq!(err.formula(), "2 + missing");
    assert_eq!(err.identifier(), Some("missing"));
}

/// Test date construction and calendar fields in UTC
#[test]
fn test_dates() {
    assert_eq!(calc("todate(15, 3, 2024)"), hour_bucket(2024, 3, 15, 0));
    assert_eq!(calc("todatetime(15, 3, 2024, 13, 47, 5)"), hour_bucket(2024, 3, 15, 13));
    assert_eq!(calc("getday(todate(15, 3, 2024))"), 15.0);
    assert_eq!(calc("getmonth(todate(15, 3, 2024))"), 3.0);
    assert_eq!(calc("getyear(todate(15, 3, 2024))"), 2024.0);
    assert_eq!(calc("getweek(todate(8, 1, 2024))"), 2.0);
    assert_eq!(calc("gethour(todatetime(15, 3, 2024, 13, 47, 5))"), 13.0);
    assert_eq!(calc("getminute(todatetime(15, 3, 2024, 13, 47, 5))"), 0.0);
    assert_eq!(calc("getsecond(todate(15, 3, 2024))"), 0.0);
}

/// Test week and month navigation
#[test]
fn test_date_navigation() {
    assert_eq!(calc("previousmonday(todate(15, 3, 2024)) == todate(11, 3, 2024)"), 1.0);
    assert_eq!(calc("startofthemonth(todate(15, 3, 2024)) == todate(1, 3, 2024)"), 1.0);
    assert_eq!(calc("endofthemonth(todate(10, 2, 2024)) == todate(29, 2, 2024)"), 1.0);
}

/// Test string to date parsing
#[test]
fn test_stringtodatetime() {
    assert_eq!(
        calc("stringtodatetime('15-03-2024', 'DD-MM-YYYY') == todate(15, 3, 2024)"),
        1.0
    );
    assert_eq!(
        calc("stringtodatetime('15/03/2024 13:00:00', 'dd/MM/yyyy HH:MI:SS')"),
        hour_bucket(2024, 3, 15, 13)
    );

    let err = Engine::default()
        .calculate("stringtodatetime('garbage', 'DD-MM-YYYY')")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseError);
    assert_eq!(err.identifier(), Some("garbage"));
}

/// Invalid calendar components are function errors
#[test]
fn test_invalid_dates() {
    assert_eq!(calc_err("todate(30, 2, 2024)"), ErrorKind::FunctionError);
    assert_eq!(calc_err("todate(-1, 2, 2024)"), ErrorKind::FunctionError);
    assert_eq!(calc_err("todatetime(1, 1, 2024, 24, 0, 0)"), ErrorKind::FunctionError);
}

/// Test distances from the current time
#[test]
fn test_distances() {
    assert_eq!(calc("distancefromtoday(today)"), 0.0);
    assert_eq!(calc("distancefromtoday(today - 48)"), 48.0);
    assert_eq!(calc("distancefromnow(now) <= 1"), 1.0);
}

/// Calendar functions follow the engine time zone
#[test]
fn test_time_zone() {
    let zone = FixedOffset::east_opt(2 * 3600).unwrap();
    let engine = Engine::with_time_zone(zone);
    assert_eq!(
        engine.calculate("todate(15, 3, 2024)").unwrap(),
        hour_bucket(2024, 3, 14, 22)
    );
    assert_eq!(
        engine.calculate("gethour(todatetime(15, 3, 2024, 13, 0, 0))").unwrap(),
        13.0
    );
    assert_eq!(engine.calculate("getday(todate(1, 1, 2025))").unwrap(), 1.0);
}

#[derive(Debug, Clone)]
enum Expr {
    Num(u8),
    Bin(Box<Expr>, char, Box<Expr>),
}

impl Expr {
    fn render(&self) -> String {
        match self {
            Expr::Num(n) => n.to_string(),
            Expr::Bin(l, op, r) => format!("({} {} {})", l.render(), op, r.render()),
        }
    }

    fn value(&self) -> i64 {
        match self {
            Expr::Num(n) => i64::from(*n),
            Expr::Bin(l, '+', r) => l.value() + r.value(),
            Expr::Bin(l, '-', r) => l.value() - r.value(),
            Expr::Bin(l, _, r) => l.value() * r.value(),
        }
    }
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = (0u8..10).prop_map(Expr::Num);
    leaf.prop_recursive(3, 8, 2, |inner| {
        (inner.clone(), prop_oneof![Just('+'), Just('-'), Just('*')], inner)
            .prop_map(|(l, op, r)| Expr::Bin(Box::new(l), op, Box::new(r)))
    })
}

proptest! {
    #[test]
    fn prop_parenthesized_arithmetic(e in expr()) {
        let engine = Engine::default();
        prop_assert_eq!(engine.calculate(&e.render()).unwrap(), e.value() as f64);
    }

    #[test]
    fn prop_precedence(a in 0i64..100, b in 0i64..100, c in 1i64..100, d in 0i64..100) {
        let engine = Engine::default();
        let formula = format!("{a} + {b} * {c} - {d}");
        prop_assert_eq!(engine.calculate(&formula).unwrap(), (a + b * c - d) as f64);

        let formula = format!("{a} - {b} - {d} * {c} / {c}");
        prop_assert_eq!(engine.calculate(&formula).unwrap(), (a - b - d) as f64);
    }
}
