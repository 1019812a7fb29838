//! Built-in functions
//!
//! Built-ins share one case-insensitive name table. A name can have a
//! numeric implementation, a string implementation, or both; calling it from
//! the channel it lacks is `FUNCTION_UNKNOWN`. Arguments arrive as raw text
//! and each implementation evaluates only the ones it needs, which is what
//! makes `if`, `and` and `or` lazy.

pub mod date;
pub mod numeric;
pub mod range;
pub mod text;

use crate::engine::Engine;
use crate::error::{CalcError, CalcResult, ErrorKind};
use duke_calc_core::datetime;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::OnceLock;

/// Numeric implementation signature
pub type NumericImpl = fn(&Call) -> CalcResult<f64>;

/// String implementation signature
pub type TextImpl = fn(&Call) -> CalcResult<String>;

/// A built-in function call being evaluated
pub struct Call<'a> {
    /// Engine evaluating the enclosing formula
    pub engine: &'a Engine,
    /// Function name as written
    pub name: &'a str,
    /// Raw argument texts
    pub args: &'a [String],
    formula: &'a str,
    position: usize,
}

impl<'a> Call<'a> {
    pub fn new(
        engine: &'a Engine,
        name: &'a str,
        args: &'a [String],
        formula: &'a str,
        position: usize,
    ) -> Self {
        Self {
            engine,
            name,
            args,
            formula,
            position,
        }
    }

    fn arg(&self, index: usize) -> CalcResult<&'a str> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.error(ErrorKind::WrongParamCount))
    }

    /// Evaluate argument `index` in the numeric channel
    pub fn number(&self, index: usize) -> CalcResult<f64> {
        self.engine.calculate(self.arg(index)?)
    }

    /// Evaluate argument `index` in the string channel
    pub fn text(&self, index: usize) -> CalcResult<String> {
        self.engine.calculate_string(self.arg(index)?)
    }

    /// Comparison precision of the engine
    pub fn decimal_numbers(&self) -> u32 {
        self.engine.settings().decimal_numbers
    }

    /// Error naming this function
    pub fn error(&self, kind: ErrorKind) -> CalcError {
        self.error_with(kind, self.name)
    }

    /// Error naming something else (an unparsable text, a user message)
    pub fn error_with(&self, kind: ErrorKind, identifier: impl Into<String>) -> CalcError {
        CalcError::new(kind, Some(identifier.into()), self.formula, self.position)
    }
}

/// Function definition
pub struct FunctionDef {
    /// Function name (lowercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation used by the numeric evaluator
    pub numeric: Option<NumericImpl>,
    /// Implementation used by the string evaluator
    pub text: Option<TextImpl>,
}

impl FunctionDef {
    fn check_arity(&self, call: &Call) -> CalcResult<()> {
        let count = call.args.len();
        let too_many = self.max_args.is_some_and(|max| count > max);
        if count < self.min_args || too_many {
            return Err(call.error(ErrorKind::WrongParamCount));
        }
        Ok(())
    }
}

/// Function registry
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_logical_functions();
        registry.register_math_functions();
        registry.register_text_functions();
        registry.register_aggregate_functions();
        registry.register_date_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_lowercase())
    }

    fn entry(
        &mut self,
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
    ) -> &mut FunctionDef {
        self.functions.entry(name.to_string()).or_insert(FunctionDef {
            name,
            min_args,
            max_args,
            numeric: None,
            text: None,
        })
    }

    fn numeric(
        &mut self,
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: NumericImpl,
    ) {
        self.entry(name, min_args, max_args).numeric = Some(implementation);
    }

    fn text(
        &mut self,
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: TextImpl,
    ) {
        self.entry(name, min_args, max_args).text = Some(implementation);
    }

    fn register_logical_functions(&mut self) {
        self.numeric("if", 3, Some(3), numeric::fn_if);
        self.text("if", 3, Some(3), text::fn_if);
        self.numeric("and", 2, None, numeric::fn_and);
        self.numeric("or", 2, None, numeric::fn_or);
        self.numeric("not", 1, Some(1), numeric::fn_not);
        self.numeric("between", 3, Some(3), numeric::fn_between);
        self.numeric("raiseerror", 1, Some(1), numeric::fn_raiseerror);
    }

    fn register_math_functions(&mut self) {
        self.numeric("safediv", 2, Some(2), numeric::fn_safediv);
        self.numeric("round", 2, Some(2), numeric::fn_round);
        self.numeric("ceil", 1, Some(1), numeric::fn_ceil);
        self.numeric("floor", 1, Some(1), numeric::fn_floor);
        self.numeric("todouble", 1, Some(1), numeric::fn_todouble);
    }

    fn register_text_functions(&mut self) {
        self.numeric("empty", 1, Some(1), numeric::fn_empty);
        self.numeric("len", 1, Some(1), numeric::fn_len);
        self.numeric("pos", 2, Some(2), numeric::fn_pos);
        self.numeric("equals", 2, Some(2), numeric::fn_equals);
        self.numeric("equalsignorecase", 2, Some(2), numeric::fn_equalsignorecase);
        self.numeric("compareto", 2, Some(2), numeric::fn_compareto);
        self.numeric("comparetoignorecase", 2, Some(2), numeric::fn_comparetoignorecase);

        self.numeric("left", 2, Some(2), numeric::fn_left);
        self.text("left", 2, Some(2), text::fn_left);
        self.numeric("right", 2, Some(2), numeric::fn_right);
        self.text("right", 2, Some(2), text::fn_right);
        self.numeric("substr", 3, Some(3), numeric::fn_substr);
        self.text("substr", 3, Some(3), text::fn_substr);

        self.text("concatenate", 2, None, text::fn_concatenate);
        self.text("replicate", 2, Some(2), text::fn_replicate);
        self.text("tostr", 1, Some(1), text::fn_tostr);
        self.text("uppercase", 1, Some(1), text::fn_uppercase);
        self.text("lowercase", 1, Some(1), text::fn_lowercase);
    }

    fn register_aggregate_functions(&mut self) {
        self.numeric("sum", 1, None, range::fn_sum);
        self.text("sum", 1, None, range::fn_sum_text);
        self.numeric("max", 1, None, range::fn_max);
        self.text("max", 1, None, range::fn_max_text);
        self.numeric("min", 1, None, range::fn_min);
        self.text("min", 1, None, range::fn_min_text);
        self.numeric("count", 1, None, range::fn_count);
        self.text("count", 1, None, range::fn_count_text);
        self.numeric("avg", 1, None, range::fn_avg);
    }

    fn register_date_functions(&mut self) {
        self.numeric("getday", 1, Some(1), date::fn_getday);
        self.numeric("getweek", 1, Some(1), date::fn_getweek);
        self.numeric("getmonth", 1, Some(1), date::fn_getmonth);
        self.numeric("getyear", 1, Some(1), date::fn_getyear);
        self.numeric("gethour", 1, Some(1), date::fn_gethour);
        self.numeric("getminute", 1, Some(1), date::fn_getminute);
        self.numeric("getsecond", 1, Some(1), date::fn_getsecond);
        self.numeric("previousmonday", 1, Some(1), date::fn_previousmonday);
        self.numeric("startofthemonth", 1, Some(1), date::fn_startofthemonth);
        self.numeric("endofthemonth", 1, Some(1), date::fn_endofthemonth);
        self.numeric("todate", 3, Some(3), date::fn_todate);
        self.numeric("todatetime", 6, Some(6), date::fn_todatetime);
        self.numeric("distancefromnow", 1, Some(1), date::fn_distancefromnow);
        self.numeric("distancefromtoday", 1, Some(1), date::fn_distancefromtoday);
        self.numeric("stringtodatetime", 2, Some(2), date::fn_stringtodatetime);
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Built-in named `name`, if any
pub fn lookup(name: &str) -> Option<&'static FunctionDef> {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new).get(name)
}

/// Run a built-in from the numeric evaluator
pub fn evaluate_numeric(def: &FunctionDef, call: &Call) -> CalcResult<f64> {
    let implementation = def.numeric.ok_or_else(|| call.error(ErrorKind::FunctionUnknown))?;
    def.check_arity(call)?;
    implementation(call)
}

/// Run a built-in from the string evaluator
pub fn evaluate_text(def: &FunctionDef, call: &Call) -> CalcResult<String> {
    let implementation = def.text.ok_or_else(|| call.error(ErrorKind::FunctionUnknown))?;
    def.check_arity(call)?;
    implementation(call)
}

/// Single-argument math functions applied to a parenthesized expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalFunction {
    Trunc,
    Int,
    Frac,
    Sin,
    Cos,
    Tan,
}

impl InternalFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        const NAMES: [(&str, InternalFunction); 6] = [
            ("trunc", InternalFunction::Trunc),
            ("int", InternalFunction::Int),
            ("frac", InternalFunction::Frac),
            ("sin", InternalFunction::Sin),
            ("cos", InternalFunction::Cos),
            ("tan", InternalFunction::Tan),
        ];
        NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, function)| function)
    }

    pub fn apply(self, value: f64) -> f64 {
        match self {
            // both round toward negative infinity
            InternalFunction::Trunc | InternalFunction::Int => value.floor(),
            InternalFunction::Frac => value - value.floor(),
            InternalFunction::Sin => value.sin(),
            InternalFunction::Cos => value.cos(),
            InternalFunction::Tan => value.tan(),
        }
    }
}

/// Space-trimming transforms of the string channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransform {
    Trim,
    LTrim,
    RTrim,
}

impl TextTransform {
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("trim") {
            Some(TextTransform::Trim)
        } else if name.eq_ignore_ascii_case("ltrim") {
            Some(TextTransform::LTrim)
        } else if name.eq_ignore_ascii_case("rtrim") {
            Some(TextTransform::RTrim)
        } else {
            None
        }
    }

    pub fn apply(self, value: &str) -> String {
        match self {
            TextTransform::Trim => value.trim_matches(' '),
            TextTransform::LTrim => value.trim_start_matches(' '),
            TextTransform::RTrim => value.trim_end_matches(' '),
        }
        .to_string()
    }
}

/// Named constants of the numeric channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Now,
    Today,
    True,
    False,
    Pi,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        const NAMES: [(&str, Constant); 5] = [
            ("now", Constant::Now),
            ("today", Constant::Today),
            ("true", Constant::True),
            ("false", Constant::False),
            ("pi", Constant::Pi),
        ];
        NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, constant)| constant)
    }

    pub fn value(self, engine: &Engine) -> duke_calc_core::Result<f64> {
        Ok(match self {
            Constant::Now => datetime::now(),
            Constant::Today => datetime::instant_to_double(datetime::today(&engine.time_zone())?),
            Constant::True => 1.0,
            Constant::False => 0.0,
            Constant::Pi => PI,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("IF").map(|def| def.name), Some("if"));
        assert_eq!(lookup("ComparetoIgnoreCase").map(|def| def.name), Some("comparetoignorecase"));
        assert!(lookup("trim").is_none());
        assert!(lookup("unknown").is_none());
    }

    #[test]
    fn test_channels() {
        let concatenate = lookup("concatenate").unwrap();
        assert!(concatenate.numeric.is_none());
        assert!(concatenate.text.is_some());

        let avg = lookup("avg").unwrap();
        assert!(avg.numeric.is_some());
        assert!(avg.text.is_none());

        let left = lookup("left").unwrap();
        assert!(left.numeric.is_some() && left.text.is_some());
    }

    #[test]
    fn test_arity_table() {
        let todatetime = lookup("todatetime").unwrap();
        assert_eq!((todatetime.min_args, todatetime.max_args), (6, Some(6)));
        let and = lookup("and").unwrap();
        assert_eq!((and.min_args, and.max_args), (2, None));
    }

    #[test]
    fn test_internal_functions() {
        assert_eq!(InternalFunction::from_name("TRUNC"), Some(InternalFunction::Trunc));
        assert_eq!(InternalFunction::Trunc.apply(-1.5), -2.0);
        assert_eq!(InternalFunction::Int.apply(2.7), 2.0);
        assert!((InternalFunction::Frac.apply(2.75) - 0.75).abs() < 1e-12);
        assert_eq!(InternalFunction::Sin.apply(0.0), 0.0);
        assert_eq!(InternalFunction::from_name("sqrt"), None);
    }

    #[test]
    fn test_text_transforms() {
        assert_eq!(TextTransform::Trim.apply("  a b  "), "a b");
        assert_eq!(TextTransform::LTrim.apply("  a  "), "a  ");
        assert_eq!(TextTransform::RTrim.apply("  a  "), "  a");
        // only spaces are trimmed
        assert_eq!(TextTransform::Trim.apply("\ta "), "\ta");
    }

    #[test]
    fn test_constants() {
        let engine = Engine::default();
        assert_eq!(Constant::from_name("PI").unwrap().value(&engine).unwrap(), PI);
        assert_eq!(Constant::from_name("True").unwrap().value(&engine).unwrap(), 1.0);
        assert_eq!(Constant::from_name("false").unwrap().value(&engine).unwrap(), 0.0);
        assert_eq!(Constant::from_name("e"), None);
    }
}
