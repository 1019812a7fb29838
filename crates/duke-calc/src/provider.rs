//! External data providers
//!
//! A provider resolves what the formula language itself does not know:
//! bare identifiers, user functions, and range navigations such as
//! `sum(childs(amount))`. Providers are consulted in registration order and
//! the first one answering `Some` wins; `None` means "not mine, ask the next".
//!
//! Every method receives the [`Engine`] that is evaluating, so a provider can
//! evaluate nested formulas (for example the raw argument texts of a user
//! function) with [`Engine::calculate`] and [`Engine::calculate_string`].
//!
//! # Example
//!
//! ```rust
//! use duke_calc::{CalcResult, DataProvider, Engine};
//!
//! struct Rates;
//!
//! impl DataProvider for Rates {
//!     fn get_value(&self, _engine: &Engine, name: &str) -> CalcResult<Option<f64>> {
//!         Ok(name.eq_ignore_ascii_case("VAT").then_some(0.25))
//!     }
//!
//!     fn call_numeric_function(
//!         &self,
//!         engine: &Engine,
//!         name: &str,
//!         args: &[String],
//!     ) -> CalcResult<Option<f64>> {
//!         if !name.eq_ignore_ascii_case("twice") || args.len() != 1 {
//!             return Ok(None);
//!         }
//!         Ok(Some(engine.calculate(&args[0])? * 2.0))
//!     }
//! }
//!
//! let mut engine = Engine::default();
//! engine.add_provider(Rates);
//! assert_eq!(engine.calculate("twice(100 * VAT)").unwrap(), 50.0);
//! ```

use crate::engine::Engine;
use crate::error::CalcResult;
use duke_calc_core::{RangeFunction, RangeValue, ValueType};

/// Host-side resolution of identifiers, user functions and ranges
///
/// All methods decline by default.
pub trait DataProvider {
    /// Numeric value of a bare identifier
    fn get_value(&self, engine: &Engine, name: &str) -> CalcResult<Option<f64>> {
        let _ = (engine, name);
        Ok(None)
    }

    /// String value of a bare identifier
    fn get_string_value(&self, engine: &Engine, name: &str) -> CalcResult<Option<String>> {
        let _ = (engine, name);
        Ok(None)
    }

    /// Values reached by a navigation keyword
    ///
    /// `inner` is the text between the keyword's parentheses, untouched.
    /// Values should match `value_type`; mismatching ones are converted.
    fn get_range_values(
        &self,
        engine: &Engine,
        range: RangeFunction,
        inner: &str,
        value_type: ValueType,
    ) -> CalcResult<Option<Vec<RangeValue>>> {
        let _ = (engine, range, inner, value_type);
        Ok(None)
    }

    /// Numeric user function; `args` are the raw, unevaluated argument texts
    fn call_numeric_function(
        &self,
        engine: &Engine,
        name: &str,
        args: &[String],
    ) -> CalcResult<Option<f64>> {
        let _ = (engine, name, args);
        Ok(None)
    }

    /// String user function
    ///
    /// A single argument arrives already evaluated in the string channel;
    /// with two or more, `args` are the raw, unevaluated argument texts.
    fn call_string_function(
        &self,
        engine: &Engine,
        name: &str,
        args: &[String],
    ) -> CalcResult<Option<String>> {
        let _ = (engine, name, args);
        Ok(None)
    }
}
