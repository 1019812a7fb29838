//! # duke-calc
//!
//! Formula evaluation engine.
//!
//! This crate provides:
//! - A lexer and a hand-written recursive-descent evaluator with a numeric
//!   and a string channel
//! - ~50 built-in functions (logic, text, aggregates, dates)
//! - Range navigation (`sum(childs(amount))`) and user functions resolved by
//!   pluggable [`DataProvider`]s
//!
//! ## Example
//!
//! ```rust
//! use duke_calc::{Engine, ErrorKind};
//!
//! let engine = Engine::default();
//!
//! assert_eq!(engine.calculate("IF(2 > 1, round(2.5, 0), 0)").unwrap(), 2.0);
//! assert_eq!(engine.calculate_string("uppercase('ab') + tostr(4)").unwrap(), "AB4.0");
//!
//! let err = engine.calculate("IF(1, 2)").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::WrongParamCount);
//! ```

pub mod engine;
pub mod error;
mod evaluator;
pub mod functions;
pub mod lexer;
pub mod params;
pub mod provider;

pub use engine::Engine;
pub use error::{CalcError, CalcResult, ErrorKind};
pub use provider::DataProvider;

pub use duke_calc_core::{EngineSettings, RangeFunction, RangeValue, RoundingMode, ValueType};
