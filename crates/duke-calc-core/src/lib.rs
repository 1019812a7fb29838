//! # duke-calc-core
//!
//! Primitives shared by the duke-calc formula engine.
//!
//! This crate provides:
//! - [`math`] - epsilon-tolerant comparisons and decimal rounding
//! - [`datetime`] - hour-granularity timestamps and calendar helpers
//! - [`EngineSettings`] - decimal precision and time zone configuration
//! - [`ValueType`], [`RangeValue`], [`RangeFunction`] - the data exchanged with providers
//!
//! ## Example
//!
//! ```rust
//! use duke_calc_core::math::{doubles_are_equal, round_to, RoundingMode};
//!
//! assert!(doubles_are_equal(1.000001, 1.000002, 5));
//! assert_eq!(round_to(2.5, 0, RoundingMode::HalfEven), 2.0);
//! ```

pub mod datetime;
pub mod error;
pub mod math;
pub mod settings;
pub mod value;

pub use error::{Error, Result};
pub use math::{RoundingMode, DEFAULT_DECIMAL_NUMBERS};
pub use settings::EngineSettings;
pub use value::{RangeFunction, RangeValue, ValueType};
