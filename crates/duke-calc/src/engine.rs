//! Public entry point

use crate::error::CalcResult;
use crate::evaluator::Evaluator;
use crate::provider::DataProvider;
use chrono::FixedOffset;
use duke_calc_core::{EngineSettings, RangeFunction, RangeValue, ValueType};
use log::debug;
use std::fmt;

/// Formula engine
///
/// Holds the settings and the ordered list of data providers. Every call to
/// [`calculate`](Engine::calculate) or
/// [`calculate_string`](Engine::calculate_string) parses its formula from
/// scratch; nothing is cached between evaluations.
///
/// # Example
///
/// ```rust
/// use duke_calc::Engine;
///
/// let engine = Engine::default();
/// assert_eq!(engine.calculate("2 + 2").unwrap(), 4.0);
/// assert_eq!(engine.calculate_string("'a' + 'b' + 'c'").unwrap(), "abc");
/// ```
pub struct Engine {
    settings: EngineSettings,
    providers: Vec<Box<dyn DataProvider>>,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            providers: Vec::new(),
        }
    }

    /// Engine with default precision bound to `zone`
    pub fn with_time_zone(zone: FixedOffset) -> Self {
        Self::new(EngineSettings::with_time_zone(zone))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EngineSettings {
        &mut self.settings
    }

    pub fn set_decimal_numbers(&mut self, decimal_numbers: u32) {
        self.settings.decimal_numbers = decimal_numbers;
    }

    pub fn time_zone(&self) -> FixedOffset {
        self.settings.time_zone()
    }

    /// Register a provider after the existing ones
    pub fn add_provider<P: DataProvider + 'static>(&mut self, provider: P) {
        self.add_boxed_provider(Box::new(provider));
    }

    pub fn add_boxed_provider(&mut self, provider: Box<dyn DataProvider>) {
        self.providers.push(provider);
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Evaluate `formula` to a number
    pub fn calculate(&self, formula: &str) -> CalcResult<f64> {
        let formula = clean_formula(formula);
        debug!("calculate [{}]", formula);
        Evaluator::new(self, &formula)?.numeric()
    }

    /// Evaluate `formula` to a string
    pub fn calculate_string(&self, formula: &str) -> CalcResult<String> {
        let formula = clean_formula(formula);
        debug!("calculate_string [{}]", formula);
        Evaluator::new(self, &formula)?.text()
    }

    fn first_answer<T>(
        &self,
        what: fmt::Arguments<'_>,
        mut ask: impl FnMut(&dyn DataProvider) -> CalcResult<Option<T>>,
    ) -> CalcResult<Option<T>> {
        for (index, provider) in self.providers.iter().enumerate() {
            if let Some(answer) = ask(provider.as_ref())? {
                debug!("provider #{} resolved {}", index, what);
                return Ok(Some(answer));
            }
        }
        debug!("no provider resolved {}", what);
        Ok(None)
    }

    pub(crate) fn resolve_value(&self, name: &str) -> CalcResult<Option<f64>> {
        self.first_answer(format_args!("value {}", name), |p| p.get_value(self, name))
    }

    pub(crate) fn resolve_string_value(&self, name: &str) -> CalcResult<Option<String>> {
        self.first_answer(format_args!("string value {}", name), |p| p.get_string_value(self, name))
    }

    pub(crate) fn resolve_range(
        &self,
        range: RangeFunction,
        inner: &str,
        value_type: ValueType,
    ) -> CalcResult<Option<Vec<RangeValue>>> {
        self.first_answer(format_args!("range {}({})", range, inner), |p| {
            p.get_range_values(self, range, inner, value_type)
        })
    }

    pub(crate) fn call_numeric_function(
        &self,
        name: &str,
        args: &[String],
    ) -> CalcResult<Option<f64>> {
        self.first_answer(format_args!("function {}", name), |p| {
            p.call_numeric_function(self, name, args)
        })
    }

    pub(crate) fn call_string_function(
        &self,
        name: &str,
        args: &[String],
    ) -> CalcResult<Option<String>> {
        self.first_answer(format_args!("string function {}", name), |p| {
            p.call_string_function(self, name, args)
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// Trim and turn line breaks and tabs into spaces
fn clean_formula(formula: &str) -> String {
    formula.trim().replace(['\r', '\n', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Fixed(&'static str, f64);

    impl DataProvider for Fixed {
        fn get_value(&self, _engine: &Engine, name: &str) -> CalcResult<Option<f64>> {
            Ok((name == self.0).then_some(self.1))
        }
    }

    #[test]
    fn test_clean_formula() {
        assert_eq!(clean_formula("  1 +\r\n2\t"), "1 +  2");
    }

    #[test]
    fn test_providers_in_registration_order() {
        let mut engine = Engine::default();
        engine.add_provider(Fixed("X", 1.0));
        engine.add_provider(Fixed("X", 2.0));
        engine.add_provider(Fixed("Y", 3.0));
        assert_eq!(engine.provider_count(), 3);
        assert_eq!(engine.calculate("X").unwrap(), 1.0);
        assert_eq!(engine.calculate("Y").unwrap(), 3.0);
        assert_eq!(engine.calculate("Z").unwrap_err().kind(), ErrorKind::FunctionError);
    }

    #[test]
    fn test_settings() {
        let zone = FixedOffset::east_opt(3600).unwrap();
        let mut engine = Engine::with_time_zone(zone);
        assert_eq!(engine.time_zone(), zone);
        engine.set_decimal_numbers(2);
        assert_eq!(engine.settings().decimal_numbers, 2);
        engine.settings_mut().decimal_numbers = 7;
        assert_eq!(engine.settings().decimal_numbers, 7);
        assert!(format!("{:?}", engine).contains("providers: 0"));
    }

    #[test]
    fn test_precision_drives_comparisons() {
        let mut engine = Engine::default();
        assert_eq!(engine.calculate("1.001 == 1").unwrap(), 0.0);
        engine.set_decimal_numbers(1);
        assert_eq!(engine.calculate("1.001 == 1").unwrap(), 1.0);
    }
}
