//! Values exchanged between the engine and data providers

use std::fmt;

/// Which evaluation channel an argument or range belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Evaluated to a double
    Numeric,
    /// Evaluated to a string
    Textual,
}

/// A single value returned by a range navigation
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RangeValue {
    fn from(value: f64) -> Self {
        RangeValue::Number(value)
    }
}

impl From<String> for RangeValue {
    fn from(value: String) -> Self {
        RangeValue::Text(value)
    }
}

impl From<&str> for RangeValue {
    fn from(value: &str) -> Self {
        RangeValue::Text(value.to_string())
    }
}

/// Relational navigation keywords recognised inside aggregate arguments
///
/// `sum(childs(amount))` asks the provider for the `amount` of every child
/// of the current record instead of evaluating the argument locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeFunction {
    ChildsNotNull,
    ParentNotNull,
    ParentsNotNull,
    Childs,
    Parent,
    Parents,
    This,
}

impl RangeFunction {
    /// Keywords in the order they are searched for; the first substring match wins
    pub const SEARCH_ORDER: [RangeFunction; 7] = [
        RangeFunction::ChildsNotNull,
        RangeFunction::ParentNotNull,
        RangeFunction::ParentsNotNull,
        RangeFunction::Childs,
        RangeFunction::Parent,
        RangeFunction::Parents,
        RangeFunction::This,
    ];

    /// Lower-case keyword as written in formulas
    pub fn keyword(self) -> &'static str {
        match self {
            RangeFunction::ChildsNotNull => "childsnotnull",
            RangeFunction::ParentNotNull => "parentnotnull",
            RangeFunction::ParentsNotNull => "parentsnotnull",
            RangeFunction::Childs => "childs",
            RangeFunction::Parent => "parent",
            RangeFunction::Parents => "parents",
            RangeFunction::This => "this",
        }
    }

    /// Find the first keyword contained in `text` (ASCII case-insensitive)
    ///
    /// Returns the keyword and the byte offset just past it.
    pub fn find_in(text: &str) -> Option<(RangeFunction, usize)> {
        let lowered = text.to_ascii_lowercase();
        Self::SEARCH_ORDER.into_iter().find_map(|function| {
            lowered
                .find(function.keyword())
                .map(|index| (function, index + function.keyword().len()))
        })
    }
}

impl fmt::Display for RangeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_keyword() {
        assert_eq!(RangeFunction::find_in("childs(amount)"), Some((RangeFunction::Childs, 6)));
        assert_eq!(
            RangeFunction::find_in("CHILDSNOTNULL(x)"),
            Some((RangeFunction::ChildsNotNull, 13))
        );
        assert_eq!(RangeFunction::find_in("this(x)"), Some((RangeFunction::This, 4)));
        assert_eq!(RangeFunction::find_in("1 + 2"), None);
    }

    #[test]
    fn test_search_order_is_literal() {
        assert_eq!(
            RangeFunction::find_in("parentnotnull(x)").map(|(f, _)| f),
            Some(RangeFunction::ParentNotNull)
        );
        // `parent` is searched before `parents`, so it wins on `parents(...)`
        assert_eq!(RangeFunction::find_in("parents(x)"), Some((RangeFunction::Parent, 6)));
    }

    #[test]
    fn test_range_value_conversions() {
        assert_eq!(RangeValue::from(1.5), RangeValue::Number(1.5));
        assert_eq!(RangeValue::from("a"), RangeValue::Text("a".into()));
        assert_eq!(RangeFunction::Childs.to_string(), "childs");
    }
}
