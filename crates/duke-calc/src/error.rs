//! Evaluation error types

use std::fmt;
use thiserror::Error;

/// Result type for formula evaluation
pub type CalcResult<T> = std::result::Result<T, CalcError>;

/// Closed set of failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// String literal without its closing quote
    InvalidString,
    /// Unexpected token, unbalanced parenthesis, trailing input
    SyntaxError,
    /// Unknown value reference, bad function call shape, failed range lookup
    FunctionError,
    /// Built-in called with the wrong number of arguments
    WrongParamCount,
    /// Function name that nothing can handle
    FunctionUnknown,
    /// Text that cannot be converted to a number or a date
    ParseError,
    /// User function declined by every provider
    ExternalFunctionError,
    /// Raised on purpose by `raiseerror` or by a provider
    UserException,
}

impl ErrorKind {
    /// Stable upper-case code
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidString => "INVALID_STRING",
            ErrorKind::SyntaxError => "SYNTAX_ERROR",
            ErrorKind::FunctionError => "FUNCTION_ERROR",
            ErrorKind::WrongParamCount => "WRONG_PARAM_COUNT",
            ErrorKind::FunctionUnknown => "FUNCTION_UNKNOWN",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::ExternalFunctionError => "EXTERNAL_FUNCTION_ERROR",
            ErrorKind::UserException => "USER_EXCEPTION",
        }
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::InvalidString => "Invalid string",
            ErrorKind::SyntaxError => "Syntax error",
            ErrorKind::FunctionError => "Function error",
            ErrorKind::WrongParamCount => "Wrong parameters count",
            ErrorKind::FunctionUnknown => "Function unknown",
            ErrorKind::ParseError => "Parse error",
            ErrorKind::ExternalFunctionError => "External function error",
            ErrorKind::UserException => "User exception",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An evaluation failure
///
/// Carries the formula being evaluated when the failure happened (for nested
/// arguments this is the argument text, not the outer formula) and the cursor
/// position at that moment.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", diagnostic(.kind, .identifier, .formula, .position))]
pub struct CalcError {
    kind: ErrorKind,
    identifier: Option<String>,
    formula: String,
    position: usize,
}

fn diagnostic(
    kind: &ErrorKind,
    identifier: &Option<String>,
    formula: &str,
    position: &usize,
) -> String {
    match identifier.as_deref().filter(|ident| !ident.is_empty()) {
        Some(ident) => format!(
            "Error {} (description: {}) while validating {} in formula [{}] before position {}",
            kind.code(),
            kind.description(),
            ident,
            formula,
            position
        ),
        None => format!(
            "Error {} (description: {}) in formula [{}] before position {}",
            kind.code(),
            kind.description(),
            formula,
            position
        ),
    }
}

impl CalcError {
    pub fn new(
        kind: ErrorKind,
        identifier: Option<String>,
        formula: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            kind,
            identifier,
            formula: formula.into(),
            position,
        }
    }

    /// A `USER_EXCEPTION` raised by a provider
    pub fn user_exception(message: impl Into<String>, formula: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserException, Some(message.into()), formula, 0)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Offending identifier or message, if any
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Character index of the cursor when the error was raised
    pub fn position(&self) -> usize {
        self.position
    }
}
