//! Recursive-descent evaluation
//!
//! Two chains share one token stream. The numeric chain, from loosest to
//! tightest binding:
//!
//! ```text
//! sequence       := bitwise (';' bitwise)*
//! bitwise        := comparison (('|' | '^' | '&') comparison)*
//! comparison     := additive (('<' | '<=' | '==' | '<>' | '>=' | '>') additive)*
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/' | '%' | '%%') unary)*
//! unary          := ('!' | '~' | '+' | '-') unary | power
//! power          := term ('**' term)?
//! term           := number | '(' sequence ')' | identifier | identifier '(' ... ')'
//! ```
//!
//! The string chain is `concatenation := text_atom ('+' text_atom)*`.
//!
//! Calls do not consume tokens for their arguments: the raw text up to the
//! matching `)` is split by [`crate::params`] and each argument is evaluated
//! later as a formula of its own, by the engine.

use crate::engine::Engine;
use crate::error::{CalcError, CalcResult, ErrorKind};
use crate::functions::{self, Call, Constant, InternalFunction, TextTransform};
use crate::lexer::{Lexer, Token};
use crate::params;
use duke_calc_core::math::{
    bool_to_float, double_is_equal_or_greater, double_is_equal_or_less, double_is_greater,
    double_is_less, doubles_are_equal,
};

/// Floor to a 32-bit integer for bitwise operators
fn to_i32(value: f64) -> i32 {
    value.floor() as i32
}

pub(crate) struct Evaluator<'a> {
    engine: &'a Engine,
    lexer: Lexer<'a>,
    token: Token,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(engine: &'a Engine, formula: &'a str) -> CalcResult<Self> {
        let mut lexer = Lexer::new(formula);
        let token = lexer.next_token()?;
        Ok(Self { engine, lexer, token })
    }

    fn advance(&mut self) -> CalcResult<()> {
        self.token = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, kind: ErrorKind, identifier: Option<&str>) -> CalcError {
        self.lexer.error(kind, identifier)
    }

    fn expect_right_paren(&mut self, kind: ErrorKind, identifier: Option<&str>) -> CalcResult<()> {
        if self.token != Token::RightParen {
            return Err(self.error(kind, identifier));
        }
        self.advance()
    }

    fn finish<T>(&self, value: T) -> CalcResult<T> {
        if self.token == Token::Eof {
            Ok(value)
        } else {
            Err(self.error(ErrorKind::SyntaxError, None))
        }
    }

    /// Split the arguments of the call whose `(` is the current token
    ///
    /// Leaves the cursor just past the matching `)`; the current token is
    /// stale until the next [`advance`](Self::advance).
    fn call_arguments(&mut self, name: &str) -> CalcResult<Vec<String>> {
        match params::split_parameters(self.lexer.formula(), self.lexer.position()) {
            Some((args, next)) => {
                self.lexer.set_position(next);
                Ok(args)
            }
            None => {
                self.lexer.set_position(self.lexer.formula().len());
                Err(self.error(ErrorKind::FunctionError, Some(name)))
            }
        }
    }

    fn call<'c>(&self, name: &'c str, args: &'c [String]) -> Call<'c>
    where
        'a: 'c,
    {
        Call::new(self.engine, name, args, self.lexer.formula(), self.lexer.char_position())
    }

    // === Numeric chain ===

    pub(crate) fn numeric(mut self) -> CalcResult<f64> {
        let value = self.sequence()?;
        self.finish(value)
    }

    fn sequence(&mut self) -> CalcResult<f64> {
        let mut value = self.bitwise()?;
        while self.token == Token::Semicolon {
            self.advance()?;
            value = self.bitwise()?;
        }
        Ok(value)
    }

    fn bitwise(&mut self) -> CalcResult<f64> {
        let mut value = self.comparison()?;
        loop {
            let op = match self.token {
                Token::Or | Token::Xor | Token::And => self.token.clone(),
                _ => return Ok(value),
            };
            self.advance()?;
            let (a, b) = (to_i32(value), to_i32(self.comparison()?));
            value = f64::from(match op {
                Token::Or => a | b,
                Token::Xor => a ^ b,
                _ => a & b,
            });
        }
    }

    fn comparison(&mut self) -> CalcResult<f64> {
        let mut value = self.additive()?;
        loop {
            let op = match self.token {
                Token::Less
                | Token::LessEqual
                | Token::Equal
                | Token::NotEqual
                | Token::GreaterEqual
                | Token::Greater => self.token.clone(),
                _ => return Ok(value),
            };
            self.advance()?;
            let rhs = self.additive()?;
            let digits = self.engine.settings().decimal_numbers;
            value = bool_to_float(match op {
                Token::Less => double_is_less(value, rhs, digits),
                Token::LessEqual => double_is_equal_or_less(value, rhs, digits),
                Token::Equal => doubles_are_equal(value, rhs, digits),
                Token::NotEqual => !doubles_are_equal(value, rhs, digits),
                Token::GreaterEqual => double_is_equal_or_greater(value, rhs, digits),
                _ => double_is_greater(value, rhs, digits),
            });
        }
    }

    fn additive(&mut self) -> CalcResult<f64> {
        let mut value = self.multiplicative()?;
        loop {
            match self.token {
                Token::Add => {
                    self.advance()?;
                    value += self.multiplicative()?;
                }
                Token::Subtract => {
                    self.advance()?;
                    value -= self.multiplicative()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn multiplicative(&mut self) -> CalcResult<f64> {
        let mut value = self.unary()?;
        loop {
            let op = match self.token {
                Token::Multiply | Token::Divide | Token::Mod | Token::Percent => self.token.clone(),
                _ => return Ok(value),
            };
            self.advance()?;
            let rhs = self.unary()?;
            value = match op {
                Token::Multiply => value * rhs,
                Token::Divide => value / rhs,
                Token::Mod => value.floor() % rhs.floor(),
                _ => value * rhs / 100.0,
            };
        }
    }

    fn unary(&mut self) -> CalcResult<f64> {
        let op = match self.token {
            Token::Not | Token::Invert | Token::Add | Token::Subtract => self.token.clone(),
            _ => return self.power(),
        };
        self.advance()?;
        let operand = self.unary()?;
        Ok(match op {
            Token::Not => bool_to_float(operand.floor() == 0.0),
            Token::Invert => f64::from(!to_i32(operand)),
            Token::Add => operand,
            _ => 0.0 - operand,
        })
    }

    fn power(&mut self) -> CalcResult<f64> {
        let base = self.term()?;
        if self.token != Token::Power {
            return Ok(base);
        }
        self.advance()?;
        Ok(base.powf(self.term()?))
    }

    fn term(&mut self) -> CalcResult<f64> {
        match &self.token {
            Token::Number(number) => {
                let value = number.value();
                self.advance()?;
                Ok(value)
            }
            Token::LeftParen => {
                self.advance()?;
                let value = self.sequence()?;
                self.expect_right_paren(ErrorKind::SyntaxError, None)?;
                Ok(value)
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                if self.token == Token::LeftParen {
                    self.numeric_call(&name)
                } else {
                    self.numeric_value(&name)
                }
            }
            _ => Err(self.error(ErrorKind::SyntaxError, None)),
        }
    }

    fn numeric_call(&mut self, name: &str) -> CalcResult<f64> {
        if let Some(def) = functions::lookup(name) {
            let args = self.call_arguments(name)?;
            let value = functions::evaluate_numeric(def, &self.call(name, &args))?;
            self.advance()?;
            return Ok(value);
        }

        if let Some(function) = InternalFunction::from_name(name) {
            self.advance()?;
            let operand = self.bitwise()?;
            self.expect_right_paren(ErrorKind::FunctionError, Some(name))?;
            return Ok(function.apply(operand));
        }

        let args = self.call_arguments(name)?;
        if self.engine.provider_count() == 0 {
            return Err(self.error(ErrorKind::FunctionUnknown, Some(name)));
        }
        let value = self
            .engine
            .call_numeric_function(name, &args)?
            .ok_or_else(|| self.error(ErrorKind::ExternalFunctionError, Some(name)))?;
        self.advance()?;
        Ok(value)
    }

    fn numeric_value(&self, name: &str) -> CalcResult<f64> {
        if let Some(constant) = Constant::from_name(name) {
            return constant
                .value(self.engine)
                .map_err(|_| self.error(ErrorKind::FunctionError, Some(name)));
        }
        self.engine
            .resolve_value(name)?
            .ok_or_else(|| self.error(ErrorKind::FunctionError, Some(name)))
    }

    // === String chain ===

    pub(crate) fn text(mut self) -> CalcResult<String> {
        let mut value = self.concatenation()?;
        while self.token == Token::Semicolon {
            self.advance()?;
            value = self.concatenation()?;
        }
        self.finish(value)
    }

    fn concatenation(&mut self) -> CalcResult<String> {
        let mut value = self.text_atom()?;
        while self.token == Token::Add {
            self.advance()?;
            value.push_str(&self.text_atom()?);
        }
        Ok(value)
    }

    fn text_atom(&mut self) -> CalcResult<String> {
        match &self.token {
            Token::Str(text) => {
                let text = text.clone();
                self.advance()?;
                Ok(text)
            }
            Token::LeftParen => {
                self.advance()?;
                let value = self.concatenation()?;
                self.expect_right_paren(ErrorKind::SyntaxError, None)?;
                Ok(value)
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                if self.token == Token::LeftParen {
                    self.text_call(&name)
                } else {
                    self.engine
                        .resolve_string_value(&name)?
                        .ok_or_else(|| self.error(ErrorKind::FunctionError, Some(&name)))
                }
            }
            // Nothing to consume; the caller decides whether what follows is valid
            _ => Ok(String::new()),
        }
    }

    fn text_call(&mut self, name: &str) -> CalcResult<String> {
        let mut args = self.call_arguments(name)?;

        let value = if let Some(def) = functions::lookup(name) {
            functions::evaluate_text(def, &self.call(name, &args))?
        } else {
            // a lone argument is evaluated before it is trimmed or forwarded
            if let [arg] = args.as_mut_slice() {
                *arg = self.engine.calculate_string(arg)?;
            }
            match (TextTransform::from_name(name), args.as_slice()) {
                (Some(transform), [arg]) => transform.apply(arg),
                _ if self.engine.provider_count() == 0 => {
                    return Err(self.error(ErrorKind::FunctionUnknown, Some(name)));
                }
                _ => self
                    .engine
                    .call_string_function(name, &args)?
                    .ok_or_else(|| self.error(ErrorKind::ExternalFunctionError, Some(name)))?,
            }
        };

        self.advance()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn calc(formula: &str) -> f64 {
        Engine::default().calculate(formula).unwrap()
    }

    fn calc_str(formula: &str) -> String {
        Engine::default().calculate_string(formula).unwrap()
    }

    fn calc_err(formula: &str) -> ErrorKind {
        Engine::default().calculate(formula).unwrap_err().kind()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(calc("2 + 2"), 4.0);
        assert_eq!(calc("((21 * 2) - 1) - 20"), 21.0);
        assert_eq!(calc("2 + 3 * 4"), 14.0);
        assert_eq!(calc("10 / 4"), 2.5);
        assert_eq!(calc("7 - 2 - 1"), 4.0);
        assert_eq!(calc("1,5 + 1.5"), 3.0);
    }

    #[test]
    fn test_mod_and_percent() {
        assert_eq!(calc("7.9 % 3"), 1.0);
        assert_eq!(calc("200 %% 15"), 30.0);
    }

    #[test]
    fn test_power() {
        assert_eq!(calc("2 ** 10"), 1024.0);
        assert_eq!(calc("-2 ** 2"), -4.0);
        assert_eq!(calc("3 * 2 ** 2"), 12.0);
    }

    #[test]
    fn test_unary() {
        assert_eq!(calc("-3 + 5"), 2.0);
        assert_eq!(calc("+3"), 3.0);
        assert_eq!(calc("!0"), 1.0);
        assert_eq!(calc("!0.7"), 1.0);
        assert_eq!(calc("!2"), 0.0);
        assert_eq!(calc("~0"), -1.0);
        assert_eq!(calc("--4"), 4.0);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(calc("6 & 3"), 2.0);
        assert_eq!(calc("6 | 3"), 7.0);
        assert_eq!(calc("6 ^ 3"), 5.0);
        assert_eq!(calc("6.9 & 3.2"), 2.0);
        // bitwise binds looser than comparison
        assert_eq!(calc("1 < 2 & 2 < 3"), 1.0);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(calc("1 < 2"), 1.0);
        assert_eq!(calc("2 <= 2"), 1.0);
        assert_eq!(calc("2 == 2.000001"), 1.0);
        assert_eq!(calc("2 == 3"), 0.0);
        assert_eq!(calc("2 <> 3"), 1.0);
        assert_eq!(calc("2 >< 2"), 0.0);
        assert_eq!(calc("2 != 2"), 0.0);
        assert_eq!(calc("3 >= 3.000001"), 1.0);
        assert_eq!(calc("3 > 3.000001"), 0.0);
        assert_eq!(calc("1 + 1 == 2"), 1.0);
        assert_eq!(calc_err("1 = 1"), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_sequence_keeps_last_value() {
        assert_eq!(calc("1; 2; 3"), 3.0);
        assert_eq!(calc("5; -3"), -3.0);
        assert_eq!(calc("(1; 2) * 3"), 6.0);
    }

    #[test]
    fn test_constants() {
        assert_eq!(calc("TRUE + true"), 2.0);
        assert_eq!(calc("false"), 0.0);
        assert_eq!(calc("pi"), std::f64::consts::PI);
        assert!(calc("now") >= calc("today"));
    }

    #[test]
    fn test_internal_functions() {
        assert_eq!(calc("trunc(2.7)"), 2.0);
        assert_eq!(calc("INT(-2.5)"), -3.0);
        assert_eq!(calc("frac(2.25) * 4"), 1.0);
        assert_eq!(calc("sin(0) + cos(0)"), 1.0);
        assert_eq!(calc("tan(0)"), 0.0);
        assert_eq!(calc("trunc(1 + 1.5) + 1"), 3.0);
        assert_eq!(calc_err("trunc(1 + 2"), ErrorKind::FunctionError);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(calc_err("(1 + 2"), ErrorKind::SyntaxError);
        assert_eq!(calc_err("1 + "), ErrorKind::SyntaxError);
        assert_eq!(calc_err("1 2"), ErrorKind::SyntaxError);
        assert_eq!(calc_err("1 # 2"), ErrorKind::SyntaxError);
        assert_eq!(calc_err("99999999999"), ErrorKind::SyntaxError);
        assert_eq!(calc_err(""), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_error_position_and_formula() {
        let err = Engine::default().calculate("1 + unknown").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FunctionError);
        assert_eq!(err.identifier(), Some("unknown"));
        assert_eq!(err.formula(), "1 + unknown");
        assert_eq!(err.position(), 11);
    }

    #[test]
    fn test_unbalanced_call() {
        let err = Engine::default().calculate("len('a'").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FunctionError);
        assert_eq!(err.identifier(), Some("len"));
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn test_error_position_counts_characters() {
        let err = Engine::default().calculate("len('été') + unknown").unwrap_err();
        assert_eq!(err.identifier(), Some("unknown"));
        assert_eq!(err.position(), 20);

        let err = Engine::default().calculate("IF(len('ü'), 1)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongParamCount);
        assert_eq!(err.position(), 15);
    }

    #[test]
    fn test_user_function_without_providers() {
        assert_eq!(calc_err("myfunc(1)"), ErrorKind::FunctionUnknown);
        let err = Engine::default().calculate_string("myfunc(1, 2)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FunctionUnknown);
    }

    #[test]
    fn test_string_chain() {
        assert_eq!(calc_str("'a' + 'b' + 'c'"), "abc");
        assert_eq!(calc_str("\"x\" + ('y' + 'z')"), "xyz");
        assert_eq!(calc_str("'a'; 'b'"), "b");
        assert_eq!(calc_str("trim('  a  ') + ltrim(' b ') + rtrim(' c ')"), "ab  c");
        assert_eq!(calc_str(""), "");
    }

    #[test]
    fn test_string_chain_errors() {
        let engine = Engine::default();
        assert_eq!(
            engine.calculate_string("'abc").unwrap_err().kind(),
            ErrorKind::InvalidString
        );
        assert_eq!(
            engine.calculate_string("name").unwrap_err().kind(),
            ErrorKind::FunctionError
        );
        assert_eq!(
            engine.calculate_string("'a' 'b'").unwrap_err().kind(),
            ErrorKind::SyntaxError
        );
        assert_eq!(
            engine.calculate_string("('a'").unwrap_err().kind(),
            ErrorKind::SyntaxError
        );
    }
}
