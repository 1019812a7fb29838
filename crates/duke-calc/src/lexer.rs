//! Formula lexer
//!
//! Pulls one token at a time out of a [`ScanState`]. Whitespace other than
//! plain spaces is expected to have been normalised by the caller.

use crate::error::{CalcError, CalcResult, ErrorKind};
use log::trace;

/// Formula text plus a byte cursor
#[derive(Debug, Clone)]
pub struct ScanState<'a> {
    formula: &'a str,
    pos: usize,
}

impl<'a> ScanState<'a> {
    pub fn new(formula: &'a str) -> Self {
        Self { formula, pos: 0 }
    }

    pub fn formula(&self) -> &'a str {
        self.formula
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Cursor as a count of characters, as reported in errors
    pub fn char_position(&self) -> usize {
        self.formula[..self.pos].chars().count()
    }

    /// Move the cursor, clamped to the end of the text
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.formula.len());
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.formula.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
        }
    }

    /// Step back over the previous character
    pub fn retreat(&mut self) {
        if let Some(c) = self.formula[..self.pos].chars().next_back() {
            self.pos -= c.len_utf8();
        }
    }

    /// Unconsumed text
    pub fn rest(&self) -> &'a str {
        &self.formula[self.pos..]
    }
}

/// Numeric literal payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i32),
    Double(f64),
}

impl Number {
    pub fn value(self) -> f64 {
        match self {
            Number::Integer(i) => f64::from(i),
            Number::Double(d) => d,
        }
    }
}

/// Lexical tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    /// Unrecognised character (a lone `=` included) or integer overflow
    Error,

    LeftParen,
    RightParen,
    Semicolon,

    // Literals
    Number(Number),
    Identifier(String),
    Str(String),

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Mod,
    Percent,

    // Unary
    Not,
    Invert,

    // Bitwise
    Or,
    Xor,
    And,

    // Comparison
    Less,
    LessEqual,
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
}

/// Single-token lexer over a formula
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    scan: ScanState<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(formula: &'a str) -> Self {
        Self {
            scan: ScanState::new(formula),
        }
    }

    pub fn formula(&self) -> &'a str {
        self.scan.formula()
    }

    pub fn position(&self) -> usize {
        self.scan.position()
    }

    pub fn char_position(&self) -> usize {
        self.scan.char_position()
    }

    pub fn set_position(&mut self, pos: usize) {
        self.scan.set_position(pos);
    }

    /// Error located at the current cursor
    pub fn error(&self, kind: ErrorKind, identifier: Option<&str>) -> CalcError {
        CalcError::new(
            kind,
            identifier.map(str::to_string),
            self.scan.formula(),
            self.scan.char_position(),
        )
    }

    /// Produce the next token
    ///
    /// Only an unterminated string literal is an error; anything else the
    /// lexer cannot make sense of comes back as [`Token::Error`].
    pub fn next_token(&mut self) -> CalcResult<Token> {
        let token = self.scan_token()?;
        trace!("token {:?} at {}", token, self.scan.position());
        Ok(token)
    }

    fn scan_token(&mut self) -> CalcResult<Token> {
        while self.scan.current_char() == Some(' ') {
            self.scan.advance();
        }

        let Some(c) = self.scan.current_char() else {
            return Ok(Token::Eof);
        };

        if c == '\'' || c == '"' {
            return self.scan_string(c);
        }
        if c.is_ascii_digit() {
            return Ok(self.scan_number());
        }
        if c.is_alphabetic() || c == '_' || c == '@' {
            return Ok(self.scan_identifier());
        }

        self.scan.advance();
        let token = match c {
            '+' => Token::Add,
            '-' => Token::Subtract,
            '/' => Token::Divide,
            '~' => Token::Invert,
            '^' => Token::Xor,
            '&' => Token::And,
            '|' => Token::Or,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ';' => Token::Semicolon,
            '=' => {
                if self.eat('=') {
                    Token::Equal
                } else {
                    self.scan.retreat();
                    Token::Error
                }
            }
            '*' => {
                if self.eat('*') {
                    Token::Power
                } else {
                    Token::Multiply
                }
            }
            '%' => {
                if self.eat('%') {
                    Token::Percent
                } else {
                    Token::Mod
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::LessEqual
                } else if self.eat('>') {
                    Token::NotEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::GreaterEqual
                } else if self.eat('<') {
                    Token::NotEqual
                } else {
                    Token::Greater
                }
            }
            '!' => {
                if self.eat('=') {
                    Token::NotEqual
                } else {
                    Token::Not
                }
            }
            _ => {
                self.scan.retreat();
                Token::Error
            }
        };
        Ok(token)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.scan.current_char() == Some(expected) {
            self.scan.advance();
            true
        } else {
            false
        }
    }

    fn scan_string(&mut self, quote: char) -> CalcResult<Token> {
        self.scan.advance();
        let rest = self.scan.rest();
        match rest.find(quote) {
            Some(end) => {
                let text = rest[..end].to_string();
                self.scan.set_position(self.scan.position() + end + quote.len_utf8());
                Ok(Token::Str(text))
            }
            None => {
                self.scan.set_position(self.scan.formula().len());
                Err(self.error(ErrorKind::InvalidString, None))
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.scan.position();
        while self.scan.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.scan.advance();
        }
        let Ok(integer) = self.scan.formula()[start..self.scan.position()].parse::<i32>() else {
            return Token::Error;
        };

        if !matches!(self.scan.current_char(), Some('.' | ',')) {
            return Token::Number(Number::Integer(integer));
        }
        self.scan.advance();

        let mut value = f64::from(integer);
        let mut scale = 1.0;
        while let Some(digit) = self.scan.current_char().and_then(|c| c.to_digit(10)) {
            scale /= 10.0;
            value += scale * f64::from(digit);
            self.scan.advance();
        }
        Token::Number(Number::Double(value))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.scan.position();
        self.scan.advance();
        while self
            .scan
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '@')
        {
            self.scan.advance();
        }
        Token::Identifier(self.scan.formula()[start..self.scan.position()].to_string())
    }
}
