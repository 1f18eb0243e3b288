//! Expression Evaluation
//!
//! A small recursive-descent evaluator for the calculator surface:
//! `+ - * /`, parentheses, unary minus, and decimal numbers.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number \"{0}\"")]
    InvalidNumber(String),
}

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        Some(&c) => Err(EvalError::UnexpectedChar(c)),
        None => Ok(value),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    value += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('*') => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.chars.next();
                    value /= self.factor()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // factor := '-' factor | '(' expression ')' | number
    fn factor(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        match self.chars.peek() {
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.chars.next();
                let value = self.expression()?;
                self.skip_whitespace();
                match self.chars.next() {
                    Some(')') => Ok(value),
                    Some(c) => Err(EvalError::UnexpectedChar(c)),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(&c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(&c) => Err(EvalError::UnexpectedChar(c)),
            None => Err(EvalError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        let mut text = String::new();
        while matches!(self.chars.peek(), Some(&c) if c.is_ascii_digit() || c == '.') {
            text.push(self.chars.next().unwrap());
        }
        text.parse()
            .map_err(|_| EvalError::InvalidNumber(text.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_arithmetic() {
        assert_eq!(evaluate("1+2"), Ok(3.0));
        assert_eq!(evaluate("7 - 10"), Ok(-3.0));
        assert_eq!(evaluate("6*7"), Ok(42.0));
        assert_eq!(evaluate("9/2"), Ok(4.5));
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(evaluate("2+3*4"), Ok(14.0));
        assert_eq!(evaluate("(2+3)*4"), Ok(20.0));
        assert_eq!(evaluate("2*(3+(4-1))"), Ok(12.0));
    }

    #[test]
    fn unary_minus_and_decimals() {
        assert_eq!(evaluate("-5+2"), Ok(-3.0));
        assert_eq!(evaluate("--4"), Ok(4.0));
        assert_eq!(evaluate("1.5*2"), Ok(3.0));
        assert_eq!(evaluate(".5+.25"), Ok(0.75));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(evaluate("1+"), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate("(1+2"), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate("1+2)"), Err(EvalError::UnexpectedChar(')')));
        assert_eq!(evaluate("a+1"), Err(EvalError::UnexpectedChar('a')));
        assert_eq!(
            evaluate("1.2.3"),
            Err(EvalError::InvalidNumber("1.2.3".to_string()))
        );
    }
}
