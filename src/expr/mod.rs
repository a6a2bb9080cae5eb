//! Evaluate the arithmetic expression in text recognized from an image.
//!
//! Recognition itself is done elsewhere; this module only cleans the text,
//! evaluates it, and formats the verdict. `a = b` is checked as an equation.

mod parser;

use serde::Serialize;
use thiserror::Error;

pub use parser::evaluate;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character {0:?} at position {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("numeric overflow")]
    Overflow,
    #[error("result is not a real number")]
    NotReal,
    #[error("expression nested too deeply")]
    TooDeep,
}

/// Integers stay integral until an operation demands a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    fn is_zero(&self) -> bool {
        self.as_f64() == 0.0
    }

    /// Numeric equality across int and float.
    pub fn equals(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }

    pub fn checked_add(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_add(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Number::Float(a.as_f64() + b.as_f64())),
        }
    }

    pub fn checked_sub(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_sub(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Number::Float(a.as_f64() - b.as_f64())),
        }
    }

    pub fn checked_mul(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_mul(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Number::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// True division; always a float.
    pub fn checked_div(self, rhs: Number) -> Result<Number, ExprError> {
        if rhs.is_zero() {
            return Err(ExprError::DivisionByZero);
        }
        Ok(Number::Float(self.as_f64() / rhs.as_f64()))
    }

    /// Division rounded toward negative infinity.
    pub fn floor_div(self, rhs: Number) -> Result<Number, ExprError> {
        if rhs.is_zero() {
            return Err(ExprError::DivisionByZero);
        }
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                let q = a.checked_div(b).ok_or(ExprError::Overflow)?;
                let floored = if a % b != 0 && ((a < 0) != (b < 0)) { q - 1 } else { q };
                Ok(Number::Int(floored))
            }
            (a, b) => Ok(Number::Float((a.as_f64() / b.as_f64()).floor())),
        }
    }

    pub fn checked_neg(self) -> Result<Number, ExprError> {
        match self {
            Number::Int(n) => n.checked_neg().map(Number::Int).ok_or(ExprError::Overflow),
            Number::Float(x) => Ok(Number::Float(-x)),
        }
    }

    pub fn pow(self, exponent: Number) -> Result<Number, ExprError> {
        if let (Number::Int(base), Number::Int(exp)) = (self, exponent) {
            if exp >= 0 {
                let exp = u32::try_from(exp).map_err(|_| ExprError::Overflow)?;
                return base.checked_pow(exp).map(Number::Int).ok_or(ExprError::Overflow);
            }
        }

        let (base, exp) = (self.as_f64(), exponent.as_f64());
        if base == 0.0 && exp < 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        let value = base.powf(exp);
        if value.is_nan() {
            Err(ExprError::NotReal)
        } else if value.is_infinite() {
            Err(ExprError::Overflow)
        } else {
            Ok(Number::Float(value))
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Keep only characters that can take part in an expression.
///
/// Spaces are dropped, anything outside `0-9 + - * / ( ) . , =` is removed,
/// and decimal commas become points.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || "+-*/().,=".contains(*c))
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Outcome of evaluating recognized text.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    NoText,
    Expression {
        text: String,
        expr: String,
        value: Number,
    },
    Equation {
        text: String,
        left: String,
        right: String,
        holds: bool,
    },
    Failed {
        text: String,
        error: ExprError,
    },
}

/// Clean `text`, then evaluate it as an expression or an equation.
pub fn evaluate_recognized(text: &str) -> Evaluation {
    let text = text.trim();
    if text.is_empty() {
        return Evaluation::NoText;
    }

    let expr = sanitize(text);
    let result = match expr.split_once('=') {
        Some((left, right)) => evaluate(left).and_then(|l| {
            evaluate(right).map(|r| Evaluation::Equation {
                text: text.to_string(),
                left: left.to_string(),
                right: right.to_string(),
                holds: l.equals(&r),
            })
        }),
        None => evaluate(&expr).map(|value| Evaluation::Expression {
            text: text.to_string(),
            expr: expr.clone(),
            value,
        }),
    };

    result.unwrap_or_else(|error| Evaluation::Failed {
        text: text.to_string(),
        error,
    })
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluation::NoText => f.write_str("⚠️ Nenhum texto reconhecido na imagem!"),
            Evaluation::Expression { text, expr, value } => {
                write!(f, "Expressão reconhecida: {}\nResultado: {} = {}", text, expr, value)
            }
            Evaluation::Equation {
                text,
                left,
                right,
                holds,
            } => write!(
                f,
                "Equação reconhecida: {}\nResultado: {} = {} → {}",
                text,
                left,
                right,
                if *holds { "True" } else { "False" }
            ),
            Evaluation::Failed { text, error } => write!(
                f,
                "Expressão reconhecida: {}\n⚠ Não foi possível calcular - {}",
                text, error
            ),
        }
    }
}
