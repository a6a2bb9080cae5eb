//! Tokenizer and recursive-descent evaluator for arithmetic expressions.
//!
//! Precedence, loosest first: `+ -`, `* / //`, unary `+ -`, `**`
//! (right-associative, binds tighter than a unary sign on its left).

use super::{ExprError, Number};

/// Deepest nesting of parentheses, signs and exponents accepted.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    StarStar,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::SlashSlash => f.write_str("//"),
            Token::StarStar => f.write_str("**"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let (token, width) = match c {
            ' ' | '\t' => {
                i += 1;
                continue;
            }
            '+' => (Token::Plus, 1),
            '-' => (Token::Minus, 1),
            '*' if next == Some('*') => (Token::StarStar, 2),
            '*' => (Token::Star, 1),
            '/' if next == Some('/') => (Token::SlashSlash, 2),
            '/' => (Token::Slash, 1),
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let mut end = i;
                while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
                    end += 1;
                }
                let literal: String = chars[start..end].iter().collect();
                (Token::Num(parse_literal(&literal)?), end - start)
            }
            other => return Err(ExprError::UnexpectedChar(other, i)),
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

fn parse_literal(literal: &str) -> Result<Number, ExprError> {
    let invalid = || ExprError::InvalidNumber(literal.to_string());
    match literal.matches('.').count() {
        0 => literal.parse().map(Number::Int).map_err(|_| ExprError::Overflow),
        1 if literal != "." => {
            // Rust's parser rejects a bare trailing or leading dot.
            let padded = format!("0{}0", literal);
            padded.parse().map(Number::Float).map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Number, ExprError> {
        let mut value = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                value = value.checked_add(self.term()?)?;
            } else if self.eat(&Token::Minus) {
                value = value.checked_sub(self.term()?)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<Number, ExprError> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                value = value.checked_mul(self.unary()?)?;
            } else if self.eat(&Token::Slash) {
                value = value.checked_div(self.unary()?)?;
            } else if self.eat(&Token::SlashSlash) {
                value = value.floor_div(self.unary()?)?;
            } else {
                return Ok(value);
            }
        }
    }

    /// Every recursive path passes through here, so the depth check lives here.
    fn unary(&mut self) -> Result<Number, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<Number, ExprError> {
        if self.eat(&Token::Minus) {
            return self.unary()?.checked_neg();
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Number, ExprError> {
        let base = self.atom()?;
        if self.eat(&Token::StarStar) {
            // the exponent may carry its own sign: 2 ** -1
            let exponent = self.unary()?;
            return base.pow(exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, ExprError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ExprError::UnexpectedToken(other.to_string())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken(other.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluate one arithmetic expression.
pub fn evaluate(src: &str) -> Result<Number, ExprError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    match parser.next() {
        None => Ok(value),
        Some(extra) => Err(ExprError::UnexpectedToken(extra.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(src: &str) -> i64 {
        match evaluate(src).unwrap() {
            Number::Int(n) => n,
            other => panic!("{src} gave {other:?}"),
        }
    }

    fn float(src: &str) -> f64 {
        match evaluate(src).unwrap() {
            Number::Float(x) => x,
            other => panic!("{src} gave {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(int("2+3*4"), 14);
        assert_eq!(int("(2+3)*4"), 20);
        assert_eq!(int("10-4-3"), 3);
        assert_eq!(int("2**3**2"), 512);
        assert_eq!(int("-2**2"), -4);
        assert_eq!(int("(-2)**2"), 4);
        assert_eq!(int("--3"), 3);
    }

    #[test]
    fn test_division() {
        assert_eq!(float("7/2"), 3.5);
        assert_eq!(float("4/2"), 2.0);
        assert_eq!(int("7//2"), 3);
        assert_eq!(int("-7//2"), -4);
        assert_eq!(int("7//-2"), -4);
        assert_eq!(float("7.5//2"), 3.0);
        assert_eq!(float("2**-1"), 0.5);
    }

    #[test]
    fn test_literals() {
        assert_eq!(float("1.5+.5"), 2.0);
        assert_eq!(float("3.*2"), 6.0);
        assert_eq!(
            evaluate("1.2.3"),
            Err(ExprError::InvalidNumber("1.2.3".into()))
        );
        assert_eq!(evaluate("."), Err(ExprError::InvalidNumber(".".into())));
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate(""), Err(ExprError::Empty));
        assert_eq!(evaluate("1/0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("1//0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("1.0/0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("(1+2"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("2+"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("2)"), Err(ExprError::UnexpectedToken(")".into())));
        assert_eq!(evaluate("2(3)"), Err(ExprError::UnexpectedToken("(".into())));
        assert_eq!(evaluate("1=1"), Err(ExprError::UnexpectedChar('=', 1)));
        assert_eq!(evaluate("9**99"), Err(ExprError::Overflow));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(int(&nested(200)), 1);
        assert_eq!(evaluate(&nested(50_000)), Err(ExprError::TooDeep));
        assert_eq!(evaluate(&"-".repeat(50_000)), Err(ExprError::TooDeep));
        assert_eq!(
            evaluate(&format!("1{}", "**1".repeat(50_000))),
            Err(ExprError::TooDeep)
        );
    }
}
