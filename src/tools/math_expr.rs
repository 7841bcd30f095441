// src/tools/math_expr.rs

//! Small arithmetic evaluator for expressions produced by the calculator chain.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathError {
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(src: &str) -> Result<Vec<Token>, MathError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent: 1e3, 2.5E-4
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| MathError::UnexpectedToken(text.clone()))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            other => return Err(MathError::UnexpectedChar(other, i)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, want: Token) -> Result<(), MathError> {
        match self.advance() {
            Some(tok) if tok == want => Ok(()),
            Some(tok) => Err(MathError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(MathError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> Result<f64, MathError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, MathError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(MathError::DivisionByZero);
                    }
                    value /= rhs;
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(MathError::DivisionByZero);
                    }
                    value %= rhs;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, MathError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // Right-associative; binds tighter than unary minus on its left.
    fn power(&mut self) -> Result<f64, MathError> {
        let base = self.atom()?;
        if let Some(Token::Caret) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, MathError> {
        match self.advance() {
            Some(Token::Num(v)) => Ok(v),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.pos += 1;
                    let args = self.arguments()?;
                    apply_function(&name, &args)
                } else {
                    constant(&name)
                }
            }
            Some(tok) => Err(MathError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(MathError::UnexpectedEnd),
        }
    }

    fn arguments(&mut self) -> Result<Vec<f64>, MathError> {
        let mut args = vec![self.expr()?];
        loop {
            match self.advance() {
                Some(Token::Comma) => args.push(self.expr()?),
                Some(Token::RParen) => return Ok(args),
                Some(tok) => return Err(MathError::UnexpectedToken(format!("{tok:?}"))),
                None => return Err(MathError::UnexpectedEnd),
            }
        }
    }
}

fn constant(name: &str) -> Result<f64, MathError> {
    match name {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        _ => Err(MathError::UnknownIdentifier(name.to_string())),
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64, MathError> {
    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(MathError::Arity {
                name: name.to_string(),
                expected,
                got: args.len(),
            })
        }
    };

    let unary: Option<fn(f64) -> f64> = match name {
        "sqrt" => Some(f64::sqrt),
        "log" | "ln" => Some(f64::ln),
        "log10" => Some(f64::log10),
        "log2" => Some(f64::log2),
        "exp" => Some(f64::exp),
        "abs" => Some(f64::abs),
        "sin" => Some(f64::sin),
        "cos" => Some(f64::cos),
        "tan" => Some(f64::tan),
        "asin" | "arcsin" => Some(f64::asin),
        "acos" | "arccos" => Some(f64::acos),
        "atan" | "arctan" => Some(f64::atan),
        "floor" => Some(f64::floor),
        "ceil" => Some(f64::ceil),
        "round" => Some(f64::round),
        _ => None,
    };

    if let Some(f) = unary {
        arity(1)?;
        return Ok(f(args[0]));
    }

    match name {
        "pow" => {
            arity(2)?;
            Ok(args[0].powf(args[1]))
        }
        _ => Err(MathError::UnknownFunction(name.to_string())),
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, MathError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(MathError::UnexpectedEnd);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some(tok) = parser.peek() {
        return Err(MathError::UnexpectedToken(format!("{tok:?}")));
    }
    if !value.is_finite() {
        return Err(MathError::NonFinite);
    }
    Ok(value)
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> f64 {
        evaluate(s).unwrap()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("15^2 + 27"), 252.0);
        assert_eq!(eval("15**2 + 27"), 252.0);
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(eval("-2 ^ 2"), -4.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("7 % 4"), 3.0);
    }

    #[test]
    fn functions_and_constants() {
        assert_eq!(eval("sqrt(16)"), 4.0);
        assert_eq!(eval("log10(100)"), 2.0);
        assert_eq!(eval("pow(2, 10)"), 1024.0);
        assert!((eval("log(e)") - 1.0).abs() < 1e-12);
        assert!((eval("2 * pi") - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(eval("1.26e8 / 100"), 1_260_000.0);
        assert!((eval("2800 * 1.60934") - 4506.152).abs() < 1e-9);
    }

    #[test]
    fn errors_are_reported() {
        assert_eq!(evaluate("1 / 0"), Err(MathError::DivisionByZero));
        assert_eq!(evaluate(""), Err(MathError::UnexpectedEnd));
        assert_eq!(evaluate("2 +"), Err(MathError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(MathError::UnexpectedEnd));
        assert_eq!(
            evaluate("foo(2)"),
            Err(MathError::UnknownFunction("foo".into()))
        );
        assert_eq!(
            evaluate("x + 1"),
            Err(MathError::UnknownIdentifier("x".into()))
        );
        assert_eq!(evaluate("2 $ 3"), Err(MathError::UnexpectedChar('$', 2)));
        assert!(matches!(evaluate("2,800"), Err(MathError::UnexpectedToken(_))));
        assert!(matches!(evaluate("sqrt(1, 2)"), Err(MathError::Arity { .. })));
        assert_eq!(evaluate("sqrt(-1)"), Err(MathError::NonFinite));
    }

    #[test]
    fn numbers_format_without_trailing_zero() {
        assert_eq!(format_number(252.0), "252");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(2.5), "2.5");
    }
}
