//! Expression evaluator for condition and effect arguments
//!
//! Grammar (standard precedence, left associative):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '{level_number}' | '{damage}' | '(' expr ')'
//! ```
//!
//! Substitution tokens are resolved from an [`ExprContext`]. Callers on the
//! trigger path use [`evaluate_or_zero`], which never fails: malformed input
//! and division by zero both yield `0.0` and a warning.

use forge_core::Formula;
use thiserror::Error;

/// Parentheses / unary-sign nesting limit
const MAX_DEPTH: usize = 64;

/// Values available to substitution tokens
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExprContext {
    /// `{level_number}`
    pub level: u32,
    /// `{damage}`; 0 outside a damage context
    pub damage: f64,
}

impl ExprContext {
    pub fn new(level: u32, damage: f64) -> Self {
        ExprContext { level, damage }
    }
}

/// Error evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("Empty expression")]
    Empty,
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedChar(char, usize),
    #[error("Unknown substitution token {{{0}}}")]
    UnknownToken(String),
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Unexpected {0}")]
    UnexpectedToken(String),
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Expression nested too deeply")]
    TooDeep,
    #[error("Result is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Level,
    Damage,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Level => "{level_number}".to_string(),
            Token::Damage => "{damage}".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            '{' => {
                let end = chars[i..]
                    .iter()
                    .position(|&ch| ch == '}')
                    .ok_or(ExprError::UnexpectedChar('{', i))?;
                let name: String = chars[i + 1..i + end].iter().collect();
                match name.trim() {
                    "level_number" => tokens.push(Token::Level),
                    "damage" => tokens.push(Token::Damage),
                    _ => return Err(ExprError::UnknownToken(name)),
                }
                i += end + 1;
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| ExprError::InvalidNumber(text))?;
                tokens.push(Token::Number(value));
            }
            _ => return Err(ExprError::UnexpectedChar(c, i)),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    ctx: &'a ExprContext,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        let value = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                -self.unary()?
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()?
            }
            _ => self.primary()?,
        };
        self.depth -= 1;
        Ok(value)
    }

    fn primary(&mut self) -> Result<f64, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Level) => Ok(self.ctx.level as f64),
            Some(Token::Damage) => Ok(self.ctx.damage),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ExprError::UnexpectedToken(other.describe())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken(other.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluate an expression string
pub fn evaluate(source: &str, ctx: &ExprContext) -> Result<f64, ExprError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser { tokens: &tokens, pos: 0, ctx, depth: 0 };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(ExprError::UnexpectedToken(extra.describe()));
    }
    if !value.is_finite() {
        return Err(ExprError::NotFinite);
    }
    Ok(value)
}

/// Evaluate a definition formula, falling back to `0.0` with a warning
pub fn evaluate_or_zero(formula: &Formula, ctx: &ExprContext) -> f64 {
    match evaluate(formula.as_str(), ctx) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(expression = %formula, %error, "Expression failed, using 0");
            0.0
        }
    }
}
