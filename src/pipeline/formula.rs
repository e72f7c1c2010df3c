//! Sandboxed arithmetic formulas for calculated columns.
//!
//! Grammar (recursive descent):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | column | '(' expr ')'
//! ```
//!
//! Column names are matched as whole tokens directly in the formula text,
//! longest name first, so `ab` wins over `a` and names may contain spaces.
//! A name edge that is a word character must not touch another word
//! character. Anything else that looks like an identifier is an error.
//!
//! Formulas are compiled once against the available column names and then
//! evaluated per row. Length and nesting depth are bounded.

use crate::constants::{MAX_FORMULA_DEPTH, MAX_FORMULA_LENGTH};
use crate::types::Record;
use thiserror::Error;

/// Errors from compiling or evaluating a formula
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("formula is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("formula nests deeper than {0}")]
    TooDeep(usize),

    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unknown identifier {0:?}")]
    UnknownIdentifier(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("result is not a finite number")]
    NonFinite,
}

/// Sandbox limits for formula compilation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormulaLimits {
    pub max_length: usize,
    pub max_depth: usize,
}

impl Default for FormulaLimits {
    fn default() -> Self {
        Self {
            max_length: MAX_FORMULA_LENGTH,
            max_depth: MAX_FORMULA_DEPTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Column(String),
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
            Token::Column(c) => format!("column {:?}", c),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Number(f64),
    Column(String),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split `text` into tokens, resolving column names at whole-token boundaries.
fn tokenize(text: &str, columns: &[&str]) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(ch) = text[pos..].chars().next() {
        if ch.is_whitespace() {
            pos += ch.len_utf8();
            continue;
        }

        let prev = text[..pos].chars().next_back();
        if let Some(name) = match_column(text, pos, prev, columns) {
            tokens.push(Token::Column(name.to_string()));
            pos += name.len();
            continue;
        }

        let single = match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(token);
            pos += 1;
            continue;
        }

        if ch.is_ascii_digit() || ch == '.' {
            let len = number_length(&text[pos..]);
            let literal = &text[pos..pos + len];
            let value = literal
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidNumber(literal.to_string()))?;
            tokens.push(Token::Number(value));
            pos += len;
            continue;
        }

        if is_word_char(ch) {
            let word: String = text[pos..].chars().take_while(|c| is_word_char(*c)).collect();
            return Err(FormulaError::UnknownIdentifier(word));
        }

        return Err(FormulaError::UnexpectedChar { ch, offset: pos });
    }

    Ok(tokens)
}

/// Longest column name starting at `pos` that sits on token boundaries.
fn match_column<'c>(text: &str, pos: usize, prev: Option<char>, columns: &[&'c str]) -> Option<&'c str> {
    let rest = &text[pos..];
    columns.iter().copied().find(|name| {
        if name.is_empty() || !rest.starts_with(name) {
            return false;
        }
        let first = name.chars().next();
        let last = name.chars().next_back();
        let next = rest[name.len()..].chars().next();

        let start_ok = !(first.is_some_and(is_word_char) && prev.is_some_and(is_word_char));
        let end_ok = !(last.is_some_and(is_word_char) && next.is_some_and(is_word_char));
        start_ok && end_ok
    })
}

/// Byte length of the numeric literal at the start of `s`.
fn number_length(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    // Optional exponent, only when followed by digits
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep(self.max_depth));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek().and_then(|t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        }) {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek().and_then(|t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        }) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(*n)),
            Some(Token::Column(name)) => Ok(Expr::Column(name.clone())),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(FormulaError::UnexpectedToken(other.describe())),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some(other) => Err(FormulaError::UnexpectedToken(other.describe())),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

impl Expr {
    fn eval(&self, row: &Record) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Column(name) => row.value(name).leading_f64_or_zero(),
            Expr::Neg(inner) => -inner.eval(row),
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(row), rhs.eval(row));
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                }
            }
        }
    }
}

/// A compiled formula
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    expr: Expr,
}

impl Formula {
    /// Compile `text`, resolving references against `columns`.
    pub fn compile(text: &str, columns: &[String], limits: FormulaLimits) -> Result<Self, FormulaError> {
        let len = text.chars().count();
        if len > limits.max_length {
            return Err(FormulaError::TooLong {
                len,
                max: limits.max_length,
            });
        }

        let mut names: Vec<&str> = columns.iter().map(String::as_str).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()));

        let tokens = tokenize(text, &names)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            max_depth: limits.max_depth,
        };
        let expr = parser.expr()?;
        if let Some(extra) = parser.peek() {
            return Err(FormulaError::UnexpectedToken(extra.describe()));
        }

        Ok(Self { expr })
    }

    /// Evaluate against one row. Unparseable cells count as `0`.
    pub fn evaluate(&self, row: &Record) -> Result<f64, FormulaError> {
        let value = self.expr.eval(row);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }
}
