//! Guard condition parser
//!
//! Accepts exactly:
//! - `field == "value"`, `score >= 700`, `balance > -10`, `active == true`
//! - comparisons joined by `&&` / `||`
//!
//! Everything else (parentheses, function calls, arithmetic, bare literals,
//! `===`, `<>`, `=>`, single `&` or `|`) is rejected.

use super::ast::{CompareOp, Expression, Literal, Operand};
use crate::decider::error::PolicyError;

/// Characters that are never allowed anywhere in a condition
const ARITHMETIC_CHARS: [char; 3] = ['+', '*', '/'];

/// Parse a condition string into an AST
pub fn parse(input: &str) -> Result<Expression, PolicyError> {
    if let Some(c) = input.chars().find(|c| ARITHMETIC_CHARS.contains(c)) {
        return Err(PolicyError::condition(format!(
            "arithmetic operator '{}' is not allowed in '{}'",
            c, input
        )));
    }

    let mut cursor = Cursor::new(input);
    let expr = parse_or(&mut cursor)?;
    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(cursor.unexpected("'&&', '||' or end of condition"));
    }
    Ok(expr)
}

fn parse_or(cursor: &mut Cursor) -> Result<Expression, PolicyError> {
    let mut left = parse_and(cursor)?;
    loop {
        cursor.skip_whitespace();
        if !cursor.eat("||") {
            return Ok(left);
        }
        let right = parse_and(cursor)?;
        left = Expression::Or(Box::new(left), Box::new(right));
    }
}

fn parse_and(cursor: &mut Cursor) -> Result<Expression, PolicyError> {
    let mut left = parse_comparison(cursor)?;
    loop {
        cursor.skip_whitespace();
        if !cursor.eat("&&") {
            return Ok(left);
        }
        let right = parse_comparison(cursor)?;
        left = Expression::And(Box::new(left), Box::new(right));
    }
}

fn parse_comparison(cursor: &mut Cursor) -> Result<Expression, PolicyError> {
    cursor.skip_whitespace();
    let left = parse_operand(cursor)?;
    cursor.skip_whitespace();
    let op = parse_operator(cursor)?;
    cursor.skip_whitespace();
    let right = parse_literal(cursor)?;
    Ok(Expression::Compare { left, op, right })
}

fn parse_operand(cursor: &mut Cursor) -> Result<Operand, PolicyError> {
    match cursor.peek() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => Ok(match cursor.take_word() {
            "true" => Operand::Constant(true),
            "false" => Operand::Constant(false),
            name => Operand::variable(name),
        }),
        _ => Err(cursor.unexpected("identifier")),
    }
}

fn parse_operator(cursor: &mut Cursor) -> Result<CompareOp, PolicyError> {
    // Longest first so `>=` is not read as `>`
    let operators = [
        ("==", CompareOp::Eq),
        ("!=", CompareOp::NotEq),
        (">=", CompareOp::Gte),
        ("<=", CompareOp::Lte),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
    ];

    for (op_str, op) in operators {
        if cursor.eat(op_str) {
            return Ok(op);
        }
    }
    Err(cursor.unexpected("comparison operator"))
}

fn parse_literal(cursor: &mut Cursor) -> Result<Literal, PolicyError> {
    match cursor.peek() {
        Some(b'"') => parse_string(cursor),
        Some(b) if b == b'-' || b.is_ascii_digit() => parse_number(cursor),
        Some(b) if b.is_ascii_alphabetic() => {
            let start = cursor.pos;
            match cursor.take_word() {
                "true" => Ok(Literal::Boolean(true)),
                "false" => Ok(Literal::Boolean(false)),
                _ => {
                    cursor.pos = start;
                    Err(cursor.unexpected("literal"))
                }
            }
        }
        _ => Err(cursor.unexpected("literal")),
    }
}

fn parse_string(cursor: &mut Cursor) -> Result<Literal, PolicyError> {
    let open = cursor.pos;
    cursor.pos += 1;
    match cursor.rest().find('"') {
        Some(len) => {
            let value = &cursor.input[cursor.pos..cursor.pos + len];
            cursor.pos += len + 1;
            Ok(Literal::String(value.to_string()))
        }
        None => Err(PolicyError::condition(format!(
            "unterminated string starting at offset {} in '{}'",
            open, cursor.input
        ))),
    }
}

fn parse_number(cursor: &mut Cursor) -> Result<Literal, PolicyError> {
    let start = cursor.pos;
    cursor.eat("-");
    if cursor.take_digits() == 0 {
        return Err(cursor.unexpected("digit"));
    }
    if cursor.eat(".") && cursor.take_digits() == 0 {
        return Err(cursor.unexpected("digit after '.'"));
    }

    let text = &cursor.input[start..cursor.pos];
    text.parse::<f64>()
        .map(Literal::Number)
        .map_err(|e| PolicyError::condition(format!("invalid number '{}': {}", text, e)))
}

/// Byte cursor over a condition string
///
/// Every token boundary the grammar cares about is ASCII, so byte offsets
/// always land on char boundaries when slicing.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn take_word(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn take_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn unexpected(&self, expected: &str) -> PolicyError {
        let found = match self.rest().chars().next() {
            Some(c) => format!("'{}'", c),
            None => "end of condition".to_string(),
        };
        PolicyError::condition(format!(
            "expected {} at offset {} but found {} in '{}'",
            expected, self.pos, found, self.input
        ))
    }
}
