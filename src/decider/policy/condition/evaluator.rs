//! Guard condition evaluator

use super::ast::{CompareOp, Expression, Literal, Operand};
use super::parser::parse;
use crate::decider::error::PolicyError;
use crate::decider::policy::state::{Value, VariableBag};
use std::cmp::Ordering;

/// Validate and evaluate a raw condition string
///
/// An empty condition is always true.
pub fn evaluate_condition(cond: &str, vars: &VariableBag) -> Result<bool, PolicyError> {
    if cond.is_empty() {
        return Ok(true);
    }
    let expr = parse(cond)?;
    evaluate(&expr, vars)
}

/// Evaluate a parsed condition against the variable bag
///
/// `&&` and `||` short-circuit, so the right-hand side is only looked at
/// when it can change the result.
pub fn evaluate(expr: &Expression, vars: &VariableBag) -> Result<bool, PolicyError> {
    match expr {
        Expression::Compare { left, op, right } => evaluate_compare(left, *op, right, vars),
        Expression::And(left, right) => Ok(evaluate(left, vars)? && evaluate(right, vars)?),
        Expression::Or(left, right) => Ok(evaluate(left, vars)? || evaluate(right, vars)?),
    }
}

fn evaluate_compare(
    left: &Operand,
    op: CompareOp,
    right: &Literal,
    vars: &VariableBag,
) -> Result<bool, PolicyError> {
    let constant;
    let value = match left {
        Operand::Variable(name) => vars
            .get(name)
            .ok_or_else(|| PolicyError::condition(format!("no variable named '{}'", name)))?,
        Operand::Constant(b) => {
            constant = Value::Bool(*b);
            &constant
        }
    };

    match op {
        CompareOp::Eq => Ok(values_equal(value, right)),
        CompareOp::NotEq => Ok(!values_equal(value, right)),
        CompareOp::Gt => ordering(left, value, op, right).map(|o| o == Ordering::Greater),
        CompareOp::Gte => ordering(left, value, op, right).map(|o| o != Ordering::Less),
        CompareOp::Lt => ordering(left, value, op, right).map(|o| o == Ordering::Less),
        CompareOp::Lte => ordering(left, value, op, right).map(|o| o != Ordering::Greater),
    }
}

fn values_equal(value: &Value, right: &Literal) -> bool {
    match (value, right) {
        (Value::String(s), Literal::String(rs)) => s == rs,
        (Value::Number(n), Literal::Number(rn)) => n == rn,
        (Value::Bool(b), Literal::Boolean(rb)) => b == rb,
        _ => false,
    }
}

/// Order numbers numerically and strings lexicographically; anything else
/// cannot be ordered.
fn ordering(
    name: &Operand,
    value: &Value,
    op: CompareOp,
    right: &Literal,
) -> Result<Ordering, PolicyError> {
    let ordering = match (value, right) {
        (Value::Number(n), Literal::Number(rn)) => n.partial_cmp(rn),
        (Value::String(s), Literal::String(rs)) => Some(s.as_str().cmp(rs.as_str())),
        _ => None,
    };

    ordering.ok_or_else(|| {
        PolicyError::condition(format!(
            "cannot compare {} '{}' ({}) {} {}",
            value.type_name(),
            name,
            value,
            op,
            right
        ))
    })
}
