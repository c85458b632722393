// SPDX-License-Identifier: MIT

//! Guard conditions for policy edges
//!
//! This module provides parsing and evaluation of edge `cond` attributes.
//! Conditions are comparisons of a variable (or `true`/`false`) against a
//! literal, joined by `&&` / `||`:
//! - `age >= 18`
//! - `role == "admin" && active == true`
//! - `score < 600 || balance < -100`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Expression, Literal, Operand};
pub use evaluator::{evaluate, evaluate_condition};
pub use parser::parse;
