// SPDX-License-Identifier: MIT

//! Variable state for policy traversal
//!
//! This module provides:
//! - `Value` - a boolean, number or string
//! - `VariableBag` - the key/value state a traversal reads and writes
//! - `apply_result` - merges a node's `key=value` assignments into a bag

mod bag;
mod result;
mod value;

pub use bag::VariableBag;
pub use result::{apply_result, coerce_value};
pub use value::Value;
