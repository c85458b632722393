// SPDX-License-Identifier: MIT

//! Policy graph model and traversal
//!
//! This module provides the graph types built from a DOT source and the
//! executor that walks them.

pub mod executor;
pub mod types;

pub use executor::{GraphExecutor, Traversal};
pub use types::{Edge, Graph, Node, START_NODE_ID};
