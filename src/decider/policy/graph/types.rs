//! Policy graph type definitions
//!
//! Node results and edge conditions are kept as raw strings; they are
//! interpreted each time the traversal reaches them.

use std::collections::HashMap;

/// Reserved identifier of the traversal entry node
pub const START_NODE_ID: &str = "start";

/// A parsed policy graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    /// Declared nodes keyed by identifier
    pub nodes: HashMap<String, Node>,
    /// Edges in declaration order; earlier edges win ties
    pub edges: Vec<Edge>,
    /// Entry node identifier
    pub start: String,
}

/// A node in the policy graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// Raw `key=value, ...` assignment list applied on visit
    pub result: String,
}

/// A guarded, directed edge
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// Raw guard condition; empty means always taken
    pub cond: String,
}

impl Graph {
    /// Get a node by identifier
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Outgoing edges of a node, in declaration order
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.from == id)
    }
}

impl Node {
    pub fn new(id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result: result.into(),
        }
    }
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, cond: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            cond: cond.into(),
        }
    }
}
