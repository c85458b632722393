//! Policy graph traversal

use crate::decider::error::PolicyError;
use crate::decider::policy::condition::evaluate_condition;
use crate::decider::policy::state::{apply_result, VariableBag};
use std::collections::HashSet;

use super::types::Graph;

/// Outcome of a traversal: the merged variables and the nodes visited
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub output: VariableBag,
    /// Visited node identifiers in walk order
    pub path: Vec<String>,
}

/// Walks a policy graph from its start node
///
/// At each node the node's result is applied, then the first outgoing edge
/// whose condition holds is followed. The walk stops at a node with no such
/// edge, or when the chosen edge leads back to an already visited node.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphExecutor;

impl GraphExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Run the graph against an input and return the merged variables
    ///
    /// The input is copied; on error no partial output is returned.
    pub fn run(&self, graph: &Graph, input: &VariableBag) -> Result<VariableBag, PolicyError> {
        self.trace(graph, input).map(|t| t.output)
    }

    /// Like `run`, but also reports the path taken
    pub fn trace(&self, graph: &Graph, input: &VariableBag) -> Result<Traversal, PolicyError> {
        let mut vars = input.clone();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut path = Vec::new();
        let mut current = graph.start.as_str();

        loop {
            // Edge targets need not be declared nodes
            if let Some(node) = graph.node(current) {
                apply_result(&node.result, &mut vars);
            }
            visited.insert(current);
            path.push(current.to_string());
            log::debug!("Visited node: {}", current);

            match self.next_node(graph, current, &vars)? {
                None => {
                    log::debug!("Node {} has no satisfied outgoing edge", current);
                    break;
                }
                Some(next) if visited.contains(next) => {
                    log::debug!("Edge {} -> {} revisits a node, stopping", current, next);
                    break;
                }
                Some(next) => current = next,
            }
        }

        Ok(Traversal { output: vars, path })
    }

    /// First outgoing edge of `current` whose condition holds
    fn next_node<'g>(
        &self,
        graph: &'g Graph,
        current: &'g str,
        vars: &VariableBag,
    ) -> Result<Option<&'g str>, PolicyError> {
        for edge in graph.outgoing(current) {
            if evaluate_condition(&edge.cond, vars)? {
                return Ok(Some(edge.to.as_str()));
            }
        }
        Ok(None)
    }
}
