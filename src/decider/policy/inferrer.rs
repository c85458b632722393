// SPDX-License-Identifier: MIT

//! Parse-then-execute pipeline behind the `/infer` route

use crate::decider::error::PolicyError;
use crate::decider::policy::dot::DotParser;
use crate::decider::policy::graph::{Graph, GraphExecutor};
use crate::decider::policy::state::VariableBag;
use std::sync::Arc;

/// Turns policy source text into a graph
pub trait PolicyParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Graph, PolicyError>;
}

/// Runs a graph against an input
pub trait PolicyExecutor: Send + Sync {
    fn execute(&self, graph: &Graph, input: &VariableBag) -> Result<VariableBag, PolicyError>;
}

impl PolicyParser for DotParser {
    fn parse(&self, source: &str) -> Result<Graph, PolicyError> {
        DotParser::parse(self, source)
    }
}

impl PolicyExecutor for GraphExecutor {
    fn execute(&self, graph: &Graph, input: &VariableBag) -> Result<VariableBag, PolicyError> {
        self.run(graph, input)
    }
}

/// A parser paired with an executor
#[derive(Clone)]
pub struct Inferrer {
    parser: Arc<dyn PolicyParser>,
    executor: Arc<dyn PolicyExecutor>,
}

impl Inferrer {
    pub fn new(parser: Arc<dyn PolicyParser>, executor: Arc<dyn PolicyExecutor>) -> Self {
        Self { parser, executor }
    }

    pub fn parse(&self, source: &str) -> Result<Graph, PolicyError> {
        self.parser.parse(source)
    }

    pub fn execute(&self, graph: &Graph, input: &VariableBag) -> Result<VariableBag, PolicyError> {
        self.executor.execute(graph, input)
    }

    /// Parse `source` and run it against `input`
    pub fn infer(&self, source: &str, input: &VariableBag) -> Result<VariableBag, PolicyError> {
        let graph = self.parse(source)?;
        self.execute(&graph, input)
    }
}

impl Default for Inferrer {
    /// DOT parser and graph executor
    fn default() -> Self {
        Self::new(Arc::new(DotParser::new()), Arc::new(GraphExecutor::new()))
    }
}
