// SPDX-License-Identifier: MIT

//! Graphviz DOT policy sources
//!
//! A policy is a digraph whose nodes carry a `result` attribute and whose
//! edges carry a `cond` attribute:
//!
//! ```text
//! digraph {
//!     start [result=""];
//!     ok    [result="approved=true"];
//!     no    [result="approved=false"];
//!     start -> ok [cond="age>=18"];
//!     start -> no [cond="age<18"];
//! }
//! ```
//!
//! Only top-level node and edge statements shape the policy. Subgraphs,
//! attribute statements and graph assignments are accepted and ignored.

use dot_structures::{Attribute, EdgeTy, Id, Stmt, Vertex};

use crate::decider::error::PolicyError;
use crate::decider::policy::graph::{Edge, Graph, Node, START_NODE_ID};
use std::collections::HashMap;

const RESULT_ATTR: &str = "result";
const COND_ATTR: &str = "cond";

/// Parses DOT text into a policy graph
#[derive(Debug, Clone, Copy, Default)]
pub struct DotParser;

impl DotParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse DOT source into a `Graph`
    ///
    /// Fails with `InvalidSyntax` when the text is not valid DOT and with
    /// `NoStartNode` when it is valid but declares no `start` node.
    pub fn parse(&self, source: &str) -> Result<Graph, PolicyError> {
        let dot = graphviz_rust::parse(source).map_err(PolicyError::syntax)?;
        let stmts = match dot {
            dot_structures::Graph::Graph { stmts, .. } => stmts,
            dot_structures::Graph::DiGraph { stmts, .. } => stmts,
        };

        let mut nodes = HashMap::new();
        let mut edges = Vec::new();
        for stmt in &stmts {
            match stmt {
                Stmt::Node(node) => {
                    // Redeclaring a node replaces it
                    let id = id_text(&node.id.0);
                    let result = attr(&node.attributes, RESULT_ATTR);
                    nodes.insert(id.clone(), Node::new(id, result));
                }
                Stmt::Edge(edge) => {
                    if let Some(edge) = edge_from_stmt(edge) {
                        edges.push(edge);
                    }
                }
                _ => {}
            }
        }

        if !nodes.contains_key(START_NODE_ID) {
            return Err(PolicyError::NoStartNode);
        }

        log::debug!(
            "Parsed policy graph with {} nodes and {} edges",
            nodes.len(),
            edges.len()
        );

        Ok(Graph {
            nodes,
            edges,
            start: START_NODE_ID.to_string(),
        })
    }
}

/// One edge per statement, from the source to the first destination
///
/// `a -> b -> c` yields only `a -> b`. Statements with a subgraph at either
/// end yield nothing.
fn edge_from_stmt(edge: &dot_structures::Edge) -> Option<Edge> {
    let (source, destination) = match &edge.ty {
        EdgeTy::Pair(source, destination) => (source, destination),
        EdgeTy::Chain(vertices) => match vertices.as_slice() {
            [source, destination, ..] => (source, destination),
            _ => return None,
        },
    };

    match (source, destination) {
        (Vertex::N(from), Vertex::N(to)) => Some(Edge::new(
            id_text(&from.0),
            id_text(&to.0),
            attr(&edge.attributes, COND_ATTR),
        )),
        _ => None,
    }
}

/// First value of `key`, or empty when absent
fn attr(attributes: &[Attribute], key: &str) -> String {
    attributes
        .iter()
        .find(|a| id_text(&a.0) == key)
        .map(|a| id_text(&a.1))
        .unwrap_or_default()
}

/// The text an ID stands for
///
/// Quoted IDs lose their quotes, with `\"` unescaped and backslash-newline
/// continuations removed. HTML IDs lose their outer angle brackets.
fn id_text(id: &Id) -> String {
    match id {
        Id::Plain(s) | Id::Anonymous(s) => s.clone(),
        Id::Escaped(s) => {
            let inner = s
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(s);
            inner
                .replace("\\\r\n", "")
                .replace("\\\n", "")
                .replace("\\\"", "\"")
        }
        Id::Html(s) => s
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(s)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR_DOT: &str = r#"digraph { start [result=""]; ok [result="approved=true"]; no [result="approved=false"]; start -> ok [cond="age>=18"]; start -> no [cond="age<18"]; }"#;

    fn parse(source: &str) -> Result<Graph, PolicyError> {
        DotParser::new().parse(source)
    }

    #[test]
    fn test_parse_linear_policy() {
        let graph = parse(LINEAR_DOT).unwrap();

        assert_eq!(graph.start, "start");
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes["ok"].result, "approved=true");
        assert_eq!(graph.nodes["start"].result, "");
        assert_eq!(
            graph.edges,
            vec![
                Edge::new("start", "ok", "age>=18"),
                Edge::new("start", "no", "age<18"),
            ]
        );
    }

    #[test]
    fn test_missing_start_node() {
        for source in [
            "digraph { }",
            r#"digraph { a [result="x=1"]; a -> b }"#,
            // only referenced by an edge, never declared
            "digraph { start -> a; a }",
            "graph { begin -- end }",
        ] {
            assert_eq!(parse(source), Err(PolicyError::NoStartNode), "{}", source);
        }
    }

    #[test]
    fn test_invalid_syntax() {
        for source in ["", "not a dot graph", "digraph { start [", "digraph { start -> }"] {
            assert!(
                matches!(parse(source), Err(PolicyError::InvalidSyntax(_))),
                "{}",
                source
            );
        }
    }

    #[test]
    fn test_duplicate_node_last_wins() {
        let graph = parse(r#"digraph { start [result="a=1"]; start [result="a=2"] }"#).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes["start"].result, "a=2");
    }

    #[test]
    fn test_omitted_attributes_are_empty() {
        let graph = parse("digraph { start; end [color=red]; start -> end [label=go] }").unwrap();
        assert_eq!(graph.nodes["start"].result, "");
        assert_eq!(graph.nodes["end"].result, "");
        assert_eq!(graph.edges, vec![Edge::new("start", "end", "")]);
    }

    #[test]
    fn test_escaped_quotes_in_condition() {
        let graph =
            parse(r#"digraph { start; admin; start -> admin [cond="role == \"admin\""] }"#).unwrap();
        assert_eq!(graph.edges[0].cond, r#"role == "admin""#);
    }

    #[test]
    fn test_edge_chain_keeps_first_hop() {
        let graph = parse(
            r#"digraph { start; a [result="x=1"]; b [result="y=2"]; start -> a -> b [cond="x==1"] }"#,
        )
        .unwrap();
        assert_eq!(graph.edges, vec![Edge::new("start", "a", "x==1")]);
    }

    #[test]
    fn test_subgraph_statements_are_ignored() {
        let graph = parse(
            r#"digraph {
                start [result="seen=true"];
                subgraph cluster_review {
                    review [result="stage=\"review\""];
                    start -> review [cond="score < 600"];
                }
                start -> { other } [cond="score >= 600"];
            }"#,
        )
        .unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_start_inside_subgraph_is_not_declared() {
        assert_eq!(
            parse(r#"digraph { subgraph s { start [result="x=1"] } }"#),
            Err(PolicyError::NoStartNode)
        );
    }

    #[test]
    fn test_quoted_start_node() {
        let graph = parse(r#"digraph { "start" [result="x=1"] }"#).unwrap();
        assert_eq!(graph.nodes["start"].result, "x=1");
    }

    #[test]
    fn test_undirected_graph() {
        let graph = parse(r#"graph { start [result="x=1"]; start -- done }"#).unwrap();
        assert_eq!(graph.edges, vec![Edge::new("start", "done", "")]);
    }
}
