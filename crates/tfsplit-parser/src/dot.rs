//! Edge extraction from Graphviz DOT descriptions.
//!
//! `terraform graph` prints a `digraph` whose statements are usually nested
//! in a `subgraph "root"`. Only edges matter here; node declarations and
//! attributes are ignored. Labels are returned verbatim, quotes included,
//! for the normalizer to clean up.

use dot_structures::{Graph, Id, NodeId, Stmt, Vertex};
use log::debug;

use crate::error::{Diagnostic, ErrorCode, ParseError};

/// A dependency edge with its raw endpoint labels. `source` depends on
/// `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
}

/// Read every edge of a directed DOT graph, in statement order.
///
/// Chains `a -> b -> c` yield one edge per consecutive pair; a subgraph
/// endpoint stands for every node it contains.
///
/// # Errors
///
/// - [`ErrorCode::E201`] if the text is not valid DOT
/// - [`ErrorCode::E200`] if the graph is undirected
pub fn parse_dot(source: &str) -> Result<Vec<RawEdge>, ParseError> {
    let graph = graphviz_rust::parse(source).map_err(|message| {
        Diagnostic::error("graph description is not valid DOT")
            .with_code(ErrorCode::E201)
            .with_help(message)
    })?;

    let stmts = match graph {
        Graph::DiGraph { stmts, .. } => stmts,
        Graph::Graph { .. } => {
            return Err(Diagnostic::error("expected a directed graph")
                .with_code(ErrorCode::E200)
                .with_help("dependency graphs must be declared with `digraph`")
                .into());
        }
    };

    let mut edges = Vec::new();
    collect_edges(&stmts, &mut edges);
    debug!(edges = edges.len(); "Read dependency graph description");

    Ok(edges)
}

fn collect_edges(stmts: &[Stmt], edges: &mut Vec<RawEdge>) {
    for stmt in stmts {
        match stmt {
            Stmt::Edge(edge) => match &edge.ty {
                dot_structures::EdgeTy::Pair(from, to) => push_pairs(from, to, edges),
                dot_structures::EdgeTy::Chain(vertices) => {
                    for pair in vertices.windows(2) {
                        push_pairs(&pair[0], &pair[1], edges);
                    }
                }
            },
            Stmt::Subgraph(subgraph) => collect_edges(&subgraph.stmts, edges),
            _ => {}
        }
    }
}

fn push_pairs(from: &Vertex, to: &Vertex, edges: &mut Vec<RawEdge>) {
    let targets = vertex_labels(to);
    for source in vertex_labels(from) {
        for target in &targets {
            edges.push(RawEdge {
                source: source.clone(),
                target: target.clone(),
            });
        }
    }
}

fn vertex_labels(vertex: &Vertex) -> Vec<String> {
    match vertex {
        Vertex::N(NodeId(id, _)) => vec![id_text(id)],
        Vertex::S(subgraph) => {
            let mut labels = Vec::new();
            collect_node_ids(&subgraph.stmts, &mut labels);
            labels
        }
    }
}

fn collect_node_ids(stmts: &[Stmt], labels: &mut Vec<String>) {
    for stmt in stmts {
        match stmt {
            Stmt::Node(node) => labels.push(id_text(&node.id.0)),
            Stmt::Edge(edge) => match &edge.ty {
                dot_structures::EdgeTy::Pair(from, to) => {
                    labels.extend(vertex_labels(from));
                    labels.extend(vertex_labels(to));
                }
                dot_structures::EdgeTy::Chain(vertices) => {
                    labels.extend(vertices.iter().flat_map(vertex_labels));
                }
            },
            Stmt::Subgraph(subgraph) => collect_node_ids(&subgraph.stmts, labels),
            _ => {}
        }
    }
}

fn id_text(id: &Id) -> String {
    match id {
        Id::Html(s) | Id::Escaped(s) | Id::Plain(s) | Id::Anonymous(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unquoted(edges: &[RawEdge]) -> Vec<(String, String)> {
        edges
            .iter()
            .map(|e| {
                (
                    e.source.trim_matches('"').to_string(),
                    e.target.trim_matches('"').to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_terraform_graph_output() {
        let source = r#"digraph {
	compound = "true"
	newrank = "true"
	subgraph "root" {
		"[root] aws_instance.web (expand)" [label = "aws_instance.web", shape = "box"]
		"[root] var.region" [label = "var.region", shape = "note"]
		"[root] aws_instance.web (expand)" -> "[root] var.region"
		"[root] output.ip (expand)" -> "[root] aws_instance.web (expand)"
	}
}
"#;
        let edges = parse_dot(source).unwrap();
        assert_eq!(
            unquoted(&edges),
            vec![
                (
                    "[root] aws_instance.web (expand)".to_string(),
                    "[root] var.region".to_string()
                ),
                (
                    "[root] output.ip (expand)".to_string(),
                    "[root] aws_instance.web (expand)".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_chain_yields_consecutive_pairs() {
        let edges = parse_dot("digraph g { a -> b -> c; }").unwrap();
        assert_eq!(
            unquoted(&edges),
            vec![
                ("a".to_string(), "b".to_string()),
                ("b".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn test_nodes_without_edges_are_ignored() {
        let edges = parse_dot("digraph g { a; b [shape = box]; }").unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn test_undirected_graph_is_rejected() {
        let err = parse_dot("graph g { a -- b; }").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E200));
    }

    #[test]
    fn test_invalid_dot_is_rejected() {
        let err = parse_dot("digraph { a -> ").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E201));
    }
}
