//! The normalized dependency graph.
//!
//! [`DependencyGraph`] holds one node per canonical address and one edge per
//! distinct (source, target) pair, where the source depends on the target.
//! Storage order is insertion order; every read that produces a sequence
//! goes through a sorted projection so results never depend on the order
//! edges appeared in the input.

use std::{
    collections::{BTreeSet, HashMap},
    fmt::Write as _,
};

use log::{debug, info, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use tfsplit_core::{CanonicalAddress, normalize};
use tfsplit_parser::{RawEdge, error::ParseError, parse_dot};

/// Terraform's annotation for the node that orders teardown of a provider
/// or module.
const CLOSE_MARKER: &str = "(close)";

/// Dependency graph over canonical addresses.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<CanonicalAddress, ()>,
    nodes: HashMap<CanonicalAddress, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from Graphviz DOT text as printed by `terraform graph`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the text is not a directed graph.
    pub fn from_dot(text: &str) -> Result<Self, ParseError> {
        let edges = parse_dot(text)?;
        Ok(Self::from_raw_edges(&edges))
    }

    /// Build a graph from raw, unnormalized edges.
    ///
    /// Edges leaving a closing node are dropped, endpoints are normalized,
    /// and self edges and repeated pairs are discarded.
    pub fn from_raw_edges(edges: &[RawEdge]) -> Self {
        let mut graph = Self::new();
        let mut dropped = 0usize;

        for edge in edges {
            if edge.source.contains(CLOSE_MARKER) {
                trace!(source = edge.source.as_str(); "Dropping edge from closing node");
                dropped += 1;
                continue;
            }
            if !graph.add_dependency(normalize(&edge.source), normalize(&edge.target)) {
                dropped += 1;
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped = dropped;
            "Dependency graph built"
        );
        graph
    }

    /// Record that `source` depends on `target`.
    ///
    /// Returns `false` when the edge is a self edge or was already present.
    pub fn add_dependency(&mut self, source: CanonicalAddress, target: CanonicalAddress) -> bool {
        if source == target {
            trace!(address = source.as_str(); "Dropping self edge");
            return false;
        }

        let from = self.node(source);
        let to = self.node(target);
        if self.graph.contains_edge(from, to) {
            return false;
        }

        self.graph.add_edge(from, to, ());
        true
    }

    fn node(&mut self, address: CanonicalAddress) -> NodeIndex {
        if let Some(&index) = self.nodes.get(&address) {
            return index;
        }
        let index = self.graph.add_node(address.clone());
        self.nodes.insert(address, index);
        index
    }

    /// Whether `address` is an endpoint of any edge.
    pub fn contains(&self, address: &str) -> bool {
        self.nodes.contains_key(address)
    }

    /// Direct dependencies of `address`, sorted. Empty for unknown addresses.
    pub fn dependencies(&self, address: &str) -> Vec<&CanonicalAddress> {
        let Some(&index) = self.nodes.get(address) else {
            return Vec::new();
        };

        let mut targets: Vec<_> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .map(|neighbor| &self.graph[neighbor])
            .collect();
        targets.sort();
        targets
    }

    /// All addresses in the graph, sorted.
    pub fn addresses(&self) -> Vec<&CanonicalAddress> {
        let mut addresses: Vec<_> = self.graph.node_weights().collect();
        addresses.sort();
        addresses
    }

    /// All edges as (source, target) pairs, sorted.
    pub fn edges(&self) -> Vec<(&CanonicalAddress, &CanonicalAddress)> {
        let mut edges: Vec<_> = self
            .graph
            .raw_edges()
            .iter()
            .map(|edge| (&self.graph[edge.source()], &self.graph[edge.target()]))
            .collect();
        edges.sort();
        edges
    }

    /// Every address reachable from `address`, excluding `address` itself
    /// unless it sits on a cycle.
    pub fn reachable_from(&self, address: &str) -> BTreeSet<&CanonicalAddress> {
        let mut reached = BTreeSet::new();
        let mut stack = self.dependencies(address);
        while let Some(next) = stack.pop() {
            if reached.insert(next) {
                stack.extend(self.dependencies(next.as_str()));
            }
        }
        reached
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the graph as DOT with sorted, quoted edges.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph {\n");
        for (source, target) in self.edges() {
            let _ = writeln!(out, "  \"{source}\" -> \"{target}\";");
        }
        out.push_str("}\n");
        debug!(edges = self.edge_count(); "Rendered dependency graph");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERRAFORM_GRAPH: &str = r#"digraph {
	subgraph "root" {
		"[root] aws_instance.web (expand)" [label = "aws_instance.web", shape = "box"]
		"[root] aws_instance.web (expand)" -> "[root] aws_subnet.main (expand)"
		"[root] aws_instance.web (expand)" -> "[root] data.aws_ami.ubuntu (expand)"
		"[root] aws_subnet.main (expand)" -> "[root] module.network (expand)"
		"[root] module.network.aws_vpc.this (expand)" -> "[root] module.network (expand)"
		"[root] module.network.aws_vpc.this (expand)" -> "[root] var.cidr"
		"[root] aws_instance.web (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
		"[root] provider[\"registry.terraform.io/hashicorp/aws\"] (close)" -> "[root] aws_instance.web (expand)"
		"[root] root" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"] (close)"
	}
}
"#;

    fn address(value: &str) -> CanonicalAddress {
        CanonicalAddress::new(value)
    }

    #[test]
    fn test_build_from_terraform_output() {
        let graph = DependencyGraph::from_dot(TERRAFORM_GRAPH).unwrap();

        let deps: Vec<_> = graph
            .dependencies("resource.aws_instance.web")
            .into_iter()
            .map(CanonicalAddress::as_str)
            .collect();
        assert_eq!(
            deps,
            ["data.aws_ami.ubuntu", "provider.aws", "resource.aws_subnet.main"]
        );

        // Module members collapse onto the module; member -> module becomes a self edge.
        assert_eq!(
            graph
                .dependencies("module.network")
                .into_iter()
                .map(CanonicalAddress::as_str)
                .collect::<Vec<_>>(),
            ["var.cidr"]
        );
    }

    #[test]
    fn test_close_nodes_are_dropped() {
        let graph = DependencyGraph::from_dot(TERRAFORM_GRAPH).unwrap();
        assert!(graph.dependencies("provider.aws").is_empty());
    }

    #[test]
    fn test_duplicate_and_self_edges() {
        let mut graph = DependencyGraph::new();
        assert!(graph.add_dependency(address("resource.a.a"), address("resource.b.b")));
        assert!(!graph.add_dependency(address("resource.a.a"), address("resource.b.b")));
        assert!(!graph.add_dependency(address("module.x"), address("module.x")));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
        assert!(!graph.contains("module.x"));
    }

    #[test]
    fn test_repeated_raw_edges_collapse() {
        let dot = r#"digraph {
            "[root] aws_s3_bucket.a (expand)" -> "[root] var.name"
            "[root] aws_s3_bucket.a" -> "[root] var.name"
            "[root] aws_s3_bucket.a (expand)" -> "[root] var.name"
        }"#;
        let graph = DependencyGraph::from_dot(dot).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_unknown_address() {
        let graph = DependencyGraph::from_dot(TERRAFORM_GRAPH).unwrap();
        assert!(!graph.contains("resource.nope.nope"));
        assert!(graph.dependencies("resource.nope.nope").is_empty());
    }

    #[test]
    fn test_reachable_from() {
        let graph = DependencyGraph::from_dot(TERRAFORM_GRAPH).unwrap();
        let reached: Vec<_> = graph
            .reachable_from("resource.aws_instance.web")
            .into_iter()
            .map(CanonicalAddress::as_str)
            .collect();
        assert_eq!(
            reached,
            [
                "data.aws_ami.ubuntu",
                "module.network",
                "provider.aws",
                "resource.aws_subnet.main",
                "var.cidr",
            ]
        );
    }

    #[test]
    fn test_to_dot_rebuilds_same_edges() {
        let graph = DependencyGraph::from_dot(TERRAFORM_GRAPH).unwrap();
        let rendered = graph.to_dot();
        let rebuilt = DependencyGraph::from_dot(&rendered).unwrap();
        assert_eq!(graph.edges(), rebuilt.edges());
        assert!(rendered.contains("\"resource.aws_instance.web\" -> \"provider.aws\";"));
    }

    #[test]
    fn test_invalid_dot_is_error() {
        assert!(DependencyGraph::from_dot("digraph { a -> ").is_err());
        assert!(DependencyGraph::from_dot("graph { a -- b }").is_err());
    }
}
