//! Assigns graph nodes to layers.
//!
//! Layers are processed in declaration order. Each layer takes everything
//! reachable from its root that no earlier layer has claimed, so a
//! dependency shared by two roots belongs to whichever layer comes first.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use log::{debug, warn};

use tfsplit_core::{CanonicalAddress, LayerClosure, LayerSpec};

use crate::DependencyGraph;

/// Closures keyed by layer name, in layer declaration order.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    layers: IndexMap<String, LayerClosure>,
}

impl Partition {
    pub fn get(&self, layer: &str) -> Option<&LayerClosure> {
        self.layers.get(layer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayerClosure)> {
        self.layers
            .iter()
            .map(|(name, closure)| (name.as_str(), closure))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Partition `graph` into one closure per layer.
///
/// Later layers with the same name replace earlier ones in the result, but
/// the earlier layer's claims still stand; configuration validation
/// rejects duplicate names before this point.
pub fn partition(graph: &DependencyGraph, layers: &[LayerSpec]) -> Partition {
    let (_, layers) = layers.iter().fold(
        (BTreeSet::new(), IndexMap::new()),
        |(mut claimed, mut closures), layer| {
            let root = layer.root();
            if !graph.contains(root.as_str()) {
                warn!(
                    layer = layer.name(), root = root.as_str();
                    "Layer root has no edges in the dependency graph"
                );
            }

            let members = closure(graph, &root, &claimed);
            debug!(layer = layer.name(), members = members.len(); "Layer closure computed");

            claimed.extend(members.iter().cloned());
            claimed.insert(root.clone());
            closures.insert(layer.name().to_string(), LayerClosure::new(root, members));
            (claimed, closures)
        },
    );

    Partition { layers }
}

/// Depth-first, pre-order walk from `root`, treating `claimed` as visited.
/// The root itself is never masked and never part of the result.
fn closure<'a>(
    graph: &'a DependencyGraph,
    root: &'a CanonicalAddress,
    claimed: &'a BTreeSet<CanonicalAddress>,
) -> Vec<CanonicalAddress> {
    let mut visited: HashSet<&'a str> = claimed.iter().map(CanonicalAddress::as_str).collect();
    visited.insert(root.as_str());

    let mut members = Vec::new();
    visit(graph, root.as_str(), &mut visited, &mut members);
    members
}

fn visit<'a>(
    graph: &'a DependencyGraph,
    address: &str,
    visited: &mut HashSet<&'a str>,
    members: &mut Vec<CanonicalAddress>,
) {
    for dependency in graph.dependencies(address) {
        if visited.insert(dependency.as_str()) {
            members.push(dependency.clone());
            visit(graph, dependency.as_str(), visited, members);
        }
    }
}
