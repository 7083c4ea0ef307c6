//! Layer definitions and partition results.

use serde::Deserialize;

use crate::{address::CanonicalAddress, normalize::normalize};

/// A named layer rooted at one declaration.
///
/// Deserialized from the `[[layers]]` table of the configuration file. The
/// root may be written in any form the normalizer accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerSpec {
    name: String,
    #[serde(alias = "rootNode")]
    root_node: String,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, root_node: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_node: root_node.into(),
        }
    }

    /// Layer name, used as the output directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root node as written in the configuration.
    pub fn root_node(&self) -> &str {
        &self.root_node
    }

    /// Root node in canonical form.
    pub fn root(&self) -> CanonicalAddress {
        normalize(&self.root_node)
    }
}

/// Addresses assigned to one layer by the partitioner.
///
/// `members` holds the addresses newly claimed by the layer, in depth-first
/// discovery order. The root itself is kept apart and never appears in
/// `members`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerClosure {
    root: CanonicalAddress,
    members: Vec<CanonicalAddress>,
}

impl LayerClosure {
    pub fn new(root: CanonicalAddress, members: Vec<CanonicalAddress>) -> Self {
        Self { root, members }
    }

    pub fn root(&self) -> &CanonicalAddress {
        &self.root
    }

    pub fn members(&self) -> &[CanonicalAddress] {
        &self.members
    }

    /// Root followed by members; the order in which the layer is emitted.
    pub fn addresses(&self) -> impl Iterator<Item = &CanonicalAddress> {
        std::iter::once(&self.root).chain(self.members.iter())
    }

    /// Whether the root or any member equals `address`.
    pub fn contains(&self, address: &str) -> bool {
        self.root.as_str() == address || self.members.iter().any(|m| m.as_str() == address)
    }
}
