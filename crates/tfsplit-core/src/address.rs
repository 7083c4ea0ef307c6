//! Canonical addresses and their classification.
//!
//! A canonical address is the normalized name of a declaration in a root
//! module, e.g. `resource.aws_instance.web`, `module.network`, `var.region`
//! or `provider.awswest`. [`classify`] maps it onto the [`BlockKey`] under
//! which the block extractor indexes the declaration's source text.

use std::{borrow::Borrow, fmt};

/// Address of the module-level `terraform { ... }` settings block.
pub const META_ADDRESS: &str = "terraform";

/// Normalized identifier of a declaration.
///
/// Ordering is plain string ordering; graph traversal and emission rely on it
/// for deterministic output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalAddress(String);

impl CanonicalAddress {
    /// Wrap an already-canonical address.
    ///
    /// No normalization is applied; use [`crate::normalize`] for raw labels.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address of the `terraform` settings block.
    pub fn meta() -> Self {
        Self(META_ADDRESS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The declaration kind this address refers to.
    pub fn kind(&self) -> Kind {
        classify(self).kind()
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Kind of top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// Managed resource, `resource "type" "name"`.
    Resource,
    /// Data source, `data "type" "name"`.
    Data,
    /// Module call, `module "name"`.
    Module,
    /// Input variable, `variable "name"`.
    Variable,
    /// Output value, `output "name"`.
    Output,
    /// Provider configuration, `provider "type"`, keyed by type plus alias.
    Provider,
    /// A single attribute of a `locals` block.
    Local,
    /// The `terraform` settings block.
    Meta,
}

impl Kind {
    /// Leading address segment for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Kind::Resource => "resource",
            Kind::Data => "data",
            Kind::Module => "module",
            Kind::Variable => "var",
            Kind::Output => "output",
            Kind::Provider => "provider",
            Kind::Local => "local",
            Kind::Meta => META_ADDRESS,
        }
    }

    /// Map a leading address segment to its kind.
    ///
    /// Terraform's graph names internal bookkeeping nodes `meta.*`; they are
    /// treated as part of the settings block.
    pub fn from_prefix(segment: &str) -> Option<Kind> {
        match segment {
            "resource" => Some(Kind::Resource),
            "data" => Some(Kind::Data),
            "module" => Some(Kind::Module),
            "var" => Some(Kind::Variable),
            "output" => Some(Kind::Output),
            "provider" => Some(Kind::Provider),
            "local" => Some(Kind::Local),
            META_ADDRESS | "meta" => Some(Kind::Meta),
            _ => None,
        }
    }

    /// All kinds, in declaration order.
    pub fn all() -> [Kind; 8] {
        [
            Kind::Resource,
            Kind::Data,
            Kind::Module,
            Kind::Variable,
            Kind::Output,
            Kind::Provider,
            Kind::Local,
            Kind::Meta,
        ]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Resource => "resource",
            Kind::Data => "data",
            Kind::Module => "module",
            Kind::Variable => "variable",
            Kind::Output => "output",
            Kind::Provider => "provider",
            Kind::Local => "local",
            Kind::Meta => "terraform",
        };
        f.write_str(name)
    }
}

/// Slot in the block index: kind, optional subtype, and name.
///
/// Resources and data sources use the subtype for their type label; every
/// other kind leaves it empty. The settings block has a fixed key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockKey {
    kind: Kind,
    subtype: String,
    name: String,
}

impl BlockKey {
    /// Key for a two-label declaration (`resource`, `data`).
    pub fn typed(kind: Kind, subtype: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            subtype: subtype.into(),
            name: name.into(),
        }
    }

    /// Key for a single-name declaration.
    pub fn named(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            subtype: String::new(),
            name: name.into(),
        }
    }

    /// Key for the `terraform` settings block.
    pub fn meta() -> Self {
        Self::named(Kind::Meta, META_ADDRESS)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Meta => write!(f, "{}", self.kind),
            _ if self.subtype.is_empty() => write!(f, "{} {}", self.kind, self.name),
            _ => write!(f, "{} {}.{}", self.kind, self.subtype, self.name),
        }
    }
}

/// Map a canonical address onto the block index slot it refers to.
///
/// Total: an address whose leading segment is not a known kind is treated as
/// a bare managed resource `type.name`, which is how Terraform itself reads
/// such references. Lookups for nonsense addresses then simply miss.
pub fn classify(address: &CanonicalAddress) -> BlockKey {
    let address = address.as_str();
    let (head, rest) = match address.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (address, None),
    };

    match (Kind::from_prefix(head), rest) {
        (Some(Kind::Meta), _) => BlockKey::meta(),
        (Some(kind @ (Kind::Resource | Kind::Data)), Some(rest)) => typed_key(kind, rest),
        (Some(kind), Some(rest)) => {
            let name = rest.split('.').next().unwrap_or(rest);
            BlockKey::named(kind, name)
        }
        _ => typed_key(Kind::Resource, address),
    }
}

fn typed_key(kind: Kind, type_and_name: &str) -> BlockKey {
    match type_and_name.split_once('.') {
        Some((subtype, name)) => BlockKey::typed(kind, subtype, name),
        None => BlockKey::typed(kind, type_and_name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(address: &str) -> BlockKey {
        classify(&CanonicalAddress::new(address))
    }

    #[test]
    fn test_classify_resource_and_data() {
        assert_eq!(
            key_of("resource.aws_instance.web"),
            BlockKey::typed(Kind::Resource, "aws_instance", "web")
        );
        assert_eq!(
            key_of("data.aws_ami.ubuntu"),
            BlockKey::typed(Kind::Data, "aws_ami", "ubuntu")
        );
    }

    #[test]
    fn test_classify_named_kinds() {
        assert_eq!(key_of("module.network"), BlockKey::named(Kind::Module, "network"));
        assert_eq!(key_of("var.region"), BlockKey::named(Kind::Variable, "region"));
        assert_eq!(key_of("output.vpc_id"), BlockKey::named(Kind::Output, "vpc_id"));
        assert_eq!(key_of("local.tags"), BlockKey::named(Kind::Local, "tags"));
    }

    #[test]
    fn test_classify_provider_keeps_alias_suffix() {
        assert_eq!(key_of("provider.aws"), BlockKey::named(Kind::Provider, "aws"));
        assert_eq!(
            key_of("provider.awswest"),
            BlockKey::named(Kind::Provider, "awswest")
        );
    }

    #[test]
    fn test_classify_meta() {
        assert_eq!(key_of("terraform"), BlockKey::meta());
        assert_eq!(key_of("meta.count-boundary"), BlockKey::meta());
        assert_eq!(CanonicalAddress::meta().kind(), Kind::Meta);
    }

    #[test]
    fn test_classify_falls_back_to_resource() {
        assert_eq!(
            key_of("aws_s3_bucket.logs"),
            BlockKey::typed(Kind::Resource, "aws_s3_bucket", "logs")
        );
        assert_eq!(key_of("root"), BlockKey::typed(Kind::Resource, "root", ""));
    }

    #[test]
    fn test_classify_nested_module_uses_outer_name() {
        assert_eq!(
            key_of("module.network.aws_vpc.this"),
            BlockKey::named(Kind::Module, "network")
        );
    }

    #[test]
    fn test_block_key_display() {
        assert_eq!(
            BlockKey::typed(Kind::Resource, "aws_instance", "web").to_string(),
            "resource aws_instance.web"
        );
        assert_eq!(BlockKey::named(Kind::Variable, "region").to_string(), "variable region");
        assert_eq!(BlockKey::meta().to_string(), "terraform");
    }

    #[test]
    fn test_kind_prefix_round_trip() {
        for kind in Kind::all() {
            assert_eq!(Kind::from_prefix(kind.prefix()), Some(kind));
        }
    }
}
