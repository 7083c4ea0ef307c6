//! Resource instances recorded in Terraform state.
//!
//! Reads the JSON document printed by `terraform show -json` and keeps the
//! managed resource instances that carry a string `id`, which is what an
//! `import` block needs to adopt the instance into a layer's own state.

use log::{debug, info};
use serde::Deserialize;

use tfsplit_core::{CanonicalAddress, normalize};

use crate::TfsplitError;

#[derive(Debug, Deserialize)]
struct StateDocument {
    #[serde(default)]
    values: Option<StateValues>,
}

#[derive(Debug, Deserialize)]
struct StateValues {
    #[serde(default)]
    root_module: Option<StateModule>,
}

#[derive(Debug, Deserialize)]
struct StateModule {
    #[serde(default)]
    resources: Vec<StateResource>,
    #[serde(default)]
    child_modules: Vec<StateModule>,
}

#[derive(Debug, Deserialize)]
struct StateResource {
    address: String,
    mode: String,
    #[serde(default)]
    values: serde_json::Value,
}

/// One managed resource instance that can be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    address: String,
    owner: CanonicalAddress,
    id: String,
}

impl ImportTarget {
    pub fn new(address: impl Into<String>, id: impl Into<String>) -> Self {
        let address = address.into();
        let owner = owner_of(&address);
        Self {
            address,
            owner,
            id: id.into(),
        }
    }

    /// Instance address as Terraform prints it, e.g. `aws_instance.web[0]`.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Canonical address of the declaration the instance belongs to.
    pub fn owner(&self) -> &CanonicalAddress {
        &self.owner
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Instance keys are dropped before normalizing, so `aws_instance.web[0]`
/// belongs to `resource.aws_instance.web` and `module.net["a"].aws_vpc.this`
/// to `module.net`.
fn owner_of(address: &str) -> CanonicalAddress {
    let base = address.split('[').next().unwrap_or(address);
    normalize(base)
}

/// Importable instances from a state document, sorted by address.
#[derive(Debug, Clone, Default)]
pub struct StateIndex {
    targets: Vec<ImportTarget>,
}

impl StateIndex {
    /// Parse `terraform show -json` output.
    ///
    /// # Errors
    ///
    /// Returns [`TfsplitError::State`] if the text is not a state document.
    pub fn from_json(text: &str) -> Result<Self, TfsplitError> {
        let document: StateDocument =
            serde_json::from_str(text).map_err(|err| TfsplitError::State(err.to_string()))?;

        let mut targets = Vec::new();
        if let Some(root) = document.values.and_then(|values| values.root_module) {
            collect(&root, &mut targets);
        }
        targets.sort_by(|a, b| a.address.cmp(&b.address));

        info!(instances = targets.len(); "State read");
        Ok(Self { targets })
    }

    pub fn targets(&self) -> &[ImportTarget] {
        &self.targets
    }

    /// Instances whose owning declaration is `address`.
    pub fn owned_by<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a ImportTarget> {
        self.targets
            .iter()
            .filter(move |target| target.owner.as_str() == address)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn collect(module: &StateModule, targets: &mut Vec<ImportTarget>) {
    for resource in &module.resources {
        if resource.mode != "managed" {
            continue;
        }
        match resource.values.get("id").and_then(serde_json::Value::as_str) {
            Some(id) => targets.push(ImportTarget::new(resource.address.as_str(), id)),
            None => debug!(address = resource.address.as_str(); "Instance has no id, not importable"),
        }
    }
    for child in &module.child_modules {
        collect(child, targets);
    }
}
