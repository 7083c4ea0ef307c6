//! Configuration types for a split run.
//!
//! All types implement [`serde::Deserialize`]; the CLI loads them from TOML.
//!
//! ```toml
//! [output]
//! split_root = "tfsplit"
//! var_file = "terraform.tfvars"
//!
//! [[layers]]
//! name = "network"
//! root_node = "module.network"
//!
//! [[layers]]
//! name = "app"
//! root_node = "aws_instance.web"
//! ```

use std::{collections::HashSet, path::Component, path::Path};

use serde::Deserialize;

use tfsplit_core::LayerSpec;

use crate::TfsplitError;

/// Top-level configuration: the ordered layers and output settings.
///
/// Layer order matters: earlier layers claim shared dependencies first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layers: Vec<LayerSpec>,

    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    pub fn new(layers: Vec<LayerSpec>, output: OutputConfig) -> Self {
        Self { layers, output }
    }

    /// Layers in the order they are partitioned.
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputConfig {
        &mut self.output
    }

    /// Check that the layers can be partitioned and written.
    ///
    /// # Errors
    ///
    /// Returns [`TfsplitError::Config`] if there are no layers, or a layer
    /// name is empty, repeated, or not a single path component, or a root
    /// node is empty.
    pub fn validate(&self) -> Result<(), TfsplitError> {
        if self.layers.is_empty() {
            return Err(TfsplitError::Config("no layers are configured".to_string()));
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            let name = layer.name();
            if !is_directory_name(name) {
                return Err(TfsplitError::Config(format!(
                    "layer name `{name}` must be a single directory name"
                )));
            }
            if !seen.insert(name) {
                return Err(TfsplitError::Config(format!(
                    "layer `{name}` is defined more than once"
                )));
            }
            if layer.root_node().trim().is_empty() {
                return Err(TfsplitError::Config(format!(
                    "layer `{name}` has an empty root node"
                )));
            }
        }

        if self.output.split_root.trim().is_empty() {
            return Err(TfsplitError::Config("split_root must not be empty".to_string()));
        }

        Ok(())
    }
}

fn is_directory_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Where and what to write.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory, relative to the module, that receives one subdirectory per
    /// layer.
    #[serde(default = "default_split_root")]
    split_root: String,

    /// Append the module's `terraform` block to every layer.
    #[serde(default = "default_include_terraform_block")]
    include_terraform_block: bool,

    /// Variable-value file to filter into each layer.
    #[serde(default)]
    var_file: Option<String>,

    /// Backend configuration file to copy into each layer with its state key
    /// prefixed by the layer name.
    #[serde(default)]
    backend_config: Option<String>,
}

fn default_split_root() -> String {
    "tfsplit".to_string()
}

fn default_include_terraform_block() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            split_root: default_split_root(),
            include_terraform_block: default_include_terraform_block(),
            var_file: None,
            backend_config: None,
        }
    }
}

impl OutputConfig {
    pub fn split_root(&self) -> &str {
        &self.split_root
    }

    pub fn include_terraform_block(&self) -> bool {
        self.include_terraform_block
    }

    pub fn var_file(&self) -> Option<&str> {
        self.var_file.as_deref()
    }

    pub fn backend_config(&self) -> Option<&str> {
        self.backend_config.as_deref()
    }

    pub fn with_split_root(mut self, split_root: impl Into<String>) -> Self {
        self.split_root = split_root.into();
        self
    }

    pub fn with_terraform_block(mut self, include: bool) -> Self {
        self.include_terraform_block = include;
        self
    }

    pub fn with_var_file(mut self, var_file: impl Into<String>) -> Self {
        self.var_file = Some(var_file.into());
        self
    }

    pub fn with_backend_config(mut self, backend_config: impl Into<String>) -> Self {
        self.backend_config = Some(backend_config.into());
        self
    }
}
