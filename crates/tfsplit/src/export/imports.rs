//! Per-layer `import` blocks.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use tfsplit_core::LayerClosure;

use super::{Exporter, quote};
use crate::{StateIndex, TfsplitError};

const FILE_NAME: &str = "imports.tf";

/// Writes an `import` block for every existing instance a layer owns, so
/// the layer's first apply adopts them instead of creating duplicates.
#[derive(Debug, Clone)]
pub struct ImportExporter {
    state: StateIndex,
}

impl ImportExporter {
    pub fn new(state: StateIndex) -> Self {
        Self { state }
    }

    fn render(&self, closure: &LayerClosure) -> String {
        let mut out = String::new();
        for target in self.state.targets() {
            if !closure.contains(target.owner().as_str()) {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(
                out,
                "import {{\n  to = {}\n  id = {}\n}}",
                target.address(),
                quote(target.id())
            );
        }
        out
    }
}

impl Exporter for ImportExporter {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn export_layer(
        &self,
        layer: &str,
        closure: &LayerClosure,
        directory: &Path,
    ) -> Result<Option<PathBuf>, TfsplitError> {
        let contents = self.render(closure);
        if contents.is_empty() {
            debug!(layer = layer; "No state instances for layer");
            return Ok(None);
        }

        let path = directory.join(FILE_NAME);
        fs::write(&path, contents)?;
        Ok(Some(path))
    }
}
