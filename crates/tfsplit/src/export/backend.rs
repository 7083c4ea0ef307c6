//! Per-layer backend configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::warn;

use tfsplit_core::LayerClosure;
use tfsplit_parser::{Item, parse_hcl, static_string};

use super::{Exporter, quote};
use crate::TfsplitError;

/// Copies a partial backend configuration into each layer, giving every
/// layer its own state object by prefixing `key` with the layer name.
#[derive(Debug, Clone)]
pub struct BackendExporter {
    file_name: String,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
enum Entry {
    Verbatim(String),
    Key(String),
}

impl BackendExporter {
    /// Read and parse the backend configuration file at `path`.
    ///
    /// # Errors
    ///
    /// [`TfsplitError::SourceRead`] if the file cannot be read,
    /// [`TfsplitError::Parse`] if it is not valid HCL.
    pub fn from_file(path: &Path) -> Result<Self, TfsplitError> {
        let source = fs::read_to_string(path).map_err(|err| TfsplitError::source_read(path, err))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backend.hcl".to_string());
        Self::from_source(file_name, &source, &path.display().to_string())
    }

    fn from_source(file_name: String, source: &str, origin: &str) -> Result<Self, TfsplitError> {
        let body = parse_hcl(source)
            .map_err(|err| TfsplitError::new_parse_error(err, source, origin))?;

        let mut entries = Vec::with_capacity(body.items().len());
        let mut has_key = false;
        for item in body.items() {
            let text = &source[item.span().range()];
            let entry = match item {
                Item::Attribute(attribute) if attribute.name() == "key" && !has_key => {
                    match static_string(&source[attribute.expression_span().range()]) {
                        Some(key) => {
                            has_key = true;
                            Entry::Key(key)
                        }
                        None => {
                            warn!(file = origin; "Backend `key` is not a plain string, copied unchanged");
                            Entry::Verbatim(text.to_string())
                        }
                    }
                }
                _ => Entry::Verbatim(text.to_string()),
            };
            entries.push(entry);
        }

        if !has_key {
            warn!(file = origin; "Backend configuration has no `key`; layers will share state");
        }

        Ok(Self { file_name, entries })
    }

    fn render(&self, layer: &str) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                Entry::Verbatim(text) => out.push_str(text),
                Entry::Key(key) => {
                    out.push_str("key = ");
                    out.push_str(&quote(&format!("{layer}/{key}")));
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Exporter for BackendExporter {
    fn name(&self) -> &'static str {
        "backend"
    }

    fn export_layer(
        &self,
        layer: &str,
        _closure: &LayerClosure,
        directory: &Path,
    ) -> Result<Option<PathBuf>, TfsplitError> {
        let path = directory.join(&self.file_name);
        fs::write(&path, self.render(layer))?;
        Ok(Some(path))
    }
}
