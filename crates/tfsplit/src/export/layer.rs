//! Layer directories.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use tfsplit_core::{CanonicalAddress, Kind, LayerClosure, classify};

use crate::{BlockIndex, TfsplitError};

/// File inside a layer directory that a declaration is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFile {
    Main,
    Data,
    Variables,
    Outputs,
    Providers,
    Locals,
    Terraform,
}

impl OutputFile {
    pub fn for_kind(kind: Kind) -> Self {
        match kind {
            Kind::Resource | Kind::Module => Self::Main,
            Kind::Data => Self::Data,
            Kind::Variable => Self::Variables,
            Kind::Output => Self::Outputs,
            Kind::Provider => Self::Providers,
            Kind::Local => Self::Locals,
            Kind::Meta => Self::Terraform,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Main => "main.tf",
            Self::Data => "data.tf",
            Self::Variables => "variables.tf",
            Self::Outputs => "outputs.tf",
            Self::Providers => "providers.tf",
            Self::Locals => "locals.tf",
            Self::Terraform => "terraform.tf",
        }
    }
}

/// A tolerated problem found while emitting a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitWarning {
    /// A provider the layer uses that has no `provider` block; Terraform
    /// configures it implicitly.
    UndeclaredProvider(CanonicalAddress),
}

impl fmt::Display for EmitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredProvider(address) => {
                write!(f, "`{address}` has no provider block in the module")
            }
        }
    }
}

/// What was written for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitSummary {
    directory: PathBuf,
    files: Vec<PathBuf>,
    counts: BTreeMap<Kind, usize>,
    warnings: Vec<EmitWarning>,
}

impl EmitSummary {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Files written, sorted.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of declarations written for `kind`.
    pub fn count(&self, kind: Kind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<Kind, usize> {
        &self.counts
    }

    pub fn warnings(&self) -> &[EmitWarning] {
        &self.warnings
    }

    pub(crate) fn add_file(&mut self, file: PathBuf) {
        self.files.push(file);
        self.files.sort();
    }
}

/// Result of emitting one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    Written(EmitSummary),
    /// The layer directory already existed and was left untouched.
    Skipped { directory: PathBuf },
}

impl EmitOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn summary(&self) -> Option<&EmitSummary> {
        match self {
            Self::Written(summary) => Some(summary),
            Self::Skipped { .. } => None,
        }
    }

    pub fn directory(&self) -> &Path {
        match self {
            Self::Written(summary) => summary.directory(),
            Self::Skipped { directory } => directory,
        }
    }
}

/// Writes layers as directories of `.tf` files under an output root.
#[derive(Debug)]
pub struct LayerEmitter<'a> {
    index: &'a BlockIndex,
    output_root: PathBuf,
    include_terraform_block: bool,
}

impl<'a> LayerEmitter<'a> {
    pub fn new(index: &'a BlockIndex, output_root: impl Into<PathBuf>) -> Self {
        Self {
            index,
            output_root: output_root.into(),
            include_terraform_block: true,
        }
    }

    /// Whether every layer gets a copy of the module's `terraform` block.
    pub fn with_terraform_block(mut self, include: bool) -> Self {
        self.include_terraform_block = include;
        self
    }

    pub fn layer_dir(&self, layer: &str) -> PathBuf {
        self.output_root.join(layer)
    }

    /// Write the root and members of `closure` into the layer directory.
    ///
    /// An existing layer directory is never modified.
    ///
    /// # Errors
    ///
    /// [`TfsplitError::MissingSource`] if an address other than a provider
    /// has no indexed declaration; nothing is written in that case.
    /// [`TfsplitError::Io`] if the directory or a file cannot be written;
    /// the partly written directory is removed again.
    pub fn emit(&self, layer: &str, closure: &LayerClosure) -> Result<EmitOutcome, TfsplitError> {
        let directory = self.layer_dir(layer);
        if directory.exists() {
            warn!(layer = layer, directory:? = directory; "Layer directory exists, skipping");
            return Ok(EmitOutcome::Skipped { directory });
        }

        let mut buffers: BTreeMap<OutputFile, String> = BTreeMap::new();
        let mut counts = BTreeMap::new();
        let mut warnings = Vec::new();

        let meta = CanonicalAddress::meta();
        let append_meta = self.include_terraform_block && !closure.contains(meta.as_str());
        let addresses = closure
            .addresses()
            .chain(append_meta.then_some(&meta));

        for address in addresses {
            let key = classify(address);
            let kind = key.kind();

            let Some(span) = self.index.get(&key) else {
                match kind {
                    Kind::Provider => {
                        let warning = EmitWarning::UndeclaredProvider(address.clone());
                        warn!(layer = layer; "{warning}");
                        warnings.push(warning);
                    }
                    Kind::Meta => debug!(layer = layer; "Module has no terraform block"),
                    _ => {
                        return Err(TfsplitError::MissingSource {
                            layer: layer.to_string(),
                            address: address.clone(),
                        });
                    }
                }
                continue;
            };

            let buffer = buffers.entry(OutputFile::for_kind(kind)).or_default();
            if kind == Kind::Local {
                buffer.push_str("  ");
                buffer.push_str(span.text());
            } else {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(span.text());
            }
            *counts.entry(kind).or_insert(0) += 1;
        }

        if let Some(locals) = buffers.get_mut(&OutputFile::Locals) {
            *locals = format!("locals {{\n{locals}}}\n");
        }

        let files = match write_files(layer, &directory, &buffers) {
            Ok(files) => files,
            Err(err) => {
                discard_layer(layer, &directory);
                return Err(err.into());
            }
        };

        info!(layer = layer, files = files.len(), warnings = warnings.len(); "Layer written");
        Ok(EmitOutcome::Written(EmitSummary {
            directory,
            files,
            counts,
            warnings,
        }))
    }
}

fn write_files(
    layer: &str,
    directory: &Path,
    buffers: &BTreeMap<OutputFile, String>,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(directory)?;
    let mut files = Vec::with_capacity(buffers.len());
    for (file, contents) in buffers {
        let path = directory.join(file.file_name());
        fs::write(&path, contents)?;
        debug!(layer = layer, file = file.file_name(); "Wrote layer file");
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Remove a layer directory whose write did not complete, so the next run
/// does not mistake it for a finished layer.
pub(crate) fn discard_layer(layer: &str, directory: &Path) {
    match fs::remove_dir_all(directory) {
        Ok(()) => debug!(layer = layer; "Discarded incomplete layer directory"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            warn!(layer = layer, directory:? = directory; "Could not remove incomplete layer directory: {err}");
        }
    }
}
