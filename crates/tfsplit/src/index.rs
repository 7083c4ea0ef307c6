//! Declaration index for a module's source files.
//!
//! [`BlockIndex`] maps a [`BlockKey`] to the exact source text of the
//! declaration it names, lifted from the module's `*.tf` files.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    fmt, fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use tfsplit_core::{BlockKey, CanonicalAddress, Kind, classify};
use tfsplit_parser::{Block, Span, parse_hcl, static_string};

use crate::TfsplitError;

/// Source text of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    file: PathBuf,
    span: Span,
    text: String,
}

impl SourceSpan {
    fn new(file: &Path, source: &str, span: Span) -> Self {
        Self {
            file: file.to_path_buf(),
            span,
            text: format!("{}\n", &source[span.range()]),
        }
    }

    /// File the declaration was read from. For merged `terraform` blocks,
    /// the file of the first one.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The declaration's text followed by a single newline.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn append(&mut self, other: &SourceSpan) {
        self.text.push('\n');
        self.text.push_str(&other.text);
    }
}

/// Something in the module that was skipped while indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexWarning {
    /// A top-level block of a type that is never split out.
    UnsupportedBlock { file: PathBuf, block_type: String },
    /// A block missing the labels its type requires.
    MissingLabels { file: PathBuf, block_type: String },
    /// A second declaration for a key; the first one is kept.
    DuplicateDeclaration { file: PathBuf, key: BlockKey },
    /// A provider alias that is not a plain string.
    DynamicProviderAlias { file: PathBuf, provider: String },
    /// A top-level attribute outside any block.
    StrayAttribute { file: PathBuf, name: String },
}

impl fmt::Display for IndexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedBlock { file, block_type } => {
                write!(f, "{}: `{block_type}` blocks are not split", file.display())
            }
            Self::MissingLabels { file, block_type } => {
                write!(f, "{}: `{block_type}` block is missing labels", file.display())
            }
            Self::DuplicateDeclaration { file, key } => {
                write!(f, "{}: `{key}` is declared again; keeping the first", file.display())
            }
            Self::DynamicProviderAlias { file, provider } => write!(
                f,
                "{}: alias of provider `{provider}` is not a plain string; indexed without alias",
                file.display()
            ),
            Self::StrayAttribute { file, name } => {
                write!(f, "{}: top-level attribute `{name}` ignored", file.display())
            }
        }
    }
}

/// Declarations of a module, keyed by kind, type and name.
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    entries: BTreeMap<BlockKey, SourceSpan>,
    warnings: Vec<IndexWarning>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every `*.tf` file directly inside `dir`, in path order.
    ///
    /// # Errors
    ///
    /// [`TfsplitError::SourceRead`] if the directory or a file cannot be
    /// read, [`TfsplitError::Parse`] if a file is not valid configuration.
    pub fn from_module(dir: &Path) -> Result<Self, TfsplitError> {
        let entries = fs::read_dir(dir).map_err(|err| TfsplitError::source_read(dir, err))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| TfsplitError::source_read(dir, err))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "tf") {
                files.push(path);
            }
        }
        files.sort();

        let mut index = Self::new();
        for file in &files {
            let source =
                fs::read_to_string(file).map_err(|err| TfsplitError::source_read(file, err))?;
            index.add_source(file, &source)?;
        }

        info!(
            files = files.len(),
            declarations = index.len(),
            warnings = index.warnings.len();
            "Module indexed"
        );
        Ok(index)
    }

    /// Index the declarations of one file's source.
    ///
    /// # Errors
    ///
    /// [`TfsplitError::Parse`] if `source` is not valid configuration.
    pub fn add_source(&mut self, file: &Path, source: &str) -> Result<(), TfsplitError> {
        let body = parse_hcl(source).map_err(|err| {
            TfsplitError::new_parse_error(err, source, file.display().to_string())
        })?;

        for attribute in body.attributes() {
            self.warn(IndexWarning::StrayAttribute {
                file: file.to_path_buf(),
                name: attribute.name().to_string(),
            });
        }

        for block in body.blocks() {
            match block.block_type() {
                "resource" => self.add_typed(Kind::Resource, block, file, source),
                "data" => self.add_typed(Kind::Data, block, file, source),
                "module" => self.add_named(Kind::Module, block, file, source),
                "variable" => self.add_named(Kind::Variable, block, file, source),
                "output" => self.add_named(Kind::Output, block, file, source),
                "provider" => self.add_provider(block, file, source),
                "locals" => {
                    for attribute in block.body().attributes() {
                        let key = BlockKey::named(Kind::Local, attribute.name());
                        self.insert(key, SourceSpan::new(file, source, attribute.span()));
                    }
                }
                "terraform" => {
                    let span = SourceSpan::new(file, source, block.span());
                    match self.entries.entry(BlockKey::meta()) {
                        Entry::Occupied(mut existing) => existing.get_mut().append(&span),
                        Entry::Vacant(slot) => {
                            slot.insert(span);
                        }
                    }
                }
                other => self.warn(IndexWarning::UnsupportedBlock {
                    file: file.to_path_buf(),
                    block_type: other.to_string(),
                }),
            }
        }

        debug!(file:? = file, declarations = self.len(); "File indexed");
        Ok(())
    }

    fn add_typed(&mut self, kind: Kind, block: &Block<'_>, file: &Path, source: &str) {
        match (block.label(0), block.label(1)) {
            (Some(subtype), Some(name)) => {
                let key = BlockKey::typed(kind, subtype, name);
                self.insert(key, SourceSpan::new(file, source, block.span()));
            }
            _ => self.missing_labels(block, file),
        }
    }

    fn add_named(&mut self, kind: Kind, block: &Block<'_>, file: &Path, source: &str) {
        match block.label(0) {
            Some(name) => {
                let key = BlockKey::named(kind, name);
                self.insert(key, SourceSpan::new(file, source, block.span()));
            }
            None => self.missing_labels(block, file),
        }
    }

    /// Providers are keyed by type with the static alias appended, matching
    /// the graph's `provider.<type><alias>` addresses.
    fn add_provider(&mut self, block: &Block<'_>, file: &Path, source: &str) {
        let Some(provider) = block.label(0) else {
            self.missing_labels(block, file);
            return;
        };

        let alias = match block.body().attribute("alias") {
            Some(attribute) => {
                let alias = static_string(&source[attribute.expression_span().range()]);
                if alias.is_none() {
                    self.warn(IndexWarning::DynamicProviderAlias {
                        file: file.to_path_buf(),
                        provider: provider.to_string(),
                    });
                }
                alias.unwrap_or_default()
            }
            None => String::new(),
        };

        let key = BlockKey::named(Kind::Provider, format!("{provider}{alias}"));
        self.insert(key, SourceSpan::new(file, source, block.span()));
    }

    fn missing_labels(&mut self, block: &Block<'_>, file: &Path) {
        self.warn(IndexWarning::MissingLabels {
            file: file.to_path_buf(),
            block_type: block.block_type().to_string(),
        });
    }

    fn insert(&mut self, key: BlockKey, span: SourceSpan) {
        if self.entries.contains_key(&key) {
            self.warn(IndexWarning::DuplicateDeclaration {
                file: span.file,
                key,
            });
        } else {
            self.entries.insert(key, span);
        }
    }

    fn warn(&mut self, warning: IndexWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn get(&self, key: &BlockKey) -> Option<&SourceSpan> {
        self.entries.get(key)
    }

    /// Source of the declaration behind a canonical address.
    pub fn lookup(&self, address: &CanonicalAddress) -> Option<&SourceSpan> {
        self.get(&classify(address))
    }

    /// Indexed keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &BlockKey> {
        self.entries.keys()
    }

    pub fn warnings(&self) -> &[IndexWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
