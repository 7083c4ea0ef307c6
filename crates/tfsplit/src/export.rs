//! Writing layers to disk.
//!
//! [`LayerEmitter`] materializes a layer's declarations into a directory of
//! `.tf` files. Once a layer directory has been written, each configured
//! [`Exporter`] adds its own file next to them.
//!
//! # Pipeline Position
//!
//! ```text
//! terraform graph        *.tf files
//!     ↓ build                ↓ index
//! DependencyGraph        BlockIndex
//!     ↓ partition            │
//! LayerClosure ──────────────┤
//!     ↓ export (this module) ↓
//! <split root>/<layer>/*.tf
//! ```

mod backend;
mod imports;
mod layer;
mod vars;

pub use backend::BackendExporter;
pub use imports::ImportExporter;
pub use layer::{EmitOutcome, EmitSummary, EmitWarning, LayerEmitter, OutputFile};

use layer::discard_layer;
pub use vars::VarsExporter;

use std::path::{Path, PathBuf};

use log::debug;
use tfsplit_core::LayerClosure;

use crate::TfsplitError;

/// A file written alongside a layer's declarations.
///
/// Exporters run only for layers written in the current run; a skipped
/// layer is left exactly as it was.
pub trait Exporter {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Write this exporter's file for `layer` into `directory`.
    ///
    /// Returns the path written, or `None` if the layer has nothing for this
    /// exporter.
    ///
    /// # Errors
    ///
    /// Returns [`TfsplitError::Io`] if the file cannot be written.
    fn export_layer(
        &self,
        layer: &str,
        closure: &LayerClosure,
        directory: &Path,
    ) -> Result<Option<PathBuf>, TfsplitError>;
}

/// Run every exporter for a freshly written layer, recording their files in
/// `summary`.
///
/// If an exporter fails the whole layer directory is removed, so a later
/// run writes the layer again instead of skipping it.
pub(crate) fn run_exporters(
    exporters: &[Box<dyn Exporter>],
    layer: &str,
    closure: &LayerClosure,
    summary: &mut EmitSummary,
) -> Result<(), TfsplitError> {
    for exporter in exporters {
        match exporter.export_layer(layer, closure, summary.directory()) {
            Ok(Some(file)) => {
                debug!(layer = layer, exporter = exporter.name(); "Exported layer file");
                summary.add_file(file);
            }
            Ok(None) => {}
            Err(err) => {
                discard_layer(layer, summary.directory());
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Render `value` as an HCL string literal.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use std::{fs, io};

    use tfsplit_core::CanonicalAddress;

    use super::*;
    use crate::BlockIndex;

    struct FixedExporter(&'static str);

    impl Exporter for FixedExporter {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn export_layer(
            &self,
            _layer: &str,
            _closure: &LayerClosure,
            directory: &Path,
        ) -> Result<Option<PathBuf>, TfsplitError> {
            let path = directory.join(self.0);
            fs::write(&path, "# fixed\n")?;
            Ok(Some(path))
        }
    }

    struct FailingExporter;

    impl Exporter for FailingExporter {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn export_layer(
            &self,
            _layer: &str,
            _closure: &LayerClosure,
            _directory: &Path,
        ) -> Result<Option<PathBuf>, TfsplitError> {
            Err(io::Error::other("disk full").into())
        }
    }

    fn written_layer(root: &Path, index: &BlockIndex) -> (LayerClosure, EmitSummary) {
        let closure = LayerClosure::new(CanonicalAddress::new("var.region"), Vec::new());
        let outcome = LayerEmitter::new(index, root)
            .emit("app", &closure)
            .unwrap();
        let EmitOutcome::Written(summary) = outcome else {
            panic!("layer should have been written");
        };
        (closure, summary)
    }

    fn index() -> BlockIndex {
        let mut index = BlockIndex::new();
        index
            .add_source(Path::new("variables.tf"), "variable \"region\" {}\n")
            .unwrap();
        index
    }

    #[test]
    fn test_exporters_add_files_to_summary() {
        let out = tempfile::tempdir().unwrap();
        let index = index();
        let (closure, mut summary) = written_layer(out.path(), &index);

        let exporters: Vec<Box<dyn Exporter>> = vec![Box::new(FixedExporter("extra.tf"))];
        run_exporters(&exporters, "app", &closure, &mut summary).unwrap();

        assert!(summary.files().contains(&out.path().join("app").join("extra.tf")));
    }

    #[test]
    fn test_failed_exporter_discards_layer() {
        let out = tempfile::tempdir().unwrap();
        let index = index();
        let (closure, mut summary) = written_layer(out.path(), &index);
        assert!(out.path().join("app").join("variables.tf").exists());

        let exporters: Vec<Box<dyn Exporter>> = vec![
            Box::new(FixedExporter("extra.tf")),
            Box::new(FailingExporter),
        ];
        let err = run_exporters(&exporters, "app", &closure, &mut summary).unwrap_err();

        assert!(matches!(err, TfsplitError::Io(_)));
        assert!(!out.path().join("app").exists());

        // The discarded layer is written again rather than skipped.
        let (_, summary) = written_layer(out.path(), &index);
        assert!(summary.directory().join("variables.tf").exists());
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote(r#"a "b" \c"#), r#""a \"b\" \\c""#);
        assert_eq!(quote("${x} %{y} $z"), "\"$${x} %%{y} $z\"");
        assert_eq!(quote("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_quote_reads_back() {
        for value in ["i-0abc", r#"weird "id" \ here"#, "arn:aws:iam::1:role/x"] {
            assert_eq!(
                tfsplit_parser::static_string(&quote(value)).as_deref(),
                Some(value)
            );
        }
    }
}
