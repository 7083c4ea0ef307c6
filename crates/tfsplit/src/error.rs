//! Error types for tfsplit operations.
//!
//! [`TfsplitError`] covers every way a split can fail. Tolerated conditions
//! (unsupported blocks, undeclared providers, existing layer directories)
//! are not errors; they surface as warnings in the index and emit results.

use std::{io, path::PathBuf};

use thiserror::Error;

use tfsplit_core::CanonicalAddress;
use tfsplit_parser::error::ParseError;

/// The main error type for tfsplit operations.
///
/// # Diagnostic Variants
///
/// `Parse` carries the diagnostics together with the source text they point
/// into and the name of that source, so callers can render snippets.
#[derive(Debug, Error)]
pub enum TfsplitError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{origin}: {err}")]
    Parse {
        err: ParseError,
        src: String,
        origin: String,
    },

    #[error("Failed to read `{}`: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Layer `{layer}` needs `{address}`, but no declaration for it was found in the module")]
    MissingSource {
        layer: String,
        address: CanonicalAddress,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Terraform error: {0}")]
    Terraform(String),
}

impl TfsplitError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            origin: origin.into(),
        }
    }

    /// Create a `SourceRead` error for `path`.
    pub fn source_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SourceRead {
            path: path.into(),
            source,
        }
    }
}
