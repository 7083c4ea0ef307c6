//! Rendering [`TfsplitError`] with miette.
//!
//! A parse error becomes one [`Report`] per diagnostic, each pointing into
//! the input it came from (a `.tf` file, the tfvars or backend file, or the
//! graph text). Every other error becomes a single report with a
//! `tfsplit::*` code.

use std::{error::Error, fmt};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use tfsplit::TfsplitError;
use tfsplit_parser::{Span, error::Diagnostic};

/// A single error ready for a miette report handler.
#[derive(Debug)]
pub struct Report<'a> {
    message: String,
    code: Option<String>,
    help: Option<&'a str>,
    src: Option<&'a str>,
    labels: Vec<LabeledSpan>,
    cause: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Report<'a> {
    /// Report a parser diagnostic found in `src`, read from `origin`.
    pub fn from_diagnostic(diag: &'a Diagnostic, src: &'a str, origin: &str) -> Self {
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let message = Some(label.message().to_string());
                let span = span_to_miette(label.span());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                }
            })
            .collect();

        Self {
            message: format!("{origin}: {}", diag.message()),
            code: diag.code().map(|code| code.to_string()),
            help: diag.help(),
            src: Some(src),
            labels,
            cause: None,
        }
    }

    /// Report an error that carries no source text.
    pub fn from_error(err: &'a TfsplitError) -> Self {
        let help = match err {
            TfsplitError::MissingSource { .. } => Some(
                "the dependency graph and the module's *.tf files disagree; regenerate the graph",
            ),
            _ => None,
        };

        Self {
            message: err.to_string(),
            code: error_code(err).map(str::to_string),
            help,
            src: None,
            labels: Vec::new(),
            cause: err.source(),
        }
    }
}

fn error_code(err: &TfsplitError) -> Option<&'static str> {
    let code = match err {
        TfsplitError::Io(_) => "tfsplit::io",
        TfsplitError::Parse { .. } => return None,
        TfsplitError::SourceRead { .. } => "tfsplit::source_read",
        TfsplitError::MissingSource { .. } => "tfsplit::missing_source",
        TfsplitError::Config(_) => "tfsplit::config",
        TfsplitError::State(_) => "tfsplit::state",
        TfsplitError::Terraform(_) => "tfsplit::terraform",
    };
    Some(code)
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Report<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display + 'b>)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'b>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.iter().cloned()))
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Split `err` into the reports to render, one per diagnostic for parse
/// errors.
pub fn to_reports(err: &TfsplitError) -> Vec<Report<'_>> {
    match err {
        TfsplitError::Parse {
            err: parse_err,
            src,
            origin,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Report::from_diagnostic(diag, src, origin))
            .collect(),
        _ => vec![Report::from_error(err)],
    }
}
