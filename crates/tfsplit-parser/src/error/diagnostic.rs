//! The core diagnostic type.

use std::fmt;

use crate::{
    error::{error_code::ErrorCode, label::Label},
    span::Span,
};

/// An error message with source location information.
///
/// ```text
/// error[E101]: block is never closed
///   --> main.tf:3:1
///    |
///  3 | resource "aws_instance" "web" {
///    |                               ^ opened here
///    |
///    = help: add the missing `}`
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfsplit_parser::error::{Diagnostic, ErrorCode};
    /// # use tfsplit_parser::Span;
    ///
    /// let diag = Diagnostic::error("unterminated string literal")
    ///     .with_code(ErrorCode::E001)
    ///     .with_label(Span::new(10..24), "string starts here")
    ///     .with_help("add closing `\"`");
    /// assert_eq!(diag.to_string(), "error[E001]: unterminated string literal");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "error[E001]: message" or "error: message"
        f.write_str("error")?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::error("expected a graph description");
        assert_eq!(diag.to_string(), "error: expected a graph description");
    }

    #[test]
    fn test_diagnostic_labels_keep_order() {
        let diag = Diagnostic::error("block is never closed")
            .with_code(ErrorCode::E101)
            .with_label(Span::new(40..40), "input ends here")
            .with_secondary_label(Span::new(0..8), "block starts here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
        assert_eq!(diag.labels()[1].message(), "block starts here");
    }
}
