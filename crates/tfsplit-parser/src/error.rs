//! Error and diagnostic system for the tfsplit parsers.
//!
//! This module provides:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Example
//!
//! ```
//! # use tfsplit_parser::error::{Diagnostic, ErrorCode};
//! # use tfsplit_parser::Span;
//!
//! let diag = Diagnostic::error("block is never closed")
//!     .with_code(ErrorCode::E101)
//!     .with_label(Span::new(0..18), "opened here")
//!     .with_help("add the missing `}`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
