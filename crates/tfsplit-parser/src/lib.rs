//! # tfsplit parser
//!
//! Source-level parsing for tfsplit:
//!
//! - [`parse_hcl`] scans Terraform configuration into a [`Body`] of blocks
//!   and attributes, each with the exact byte span it occupies, so callers
//!   can lift declarations out of a file verbatim.
//! - [`parse_dot`] reads the edges of a `terraform graph` description.
//!
//! Both report problems as a [`ParseError`](error::ParseError) holding one
//! or more [`Diagnostic`](error::Diagnostic)s with source spans.
//!
//! ## Usage
//!
//! ```
//! # use tfsplit_parser::{parse_hcl, error::ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//! resource "aws_instance" "web" {
//!   tags = { Name = "web" }
//! }
//! "#;
//!
//!     let body = parse_hcl(source)?;
//!     let block = body.blocks().next().unwrap();
//!     assert_eq!(block.block_type(), "resource");
//!     assert!(source[block.span().range()].ends_with("}\n}"));
//!     Ok(())
//! }
//! ```

pub mod error;

mod dot;
mod lexer;
mod literal;
mod parser;
mod parser_types;
mod span;
mod tokens;

pub use dot::{RawEdge, parse_dot};
pub use literal::static_string;
pub use parser_types::{Attribute, Block, Body, Item};
pub use span::{Span, Spanned};

use error::ParseError;

/// Parse HCL source into its top-level [`Body`].
///
/// 1. **Tokenize** - split the text into tokens, collecting lexical errors
/// 2. **Parse** - group tokens into attributes and brace-delimited blocks
pub fn parse_hcl(source: &str) -> Result<Body<'_>, ParseError> {
    let tokens = lexer::tokenize(source)?;
    parser::build_body(&tokens)
}
