//! Error codes for the tfsplit diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - HCL lexer errors
//! - `E1xx` - HCL structure errors
//! - `E2xx` - Dependency graph errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A quoted template was opened but the line ended before its closing quote.
    E001,

    /// Unexpected character.
    E002,

    /// Unterminated block comment.
    ///
    /// A `/*` comment has no matching `*/`.
    E003,

    /// Unterminated heredoc.
    ///
    /// A `<<MARKER` heredoc has no line consisting of the closing marker.
    E004,

    // =========================================================================
    // Structure Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// A body item must start with an identifier.
    E100,

    /// Unclosed block.
    ///
    /// The input ended before the block's closing `}`.
    E101,

    /// Unmatched closing delimiter.
    E102,

    /// Missing block body.
    ///
    /// A block header was not followed by `{` or an attribute name by `=`.
    E103,

    // =========================================================================
    // Graph Errors (E2xx)
    // =========================================================================
    /// The graph description is not directed.
    E200,

    /// The graph description is not valid DOT.
    E201,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "unterminated block comment",
            ErrorCode::E004 => "unterminated heredoc",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unclosed block",
            ErrorCode::E102 => "unmatched closing delimiter",
            ErrorCode::E103 => "missing block body",
            ErrorCode::E200 => "undirected graph",
            ErrorCode::E201 => "malformed graph description",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
        assert_eq!(ErrorCode::E201.to_string(), "E201");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E004.description(), "unterminated heredoc");
        assert_eq!(ErrorCode::E101.description(), "unclosed block");
    }
}
