//! Token definitions for the HCL lexer.
//!
//! The lexer only needs to distinguish what matters for finding block
//! boundaries: delimiters, `=`, identifiers, and the constructs that may hide
//! delimiters (strings, heredocs, comments). Everything else is [`Token::Other`].

use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Identifier(&'a str),
    /// Quoted template, including the surrounding quotes.
    StringLiteral(&'a str),
    /// Heredoc from `<<` through the closing marker.
    Heredoc(&'a str),
    /// `#` or `//` comment, without the line break.
    LineComment(&'a str),
    BlockComment(&'a str),

    Equals,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,

    Newline,
    Whitespace,

    /// Operators, numbers, and punctuation without structural meaning.
    Other(&'a str),
}

impl Token<'_> {
    /// Whitespace or a comment; never a line break.
    pub fn is_inline_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::LineComment(_) | Token::BlockComment(_)
        )
    }

    /// Any token that carries no meaning for the block structure.
    pub fn is_trivia(&self) -> bool {
        self.is_inline_trivia() || matches!(self, Token::Newline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'a> {
    pub token: Token<'a>,
    pub span: Span,
}

impl<'a> PositionedToken<'a> {
    pub fn new(token: Token<'a>, span: Span) -> Self {
        Self { token, span }
    }
}
