//! Lexical analyzer for HCL source text.
//!
//! The lexer converts source text into [`Token`]s precise enough to find
//! block boundaries: braces inside quoted templates, template
//! interpolations, heredocs and comments are swallowed by the token that
//! contains them and never reach the structure parser as delimiters.
//!
//! The public entry point is [`tokenize`], which recovers from errors and
//! collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, one_of, take_till, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// `#` or `//` comment up to, not including, the line break.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (alt(("#", "//")), take_while(0.., |c: char| c != '\n'))
        .take()
        .map(Token::LineComment)
        .parse_next(input)
}

fn block_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    (
        "/*",
        cut_err(terminated(take_until(0.., "*/"), "*/")).context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated block comment",
            help: Some("add closing `*/`"),
            start,
        }),
    )
        .take()
        .map(Token::BlockComment)
        .parse_next(input)
}

/// Lines of a heredoc body, through the line holding only `marker`.
fn heredoc_lines<'a>(input: &mut Input<'a>, marker: &str) -> IResult<()> {
    loop {
        let line: &str = take_till(0.., '\n').parse_next(input)?;
        if line.trim() == marker {
            return Ok(());
        }
        '\n'.void().parse_next(input)?;
    }
}

/// `<<EOT` or `<<-EOT` heredoc, through its closing marker.
fn heredoc<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let checkpoint = input.checkpoint();

    let marker = preceded(("<<", opt('-')), identifier_text).parse_next(input)?;
    (take_while(0.., |c: char| c == ' ' || c == '\t' || c == '\r'), '\n')
        .void()
        .parse_next(input)?;

    cut_err(|i: &mut Input<'a>| heredoc_lines(i, marker))
        .context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated heredoc",
            help: Some("add a line containing only the closing marker"),
            start,
        })
        .parse_next(input)?;

    let end = input.current_token_start();
    input.reset(&checkpoint);
    Ok(Token::Heredoc(input.next_slice(end - start)))
}

/// Content of a `${ ... }` or `%{ ... }` template sequence.
///
/// Nested braces and quoted strings are allowed, so `"${lookup(m, "k")}"`
/// lexes as a single string.
fn interpolation_content<'a>(input: &mut Input<'a>) -> IResult<()> {
    repeat(
        0..,
        alt((
            string_literal.void(),
            ('{', interpolation_content, '}').void(),
            take_while(1.., |c: char| !matches!(c, '"' | '{' | '}')).void(),
        )),
    )
    .parse_next(input)
}

fn template_interpolation<'a>(input: &mut Input<'a>) -> IResult<()> {
    (alt(("${", "%{")), interpolation_content, '}')
        .void()
        .parse_next(input)
}

/// Characters of a quoted template up to its closing quote.
fn template_content<'a>(input: &mut Input<'a>) -> IResult<()> {
    repeat(
        0..,
        alt((
            ('\\', any).void(),
            literal("$${").void(),
            literal("%%{").void(),
            template_interpolation,
            take_while(1.., |c: char| !matches!(c, '"' | '\\' | '$' | '%' | '\n')).void(),
            one_of(['$', '%']).void(),
        )),
    )
    .parse_next(input)
}

/// Quoted template, kept verbatim including its quotes.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    (
        '"',
        cut_err(terminated(template_content, '"')).context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"` before the end of the line"),
            start,
        }),
    )
        .take()
        .map(Token::StringLiteral)
        .parse_next(input)
}

fn identifier_text<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-'
        }),
    )
        .take()
        .parse_next(input)
}

fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    identifier_text.map(Token::Identifier).parse_next(input)
}

/// Multi-character operators that start with a structural character.
fn multi_char_operator<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt(("==", "!=", "<=", ">=", "=>", "&&", "||", "..."))
        .map(Token::Other)
        .parse_next(input)
}

fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '='.value(Token::Equals),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
    ))
    .parse_next(input)
}

/// Whitespace other than line breaks.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

fn other<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    any.take().map(Token::Other).parse_next(input)
}

fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,        // Must come before `/` in `other`
        block_comment,       // Must come before `/` in `other`
        heredoc,             // Must come before `<=`
        string_literal,
        multi_char_operator, // Must come before `=`
        identifier,
        single_char_token,
        newline, // Must come before whitespace
        whitespace,
        other,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        while input.eof_offset() > 0 {
            let before = input.current_token_start();
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    // A failed string stops at its line break; resume there.
                    if error_pos == before && input.eof_offset() > 0 {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) if no diagnostic context
    /// is attached.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize HCL source, collecting every lexical error.
///
/// # Returns
///
/// - `Ok(tokens)` - the source tokenized cleanly
/// - `Err(ParseError)` - one or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
