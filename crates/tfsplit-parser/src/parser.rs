//! Structure parser for HCL token streams.
//!
//! Turns the tokens from the [`lexer`](super::lexer) into a [`Body`] of
//! attributes and blocks. A block's extent is found by counting brace depth
//! from its opening `{`; the tokens in between are then parsed as the block
//! body. Attribute expressions end at the first line break outside any
//! bracket pair.

use winnow::{
    Parser as _,
    combinator::{peek, repeat},
    error::{AddContext, ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    literal::label_value,
    parser_types::{Attribute, Block, Body, Item},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Structural problem found while parsing, carried through winnow errors.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StructureDiagnostic {
    code: ErrorCode,
    message: &'static str,
    label: &'static str,
    span: Span,
    help: Option<&'static str>,
    related: Option<(Span, &'static str)>,
}

impl StructureDiagnostic {
    fn new(code: ErrorCode, message: &'static str, label: &'static str, span: Span) -> Self {
        Self {
            code,
            message,
            label,
            span,
            help: None,
            related: None,
        }
    }

    fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    fn with_related(mut self, span: Span, label: &'static str) -> Self {
        self.related = Some((span, label));
        self
    }
}

/// Token input. Block bodies are re-parsed from a collected token buffer, so
/// the slice lifetime is independent of the source lifetime.
type Input<'t, 'src> = TokenSlice<'t, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<StructureDiagnostic>>>;

fn structure_error(
    input: &Input<'_, '_>,
    diagnostic: StructureDiagnostic,
) -> ErrMode<ContextError<StructureDiagnostic>> {
    ErrMode::Cut(ContextError::new().add_context(input, &input.checkpoint(), diagnostic))
}

/// Next token without consuming it.
fn peek_token<'t, 'src>(input: &mut Input<'t, 'src>) -> Option<&'t PositionedToken<'src>> {
    peek(any::<_, ErrMode<ContextError<StructureDiagnostic>>>)
        .parse_next(input)
        .ok()
}

fn advance(input: &mut Input<'_, '_>) -> IResult<()> {
    any.void().parse_next(input)
}

/// Skip whitespace, comments and line breaks.
fn trivia0(input: &mut Input<'_, '_>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| token.token.is_trivia())
            .void(),
    )
    .parse_next(input)
}

/// Skip whitespace and comments on the current line.
fn inline_trivia0(input: &mut Input<'_, '_>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| token.token.is_inline_trivia())
            .void(),
    )
    .parse_next(input)
}

fn item_name<'src>(input: &mut Input<'_, 'src>) -> IResult<Spanned<&'src str>> {
    let Some(token) = peek_token(input) else {
        return Err(structure_error(
            input,
            StructureDiagnostic::new(
                ErrorCode::E100,
                "expected an attribute or block name",
                "input ends here",
                Span::default(),
            ),
        ));
    };

    match token.token {
        Token::Identifier(name) => {
            advance(input)?;
            Ok(Spanned::new(name, token.span))
        }
        Token::RightBrace | Token::RightBracket | Token::RightParen => Err(structure_error(
            input,
            StructureDiagnostic::new(
                ErrorCode::E102,
                "unmatched closing delimiter",
                "no matching opening delimiter",
                token.span,
            ),
        )),
        _ => Err(structure_error(
            input,
            StructureDiagnostic::new(
                ErrorCode::E100,
                "expected an attribute or block name",
                "unexpected token",
                token.span,
            ),
        )),
    }
}

/// `= expression`, after the attribute name.
fn attribute<'src>(
    input: &mut Input<'_, 'src>,
    name: Spanned<&'src str>,
) -> IResult<Attribute<'src>> {
    let equals = peek_token(input).map(|t| t.span).unwrap_or_default();
    advance(input)?;

    let mut depth = 0usize;
    let mut expression: Option<Span> = None;

    while let Some(token) = peek_token(input) {
        match token.token {
            Token::Newline if depth == 0 => break,
            Token::LeftBrace | Token::LeftBracket | Token::LeftParen => depth += 1,
            Token::RightBrace | Token::RightBracket | Token::RightParen => {
                if depth == 0 {
                    return Err(structure_error(
                        input,
                        StructureDiagnostic::new(
                            ErrorCode::E102,
                            "unmatched closing delimiter",
                            "no matching opening delimiter",
                            token.span,
                        )
                        .with_related(name.span(), "in this attribute"),
                    ));
                }
                depth -= 1;
            }
            _ => {}
        }
        advance(input)?;

        if !token.token.is_trivia() {
            expression = Some(match expression {
                Some(span) => span.union(token.span),
                None => token.span,
            });
        }
    }

    match expression {
        Some(expression) => Ok(Attribute::new(name, expression)),
        None => Err(structure_error(
            input,
            StructureDiagnostic::new(
                ErrorCode::E100,
                "expected an expression after `=`",
                "missing value",
                equals,
            ),
        )),
    }
}

/// Tokens up to the brace closing a block, found by counting brace depth.
///
/// Returns the enclosed tokens and the closing brace.
fn block_contents<'t, 'src>(
    input: &mut Input<'t, 'src>,
    header: Span,
) -> IResult<(Vec<PositionedToken<'src>>, &'t PositionedToken<'src>)> {
    let mut depth = 1usize;
    let mut inner = Vec::new();

    loop {
        let Some(token) = peek_token(input) else {
            return Err(structure_error(
                input,
                StructureDiagnostic::new(
                    ErrorCode::E101,
                    "block is never closed",
                    "block opened here",
                    header,
                )
                .with_help("add the missing `}`"),
            ));
        };
        advance(input)?;

        match token.token {
            Token::LeftBrace => depth += 1,
            Token::RightBrace => {
                depth -= 1;
                if depth == 0 {
                    return Ok((inner, token));
                }
            }
            _ => {}
        }
        inner.push(token.clone());
    }
}

/// Labels and body, after the block type.
fn block<'src>(
    input: &mut Input<'_, 'src>,
    block_type: Spanned<&'src str>,
) -> IResult<Block<'src>> {
    let mut labels = Vec::new();

    let open = loop {
        inline_trivia0(input)?;
        let Some(token) = peek_token(input) else {
            return Err(structure_error(
                input,
                StructureDiagnostic::new(
                    ErrorCode::E103,
                    "expected a block body",
                    "block header without `{`",
                    block_type.span(),
                ),
            ));
        };

        match token.token {
            Token::StringLiteral(raw) => labels.push(Spanned::new(label_value(raw), token.span)),
            Token::Identifier(name) => labels.push(Spanned::new(name.to_string(), token.span)),
            Token::LeftBrace => {
                advance(input)?;
                break token;
            }
            _ => {
                return Err(structure_error(
                    input,
                    StructureDiagnostic::new(
                        ErrorCode::E103,
                        "expected a block label or `{`",
                        "unexpected token",
                        token.span,
                    )
                    .with_related(block_type.span(), "in this block header"),
                ));
            }
        }
        advance(input)?;
    };

    let (inner, close) = block_contents(input, block_type.span().union(open.span))?;
    let mut inner_input = TokenSlice::new(&inner);
    let block_body = body(&mut inner_input)?;

    let span = block_type.span().union(close.span);
    Ok(Block::new(block_type, labels, block_body, span))
}

fn item<'src>(input: &mut Input<'_, 'src>) -> IResult<Item<'src>> {
    let name = item_name(input)?;
    inline_trivia0(input)?;

    match peek_token(input).map(|token| &token.token) {
        Some(Token::Equals) => attribute(input, name).map(Item::Attribute),
        Some(Token::StringLiteral(_) | Token::Identifier(_) | Token::LeftBrace) => {
            block(input, name).map(Item::Block)
        }
        _ => Err(structure_error(
            input,
            StructureDiagnostic::new(
                ErrorCode::E103,
                "expected `=` or a block body",
                "name without value or body",
                name.span(),
            )
            .with_help("attributes are written `name = value`, blocks `type \"label\" { ... }`"),
        )),
    }
}

fn body<'src>(input: &mut Input<'_, 'src>) -> IResult<Body<'src>> {
    let mut items = Vec::new();
    loop {
        trivia0(input)?;
        if input.eof_offset() == 0 {
            break;
        }
        items.push(item(input)?);
    }
    Ok(Body::new(items))
}

fn convert_error(err: ErrMode<ContextError<StructureDiagnostic>>, end: Span) -> ParseError {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let Some(structure) = context_error.context().next() else {
        return Diagnostic::error("unexpected token")
            .with_code(ErrorCode::E100)
            .with_label(end, ErrorCode::E100.description())
            .into();
    };

    let mut diag = Diagnostic::error(structure.message)
        .with_code(structure.code)
        .with_label(structure.span, structure.label);
    if let Some((span, label)) = structure.related {
        diag = diag.with_secondary_label(span, label);
    }
    if let Some(help) = structure.help {
        diag = diag.with_help(help);
    }
    diag.into()
}

/// Parse a token stream into a top-level [`Body`].
pub fn build_body<'src>(tokens: &[PositionedToken<'src>]) -> Result<Body<'src>, ParseError> {
    let mut input = TokenSlice::new(tokens);
    body(&mut input).map_err(|err| {
        let end = tokens.last().map(|token| token.span).unwrap_or_default();
        convert_error(err, end)
    })
}
