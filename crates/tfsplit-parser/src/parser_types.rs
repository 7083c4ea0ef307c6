//! Syntax tree produced by the structure parser.
//!
//! Only the shape of the configuration is modelled: blocks with their labels
//! and bodies, and attributes with the span of their expression. Expressions
//! themselves stay opaque source text.

use indexmap::IndexMap;

use crate::span::{Span, Spanned};

/// Sequence of attributes and nested blocks, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body<'src> {
    items: Vec<Item<'src>>,
}

impl<'src> Body<'src> {
    pub fn new(items: Vec<Item<'src>>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item<'src>] {
        &self.items
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block<'src>> {
        self.items.iter().filter_map(|item| match item {
            Item::Block(block) => Some(block),
            Item::Attribute(_) => None,
        })
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute<'src>> {
        self.items.iter().filter_map(|item| match item {
            Item::Attribute(attribute) => Some(attribute),
            Item::Block(_) => None,
        })
    }

    /// First attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute<'src>> {
        self.attributes().find(|attribute| attribute.name() == name)
    }

    /// Attributes by name, in source order. A repeated name keeps its first
    /// occurrence.
    pub fn attribute_map(&self) -> IndexMap<&'src str, &Attribute<'src>> {
        let mut map = IndexMap::new();
        for attribute in self.attributes() {
            map.entry(*attribute.name.inner()).or_insert(attribute);
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<'src> {
    Attribute(Attribute<'src>),
    Block(Block<'src>),
}

impl Item<'_> {
    pub fn span(&self) -> Span {
        match self {
            Item::Attribute(attribute) => attribute.span(),
            Item::Block(block) => block.span(),
        }
    }
}

/// `name = expression`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'src> {
    name: Spanned<&'src str>,
    expression: Span,
    span: Span,
}

impl<'src> Attribute<'src> {
    pub fn new(name: Spanned<&'src str>, expression: Span) -> Self {
        let span = name.span().union(expression);
        Self {
            name,
            expression,
            span,
        }
    }

    pub fn name(&self) -> &'src str {
        self.name.inner()
    }

    pub fn name_span(&self) -> Span {
        self.name.span()
    }

    /// Span of the expression, from its first to its last token.
    pub fn expression_span(&self) -> Span {
        self.expression
    }

    /// Span from the start of the name to the end of the expression.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// `type "label" ... { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'src> {
    block_type: Spanned<&'src str>,
    labels: Vec<Spanned<String>>,
    body: Body<'src>,
    span: Span,
}

impl<'src> Block<'src> {
    pub fn new(
        block_type: Spanned<&'src str>,
        labels: Vec<Spanned<String>>,
        body: Body<'src>,
        span: Span,
    ) -> Self {
        Self {
            block_type,
            labels,
            body,
            span,
        }
    }

    pub fn block_type(&self) -> &'src str {
        self.block_type.inner()
    }

    pub fn labels(&self) -> &[Spanned<String>] {
        &self.labels
    }

    /// Label at `index`, unquoted.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|label| label.inner().as_str())
    }

    pub fn body(&self) -> &Body<'src> {
        &self.body
    }

    /// Span from the block type through the closing brace.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Span of the block type and labels.
    pub fn header_span(&self) -> Span {
        self.labels
            .iter()
            .fold(self.block_type.span(), |span, label| span.union(label.span()))
    }
}
