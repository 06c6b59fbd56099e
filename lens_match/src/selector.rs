// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector parsing and matching.

use alloc::string::String;
use alloc::vec::Vec;

use lens_doc::{Document, NodeId};

/// Selector parse failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// The selector (or one entry of a `,` list) is empty.
    #[error("empty selector")]
    Empty,
    /// A character that cannot start or continue a selector.
    #[error("unexpected {found:?} at byte {at}")]
    Unexpected {
        /// Offending character.
        found: char,
        /// Byte offset into the input.
        at: usize,
    },
    /// A `[` without its closing `]`, or an unterminated quoted value.
    #[error("unterminated attribute selector starting at byte {at}")]
    UnterminatedAttribute {
        /// Byte offset of the opening `[`.
        at: usize,
    },
    /// A `>` with nothing on one of its sides.
    #[error("combinator without a selector on both sides")]
    DanglingCombinator,
}

/// How a compound relates to the compound on its left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the direct parent.
    Child,
}

/// Attribute comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals(String),
    /// `[attr~=word]`: whitespace-separated word list contains `word`.
    Includes(String),
    /// `[attr^=prefix]`
    Prefix(String),
    /// `[attr$=suffix]`
    Suffix(String),
    /// `[attr*=needle]`
    Substring(String),
}

/// One attribute predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrSelector {
    /// Attribute name.
    pub name: String,
    /// Comparison.
    pub op: AttrOp,
}

impl AttrSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Includes(w) => value.split_ascii_whitespace().any(|p| p == w),
            AttrOp::Prefix(p) => !p.is_empty() && value.starts_with(p.as_str()),
            AttrOp::Suffix(p) => !p.is_empty() && value.ends_with(p.as_str()),
            AttrOp::Substring(s) => !s.is_empty() && value.contains(s.as_str()),
        }
    }
}

/// A single-element predicate: `tag#id.class[attr]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    /// Required tag name (ASCII case-insensitive). `None` for `*` or no tag.
    pub tag: Option<String>,
    /// Required `id` attribute.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
    /// Attribute predicates.
    pub attrs: Vec<AttrSelector>,
}

impl Compound {
    /// Returns `true` if the node satisfies every predicate.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if let Some(required) = &self.tag
            && !required.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && doc.attribute(node, "id") != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|c| doc.has_class(node, c))
            && self
                .attrs
                .iter()
                .all(|a| a.matches(doc.attribute(node, &a.name)))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Part {
    /// Relation to the previous part; ignored for the first one.
    combinator: Combinator,
    compound: Compound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    parts: Vec<Part>,
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        matches_parts(doc, node, &self.parts)
    }
}

fn matches_parts(doc: &Document, node: NodeId, parts: &[Part]) -> bool {
    let Some((last, rest)) = parts.split_last() else {
        return true;
    };
    if !last.compound.matches(doc, node) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match last.combinator {
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|p| matches_parts(doc, p, rest)),
        Combinator::Descendant => doc.ancestors(node).any(|a| matches_parts(doc, a, rest)),
    }
}

/// A parsed selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parses a selector list such as `".mermaid > svg, img[alt]"`.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for (start, part) in split_top_level(input) {
            alternatives.push(Parser::new(input, start, start + part.len()).complex()?);
        }
        Ok(Self {
            source: input.trim().into(),
            alternatives,
        })
    }

    /// Returns the trimmed source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if any alternative matches `node`.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, node))
    }
}

/// Splits on `,` outside brackets and quotes, yielding `(byte offset, slice)`.
fn split_top_level(input: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut depth = 0_u32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                out.push((start, &input[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push((start, &input[start..]));
    out
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, pos: usize, end: usize) -> Self {
        Self { src, pos, end }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..self.end].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                found,
                at: self.pos,
            },
            None => SelectorError::Empty,
        }
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts: Vec<Part> = Vec::new();
        self.skip_ws();
        let mut combinator = Combinator::Descendant;
        let mut explicit = false;
        loop {
            match self.peek() {
                None => {
                    if explicit {
                        return Err(SelectorError::DanglingCombinator);
                    }
                    break;
                }
                Some('>') => {
                    if parts.is_empty() || explicit {
                        return Err(SelectorError::DanglingCombinator);
                    }
                    self.bump();
                    self.skip_ws();
                    combinator = Combinator::Child;
                    explicit = true;
                }
                Some(_) => {
                    let compound = self.compound()?;
                    parts.push(Part {
                        combinator,
                        compound,
                    });
                    combinator = Combinator::Descendant;
                    explicit = false;
                    self.skip_ws();
                }
            }
        }
        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;
        if self.peek() == Some('*') {
            self.bump();
            universal = true;
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?);
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('[') => compound.attrs.push(self.attr()?),
                _ => break,
            }
        }
        if compound.is_empty() && !universal {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(self.src[start..self.pos].into())
    }

    fn attr(&mut self) -> Result<AttrSelector, SelectorError> {
        let open = self.pos;
        self.bump();
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let op: fn(String) -> AttrOp = match self.bump() {
            Some(']') => {
                return Ok(AttrSelector {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '^' | '$' | '*')) => {
                if self.bump() != Some('=') {
                    return Err(SelectorError::UnterminatedAttribute { at: open });
                }
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(SelectorError::UnterminatedAttribute { at: open }),
        };
        self.skip_ws();
        let value = self.attr_value(open)?;
        self.skip_ws();
        if self.bump() != Some(']') {
            return Err(SelectorError::UnterminatedAttribute { at: open });
        }
        Ok(AttrSelector {
            name,
            op: op(value),
        })
    }

    fn attr_value(&mut self, open: usize) -> Result<String, SelectorError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == q => return Ok(self.src[start..self.pos - 1].into()),
                        Some(_) => {}
                        None => return Err(SelectorError::UnterminatedAttribute { at: open }),
                    }
                }
            }
            _ => self.ident(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
