//! The document tree produced by the `vellum` readers and consumed by the
//! writers.
//!
//! A parsed document is a [`Pandoc`]: document [`Meta`] plus a sequence of
//! [`Block`]s, where blocks contain [`Inline`]s. Both hierarchies are closed
//! enums; consumers pattern-match exhaustively.

use serde::{Deserialize, Serialize};

mod helpers;

pub use helpers::{
    compactify, join_with_sep, normalize_spaces, remove_leading_trailing_space,
    remove_trailing_space, split_by_indices, strip_trailing_newlines,
};

/// A complete document: metadata and block content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pandoc {
    pub meta: Meta,
    pub blocks: Vec<Block>,
}

/// Document metadata from the title block.
///
/// `authors` holds plain author strings (character references already
/// decoded); `date` is a single decoded string. Both are empty when the
/// source has no title block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub title: Vec<Inline>,
    pub authors: Vec<String>,
    pub date: String,
}

/// A link or image target: `(url, title)`.
pub type Target = (String, String);

/// Attributes of an ordered list: starting number, numbering style,
/// delimiter style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAttributes(pub i32, pub ListNumberStyle, pub ListNumberDelim);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListNumberStyle {
    #[default]
    DefaultStyle,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListNumberDelim {
    #[default]
    DefaultDelim,
    Period,
    OneParen,
    TwoParens,
}

/// Column alignment in a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Right,
    Center,
    #[default]
    Default,
}

/// Kind of a smart-quoted span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteType {
    SingleQuote,
    DoubleQuote,
}

/// A block-level element.
///
/// `Plain` is a paragraph without paragraph semantics (tight list items);
/// `Null` is an empty placeholder that readers filter from final output.
/// A `Table` carries caption, per-column alignments, relative widths, header
/// cells and rows, where every cell is a block list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Plain(Vec<Inline>),
    Para(Vec<Inline>),
    Header(i32, Vec<Inline>),
    CodeBlock(String),
    BlockQuote(Vec<Block>),
    BulletList(Vec<Vec<Block>>),
    OrderedList(ListAttributes, Vec<Vec<Block>>),
    DefinitionList(Vec<(Vec<Inline>, Vec<Block>)>),
    HorizontalRule,
    Table(
        Vec<Inline>,
        Vec<Alignment>,
        Vec<f64>,
        Vec<Vec<Block>>,
        Vec<Vec<Vec<Block>>>,
    ),
    RawHtml(String),
    Null,
}

/// An inline element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Str(String),
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    Quoted(QuoteType, Vec<Inline>),
    Code(String),
    Space,
    EmDash,
    EnDash,
    Ellipses,
    Apostrophe,
    LineBreak,
    Math(String),
    TeX(String),
    HtmlInline(String),
    Link(Vec<Inline>, Target),
    Image(Vec<Inline>, Target),
    Note(Vec<Block>),
}

impl Inline {
    /// Plain-string shorthand used all over the readers.
    pub fn str(s: impl Into<String>) -> Self {
        Inline::Str(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ast_round_trips_through_serde() {
        let doc = Pandoc {
            meta: Meta {
                title: vec![Inline::str("Title")],
                authors: vec!["A. Author".to_string()],
                date: "2008-07-01".to_string(),
            },
            blocks: vec![
                Block::Header(1, vec![Inline::str("Hi")]),
                Block::Para(vec![
                    Inline::Emph(vec![Inline::str("em")]),
                    Inline::Space,
                    Inline::Link(
                        vec![Inline::str("a")],
                        ("http://x".to_string(), "t".to_string()),
                    ),
                ]),
                Block::Table(
                    vec![],
                    vec![Alignment::Default, Alignment::Left],
                    vec![0.25, 0.75],
                    vec![vec![Block::Plain(vec![Inline::str("h")])], vec![]],
                    vec![vec![vec![Block::Plain(vec![Inline::str("1")])], vec![]]],
                ),
            ],
        };
        let json = serde_json::to_string(&doc).expect("serialize");
        let back: Pandoc = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(doc, back);
    }
}
