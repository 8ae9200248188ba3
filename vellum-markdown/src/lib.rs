//! Markdown reader for the `vellum` document tree.
//!
//! Parses Markdown source text (with the common extensions: footnotes,
//! tables, definition lists, inline math, smart typography, raw HTML and
//! LaTeX) into a [`Pandoc`] document of [`Block`] and [`Inline`] nodes,
//! plus title-block metadata.
//!
//! # Quick Start
//!
//! ```
//! use vellum_markdown::{parse, Options};
//!
//! let doc = parse("# Hi\n", &Options::default()).expect("markdown always parses");
//! assert_eq!(doc.blocks.len(), 1);
//! ```
//!
//! The reader never rejects input: unmatched constructs backtrack and fall
//! through to plain text. [`read_markdown`] makes that contract explicit by
//! returning the document directly.

mod entities;
mod error;
mod grammar;
mod options;
mod preprocess;
mod state;

pub use error::Error;
pub use options::{Options, OptionsBuilder};
pub use vellum_ast::{
    Alignment, Block, Inline, ListAttributes, ListNumberDelim, ListNumberStyle, Meta, Pandoc,
    QuoteType, Target,
};

use state::ParserState;
use tracing::instrument;

/// Parse Markdown source into a document.
///
/// Runs the title block, the two extraction passes (reference keys, then
/// footnote bodies), and finally the block parser over the residual text.
/// A `"\n\n"` sentinel is appended first so constructs that end on blank
/// lines terminate at end of input.
///
/// # Errors
/// Any input produces a document; `Err` only surfaces if the grammar
/// machinery reaches a state it cannot represent.
#[instrument(skip(source))]
pub fn parse(source: &str, options: &Options) -> Result<Pandoc, Error> {
    let mut state = ParserState::new(options.clone());
    let input = format!("{source}\n\n");

    let (meta, body) = match grammar::markdown_parser::title_block(&input, &mut state) {
        Ok(((title, authors, date), rest)) => (
            Meta {
                title,
                authors,
                date,
            },
            rest.to_string(),
        ),
        Err(_) => (Meta::default(), input.clone()),
    };

    let body = preprocess::extract_reference_keys(&mut state, &body);
    let body = preprocess::extract_note_blocks(&mut state, &body);

    let blocks = grammar::markdown_parser::blocks(&body, &mut state)?;
    let blocks = blocks.into_iter().filter(|b| *b != Block::Null).collect();
    Ok(Pandoc { meta, blocks })
}

/// Total entry point: parse Markdown, falling back to a single literal
/// paragraph in the (unreachable on well-formed UTF-8) case where the
/// grammar errors out.
#[must_use]
pub fn read_markdown(options: Options, source: &str) -> Pandoc {
    match parse(source, &options) {
        Ok(doc) => doc,
        Err(error) => {
            tracing::error!(?error, "markdown reader reached an unrepresentable state");
            Pandoc {
                meta: Meta::default(),
                blocks: vec![Block::Para(vec![Inline::Str(source.to_string())])],
            }
        }
    }
}
