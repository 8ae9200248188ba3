//! The Markdown grammar and its re-entry bridge.
//!
//! `markdown.rs` holds the peg grammar itself. The functions here run that
//! grammar against captured substrings with the shared parser state: list
//! item bodies, block quote interiors, note bodies, link labels and table
//! cells are all parsed through this bridge.

pub(crate) mod list_markers;
mod markdown;
pub(crate) mod tables;

pub(crate) use markdown::markdown_parser;

use vellum_ast::{normalize_spaces, remove_leading_trailing_space, Block, Inline};

use crate::state::{ParserContext, ParserState};

/// Smart-quote context threaded through the inline rules as a `Copy`
/// argument, so grammar backtracking rewinds it for free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum QuoteContext {
    #[default]
    None,
    InSingle,
    InDouble,
}

/// Parse a captured substring as a block sequence, sharing the outer state.
/// Degrades to a literal `Plain` when the nesting budget is spent or the
/// grammar reports an unrepresentable state.
pub(crate) fn parse_blocks_from(state: &mut ParserState, text: &str) -> Vec<Block> {
    if state.nesting_left == 0 {
        return vec![Block::Plain(vec![Inline::Str(text.to_string())])];
    }
    state.nesting_left -= 1;
    let result = markdown_parser::blocks(text, state);
    state.nesting_left += 1;
    match result {
        Ok(blocks) => blocks.into_iter().filter(|b| *b != Block::Null).collect(),
        Err(error) => {
            tracing::error!(?error, "block re-entry failed");
            vec![Block::Plain(vec![Inline::Str(text.to_string())])]
        }
    }
}

/// Parse a list item body. Installs `ListItemState` for the duration so
/// `endline` treats a fresh list marker as a structural break, and restores
/// the previous context afterwards.
pub(crate) fn parse_list_item_blocks(state: &mut ParserState, text: &str) -> Vec<Block> {
    let outer = state.parser_context;
    state.parser_context = ParserContext::ListItemState;
    let blocks = parse_blocks_from(state, text);
    state.parser_context = outer;
    blocks
}

/// Parse a captured substring as an inline sequence.
pub(crate) fn parse_inlines_from(state: &mut ParserState, text: &str) -> Vec<Inline> {
    if state.nesting_left == 0 {
        return vec![Inline::Str(text.to_string())];
    }
    state.nesting_left -= 1;
    let result = markdown_parser::inlines(text, state);
    state.nesting_left += 1;
    match result {
        Ok(inlines) => inlines,
        Err(error) => {
            tracing::error!(?error, "inline re-entry failed");
            vec![Inline::Str(text.to_string())]
        }
    }
}

/// Resolve a footnote reference to its block content by re-parsing the raw
/// body recorded in pass 2. The note's own id is withdrawn from the table
/// while its body parses, so a self-referential note falls back to literal
/// text instead of recursing. Returns `None` for unknown ids, which fails
/// the `note_ref` rule and lets `[^id]` re-parse as plain text.
pub(crate) fn parse_note_blocks(state: &mut ParserState, id: &str) -> Option<Vec<Block>> {
    let raw = state.notes.shift_remove(id)?;
    let mut body = raw.clone();
    while !body.ends_with("\n\n") {
        body.push('\n');
    }
    let blocks = parse_blocks_from(state, &body);
    state.notes.insert(id.to_string(), raw);
    Some(blocks)
}

/// One table cell: trimmed raw text parsed to a `Plain` block, or nothing
/// for an empty cell.
pub(crate) fn table_cell_blocks(state: &mut ParserState, raw: &str) -> Vec<Block> {
    let text = remove_leading_trailing_space(raw);
    if text.is_empty() {
        return Vec::new();
    }
    vec![Block::Plain(normalize_spaces(parse_inlines_from(
        state, text,
    )))]
}

const HTML_BLOCK_TAGS: &[&str] = &[
    "address",
    "blockquote",
    "center",
    "dd",
    "del",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "form",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "ins",
    "isindex",
    "li",
    "menu",
    "noframes",
    "noscript",
    "ol",
    "p",
    "pre",
    "script",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

pub(crate) fn is_html_block_tag(name: &str) -> bool {
    HTML_BLOCK_TAGS.contains(&name.to_ascii_lowercase().as_str())
}

/// Void elements stand alone as block tokens even without `/>`.
pub(crate) fn is_void_tag(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "br" | "col" | "hr" | "img" | "input" | "link" | "meta" | "param"
    )
}

/// Tag name of a raw `<tag ...>` or `</tag>` string, lowercased.
pub(crate) fn tag_name(raw: &str) -> String {
    raw.trim_start_matches(['<', '/'])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}
