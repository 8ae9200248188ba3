//! End-to-end reader scenarios: one test per documented behavior, plus the
//! boundary conditions around empty input, title blocks and tab stops.

use pretty_assertions::assert_eq;
use rstest::rstest;
use vellum_markdown::{
    read_markdown, Alignment, Block, Inline, ListAttributes, ListNumberDelim, ListNumberStyle,
    Meta, Options, Pandoc, QuoteType,
};

fn blocks(source: &str) -> Vec<Block> {
    read_markdown(Options::default(), source).blocks
}

fn s(text: &str) -> Inline {
    Inline::str(text)
}

#[test]
fn atx_header() {
    assert_eq!(blocks("# Hi\n"), vec![Block::Header(1, vec![s("Hi")])]);
}

#[test]
fn setext_header() {
    assert_eq!(blocks("Hi\n==\n"), vec![Block::Header(1, vec![s("Hi")])]);
}

#[test]
fn horizontal_rule() {
    assert_eq!(blocks("---\n"), vec![Block::HorizontalRule]);
}

#[test]
fn reference_key_resolves_link() {
    assert_eq!(
        blocks("[a]: http://x \"t\"\n\n[a]\n"),
        vec![Block::Para(vec![Inline::Link(
            vec![s("a")],
            ("http://x".to_string(), "t".to_string()),
        )])]
    );
}

#[test]
fn ordered_list_decimal_period() {
    assert_eq!(
        blocks("1. a\n2. b\n"),
        vec![Block::OrderedList(
            ListAttributes(1, ListNumberStyle::Decimal, ListNumberDelim::Period),
            vec![
                vec![Block::Plain(vec![s("a")])],
                vec![Block::Plain(vec![s("b")])],
            ],
        )]
    );
}

#[test]
fn simple_table() {
    assert_eq!(
        blocks(" a    b    c\n --- --- ---\n 1   2   3\n\n"),
        vec![Block::Table(
            vec![],
            vec![Alignment::Default, Alignment::Default, Alignment::Default],
            vec![0.05, 0.05, 0.0375],
            vec![
                vec![Block::Plain(vec![s("a")])],
                vec![Block::Plain(vec![s("b")])],
                vec![Block::Plain(vec![s("c")])],
            ],
            vec![vec![
                vec![Block::Plain(vec![s("1")])],
                vec![Block::Plain(vec![s("2")])],
                vec![Block::Plain(vec![s("3")])],
            ]],
        )]
    );
}

#[test]
fn emphasis_and_strong() {
    assert_eq!(
        blocks("*em* and **strong**\n"),
        vec![Block::Para(vec![
            Inline::Emph(vec![s("em")]),
            Inline::Space,
            s("and"),
            Inline::Space,
            Inline::Strong(vec![s("strong")]),
        ])]
    );
}

#[test]
fn footnote_reference_carries_parsed_body() {
    assert_eq!(
        blocks("Here[^1] is.\n\n[^1]: footnote body.\n"),
        vec![Block::Para(vec![
            s("Here"),
            Inline::Note(vec![Block::Para(vec![
                s("footnote"),
                Inline::Space,
                s("body."),
            ])]),
            Inline::Space,
            s("is."),
        ])]
    );
}

// -- Boundary conditions ----------------------------------------------

#[test]
fn empty_input_is_an_empty_document() {
    assert_eq!(
        read_markdown(Options::default(), ""),
        Pandoc {
            meta: Meta::default(),
            blocks: vec![],
        }
    );
}

#[test]
fn single_newline_is_an_empty_document() {
    assert_eq!(
        read_markdown(Options::default(), "\n"),
        Pandoc {
            meta: Meta::default(),
            blocks: vec![],
        }
    );
}

#[test]
fn bare_percent_line_is_not_a_title() {
    let doc = read_markdown(Options::default(), "%\n");
    assert_eq!(doc.meta, Meta::default());
    assert_eq!(doc.blocks, vec![Block::Para(vec![s("%")])]);
}

#[test]
fn title_block_fills_metadata() {
    let doc = read_markdown(
        Options::default(),
        "% The Title\n% Alice; Bob\n% July 2008\n\nBody\n",
    );
    assert_eq!(
        doc.meta,
        Meta {
            title: vec![s("The"), Inline::Space, s("Title")],
            authors: vec!["Alice".to_string(), "Bob".to_string()],
            date: "July 2008".to_string(),
        }
    );
    assert_eq!(doc.blocks, vec![Block::Para(vec![s("Body")])]);
}

#[test]
fn title_block_is_disabled_in_strict_mode() {
    let doc = read_markdown(Options::builder().strict().build(), "% T\n");
    assert_eq!(doc.meta, Meta::default());
    assert_eq!(doc.blocks, vec![Block::Para(vec![s("%"), Inline::Space, s("T")])]);
}

#[test]
fn tab_stop_changes_what_counts_as_code() {
    assert_eq!(
        blocks("    code\n"),
        vec![Block::CodeBlock("code".to_string())]
    );
    let wide = read_markdown(Options::builder().tab_stop(8).build(), "    code\n");
    assert_eq!(wide.blocks, vec![Block::Para(vec![s("code")])]);
}

#[test]
fn paragraph_followed_by_dashes_is_a_setext_header() {
    // The dashed line binds to the text above it as a level-2 underline,
    // not as a horizontal rule after a paragraph.
    assert_eq!(blocks("Hi\n---\n"), vec![Block::Header(2, vec![s("Hi")])]);
}

#[test]
fn strict_paragraph_ends_at_header_without_blank_line() {
    let doc = read_markdown(Options::builder().strict().build(), "text\n# Head\n\n");
    assert_eq!(
        doc.blocks,
        vec![
            Block::Para(vec![s("text")]),
            Block::Header(1, vec![s("Head")]),
        ]
    );
}

#[test]
fn smart_quote_state_rewinds_cleanly() {
    // An unclosed opener must fall back to an apostrophe without poisoning
    // the rest of the parse.
    let doc = read_markdown(Options::builder().smart().build(), "a 'b and 'c' end\n");
    assert!(matches!(doc.blocks[0], Block::Para(_)));
}

#[rstest]
#[case("")]
#[case("\n")]
#[case("***")]
#[case("* * *")]
#[case("[")]
#[case("[]")]
#[case("[a](")]
#[case("[a](url")]
#[case("`")]
#[case("``x`")]
#[case("$")]
#[case("$x")]
#[case("\\")]
#[case("~~x")]
#[case("^")]
#[case("^[")]
#[case("<")]
#[case("<div")]
#[case("<!--")]
#[case("\\begin{x}")]
#[case("> ")]
#[case("> > > > a")]
#[case("1. ")]
#[case("- ")]
#[case(",----\n|x")]
#[case("a\n---")]
#[case("[^x]")]
#[case("[^x]:")]
#[case("&")]
#[case("&amp")]
#[case("  \n")]
#[case("\t\t")]
#[case("% ")]
#[case("héllo wörld ✓")]
#[case("“smart” – text")]
#[case("a  \nb")]
#[case("term\n:")]
#[case("x\n-- --\ny")]
fn reader_is_total_on_awkward_input(#[case] source: &str) {
    for options in [
        Options::default(),
        Options::builder().smart().build(),
        Options::builder().strict().build(),
        Options::builder().parse_raw(false).build(),
    ] {
        let _doc = read_markdown(options, source);
    }
}

#[test]
fn quoted_inlines_use_quote_type() {
    let doc = read_markdown(Options::builder().smart().build(), "'single'\n");
    assert_eq!(
        doc.blocks,
        vec![Block::Para(vec![Inline::Quoted(
            QuoteType::SingleQuote,
            vec![s("single")],
        )])]
    );
}
