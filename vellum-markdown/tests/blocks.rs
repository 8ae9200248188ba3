//! Block-level parsing behavior.

use pretty_assertions::assert_eq;
use rstest::rstest;
use vellum_markdown::{
    read_markdown, Alignment, Block, Inline, ListAttributes, ListNumberDelim, ListNumberStyle,
    Options,
};

fn blocks(source: &str) -> Vec<Block> {
    read_markdown(Options::default(), source).blocks
}

fn strict_blocks(source: &str) -> Vec<Block> {
    read_markdown(Options::builder().strict().build(), source).blocks
}

fn s(text: &str) -> Inline {
    Inline::str(text)
}

#[test]
fn atx_header_levels_and_trailing_hashes() {
    assert_eq!(blocks("### Three\n"), vec![Block::Header(3, vec![s("Three")])]);
    assert_eq!(blocks("## Two ##\n"), vec![Block::Header(2, vec![s("Two")])]);
}

#[test]
fn hash_followed_by_period_is_not_a_header() {
    assert!(matches!(blocks("#. x\n")[0], Block::Para(_)));
}

#[rstest]
#[case("***\n")]
#[case("* * *\n")]
#[case("___\n")]
#[case("- - -\n")]
fn horizontal_rule_variants(#[case] source: &str) {
    assert_eq!(blocks(source), vec![Block::HorizontalRule]);
}

#[test]
fn indented_code_block_with_blank_line() {
    assert_eq!(
        blocks("    a\n\n    b\n"),
        vec![Block::CodeBlock("a\n\nb".to_string())]
    );
}

#[test]
fn tab_indented_code_block() {
    assert_eq!(blocks("\tcode\n"), vec![Block::CodeBlock("code".to_string())]);
}

#[test]
fn tight_bullet_list() {
    assert_eq!(
        blocks("- a\n- b\n\n"),
        vec![Block::BulletList(vec![
            vec![Block::Plain(vec![s("a")])],
            vec![Block::Plain(vec![s("b")])],
        ])]
    );
}

#[test]
fn loose_bullet_list_keeps_paragraphs() {
    assert_eq!(
        blocks("- a\n\n- b\n\n"),
        vec![Block::BulletList(vec![
            vec![Block::Para(vec![s("a")])],
            vec![Block::Para(vec![s("b")])],
        ])]
    );
}

#[test]
fn nested_bullet_list() {
    assert_eq!(
        blocks("- a\n    - b\n\n"),
        vec![Block::BulletList(vec![vec![
            Block::Plain(vec![s("a")]),
            Block::BulletList(vec![vec![Block::Plain(vec![s("b")])]]),
        ]])]
    );
}

#[test]
fn list_item_with_indented_continuation_paragraph() {
    assert_eq!(
        blocks("- a\n\n    cont\n\n"),
        vec![Block::BulletList(vec![vec![
            Block::Para(vec![s("a")]),
            Block::Para(vec![s("cont")]),
        ]])]
    );
}

#[test]
fn lower_roman_list() {
    assert_eq!(
        blocks("i. one\nii. two\n"),
        vec![Block::OrderedList(
            ListAttributes(1, ListNumberStyle::LowerRoman, ListNumberDelim::Period),
            vec![
                vec![Block::Plain(vec![s("one")])],
                vec![Block::Plain(vec![s("two")])],
            ],
        )]
    );
}

#[test]
fn lower_alpha_paren_list() {
    assert_eq!(
        blocks("a) x\nb) y\n"),
        vec![Block::OrderedList(
            ListAttributes(1, ListNumberStyle::LowerAlpha, ListNumberDelim::OneParen),
            vec![
                vec![Block::Plain(vec![s("x")])],
                vec![Block::Plain(vec![s("y")])],
            ],
        )]
    );
}

#[test]
fn upper_alpha_period_needs_a_wide_separator() {
    assert_eq!(
        blocks("A.  first\nB.  second\n"),
        vec![Block::OrderedList(
            ListAttributes(1, ListNumberStyle::UpperAlpha, ListNumberDelim::Period),
            vec![
                vec![Block::Plain(vec![s("first")])],
                vec![Block::Plain(vec![s("second")])],
            ],
        )]
    );
    // A single space reads as an initial, not a marker.
    assert_eq!(
        blocks("B. text\n"),
        vec![Block::Para(vec![s("B."), Inline::Space, s("text")])]
    );
}

#[test]
fn single_letter_upper_roman_period_needs_a_wide_separator() {
    assert!(matches!(blocks("I. note\n")[0], Block::Para(_)));
    assert!(matches!(blocks("II. note\n")[0], Block::OrderedList(..)));
}

#[test]
fn page_number_is_not_a_list_start() {
    assert!(matches!(blocks("p. 4\n")[0], Block::Para(_)));
}

#[test]
fn strict_mode_ordered_markers_ignore_number_and_style() {
    assert_eq!(
        strict_blocks("3. a\n"),
        vec![Block::OrderedList(
            ListAttributes(1, ListNumberStyle::DefaultStyle, ListNumberDelim::DefaultDelim),
            vec![vec![Block::Plain(vec![s("a")])]],
        )]
    );
}

#[test]
fn definition_list() {
    assert_eq!(
        blocks("term\n:   def\n\n"),
        vec![Block::DefinitionList(vec![(
            vec![s("term")],
            vec![Block::Para(vec![s("def")])],
        )])]
    );
}

#[test]
fn email_block_quote_with_lazy_continuation() {
    assert_eq!(
        blocks("> a\nb\n\n"),
        vec![Block::BlockQuote(vec![Block::Para(vec![
            s("a"),
            Inline::Space,
            s("b"),
        ])])]
    );
}

#[test]
fn emacs_box_quote() {
    assert_eq!(
        blocks(",----\n| hi\n`----\n\n"),
        vec![Block::BlockQuote(vec![Block::Para(vec![s("hi")])])]
    );
}

#[test]
fn loose_html_block_takes_the_tag_line() {
    assert_eq!(
        blocks("<hr />\n\n"),
        vec![Block::RawHtml("<hr />\n".to_string())]
    );
}

#[test]
fn strict_html_block_spans_the_whole_element() {
    assert_eq!(
        strict_blocks("<div>\nfoo\n</div>\n\n"),
        vec![Block::RawHtml("<div>\nfoo\n</div>\n".to_string())]
    );
}

#[test]
fn latex_environment_becomes_a_tex_paragraph() {
    assert_eq!(
        blocks("\\begin{align}\nx &= y\n\\end{align}\n\n"),
        vec![Block::Para(vec![Inline::TeX(
            "\\begin{align}\nx &= y\n\\end{align}".to_string(),
        )])]
    );
}

#[test]
fn simple_table_with_caption() {
    assert_eq!(
        blocks(" a  b\n -- --\n 1  2\n\nTable: Demo\n\n"),
        vec![Block::Table(
            vec![s("Demo")],
            vec![Alignment::Default, Alignment::Default],
            vec![0.0375, 0.025],
            vec![
                vec![Block::Plain(vec![s("a")])],
                vec![Block::Plain(vec![s("b")])],
            ],
            vec![vec![
                vec![Block::Plain(vec![s("1")])],
                vec![Block::Plain(vec![s("2")])],
            ]],
        )]
    );
}

#[test]
fn multiline_table_with_alignment_inference() {
    let source = "----------\nfoo  bar\n---- ----\none  two\n\n----------\n\n";
    assert_eq!(
        blocks(source),
        vec![Block::Table(
            vec![],
            vec![Alignment::Left, Alignment::Left],
            vec![0.0625, 0.05],
            vec![
                vec![Block::Plain(vec![s("foo")])],
                vec![Block::Plain(vec![s("bar")])],
            ],
            vec![vec![
                vec![Block::Plain(vec![s("one")])],
                vec![Block::Plain(vec![s("two")])],
            ]],
        )]
    );
}

#[test]
fn malformed_table_degrades_to_text() {
    // A dashed line with no rows before the blank is not a table.
    let out = blocks("a b\n-- --\n\n");
    assert!(out.iter().all(|b| !matches!(b, Block::Table(..))));
}

#[test]
fn strict_mode_has_no_tables() {
    let out = strict_blocks(" a  b\n -- --\n 1  2\n\n");
    assert!(out.iter().all(|b| !matches!(b, Block::Table(..))));
}
