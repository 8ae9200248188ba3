//! The extraction passes that run before block parsing.
//!
//! References and footnotes can be forward-declared anywhere, so the reader
//! scans the whole input for them first. Each pass tries its grammar rule
//! at the current position; on failure it moves one line clump (a maximal
//! run of non-blank lines plus the blank lines after it) into the residual
//! text, which the next pass then consumes.

use crate::grammar::markdown_parser;
use crate::state::ParserState;

/// Pass 1: collect `[label]: url "title"` definitions into the key table.
#[tracing::instrument(skip_all)]
pub(crate) fn extract_reference_keys(state: &mut ParserState, input: &str) -> String {
    let mut rest = input;
    let mut residual = String::with_capacity(input.len());
    while !rest.is_empty() {
        match markdown_parser::reference_key(rest, state) {
            Ok((label, target, tail)) => {
                state.insert_key(&label, target);
                rest = tail;
            }
            Err(_) => {
                let clump = line_clump(rest);
                residual.push_str(clump);
                rest = &rest[clump.len()..];
            }
        }
    }
    residual
}

/// Pass 2: collect `[^id]:` footnote bodies into the note table. Footnotes
/// are an extension, so strict mode passes the input through unchanged.
#[tracing::instrument(skip_all)]
pub(crate) fn extract_note_blocks(state: &mut ParserState, input: &str) -> String {
    if state.options.strict {
        return input.to_string();
    }
    let mut rest = input;
    let mut residual = String::with_capacity(input.len());
    while !rest.is_empty() {
        match markdown_parser::note_block(rest, state) {
            Ok((id, raw, tail)) => {
                state.insert_note(&id, raw);
                rest = tail;
            }
            Err(_) => {
                let clump = line_clump(rest);
                residual.push_str(clump);
                rest = &rest[clump.len()..];
            }
        }
    }
    residual
}

/// The next line clump: non-blank lines followed by any blank lines, or a
/// run of blank lines when the input starts blank. Always consumes at least
/// one byte of non-empty input.
fn line_clump(s: &str) -> &str {
    let mut end = 0;
    let mut seen_blank = false;
    for line in s.split_inclusive('\n') {
        let blank = line.trim().is_empty();
        if blank {
            seen_blank = true;
        } else if seen_blank {
            break;
        }
        end += line.len();
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_clump_takes_content_and_trailing_blanks() {
        assert_eq!(line_clump("a\nb\n\n\nc\n"), "a\nb\n\n\n");
        assert_eq!(line_clump("\n\nx\n"), "\n\n");
        assert_eq!(line_clump("tail without newline"), "tail without newline");
    }

    #[test]
    fn pass_one_extracts_keys_and_preserves_text() {
        let mut state = ParserState::new(Options::default());
        let input = "before\n\n[a]: http://x \"t\"\n\nafter\n\n";
        let residual = extract_reference_keys(&mut state, input);
        assert_eq!(residual, "before\n\nafter\n\n");
        assert_eq!(
            state.lookup_key_src("a"),
            Some(&("http://x".to_string(), "t".to_string()))
        );
    }

    #[test]
    fn pass_one_last_definition_wins() {
        let mut state = ParserState::new(Options::default());
        let input = "[k]: http://one\n\n[K]: http://two\n\n";
        extract_reference_keys(&mut state, input);
        assert_eq!(
            state.lookup_key_src("k").map(|t| t.0.as_str()),
            Some("http://two")
        );
    }

    #[test]
    fn pass_two_extracts_note_bodies() {
        let mut state = ParserState::new(Options::default());
        let input = "text[^1]\n\n[^1]: the note\n\n";
        let residual = extract_note_blocks(&mut state, input);
        assert_eq!(residual, "text[^1]\n\n");
        assert_eq!(state.notes.get("1").map(String::as_str), Some("the note\n"));
    }

    #[test]
    fn pass_two_is_disabled_in_strict_mode() {
        let mut state = ParserState::new(Options::builder().strict().build());
        let input = "[^1]: kept\n\n";
        let residual = extract_note_blocks(&mut state, input);
        assert_eq!(residual, input);
        assert!(state.notes.is_empty());
    }
}
