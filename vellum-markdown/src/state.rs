use indexmap::IndexMap;
use vellum_ast::Target;

use crate::Options;

/// Parser context installed while re-parsing extracted list-item bodies.
/// In `ListItemState`, `endline` treats an upcoming list marker as a
/// structural break so a `Plain` stops before a nested list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ParserContext {
    #[default]
    NullState,
    ListItemState,
}

/// Mutable reader state, one per parse.
///
/// The key and note tables are filled by the preprocessing passes and are
/// never mutated during speculative block/inline parsing, so grammar
/// backtracking cannot observe partial table updates. The quote context is
/// deliberately *not* stored here: it travels as a `Copy` rule argument
/// through the inline grammar, which makes rewind-on-backtrack automatic.
#[derive(Debug)]
pub(crate) struct ParserState {
    pub(crate) options: Options,
    /// Normalized reference label -> (url, title). Last definition wins.
    pub(crate) keys: IndexMap<String, Target>,
    /// Note id -> raw body text. Bodies are parsed to blocks at each
    /// reference site.
    pub(crate) notes: IndexMap<String, String>,
    pub(crate) parser_context: ParserContext,
    /// Remaining re-entry depth; nested constructs past this fail and
    /// degrade to literal text.
    pub(crate) nesting_left: usize,
}

const MAX_NESTING: usize = 24;

impl ParserState {
    pub(crate) fn new(options: Options) -> Self {
        Self {
            options,
            keys: IndexMap::new(),
            notes: IndexMap::new(),
            parser_context: ParserContext::default(),
            nesting_left: MAX_NESTING,
        }
    }

    /// Record a reference key. Duplicate labels overwrite (last wins).
    pub(crate) fn insert_key(&mut self, label: &str, target: Target) {
        let normalized = normalize_key(label);
        tracing::debug!(label = %normalized, url = %target.0, "reference key");
        self.keys.insert(normalized, target);
    }

    /// Look up a reference by raw label text.
    pub(crate) fn lookup_key_src(&self, label: &str) -> Option<&Target> {
        self.keys.get(&normalize_key(label))
    }

    pub(crate) fn insert_note(&mut self, id: &str, raw: String) {
        tracing::debug!(id, bytes = raw.len(), "note block");
        self.notes.insert(id.to_string(), raw);
    }
}

/// Key labels match case-insensitively after whitespace normalization:
/// interior whitespace runs collapse to single spaces and the ends are
/// trimmed before lowercasing.
pub(crate) fn normalize_key(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keys_match_case_insensitively_after_whitespace_normalization() {
        let mut state = ParserState::new(Options::default());
        state.insert_key("My  Label", ("http://x".into(), String::new()));
        assert!(state.lookup_key_src("my label").is_some());
        assert!(state.lookup_key_src(" MY\nLABEL ").is_some());
        assert!(state.lookup_key_src("mylabel").is_none());
    }

    #[test]
    fn duplicate_keys_last_definition_wins() {
        let mut state = ParserState::new(Options::default());
        state.insert_key("a", ("http://first".into(), String::new()));
        state.insert_key("A", ("http://second".into(), String::new()));
        assert_eq!(state.keys.len(), 1);
        assert_eq!(
            state.lookup_key_src("a").map(|t| t.0.as_str()),
            Some("http://second")
        );
    }

    #[test]
    fn key_table_preserves_definition_order() {
        let mut state = ParserState::new(Options::default());
        state.insert_key("b", ("1".into(), String::new()));
        state.insert_key("a", ("2".into(), String::new()));
        let order: Vec<&str> = state.keys.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
