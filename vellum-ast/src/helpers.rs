//! Small pure helpers shared between readers and writers.

use crate::{Block, Inline};

/// Normalize an inline sequence: no leading or trailing `Space`, no two
/// adjacent `Space`s. Idempotent.
#[must_use]
pub fn normalize_spaces(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut result: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if matches!(inline, Inline::Space)
            && matches!(result.last(), None | Some(Inline::Space))
        {
            continue;
        }
        result.push(inline);
    }
    while matches!(result.last(), Some(Inline::Space)) {
        result.pop();
    }
    result
}

/// Change the final list item's trailing `Para` to `Plain` when it is the
/// only `Para` in the whole list, so purely compact lists render tight.
#[must_use]
pub fn compactify(items: Vec<Vec<Block>>) -> Vec<Vec<Block>> {
    let para_count = items
        .iter()
        .flatten()
        .filter(|b| matches!(b, Block::Para(_)))
        .count();
    if para_count != 1 {
        return items;
    }
    let mut items = items;
    if let Some(last) = items.last_mut().and_then(|item| item.last_mut()) {
        if let Block::Para(inlines) = last {
            let inlines = std::mem::take(inlines);
            *last = Block::Plain(inlines);
        }
    }
    items
}

/// Split a string at the given character indices (absolute positions,
/// ascending). `split_by_indices("abcdef", &[2, 4])` yields
/// `["ab", "cd", "ef"]`.
#[must_use]
pub fn split_by_indices(s: &str, indices: &[usize]) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut pieces = Vec::with_capacity(indices.len() + 1);
    let mut prev = 0;
    for &idx in indices {
        let idx = idx.min(chars.len()).max(prev);
        pieces.push(chars[prev..idx].iter().collect());
        prev = idx;
    }
    pieces.push(chars[prev..].iter().collect());
    pieces
}

/// Join string pieces with a separator.
#[must_use]
pub fn join_with_sep(sep: &str, pieces: &[String]) -> String {
    pieces.join(sep)
}

/// Strip spaces and tabs from both ends.
#[must_use]
pub fn remove_leading_trailing_space(s: &str) -> &str {
    s.trim_matches([' ', '\t'])
}

/// Strip spaces and tabs from the end only.
#[must_use]
pub fn remove_trailing_space(s: &str) -> &str {
    s.trim_end_matches([' ', '\t'])
}

/// Strip trailing newlines.
#[must_use]
pub fn strip_trailing_newlines(s: &str) -> &str {
    s.trim_end_matches('\n')
}
