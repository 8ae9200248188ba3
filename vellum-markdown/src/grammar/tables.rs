//! Table geometry: column indices from a dashed rule, row splitting,
//! alignment inference and relative widths.

use vellum_ast::{remove_trailing_space, split_by_indices, Alignment};

/// Column break indices from a dashed separator line.
///
/// `segments` holds `(dash_run_len, dash_run_len + trailing_spaces)` per
/// column; the result is the running sum of the second components, seeded
/// with the separator line's leading-space count. One more entry than there
/// are columns.
pub(crate) fn column_indices(init_sp: usize, segments: &[(usize, usize)]) -> Vec<usize> {
    let mut indices = Vec::with_capacity(segments.len() + 1);
    let mut acc = init_sp;
    indices.push(acc);
    for &(_, span) in segments {
        acc += span;
        indices.push(acc);
    }
    indices
}

/// Split one raw table line into per-column cell text. The text before the
/// first index is discarded; the final cell runs to the end of the line.
pub(crate) fn split_row(line: &str, indices: &[usize]) -> Vec<String> {
    let inner = &indices[..indices.len().saturating_sub(1)];
    let mut pieces = split_by_indices(line, inner);
    if !pieces.is_empty() {
        pieces.remove(0);
    }
    pieces
}

/// Infer one column's alignment from its raw header cell(s).
///
/// Uses the shortest cell after trailing-space removal. A leading space
/// pushes content right; content ending short of the dash run (or on a
/// space at the dash run's last position) leaves the right edge open.
pub(crate) fn align_type(cells: &[String], dash_len: usize) -> Alignment {
    let shortest = cells
        .iter()
        .map(|c| remove_trailing_space(c))
        .min_by_key(|c| c.chars().count());
    let Some(cell) = shortest else {
        return Alignment::Default;
    };
    let chars: Vec<char> = cell.chars().collect();
    if chars.is_empty() {
        return Alignment::Default;
    }
    let left_space = matches!(chars[0], ' ' | '\t');
    let right_space =
        chars.len() < dash_len || dash_len == 0 || matches!(chars[dash_len - 1], ' ' | '\t');
    match (left_space, right_space) {
        (true, false) => Alignment::Right,
        (false, true) => Alignment::Left,
        (true, true) => Alignment::Center,
        (false, false) => Alignment::Default,
    }
}

/// Relative column widths from break indices.
///
/// Differences of consecutive indices (with 0 prepended) give per-column
/// spans; each is divided by `max(total span, columns budget)`, and the
/// first difference (the leading indentation) is dropped. Widths therefore
/// sum to at most 1.0.
pub(crate) fn widths_from_indices(columns: usize, indices: &[usize]) -> Vec<f64> {
    if indices.is_empty() {
        return Vec::new();
    }
    let mut lengths = Vec::with_capacity(indices.len());
    let mut prev = 0usize;
    for &idx in indices {
        lengths.push(idx.saturating_sub(prev));
        prev = idx;
    }
    let total: usize = lengths.iter().sum();
    let denominator = total.max(columns).max(1) as f64;
    lengths
        .into_iter()
        .skip(1)
        .map(|len| len as f64 / denominator)
        .collect()
}
