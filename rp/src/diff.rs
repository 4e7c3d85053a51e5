//! Unified diff rendering for dry runs

use similar::{ChangeTag, TextDiff};

/// Lines of unchanged context around each hunk
pub const DEFAULT_CONTEXT: usize = 3;

/// Render a unified diff between `original` and `patched`
///
/// Returns an empty string when the texts are equal.
pub fn unified_diff(original: &str, patched: &str, label: &str) -> String {
    if original == patched {
        return String::new();
    }

    let old_header = format!("a/{}", label);
    let new_header = format!("b/{}", label);
    let diff = TextDiff::from_lines(original, patched);
    diff.unified_diff()
        .context_radius(DEFAULT_CONTEXT)
        .header(&old_header, &new_header)
        .to_string()
}

/// Count of (inserted, deleted) lines
pub fn line_stats(original: &str, patched: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(original, patched);
    diff.iter_all_changes().fold((0, 0), |(ins, del), change| match change.tag() {
        ChangeTag::Insert => (ins + 1, del),
        ChangeTag::Delete => (ins, del + 1),
        ChangeTag::Equal => (ins, del),
    })
}
