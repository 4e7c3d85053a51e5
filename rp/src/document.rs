//! In-memory document pipeline
//!
//! A [`Document`] is the full text of the target file, treated as an opaque
//! string. Patches are applied strictly in order; each one sees the output of
//! every patch before it.

use tracing::debug;

use crate::error::PatchError;
use crate::patch::{Anchor, Mode, Patch};

/// Why a patch left the document untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Optional patch whose anchor was absent
    NoMatch,
    /// The `unless_contains` guard text was already present
    Guarded,
}

/// Result of applying a single patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied { replacements: usize },
    Skipped(SkipReason),
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied { .. })
    }
}

/// Per-patch entry in a batch report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub name: String,
    pub mode: Mode,
    pub outcome: PatchOutcome,
}

/// Whether a patch's anchor is currently present, without applying it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Present { matches: usize },
    Absent,
    Guarded,
}

/// Full text of the target file during one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check a patch against the current text without changing it
    pub fn probe(&self, patch: &Patch) -> Probe {
        debug!(patch = %patch.name, "Document::probe: called");
        if is_guarded(&self.text, patch) {
            return Probe::Guarded;
        }
        match count_matches(&self.text, &patch.anchor) {
            0 => Probe::Absent,
            matches => Probe::Present { matches },
        }
    }

    /// Apply one patch in place
    ///
    /// A required patch whose anchor is absent fails with
    /// [`PatchError::AnchorNotFound`] and leaves the document unchanged.
    pub fn apply(&mut self, patch: &Patch) -> Result<PatchOutcome, PatchError> {
        debug!(patch = %patch.name, kind = patch.anchor.kind(), mode = %patch.mode, "Document::apply: called");
        patch.validate()?;

        if is_guarded(&self.text, patch) {
            debug!(patch = %patch.name, "Document::apply: guard text present, skipping");
            return Ok(PatchOutcome::Skipped(SkipReason::Guarded));
        }

        match substitute(&self.text, patch) {
            Some((text, replacements)) => {
                debug!(patch = %patch.name, replacements, "Document::apply: substituted");
                self.text = text;
                Ok(PatchOutcome::Applied { replacements })
            }
            None if patch.is_required() => {
                debug!(patch = %patch.name, "Document::apply: required anchor missing");
                Err(PatchError::AnchorNotFound {
                    patch: patch.name.clone(),
                    anchor: patch.anchor.describe(),
                })
            }
            None => {
                debug!(patch = %patch.name, "Document::apply: optional anchor missing, no-op");
                Ok(PatchOutcome::Skipped(SkipReason::NoMatch))
            }
        }
    }

    /// Apply an ordered sequence of patches
    ///
    /// All or nothing: on error the document keeps the text it had before
    /// the call.
    pub fn apply_all(&mut self, patches: &[Patch]) -> Result<Vec<PatchReport>, PatchError> {
        debug!(count = patches.len(), "Document::apply_all: called");
        let mut working = self.clone();
        let mut reports = Vec::with_capacity(patches.len());

        for patch in patches {
            let outcome = working.apply(patch)?;
            reports.push(PatchReport {
                name: patch.name.clone(),
                mode: patch.mode,
                outcome,
            });
        }

        *self = working;
        debug!(count = reports.len(), "Document::apply_all: complete");
        Ok(reports)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

fn is_guarded(text: &str, patch: &Patch) -> bool {
    patch.unless_contains.as_deref().is_some_and(|guard| text.contains(guard))
}

fn count_matches(text: &str, anchor: &Anchor) -> usize {
    match anchor {
        Anchor::Literal(find) => text.matches(find.as_str()).count(),
        Anchor::Regex(re) => re.find_iter(text).count(),
        Anchor::Span { start, ends } => usize::from(span_range(text, start, ends).is_some()),
    }
}

/// Byte range from the first `start` up to the first end marker found after it
fn span_range(text: &str, start: &str, ends: &[String]) -> Option<(usize, usize)> {
    let start_pos = text.find(start)?;
    let search_from = start_pos + start.len();
    let rest = &text[search_from..];
    ends.iter()
        .find_map(|end| rest.find(end.as_str()))
        .map(|offset| (start_pos, search_from + offset))
}

/// New text and number of replacements, or `None` when the anchor is absent
fn substitute(text: &str, patch: &Patch) -> Option<(String, usize)> {
    match &patch.anchor {
        Anchor::Literal(find) => {
            let matches = text.matches(find.as_str()).count();
            if matches == 0 {
                return None;
            }
            match patch.count {
                Some(n) => Some((text.replacen(find.as_str(), &patch.replacement, n), matches.min(n))),
                None => Some((text.replace(find.as_str(), &patch.replacement), matches)),
            }
        }
        Anchor::Regex(re) => {
            let matches = re.find_iter(text).count();
            if matches == 0 {
                return None;
            }
            let limit = patch.count.unwrap_or(0);
            let replaced = re.replacen(text, limit, patch.replacement.as_str()).into_owned();
            Some((replaced, patch.count.map_or(matches, |n| matches.min(n))))
        }
        Anchor::Span { start, ends } => {
            let (from, to) = span_range(text, start, ends)?;
            let mut replaced = String::with_capacity(text.len() - (to - from) + patch.replacement.len());
            replaced.push_str(&text[..from]);
            replaced.push_str(&patch.replacement);
            replaced.push_str(&text[to..]);
            Some((replaced, 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINAL_RESULT: &str = "<th rowSpan={2}>Final Result<br/>(Avg)</th>";
    const FINAL_RESULT_GOLD: &str = "<th rowSpan={2} className=\"gold-bg\">Final Result<br/>(Avg)</th>";

    #[test]
    fn test_literal_replaces_all_by_default() {
        let mut doc = Document::new("a-b-a-b-a");
        let outcome = doc.apply(&Patch::literal("a-to-x", "a", "x")).unwrap();
        assert_eq!(outcome, PatchOutcome::Applied { replacements: 3 });
        assert_eq!(doc.as_str(), "x-b-x-b-x");
    }

    #[test]
    fn test_literal_first_n() {
        let mut doc = Document::new(
            "<table className=\"foundational-table\"></table><table className=\"foundational-table\"></table>",
        );
        let patch = Patch::literal(
            "tag-first-table",
            "<table className=\"foundational-table\">",
            "<table className=\"foundational-table scholastic-table\">",
        )
        .first(1);
        let outcome = doc.apply(&patch).unwrap();
        assert_eq!(outcome, PatchOutcome::Applied { replacements: 1 });
        assert_eq!(doc.as_str().matches("scholastic-table").count(), 1);
        assert!(doc.as_str().ends_with("<table className=\"foundational-table\"></table>"));
    }

    #[test]
    fn test_regex_first_n() {
        let mut doc = Document::new("a1 a2 a3");
        let patch = Patch::regex("a-to-b", r"a(\d)", "b${1}").unwrap().first(2);
        let outcome = doc.apply(&patch).unwrap();
        assert_eq!(outcome, PatchOutcome::Applied { replacements: 2 });
        assert_eq!(doc.as_str(), "b1 b2 a3");
    }

    #[test]
    fn test_regex_count_above_matches_reports_actual() {
        let mut doc = Document::new("a1 a2");
        let patch = Patch::regex("a-to-b", r"a(\d)", "b${1}").unwrap().first(5);
        assert_eq!(doc.apply(&patch).unwrap(), PatchOutcome::Applied { replacements: 2 });
        assert_eq!(doc.as_str(), "b1 b2");
    }

    #[test]
    fn test_required_missing_anchor_fails_and_keeps_text() {
        let mut doc = Document::new("nothing to see");
        let err = doc.apply(&Patch::literal("needle", "needle!", "pin")).unwrap_err();
        assert!(err.is_anchor_not_found());
        assert_eq!(doc.as_str(), "nothing to see");
    }

    #[test]
    fn test_optional_missing_anchor_is_noop() {
        let mut doc = Document::new("nothing to see");
        let outcome = doc.apply(&Patch::literal("needle", "needle!", "pin").optional()).unwrap();
        assert_eq!(outcome, PatchOutcome::Skipped(SkipReason::NoMatch));
        assert_eq!(doc.as_str(), "nothing to see");
    }

    #[test]
    fn test_guard_skips_even_required_patch() {
        let mut doc = Document::new("<style>.scholastic-table {}</style>");
        let patch = Patch::literal("inject-css", "</style>", ".scholastic-table {}</style>").unless_contains(".scholastic-table");
        let outcome = doc.apply(&patch).unwrap();
        assert_eq!(outcome, PatchOutcome::Skipped(SkipReason::Guarded));
        assert_eq!(doc.as_str(), "<style>.scholastic-table {}</style>");
    }

    #[test]
    fn test_regex_preserves_captured_suffix() {
        let mut doc = Document::new(".foundational-table th {\n    padding: 9px 14px !important;\n}");
        let patch = Patch::regex(
            "th-padding",
            r"(padding:\s*)9px 14px(\s*!important;)",
            "${1}6px 4px${2}",
        )
        .unwrap();
        doc.apply(&patch).unwrap();
        assert_eq!(doc.as_str(), ".foundational-table th {\n    padding: 6px 4px !important;\n}");
    }

    #[test]
    fn test_regex_capture_scoped_to_rule_block() {
        let css = ".foundational-table th {\n  font-size: 10.5px !important;\n}\n.foundational-table td {\n  font-size: 11px !important;\n}";
        let mut doc = Document::new(css);
        let patch = Patch::regex(
            "td-font-size",
            r"(\.foundational-table td\s*\{[^}]*font-size:\s*)11px",
            "${1}10px",
        )
        .unwrap();
        doc.apply(&patch).unwrap();
        assert!(doc.as_str().contains("td {\n  font-size: 10px !important;"));
        assert!(doc.as_str().contains("th {\n  font-size: 10.5px !important;"));
    }

    #[test]
    fn test_regex_double_dollar_is_literal() {
        let mut doc = Document::new("{/* MARK */}");
        let patch = Patch::regex("border", r"(\{/\* MARK \*/\})", "<div style={{ border: `1px solid $${C.navy}` }} />${1}").unwrap();
        doc.apply(&patch).unwrap();
        assert_eq!(doc.as_str(), "<div style={{ border: `1px solid ${C.navy}` }} />{/* MARK */}");
    }

    #[test]
    fn test_span_uses_first_available_end_marker() {
        let text = "head<tbody>old rows</tbody>\n</table>tail";
        let mut doc = Document::new(text);
        let patch = Patch::span("tbody", "<tbody>", ["<!-- missing -->", "</tbody>"], "<tbody>new rows");
        let outcome = doc.apply(&patch).unwrap();
        assert_eq!(outcome, PatchOutcome::Applied { replacements: 1 });
        assert_eq!(doc.as_str(), "head<tbody>new rows</tbody>\n</table>tail");
    }

    #[test]
    fn test_span_end_must_follow_start() {
        let mut doc = Document::new("</tbody> then <tbody> and nothing after");
        let err = doc.apply(&Patch::span("tbody", "<tbody>", ["</tbody>"], "")).unwrap_err();
        assert!(err.is_anchor_not_found());
    }

    #[test]
    fn test_apply_all_is_sequential() {
        let mut doc = Document::new("alpha");
        let patches = vec![
            Patch::literal("alpha-to-beta", "alpha", "beta"),
            Patch::literal("beta-to-gamma", "beta", "gamma"),
        ];
        let reports = doc.apply_all(&patches).unwrap();
        assert_eq!(doc.as_str(), "gamma");
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.outcome.is_applied()));
    }

    #[test]
    fn test_apply_all_rolls_back_on_failure() {
        let mut doc = Document::new("alpha");
        let patches = vec![
            Patch::literal("alpha-to-beta", "alpha", "beta"),
            Patch::literal("needs-delta", "delta", "epsilon"),
        ];
        let err = doc.apply_all(&patches).unwrap_err();
        assert_eq!(err.patch_name(), Some("needs-delta"));
        assert_eq!(doc.as_str(), "alpha");
    }

    #[test]
    fn test_apply_all_continues_after_optional_noop() {
        let mut doc = Document::new("alpha");
        let patches = vec![
            Patch::literal("missing", "omega", "x").optional(),
            Patch::literal("alpha-to-beta", "alpha", "beta"),
        ];
        let reports = doc.apply_all(&patches).unwrap();
        assert_eq!(reports[0].outcome, PatchOutcome::Skipped(SkipReason::NoMatch));
        assert_eq!(reports[1].outcome, PatchOutcome::Applied { replacements: 1 });
        assert_eq!(doc.as_str(), "beta");
    }

    #[test]
    fn test_gold_toggle_round_trip() {
        let original = format!("<tr>{}</tr>", FINAL_RESULT);
        let mut doc = Document::new(original.clone());

        doc.apply(&Patch::literal("make-gold", FINAL_RESULT, FINAL_RESULT_GOLD)).unwrap();
        assert_eq!(doc.as_str(), format!("<tr>{}</tr>", FINAL_RESULT_GOLD));

        doc.apply(&Patch::literal("remove-gold", FINAL_RESULT_GOLD, FINAL_RESULT)).unwrap();
        assert_eq!(doc.as_str(), original);
    }

    #[test]
    fn test_probe() {
        let doc = Document::new("x x x");
        assert_eq!(doc.probe(&Patch::literal("x", "x", "y")), Probe::Present { matches: 3 });
        assert_eq!(doc.probe(&Patch::literal("z", "z", "y")), Probe::Absent);
        assert_eq!(doc.probe(&Patch::literal("x", "x", "y").unless_contains("x x")), Probe::Guarded);
    }

    #[test]
    fn test_invalid_patch_is_rejected_before_matching() {
        let mut doc = Document::new("abc");
        let err = doc.apply(&Patch::literal("empty", "", "z")).unwrap_err();
        assert!(matches!(err, PatchError::InvalidPatch { .. }));
        assert_eq!(doc.as_str(), "abc");
    }
}
