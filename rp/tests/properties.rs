//! Property tests for the patch pipeline

use std::fs;

use proptest::prelude::*;
use reportpatch::{Document, Patch, PatchOutcome, SkipReason, apply_patches};
use tempfile::TempDir;

const ANCHOR: &str = "<th rowSpan={2}>Final Result<br/>(Avg)</th>";
const REPLACEMENT: &str = "<th rowSpan={2} className=\"gold-bg\">Final Result<br/>(Avg)</th>";

/// Text that can never contain ANCHOR (no '<')
fn filler() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 {}:;.\n-]{0,200}"
}

proptest! {
    /// Property: replacing a unique anchor changes the length by exactly the substitution delta
    #[test]
    fn test_length_delta(prefix in filler(), suffix in filler()) {
        let text = format!("{}{}{}", prefix, ANCHOR, suffix);
        let mut doc = Document::new(text.clone());

        let outcome = doc.apply(&Patch::literal("make-gold", ANCHOR, REPLACEMENT)).unwrap();

        prop_assert_eq!(outcome, PatchOutcome::Applied { replacements: 1 });
        prop_assert_eq!(doc.len() as isize - text.len() as isize, REPLACEMENT.len() as isize - ANCHOR.len() as isize);
        prop_assert_eq!(doc.as_str(), format!("{}{}{}", prefix, REPLACEMENT, suffix));
    }

    /// Property: a missing required anchor fails and the file stays byte-for-byte identical
    #[test]
    fn test_missing_anchor_leaves_file(text in filler()) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Report.tsx");
        fs::write(&path, &text).unwrap();

        let err = apply_patches(&path, &[Patch::literal("make-gold", ANCHOR, REPLACEMENT)]).unwrap_err();

        prop_assert!(err.is_anchor_not_found());
        prop_assert_eq!(fs::read(&path).unwrap(), text.into_bytes());
    }

    /// Property: an absent optional anchor is a no-op and later patches still run
    #[test]
    fn test_optional_noop_then_continue(text in filler()) {
        let mut doc = Document::new(format!("{}MARK", text));
        let patches = vec![
            Patch::literal("make-gold", ANCHOR, REPLACEMENT).optional(),
            Patch::literal("mark", "MARK", "DONE"),
        ];

        let reports = doc.apply_all(&patches).unwrap();

        prop_assert_eq!(reports[0].outcome, PatchOutcome::Skipped(SkipReason::NoMatch));
        prop_assert_eq!(reports[1].outcome, PatchOutcome::Applied { replacements: 1 });
        prop_assert_eq!(doc.as_str(), format!("{}DONE", text));
    }

    /// Property: a patch whose replacement no longer matches its anchor is idempotent
    #[test]
    fn test_idempotent_safe_patch(prefix in filler(), suffix in filler()) {
        let patch = Patch::literal("make-gold", ANCHOR, REPLACEMENT).optional();
        let mut once = Document::new(format!("{}{}{}", prefix, ANCHOR, suffix));
        once.apply(&patch).unwrap();

        let mut twice = once.clone();
        let second = twice.apply(&patch).unwrap();

        prop_assert_eq!(second, PatchOutcome::Skipped(SkipReason::NoMatch));
        prop_assert_eq!(once, twice);
    }

    /// Property: a capture-group rewrite keeps the captured suffix verbatim
    #[test]
    fn test_regex_keeps_important_suffix(a in 1u32..40, b in 1u32..40) {
        let text = format!("th {{ padding: {}px {}px !important; }}", a, b);
        let patch = Patch::regex("padding", r"(padding:\s*)\d+px \d+px(\s*!important;)", "${1}6px 4px${2}").unwrap();
        let mut doc = Document::new(text);

        doc.apply(&patch).unwrap();

        prop_assert_eq!(doc.as_str(), "th { padding: 6px 4px !important; }");
    }
}

#[test]
fn test_important_suffix_example() {
    let mut doc = Document::new("padding: 9px 14px !important;");
    let patch = Patch::regex("padding", r"(padding:\s*)9px 14px(\s*!important;)", "${1}6px 4px${2}").unwrap();
    doc.apply(&patch).unwrap();
    assert_eq!(doc.as_str(), "padding: 6px 4px !important;");
}
