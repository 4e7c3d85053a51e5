//! Built-in patch sets for the grade III-VIII report template
//!
//! Each set reproduces one maintenance edit. They were authored against a
//! template evolving in this order, so each expects the shape the previous
//! one leaves behind:
//!
//! 1. `merge-co-scholastic`
//! 2. `paginate`
//! 3. `compact-scholastic`
//! 4. `fix-css-footer`
//! 5. `expand-scholastic`
//!
//! `make-gold` and `remove-gold` are standalone toggles.

use tracing::debug;

use super::PatchSet;
use crate::error::PatchError;
use crate::patch::Patch;

/// Default target path, relative to the web app root
pub const DEFAULT_TARGET: &str = "app/components/reports/ReportTemplate_III_VIII.tsx";

/// Names of the built-in sets, in authoring order
pub const BUILTIN_NAMES: &[&str] = &[
    "merge-co-scholastic",
    "paginate",
    "compact-scholastic",
    "fix-css-footer",
    "expand-scholastic",
    "make-gold",
    "remove-gold",
];

const SCHOLASTIC_PADDING_OLD: &str = include_str!("fragments/scholastic_padding_old.tsx");
const SCHOLASTIC_PADDING_NEW: &str = include_str!("fragments/scholastic_padding_new.tsx");
const SCHOLASTIC_CSS: &str = include_str!("fragments/scholastic_css.tsx");
const SCHOLASTIC_FOOTER_OLD: &str = include_str!("fragments/scholastic_footer_old.tsx");
const SCHOLASTIC_FOOTER_NEW: &str = include_str!("fragments/scholastic_footer_new.tsx");
const SCHOLASTIC_TBODY: &str = include_str!("fragments/scholastic_tbody.tsx");
const CO_SCHOLASTIC_MERGED: &str = include_str!("fragments/co_scholastic_merged.tsx");
const CO_SCHOLASTIC_CONTINUED: &str = include_str!("fragments/co_scholastic_continued.tsx");
const PERSONALITY_HEADER: &str = include_str!("fragments/personality_header.tsx");
const PAGE_BREAK: &str = include_str!("fragments/page_break.tsx");
const HIDDEN_HEADER: &str = include_str!("fragments/hidden_header.tsx");
const PRINT_PAGE_BREAK_CSS: &str = include_str!("fragments/print_page_break.css");

const FINAL_RESULT: &str = "<th rowSpan={2}>Final Result<br/>(Avg)</th>";
const FINAL_RESULT_GOLD: &str = "<th rowSpan={2} className=\"gold-bg\">Final Result<br/>(Avg)</th>";
const FINAL_RESULT_SPACED: &str = "<th rowSpan={2}>Final Result<br />(Avg)</th>";
const FINAL_RESULT_SPACED_GOLD: &str = "<th rowSpan={2} className=\"gold-bg\">Final Result<br />(Avg)</th>";

const STYLE_CLOSE: &str = "    `}</style>";
const MEDIA_PRINT: &str = "        @media print {";
const FOUNDATIONAL_TABLE: &str = "<table className=\"foundational-table\">";
const SCHOLASTIC_TABLE: &str = "<table className=\"foundational-table scholastic-table\">";

const SCHOLASTIC_TBODY_START: &str = "<tbody>\n                                    {reportData.subjects?.map((sub: any) => {";
const SCHOLASTIC_END_BEFORE_PAGE_BREAK: &str = "</tbody>\n                            </table>\n                        </div>\n                    </div>\n\n                    {/* ---> PAGE BREAK <--- */}";
const SCHOLASTIC_END_BEFORE_CO_SCHOLASTIC: &str = "</tbody>\n                            </table>\n                        </div>\n                    </div>\n\n                    {/* CO-SCHOLASTIC DOMAINS */}";
const CONTINUED_TBODY: &str = "<tbody>\n                                    {/* Performing";

/// Escape `$` so text is inserted verbatim by a regex replacement
fn verbatim(text: &str) -> String {
    text.replace('$', "$$")
}

/// Regex that rewrites one numeric value inside a `.foundational-table` rule
///
/// `selector` is the regex-escaped selector after `.foundational-table`.
fn rule_value(name: &str, selector: &str, property: &str, from: &str, to: &str) -> Result<Patch, PatchError> {
    let pattern = format!(r"(\.foundational-table {}\s*\{{[^}}]*{}:\s*){}", selector, property, from);
    Patch::regex(name, &pattern, format!("${{1}}{}", to))
}

/// Page-break wrapper inserted before a `{/* MARKER */}` comment
fn page_break_before(name: &str, marker: &str) -> Result<Patch, PatchError> {
    let pattern = format!(r"(\{{/\* {} \*/\}})", regex::escape(marker));
    Ok(Patch::regex(name, &pattern, format!("{}${{1}}", verbatim(PAGE_BREAK)))?
        .optional()
        .precondition(format!("`{{/* {} */}}` marks where the new page starts", marker)))
}

fn make_gold_patches() -> Vec<Patch> {
    vec![
        Patch::literal("final-result-gold", FINAL_RESULT, FINAL_RESULT_GOLD)
            .optional()
            .precondition("Final Result header written as <br/> without gold-bg"),
        Patch::literal("final-result-gold-spaced", FINAL_RESULT_SPACED, FINAL_RESULT_SPACED_GOLD)
            .optional()
            .precondition("Final Result header written as <br /> without gold-bg"),
    ]
}

fn remove_gold_patches() -> Vec<Patch> {
    vec![
        Patch::literal("final-result-plain-spaced", FINAL_RESULT_SPACED_GOLD, FINAL_RESULT_SPACED)
            .optional()
            .precondition("Final Result header written as <br /> with gold-bg"),
        Patch::literal("final-result-plain", FINAL_RESULT_GOLD, FINAL_RESULT)
            .optional()
            .precondition("Final Result header written as <br/> with gold-bg"),
    ]
}

/// Look up a built-in set by name
pub fn get_builtin(name: &str) -> Result<Option<PatchSet>, PatchError> {
    debug!(%name, "get_builtin: called");
    let set = match name {
        "merge-co-scholastic" => merge_co_scholastic()?,
        "paginate" => paginate()?,
        "compact-scholastic" => compact_scholastic()?,
        "fix-css-footer" => fix_css_footer()?,
        "expand-scholastic" => expand_scholastic(),
        "make-gold" => make_gold(),
        "remove-gold" => remove_gold(),
        _ => {
            debug!(%name, "get_builtin: no match found");
            return Ok(None);
        }
    };
    Ok(Some(set))
}

/// All built-in sets in authoring order
pub fn all_builtins() -> Result<Vec<PatchSet>, PatchError> {
    BUILTIN_NAMES
        .iter()
        .filter_map(|name| get_builtin(name).transpose())
        .collect()
}

/// Taller scholastic rows and a gold Final Result header
pub fn expand_scholastic() -> PatchSet {
    let mut patches = vec![
        Patch::literal("scholastic-row-padding", SCHOLASTIC_PADDING_OLD, SCHOLASTIC_PADDING_NEW)
            .optional()
            .precondition("scholastic-table rule sets only left/right padding"),
    ];
    patches.extend(make_gold_patches());

    PatchSet::new(
        "expand-scholastic",
        "Add vertical padding to scholastic cells and make the Final Result header gold",
        patches,
    )
    .with_message("Expanded Scholastic Rows successfully.")
}

/// Restore foundational table sizing, compress only the scholastic table, slim the footer
pub fn fix_css_footer() -> Result<PatchSet, PatchError> {
    let patches = vec![
        rule_value("td-font-size", "td", "font-size", "10px", "11px")?.optional(),
        rule_value("th-font-size", "th", "font-size", r"9\.5px", "10.5px")?.optional(),
        rule_value("td-padding", "td", "padding", r"4px 4px\s*!important", "6px 10px !important")?.optional(),
        rule_value("th-padding", "th", "padding", r"6px 4px\s*!important", "9px 14px !important")?.optional(),
        rule_value(
            "domain-header-padding",
            r"tr\.domain-header td",
            "padding",
            r"6px 14px\s*!important",
            "10px 14px !important",
        )?
        .optional(),
        Patch::literal("scholastic-css", STYLE_CLOSE, format!("{}{}", SCHOLASTIC_CSS, STYLE_CLOSE))
            .optional()
            .unless_contains(".scholastic-table")
            .precondition("inline <style> block closes with four-space indented `}</style>"),
        Patch::literal("scholastic-table-class", FOUNDATIONAL_TABLE, SCHOLASTIC_TABLE)
            .optional()
            .first(1)
            .precondition("the first foundational table is the scholastic one"),
        Patch::literal("scholastic-footer", SCHOLASTIC_FOOTER_OLD, SCHOLASTIC_FOOTER_NEW)
            .optional()
            .precondition("scholastic footer shows per-term Grand Total and Percentage rows"),
    ];

    Ok(PatchSet::new(
        "fix-css-footer",
        "Restore foundational table CSS, compress only the scholastic table, keep totals under Final Result",
        patches,
    )
    .with_message("Fixed CSS and Scholastic Layout successfully."))
}

/// Merge the split co-scholastic sections and align the personality header
pub fn merge_co_scholastic() -> Result<PatchSet, PatchError> {
    let patches = vec![
        Patch::regex(
            "co-scholastic-merge",
            r"(?s)([ \t]*\{/\* PHYSICAL EDUCATION \(Split from Co-Scholastic\) \*/\}.*?)\{/\* PERSONALITY DEVELOPMENT SKILLS \*/\}",
            verbatim(CO_SCHOLASTIC_MERGED),
        )?
        .required()
        .precondition("split Physical Education section precedes the Personality Development comment"),
        Patch::regex(
            "personality-header",
            r#"(?s)\{/\* PERSONALITY DEVELOPMENT SKILLS \*/\}(.*?<table className="foundational-table">\s*)<thead>(.*?)</thead>"#,
            format!("{{/* PERSONALITY DEVELOPMENT SKILLS */}}${{1}}{}", verbatim(PERSONALITY_HEADER)),
        )?
        .required()
        .precondition("Personality Development section holds a foundational table with a thead"),
    ];

    Ok(PatchSet::new(
        "merge-co-scholastic",
        "Merge the split co-scholastic sections into one table and align the personality header",
        patches,
    )
    .with_message("Code successfully replaced!"))
}

/// Plain Final Result header, tighter cells and a totals footer in the scholastic table
pub fn compact_scholastic() -> Result<PatchSet, PatchError> {
    let mut patches = remove_gold_patches();
    patches.extend([
        Patch::literal("th-padding", "padding: 9px 14px !important;", "padding: 6px 4px !important;").optional(),
        Patch::literal("td-padding", "padding: 6px 10px !important;", "padding: 4px 4px !important;").optional(),
        rule_value("td-font-size", "td", "font-size", "11px", "10px")?.optional(),
        rule_value("th-font-size", "th", "font-size", r"10\.5px", "9.5px")?.optional(),
        Patch::span(
            "scholastic-tbody",
            SCHOLASTIC_TBODY_START,
            [
                SCHOLASTIC_END_BEFORE_PAGE_BREAK,
                SCHOLASTIC_END_BEFORE_CO_SCHOLASTIC,
                "</tbody>",
            ],
            SCHOLASTIC_TBODY,
        )
        .required()
        .precondition("scholastic tbody maps reportData.subjects directly"),
        Patch::literal(
            "subjects-column-width",
            "<th rowSpan={2} style={{ width: '18%' }}>Subjects</th>",
            "<th rowSpan={2} style={{ width: '15%' }}>Subjects</th>",
        )
        .optional(),
    ]);

    Ok(PatchSet::new(
        "compact-scholastic",
        "Drop the gold header, tighten table cells and add Grand Total and Percentage rows",
        patches,
    )
    .with_message("Updated scholastic tables and computations!"))
}

/// Split the report into printed pages
pub fn paginate() -> Result<PatchSet, PatchError> {
    let patches = vec![
        page_break_before("scholastic-page-break", "SCHOLASTIC DOMAINS")?,
        Patch::regex(
            "co-scholastic-split",
            r"(\{/\* Performing Art - Dance \*/\})",
            format!("{}${{1}}", verbatim(CO_SCHOLASTIC_CONTINUED)),
        )?
        .optional()
        .precondition("merged co-scholastic table lists Performing Art - Dance after Visual Art"),
        Patch::literal("continued-column-sizing", CONTINUED_TBODY, HIDDEN_HEADER)
            .optional()
            .precondition("continued co-scholastic tbody opens with the Performing Art comment"),
        page_break_before("feedback-page-break", "FEEDBACK SECTIONS")?,
        page_break_before("grading-page-break", "GRADING FRAMEWORK")?,
        Patch::literal("print-page-break-rule", MEDIA_PRINT, PRINT_PAGE_BREAK_CSS)
            .optional()
            .precondition("inline styles contain an eight-space indented @media print block"),
    ];

    Ok(PatchSet::new(
        "paginate",
        "Insert print page breaks: scholastic, co-scholastic split, feedback, grading",
        patches,
    )
    .with_message("Code paginated successfully."))
}

/// Add gold-bg to the Final Result header
pub fn make_gold() -> PatchSet {
    PatchSet::new("make-gold", "Make the Final Result header gold", make_gold_patches())
        .with_message("Final Result header is gold.")
}

/// Remove gold-bg from the Final Result header
pub fn remove_gold() -> PatchSet {
    PatchSet::new("remove-gold", "Remove the gold background from the Final Result header", remove_gold_patches())
        .with_message("Final Result header is plain.")
}
