//! Patch model
//!
//! A [`Patch`] pairs an [`Anchor`] (where to match) with a replacement. Patches
//! are authored either in code (the built-in sets) or in YAML via [`PatchDef`]:
//!
//! ```yaml
//! - name: th-padding
//!   literal: "padding: 9px 14px !important;"
//!   replace: "padding: 6px 4px !important;"
//!   mode: optional
//! - name: td-font-size
//!   regex: '(\.foundational-table td\s*\{[^}]*font-size:\s*)11px'
//!   replace: '${1}10px'
//! - name: scholastic-tbody
//!   span:
//!     start: "<tbody>"
//!     end: ["</tbody>"]
//!   replace: "<tbody>...</tbody>"
//! ```
//!
//! Regex replacements use the `regex` crate template syntax, so a literal `$`
//! (common in template-literal markup like `${C.navy}`) must be written `$$`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatchError;

/// Longest anchor excerpt shown in errors and listings
const ANCHOR_EXCERPT_LEN: usize = 60;

/// What happens when a patch's anchor is absent from the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Missing anchor aborts the whole batch
    #[default]
    Required,
    /// Missing anchor is treated as already applied
    Optional,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Required => write!(f, "required"),
            Mode::Optional => write!(f, "optional"),
        }
    }
}

/// Where a patch matches
#[derive(Debug, Clone)]
pub enum Anchor {
    /// Exact substring
    Literal(String),
    /// Regex with capture-group aware replacement
    Regex(Regex),
    /// From the first `start` up to the first of `ends` (tried in order) found after it
    Span { start: String, ends: Vec<String> },
}

impl Anchor {
    /// Short name of the anchor kind
    pub fn kind(&self) -> &'static str {
        match self {
            Anchor::Literal(_) => "literal",
            Anchor::Regex(_) => "regex",
            Anchor::Span { .. } => "span",
        }
    }

    /// One-line human description, truncated for long anchors
    pub fn describe(&self) -> String {
        match self {
            Anchor::Literal(text) => format!("literal {:?}", excerpt(text)),
            Anchor::Regex(re) => format!("regex /{}/", excerpt(re.as_str())),
            Anchor::Span { start, ends } => {
                let ends: Vec<String> = ends.iter().map(|e| format!("{:?}", excerpt(e))).collect();
                format!("span {:?} .. [{}]", excerpt(start), ends.join(", "))
            }
        }
    }
}

fn excerpt(text: &str) -> String {
    let line = text.trim().lines().next().unwrap_or("");
    if line.chars().count() > ANCHOR_EXCERPT_LEN {
        let cut: String = line.chars().take(ANCHOR_EXCERPT_LEN).collect();
        format!("{}...", cut)
    } else if line.len() < text.trim().len() {
        format!("{}...", line)
    } else {
        line.to_string()
    }
}

/// One atomic find/replace operation
#[derive(Debug, Clone)]
pub struct Patch {
    pub name: String,
    pub anchor: Anchor,
    pub replacement: String,
    pub mode: Mode,
    /// Replace at most this many matches (all when `None`)
    pub count: Option<usize>,
    /// Skip the patch when the document already contains this text
    pub unless_contains: Option<String>,
    /// Shape of the document this patch expects to find
    pub precondition: Option<String>,
}

impl Patch {
    fn new(name: impl Into<String>, anchor: Anchor, replacement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor,
            replacement: replacement.into(),
            mode: Mode::Required,
            count: None,
            unless_contains: None,
            precondition: None,
        }
    }

    /// Replace an exact substring
    pub fn literal(name: impl Into<String>, find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self::new(name, Anchor::Literal(find.into()), replace)
    }

    /// Substitute a regex; `replace` may reference capture groups
    pub fn regex(name: impl Into<String>, pattern: &str, replace: impl Into<String>) -> Result<Self, PatchError> {
        let name = name.into();
        debug!(%name, %pattern, "Patch::regex: compiling");
        let re = Regex::new(pattern).map_err(|source| PatchError::InvalidRegex {
            patch: name.clone(),
            source,
        })?;
        Ok(Self::new(name, Anchor::Regex(re), replace))
    }

    /// Replace everything from `start` up to the first matching end marker
    pub fn span<I, S>(name: impl Into<String>, start: impl Into<String>, ends: I, replace: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let anchor = Anchor::Span {
            start: start.into(),
            ends: ends.into_iter().map(Into::into).collect(),
        };
        Self::new(name, anchor, replace)
    }

    pub fn optional(mut self) -> Self {
        self.mode = Mode::Optional;
        self
    }

    pub fn required(mut self) -> Self {
        self.mode = Mode::Required;
        self
    }

    /// Limit the patch to the first `n` matches
    pub fn first(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    pub fn unless_contains(mut self, text: impl Into<String>) -> Self {
        self.unless_contains = Some(text.into());
        self
    }

    pub fn precondition(mut self, text: impl Into<String>) -> Self {
        self.precondition = Some(text.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.mode == Mode::Required
    }

    /// Reject patches that could never apply sensibly
    pub fn validate(&self) -> Result<(), PatchError> {
        let invalid = |reason: &str| PatchError::InvalidPatch {
            patch: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("patch name is empty"));
        }
        if self.count == Some(0) {
            return Err(invalid("count must be at least 1"));
        }
        match &self.anchor {
            Anchor::Literal(text) if text.is_empty() => Err(invalid("literal anchor is empty")),
            Anchor::Span { start, .. } if start.is_empty() => Err(invalid("span start is empty")),
            Anchor::Span { ends, .. } if ends.is_empty() || ends.iter().any(|e| e.is_empty()) => {
                Err(invalid("span needs at least one non-empty end marker"))
            }
            Anchor::Span { .. } if self.count.is_some() => Err(invalid("count does not apply to span anchors")),
            _ => Ok(()),
        }
    }
}

/// Span anchor as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpanDef {
    pub start: String,
    pub end: Vec<String>,
}

/// A patch as written in a YAML patch-set file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PatchDef {
    pub name: String,

    #[serde(default)]
    pub literal: Option<String>,

    #[serde(default)]
    pub regex: Option<String>,

    #[serde(default)]
    pub span: Option<SpanDef>,

    /// Replacement text (empty deletes the match)
    #[serde(default)]
    pub replace: String,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub count: Option<usize>,

    #[serde(default)]
    pub unless_contains: Option<String>,

    #[serde(default)]
    pub precondition: Option<String>,
}

impl TryFrom<PatchDef> for Patch {
    type Error = PatchError;

    fn try_from(def: PatchDef) -> Result<Self, Self::Error> {
        debug!(name = %def.name, "Patch::try_from: called");
        let mut patch = match (def.literal, def.regex, def.span) {
            (Some(find), None, None) => Patch::literal(def.name, find, def.replace),
            (None, Some(pattern), None) => Patch::regex(def.name, &pattern, def.replace)?,
            (None, None, Some(span)) => Patch::span(def.name, span.start, span.end, def.replace),
            (None, None, None) => {
                return Err(PatchError::InvalidPatch {
                    patch: def.name,
                    reason: "one of literal, regex or span is required".to_string(),
                });
            }
            _ => {
                return Err(PatchError::InvalidPatch {
                    patch: def.name,
                    reason: "only one of literal, regex or span may be given".to_string(),
                });
            }
        };

        patch.mode = def.mode;
        patch.count = def.count;
        patch.unless_contains = def.unless_contains;
        patch.precondition = def.precondition;
        patch.validate()?;
        Ok(patch)
    }
}
