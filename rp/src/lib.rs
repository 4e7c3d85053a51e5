//! reportpatch - ordered, anchor-checked edits to the report-card template
//!
//! The template is treated as an opaque text document. An edit is a
//! [`PatchSet`]: an explicit ordered list of [`Patch`]es, each with an anchor
//! (literal, regex or span) and a replacement. Required anchors that are
//! missing abort the whole batch before anything is written; optional ones
//! are no-ops.
//!
//! # Example
//!
//! ```no_run
//! use reportpatch::{Patch, apply_patches};
//!
//! let patches = vec![
//!     Patch::literal("th-padding", "padding: 9px 14px !important;", "padding: 6px 4px !important;").optional(),
//!     Patch::regex(
//!         "td-font-size",
//!         r"(\.foundational-table td\s*\{[^}]*font-size:\s*)11px",
//!         "${1}10px",
//!     )?,
//! ];
//! let result = apply_patches("app/components/reports/ReportTemplate_III_VIII.tsx", &patches)?;
//! println!("{} applied", result.applied_count());
//! # Ok::<(), reportpatch::PatchError>(())
//! ```

pub mod cli;
pub mod config;
pub mod diff;
mod document;
mod error;
mod patch;
mod patcher;
pub mod patchset;

pub use document::{Document, PatchOutcome, PatchReport, Probe, SkipReason};
pub use error::PatchError;
pub use patch::{Anchor, Mode, Patch, PatchDef, SpanDef};
pub use patcher::{PatchResult, Preview, apply_patches, preview_patches, read_document};
pub use patchset::{PatchSet, PatchSetLoader, SetSource};
