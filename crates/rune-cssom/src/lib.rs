//! In-memory stylesheet object model.
//!
//! Models the parts of the browser CSSOM that keyframe tooling relies on:
//! documents holding ordered stylesheets, rule lists with index-based
//! `insert_rule`/`delete_rule`, `@import` chains, cross-origin sheets whose
//! rule lists cannot be read, and keyframe-group rules (standard and
//! vendor-prefixed) with `append_rule`/`delete_rule` on their steps.

#![allow(clippy::all)]

mod document;
mod error;
mod parser;
mod rule;
mod sheet;

pub use document::{Document, DocumentRef, HostFeatures, ResourceOrigin};
pub use error::{CssomError, Result};
pub use rule::{
    CssRule, ImportRule, KeyframeRule, KeyframesRef, KeyframesRule, RuleKind, StyleRule,
    VendorPrefix, normalize_key_text,
};
pub use sheet::{SheetRef, StyleSheet};
