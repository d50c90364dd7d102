use rune_cssom::KeyframeRule;
use serde::Serialize;

use crate::declarations::{DeclarationMap, parse_declarations};

/// Snapshot of one keyframe step: its selector and parsed declarations.
///
/// Steps are never edited in place; [`crate::KeyframeAnimation::set_step`]
/// replaces the live rule and re-indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyframeStep {
    selector: String,
    declarations: DeclarationMap,
}

impl KeyframeStep {
    pub fn from_rule(rule: &KeyframeRule) -> Self {
        Self {
            selector: rule.key_text().to_string(),
            declarations: parse_declarations(rule.style()),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn declarations(&self) -> &DeclarationMap {
        &self.declarations
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations.get(property).map(String::as_str)
    }
}
