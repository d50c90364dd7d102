//! Stylesheets: ordered rule lists with CSSOM insertion and deletion.

use std::cell::RefCell;
use std::rc::Rc;

use crate::document::HostFeatures;
use crate::error::{CssomError, Result};
use crate::parser;
use crate::rule::{CssRule, KeyframesRef, RuleKind};

/// Shared handle to a stylesheet.
pub type SheetRef = Rc<RefCell<StyleSheet>>;

#[derive(Debug, Clone)]
pub struct StyleSheet {
    href: Option<String>,
    origin_clean: bool,
    rules: Vec<CssRule>,
    features: HostFeatures,
    attached: bool,
}

impl StyleSheet {
    /// An empty, origin-clean sheet.
    pub fn new(features: HostFeatures) -> Self {
        Self {
            href: None,
            origin_clean: true,
            rules: Vec::new(),
            features,
            attached: true,
        }
    }

    /// Parse sheet text without resolving imports. Unparsable rules are skipped.
    pub fn parse(css: &str, features: HostFeatures) -> Self {
        let rules = parser::parse_stylesheet_rules(css, &features, &parser::no_imports);
        Self {
            rules,
            ..Self::new(features)
        }
    }

    pub(crate) fn from_parts(
        href: Option<String>,
        origin_clean: bool,
        rules: Vec<CssRule>,
        features: HostFeatures,
    ) -> Self {
        Self {
            href,
            origin_clean,
            rules,
            features,
            attached: true,
        }
    }

    pub fn into_ref(self) -> SheetRef {
        Rc::new(RefCell::new(self))
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// False for sheets loaded from another origin.
    pub fn is_origin_clean(&self) -> bool {
        self.origin_clean
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The rule list; denied for cross-origin sheets.
    pub fn css_rules(&self) -> Result<&[CssRule]> {
        self.check_access()?;
        Ok(&self.rules)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.css_rules()?.len())
    }

    /// Keyframe-group rule at `index`, if that rule is one.
    pub fn keyframes_at(&self, index: usize) -> Result<Option<KeyframesRef>> {
        Ok(self
            .css_rules()?
            .get(index)
            .and_then(CssRule::as_keyframes)
            .cloned())
    }

    /// Parse `text` as a single rule and insert it before `index`.
    pub fn insert_rule(&mut self, text: &str, index: usize) -> Result<usize> {
        self.check_access()?;
        let len = self.rules.len();
        if index > len {
            return Err(CssomError::IndexSize { index, len });
        }
        let rule = parser::parse_single_rule(text, &self.features, &parser::no_imports)?;
        self.check_hierarchy(&rule, index)?;
        self.rules.insert(index, rule);
        Ok(index)
    }

    /// Remove the rule at `index`. A removed keyframe-group rule is detached.
    pub fn delete_rule(&mut self, index: usize) -> Result<()> {
        self.check_access()?;
        let len = self.rules.len();
        if index >= len {
            return Err(CssomError::IndexSize { index, len });
        }
        let removed = self.rules.remove(index);
        detach_rule(&removed);
        Ok(())
    }

    /// Mark this sheet and every keyframe-group rule reachable from it detached.
    pub(crate) fn detach(&mut self) {
        self.attached = false;
        for rule in &self.rules {
            detach_rule(rule);
        }
    }

    fn check_access(&self) -> Result<()> {
        if self.origin_clean {
            Ok(())
        } else {
            Err(CssomError::Security {
                href: self.href.clone(),
            })
        }
    }

    fn check_hierarchy(&self, rule: &CssRule, index: usize) -> Result<()> {
        let is_import = rule.kind() == RuleKind::Import;
        let after_other = self.rules[..index]
            .iter()
            .any(|r| r.kind() != RuleKind::Import);
        let before_import = self.rules[index..]
            .iter()
            .any(|r| r.kind() == RuleKind::Import);
        if is_import && after_other {
            return Err(CssomError::HierarchyRequest(
                "@import must precede all other rules".to_string(),
            ));
        }
        if !is_import && before_import {
            return Err(CssomError::HierarchyRequest(
                "rules cannot be inserted before an @import".to_string(),
            ));
        }
        Ok(())
    }
}

fn detach_rule(rule: &CssRule) {
    match rule {
        CssRule::Keyframes(keyframes) => keyframes.borrow_mut().detach(),
        CssRule::Import(import) => {
            if let Some(sheet) = &import.style_sheet {
                sheet.borrow_mut().detach();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_rules() {
        let mut sheet = StyleSheet::new(HostFeatures::default());
        assert_eq!(sheet.insert_rule(".a { color: red; }", 0).unwrap(), 0);
        assert_eq!(sheet.insert_rule("@keyframes fade {}", 1).unwrap(), 1);
        assert_eq!(sheet.len().unwrap(), 2);

        let fade = sheet.keyframes_at(1).unwrap().unwrap();
        assert!(fade.borrow().is_attached());
        assert!(sheet.keyframes_at(0).unwrap().is_none());

        sheet.delete_rule(1).unwrap();
        assert!(!fade.borrow().is_attached());
        assert_eq!(
            sheet.delete_rule(5).unwrap_err(),
            CssomError::IndexSize { index: 5, len: 1 }
        );
    }

    #[test]
    fn insert_rejects_bad_index_and_text() {
        let mut sheet = StyleSheet::new(HostFeatures::default());
        assert!(matches!(
            sheet.insert_rule(".a {}", 3),
            Err(CssomError::IndexSize { index: 3, len: 0 })
        ));
        assert!(sheet.insert_rule("not a rule", 0).unwrap_err().is_syntax_error());
        assert!(sheet.insert_rule("", 0).is_err());
    }

    #[test]
    fn import_ordering_is_enforced() {
        let mut sheet = StyleSheet::parse("@import url(a.css); .a { color: red; }", HostFeatures::default());
        assert!(matches!(
            sheet.insert_rule("@import url(b.css);", 2),
            Err(CssomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            sheet.insert_rule(".b {}", 0),
            Err(CssomError::HierarchyRequest(_))
        ));
        assert_eq!(sheet.insert_rule("@import url(b.css);", 1).unwrap(), 1);
    }

    #[test]
    fn cross_origin_sheet_denies_access() {
        let mut sheet = StyleSheet::from_parts(
            Some("https://cdn.example/x.css".to_string()),
            false,
            Vec::new(),
            HostFeatures::default(),
        );
        let err = sheet.css_rules().unwrap_err();
        assert!(err.is_security_error());
        assert!(sheet.insert_rule(".a {}", 0).unwrap_err().is_security_error());
        assert!(sheet.delete_rule(0).unwrap_err().is_security_error());
    }

    #[test]
    fn detach_reaches_keyframes() {
        let mut sheet = StyleSheet::parse("@keyframes a { to { top: 0 } }", HostFeatures::default());
        let rule = sheet.keyframes_at(0).unwrap().unwrap();
        sheet.detach();
        assert!(!sheet.is_attached());
        assert!(!rule.borrow().is_attached());
    }
}
