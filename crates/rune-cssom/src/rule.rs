//! Rule types held by a stylesheet.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{CssomError, Result};
use crate::parser;
use crate::sheet::SheetRef;

/// Shared handle to a keyframe-group rule.
pub type KeyframesRef = Rc<RefCell<KeyframesRule>>;

/// Vendor prefix carried by a non-standard keyframe-group rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorPrefix {
    Webkit,
    Moz,
}

impl VendorPrefix {
    /// Prefix as written in rule text, e.g. `-webkit-`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webkit => "-webkit-",
            Self::Moz => "-moz-",
        }
    }

    /// Parse a prefix name, with or without the surrounding dashes.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim_matches('-').to_ascii_lowercase().as_str() {
            "webkit" => Some(Self::Webkit),
            "moz" => Some(Self::Moz),
            _ => None,
        }
    }
}

impl fmt::Display for VendorPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant tag of a rule, resolved once from the rule itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Style,
    Import,
    Keyframes,
    PrefixedKeyframes(VendorPrefix),
    Other,
}

/// A top-level rule inside a stylesheet.
#[derive(Debug, Clone)]
pub enum CssRule {
    Style(StyleRule),
    Import(ImportRule),
    Keyframes(KeyframesRef),
    /// Any other at-rule, kept verbatim.
    Other(String),
}

impl CssRule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Style(_) => RuleKind::Style,
            Self::Import(_) => RuleKind::Import,
            Self::Keyframes(rule) => match rule.borrow().prefix() {
                Some(prefix) => RuleKind::PrefixedKeyframes(prefix),
                None => RuleKind::Keyframes,
            },
            Self::Other(_) => RuleKind::Other,
        }
    }

    pub fn as_keyframes(&self) -> Option<&KeyframesRef> {
        match self {
            Self::Keyframes(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn css_text(&self) -> String {
        match self {
            Self::Style(rule) => rule.css_text(),
            Self::Import(rule) => rule.css_text(),
            Self::Keyframes(rule) => rule.borrow().css_text(),
            Self::Other(text) => text.clone(),
        }
    }
}

/// A plain style rule (`selector { declarations }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector_text: String,
    pub style: String,
}

impl StyleRule {
    pub fn css_text(&self) -> String {
        block_text(&self.selector_text, &self.style)
    }
}

/// An `@import` rule and the sheet it resolved to, if any.
#[derive(Debug, Clone)]
pub struct ImportRule {
    pub href: String,
    pub style_sheet: Option<SheetRef>,
}

impl ImportRule {
    pub fn css_text(&self) -> String {
        format!("@import url(\"{}\");", self.href)
    }
}

/// One keyframe step inside a keyframe-group rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframeRule {
    key_text: String,
    style: String,
}

impl KeyframeRule {
    /// Parse `"<keys> { <declarations> }"`.
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse_keyframe_rule(text)
    }

    pub(crate) fn new(key_text: String, style: String) -> Self {
        Self { key_text, style }
    }

    /// Normalized key selector, e.g. `0%` or `from, 50%`.
    pub fn key_text(&self) -> &str {
        &self.key_text
    }

    /// Raw flat declaration text of the step.
    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn css_text(&self) -> String {
        block_text(&self.key_text, &self.style)
    }
}

/// A keyframe-group rule (`@keyframes name { ... }` or a prefixed form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframesRule {
    name: String,
    prefix: Option<VendorPrefix>,
    rules: Vec<KeyframeRule>,
    generation: u64,
    attached: bool,
}

impl KeyframesRule {
    pub fn new(name: impl Into<String>, prefix: Option<VendorPrefix>) -> Self {
        Self {
            name: name.into(),
            prefix,
            rules: Vec::new(),
            generation: 0,
            attached: true,
        }
    }

    pub(crate) fn with_rules(
        name: impl Into<String>,
        prefix: Option<VendorPrefix>,
        rules: Vec<KeyframeRule>,
    ) -> Self {
        Self {
            rules,
            ..Self::new(name, prefix)
        }
    }

    pub fn into_ref(self) -> KeyframesRef {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<VendorPrefix> {
        self.prefix
    }

    pub fn css_rules(&self) -> &[KeyframeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Bumped on every successful mutation of the step list.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once the rule was deleted from its sheet or its sheet was removed.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn detach(&mut self) {
        self.attached = false;
    }

    /// Append a step parsed from `"<keys> { <declarations> }"`.
    pub fn append_rule(&mut self, text: &str) -> Result<()> {
        let rule = parser::parse_keyframe_rule(text)?;
        self.rules.push(rule);
        self.generation += 1;
        Ok(())
    }

    /// Delete the last step whose key selector matches `select`.
    ///
    /// No match is not an error; an unparsable selector is.
    pub fn delete_rule(&mut self, select: &str) -> Result<()> {
        let key = normalize_key_text(select)?;
        if let Some(pos) = self.rules.iter().rposition(|r| r.key_text == key) {
            self.rules.remove(pos);
            self.generation += 1;
        }
        Ok(())
    }

    /// Last step whose key selector matches `select`.
    pub fn find_rule(&self, select: &str) -> Option<&KeyframeRule> {
        let key = normalize_key_text(select).ok()?;
        self.rules.iter().rev().find(|r| r.key_text == key)
    }

    pub fn css_text(&self) -> String {
        let prefix = self.prefix.map(|p| p.as_str()).unwrap_or("");
        let mut out = format!("@{}keyframes {} {{", prefix, self.name);
        for rule in &self.rules {
            out.push(' ');
            out.push_str(&rule.css_text());
        }
        out.push_str(" }");
        out
    }
}

/// Normalize a keyframe selector list.
///
/// Every comma-separated key must be `from`, `to` or a percentage in
/// `[0%, 100%]`. Keys are lower-cased and joined with `", "`.
pub fn normalize_key_text(text: &str) -> Result<String> {
    let mut keys = Vec::new();
    for raw in text.split(',') {
        let key = raw.trim().to_ascii_lowercase();
        let valid = match key.as_str() {
            "from" | "to" => true,
            _ => key
                .strip_suffix('%')
                .and_then(|n| n.parse::<f32>().ok())
                .is_some_and(|n| (0.0..=100.0).contains(&n)),
        };
        if !valid {
            return Err(CssomError::syntax(format!(
                "invalid keyframe selector `{}`",
                text.trim()
            )));
        }
        keys.push(key);
    }
    Ok(keys.join(", "))
}

fn block_text(prelude: &str, body: &str) -> String {
    if body.is_empty() {
        format!("{} {{ }}", prelude)
    } else {
        format!("{} {{ {} }}", prelude, body)
    }
}
