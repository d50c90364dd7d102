//! The document: an ordered set of attached stylesheets plus the resources
//! `@import` and `<link>` can resolve against.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rune_config::CssomConfig;

use crate::parser;
use crate::sheet::{SheetRef, StyleSheet};

/// Shared handle to a document.
pub type DocumentRef = Rc<RefCell<Document>>;

/// Capabilities of the stylesheet host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFeatures {
    /// Unprefixed `@keyframes` rules are accepted.
    pub standard_keyframes: bool,
    /// Deepest `@import` chain that gets loaded.
    pub max_import_depth: usize,
}

impl Default for HostFeatures {
    fn default() -> Self {
        Self {
            standard_keyframes: true,
            max_import_depth: 16,
        }
    }
}

impl HostFeatures {
    pub fn from_config(config: &CssomConfig) -> Self {
        Self {
            standard_keyframes: config.standard_keyframes,
            max_import_depth: config.max_import_depth,
        }
    }
}

/// Where a stylesheet resource was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOrigin {
    SameOrigin,
    /// Loaded fine, but its rule list cannot be read.
    CrossOrigin,
}

#[derive(Debug, Clone)]
struct Resource {
    css: String,
    origin: ResourceOrigin,
}

#[derive(Debug, Default)]
pub struct Document {
    sheets: Vec<SheetRef>,
    resources: HashMap<String, Resource>,
    features: HostFeatures,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(features: HostFeatures) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    pub fn into_ref(self) -> DocumentRef {
        Rc::new(RefCell::new(self))
    }

    pub fn features(&self) -> HostFeatures {
        self.features
    }

    /// Attached sheets in document order.
    pub fn style_sheets(&self) -> &[SheetRef] {
        &self.sheets
    }

    /// Make `href` resolvable by `@import` and [`Document::link_style_sheet`].
    pub fn register_resource(
        &mut self,
        href: impl Into<String>,
        css: impl Into<String>,
        origin: ResourceOrigin,
    ) {
        self.resources.insert(
            href.into(),
            Resource {
                css: css.into(),
                origin,
            },
        );
    }

    /// Attach an inline sheet (`<style>` contents).
    pub fn add_style_sheet(&mut self, css: &str) -> SheetRef {
        let resources = &self.resources;
        let features = self.features;
        let resolve = |href: &str| load_sheet(resources, &features, href, 1);
        let rules = parser::parse_stylesheet_rules(css, &features, &resolve);
        let sheet = StyleSheet::from_parts(None, true, rules, features).into_ref();
        self.sheets.push(Rc::clone(&sheet));
        sheet
    }

    /// Attach the sheet registered under `href` (`<link rel="stylesheet">`).
    pub fn link_style_sheet(&mut self, href: &str) -> Option<SheetRef> {
        let sheet = load_sheet(&self.resources, &self.features, href, 0)?;
        self.sheets.push(Rc::clone(&sheet));
        Some(sheet)
    }

    /// Attach a fresh, empty sheet.
    pub fn create_style_sheet(&mut self) -> SheetRef {
        let sheet = StyleSheet::new(self.features).into_ref();
        self.sheets.push(Rc::clone(&sheet));
        sheet
    }

    /// Detach `sheet` and every keyframe-group rule it holds.
    pub fn remove_style_sheet(&mut self, sheet: &SheetRef) -> bool {
        let Some(pos) = self.sheets.iter().position(|s| Rc::ptr_eq(s, sheet)) else {
            return false;
        };
        let removed = self.sheets.remove(pos);
        removed.borrow_mut().detach();
        true
    }
}

fn load_sheet(
    resources: &HashMap<String, Resource>,
    features: &HostFeatures,
    href: &str,
    depth: usize,
) -> Option<SheetRef> {
    if depth > features.max_import_depth {
        tracing::warn!(href = %href, depth, "import depth exceeded, sheet not loaded");
        return None;
    }
    let Some(resource) = resources.get(href) else {
        tracing::debug!(href = %href, "no resource registered for stylesheet");
        return None;
    };
    let resolve = |child: &str| load_sheet(resources, features, child, depth + 1);
    let rules = parser::parse_stylesheet_rules(&resource.css, features, &resolve);
    let origin_clean = resource.origin == ResourceOrigin::SameOrigin;
    Some(StyleSheet::from_parts(Some(href.to_string()), origin_clean, rules, *features).into_ref())
}
