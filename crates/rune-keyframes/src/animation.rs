//! A keyframe-group rule presented as an indexed, editable animation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rune_cssom::{KeyframesRef, VendorPrefix, normalize_key_text};

use crate::declarations::{DeclarationMap, serialize_step};
use crate::error::Result;
use crate::step::KeyframeStep;

/// Shared handle to an animation held by the registry.
pub type AnimationHandle = Rc<RefCell<KeyframeAnimation>>;

/// Index over the steps of one live keyframe-group rule.
///
/// `steps` and the selector index are a cache over the live rule. The cache
/// records the rule generation it was built from; any mutation of the rule
/// that did not go through [`KeyframeAnimation::reindex`] makes it stale.
#[derive(Debug)]
pub struct KeyframeAnimation {
    name: String,
    rule: KeyframesRef,
    steps: Vec<KeyframeStep>,
    // selector -> position in `steps`; later duplicates overwrite earlier ones
    index: HashMap<String, usize>,
    indexed_generation: Option<u64>,
}

impl KeyframeAnimation {
    /// Wrap a live rule and index its steps.
    pub fn new(rule: KeyframesRef) -> Self {
        let name = rule.borrow().name().to_string();
        let mut animation = Self {
            name,
            rule,
            steps: Vec::new(),
            index: HashMap::new(),
            indexed_generation: None,
        };
        animation.reindex();
        animation
    }

    pub fn into_handle(self) -> AnimationHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The live rule backing this animation.
    pub fn rule(&self) -> &KeyframesRef {
        &self.rule
    }

    pub fn vendor_prefix(&self) -> Option<VendorPrefix> {
        self.rule.borrow().prefix()
    }

    /// Selectors in step order, as last indexed.
    pub fn selectors(&self) -> Vec<&str> {
        self.steps.iter().map(KeyframeStep::selector).collect()
    }

    pub fn steps(&self) -> &[KeyframeStep] {
        &self.steps
    }

    /// Step for `selector`, matched verbatim or by normalized key text.
    pub fn step(&self, selector: &str) -> Option<&KeyframeStep> {
        let pos = match self.index.get(selector) {
            Some(pos) => *pos,
            None => {
                let key = normalize_key_text(selector).ok()?;
                *self.index.get(&key)?
            }
        };
        self.steps.get(pos)
    }

    /// Append a step to the live rule and rebuild the index.
    ///
    /// An existing step with the same selector is not removed; the index
    /// resolves to whichever the rule lists last. On failure the index is
    /// left untouched.
    pub fn set_step(&mut self, selector: &str, declarations: &DeclarationMap) -> Result<()> {
        let text = serialize_step(selector, declarations);
        self.rule.borrow_mut().append_rule(&text)?;
        self.reindex();
        Ok(())
    }

    /// Delete every indexed step from the live rule.
    ///
    /// Afterwards the animation reports no steps and is stale until the next
    /// [`KeyframeAnimation::reindex`]. A failed deletion aborts the loop with
    /// the steps deleted so far already gone.
    pub fn clear(&mut self) -> Result<()> {
        {
            let mut rule = self.rule.borrow_mut();
            for step in &self.steps {
                rule.delete_rule(step.selector())?;
            }
        }
        self.steps.clear();
        self.index.clear();
        self.indexed_generation = None;
        Ok(())
    }

    /// Rebuild steps and index from the live rule, in rule order.
    pub fn reindex(&mut self) {
        let rule = self.rule.borrow();
        self.steps = rule.css_rules().iter().map(KeyframeStep::from_rule).collect();
        self.index = self
            .steps
            .iter()
            .enumerate()
            .map(|(pos, step)| (step.selector().to_string(), pos))
            .collect();
        self.indexed_generation = Some(rule.generation());
    }

    /// True when the live rule changed since the last re-index, or after `clear`.
    pub fn is_stale(&self) -> bool {
        self.indexed_generation != Some(self.rule.borrow().generation())
    }

    /// False once the live rule left its stylesheet.
    pub fn is_attached(&self) -> bool {
        self.rule.borrow().is_attached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::declaration_map;
    use rune_cssom::{CssomError, KeyframesRule};

    fn spin() -> KeyframeAnimation {
        let mut rule = KeyframesRule::new("spin", None);
        rule.append_rule("0% { transform: rotate(0deg); }").unwrap();
        rule.append_rule("100% { transform: rotate(360deg); }").unwrap();
        KeyframeAnimation::new(rule.into_ref())
    }

    #[test]
    fn indexes_steps_in_rule_order() {
        let anim = spin();
        assert_eq!(anim.name(), "spin");
        assert_eq!(anim.selectors(), ["0%", "100%"]);
        assert_eq!(
            anim.step("0%").unwrap().declarations(),
            &declaration_map([("transform", "rotate(0deg)")])
        );
        assert!(anim.step("50%").is_none());
        assert!(!anim.is_stale());
    }

    #[test]
    fn step_lookup_normalizes_selector() {
        let mut anim = spin();
        anim.set_step("FROM", &declaration_map([("opacity", "0")])).unwrap();
        assert_eq!(anim.step("from").unwrap().get("opacity"), Some("0"));
        assert_eq!(anim.step(" From ").unwrap().get("opacity"), Some("0"));
    }

    #[test]
    fn set_step_appends_and_reindexes() {
        let mut anim = spin();
        anim.set_step("50%", &declaration_map([("opacity", "0.5")])).unwrap();
        assert_eq!(anim.selectors(), ["0%", "100%", "50%"]);
        assert_eq!(anim.step("50%").unwrap().get("opacity"), Some("0.5"));
        assert_eq!(
            anim.rule().borrow().find_rule("50%").unwrap().css_text(),
            "50% { opacity:0.5; }"
        );
    }

    #[test]
    fn duplicate_selector_resolves_to_last() {
        let mut anim = spin();
        anim.set_step("0%", &declaration_map([("transform", "rotate(10deg)")]))
            .unwrap();
        assert_eq!(anim.selectors(), ["0%", "100%", "0%"]);
        assert_eq!(anim.step("0%").unwrap().get("transform"), Some("rotate(10deg)"));
    }

    #[test]
    fn set_step_failure_leaves_index() {
        let mut anim = spin();
        let err = anim
            .set_step("sideways", &declaration_map([("opacity", "1")]))
            .unwrap_err();
        assert!(matches!(err, crate::KeyframesError::Cssom(CssomError::Syntax(_))));
        assert_eq!(anim.selectors(), ["0%", "100%"]);
        assert!(!anim.is_stale());
    }

    #[test]
    fn clear_empties_rule_and_marks_stale() {
        let mut anim = spin();
        anim.set_step("0%", &declaration_map([("opacity", "1")])).unwrap();
        anim.clear().unwrap();

        assert!(anim.selectors().is_empty());
        assert!(anim.step("0%").is_none());
        assert!(anim.is_stale());
        assert!(anim.rule().borrow().is_empty());

        anim.reindex();
        assert!(!anim.is_stale());
        assert!(anim.steps().is_empty());
    }

    #[test]
    fn out_of_band_edit_makes_index_stale() {
        let mut anim = spin();
        anim.rule().borrow_mut().delete_rule("100%").unwrap();
        assert!(anim.is_stale());
        assert_eq!(anim.selectors(), ["0%", "100%"]);

        anim.reindex();
        assert_eq!(anim.selectors(), ["0%"]);
    }
}
