use serde::Serialize;

use crate::animation::KeyframeAnimation;
use crate::step::KeyframeStep;

/// Serializable view of a registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub animations: Vec<AnimationSnapshot>,
    /// Hrefs of sheets skipped during the last scan (`null` for inline sheets).
    pub denied_sheets: Vec<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnimationSnapshot {
    pub name: String,
    pub vendor_prefix: Option<String>,
    pub css_text: String,
    pub steps: Vec<KeyframeStep>,
}

impl AnimationSnapshot {
    pub fn from_animation(animation: &KeyframeAnimation) -> Self {
        Self {
            name: animation.name().to_string(),
            vendor_prefix: animation.vendor_prefix().map(|p| p.as_str().to_string()),
            css_text: animation.rule().borrow().css_text(),
            steps: animation.steps().to_vec(),
        }
    }
}
