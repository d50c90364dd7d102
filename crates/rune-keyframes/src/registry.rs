//! Name -> animation index over every stylesheet of a document.

use std::collections::HashMap;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rune_config::AnimationsConfig;
use rune_cssom::{DocumentRef, SheetRef, VendorPrefix};

use crate::animation::{AnimationHandle, KeyframeAnimation};
use crate::diagnostics::{KEYFRAMES, diagnostics_enabled};
use crate::discovery::{DiscoveryReport, discover};
use crate::error::{KeyframesError, Result};
use crate::snapshot::{AnimationSnapshot, RegistrySnapshot};

const UNIQUE_NAME_ATTEMPTS: u32 = 32;

/// Animation to remove: by name, or by a handle obtained from the registry.
#[derive(Debug, Clone, Copy)]
pub enum AnimationTarget<'a> {
    Name(&'a str),
    Animation(&'a AnimationHandle),
}

impl<'a> From<&'a str> for AnimationTarget<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for AnimationTarget<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a AnimationHandle> for AnimationTarget<'a> {
    fn from(animation: &'a AnimationHandle) -> Self {
        Self::Animation(animation)
    }
}


/// Index of the keyframe animations of one document.
///
/// Built by a full scan at construction. Removed names keep an empty slot so
/// repeated removal is a no-op.
pub struct AnimationRegistry {
    document: DocumentRef,
    config: AnimationsConfig,
    animations: HashMap<String, Option<AnimationHandle>>,
    dynamic_sheet: Option<SheetRef>,
    rng: StdRng,
    last_report: DiscoveryReport,
}

impl AnimationRegistry {
    /// Scan every sheet attached to `document` and index its animations.
    pub fn initialize(document: DocumentRef, config: AnimationsConfig) -> Self {
        Self::initialize_with_rng(document, config, StdRng::from_entropy())
    }

    /// Like [`AnimationRegistry::initialize`] with a caller-provided name generator.
    pub fn initialize_with_rng(document: DocumentRef, config: AnimationsConfig, rng: StdRng) -> Self {
        let mut registry = Self {
            document,
            config,
            animations: HashMap::new(),
            dynamic_sheet: None,
            rng,
            last_report: DiscoveryReport::default(),
        };
        registry.rescan();
        registry
    }

    /// Drop the index and rebuild it from the document's current sheets.
    pub fn rescan(&mut self) -> &DiscoveryReport {
        let sheets = self.document.borrow().style_sheets().to_vec();
        let max_depth = self.document.borrow().features().max_import_depth;

        let mut animations = HashMap::new();
        let report = discover(&sheets, max_depth, |found| {
            let animation = KeyframeAnimation::new(Rc::clone(found.rule));
            animations.insert(animation.name().to_string(), Some(animation.into_handle()));
        });

        if diagnostics_enabled(KEYFRAMES) {
            tracing::info!(
                sheets = report.sheets_visited,
                keyframes = report.keyframes_found,
                animations = animations.len(),
                denied = report.denied.len(),
                "diagnostics: keyframes index rebuilt"
            );
        }
        self.animations = animations;
        self.last_report = report;
        &self.last_report
    }

    /// Report of the most recent scan.
    pub fn last_report(&self) -> &DiscoveryReport {
        &self.last_report
    }

    /// Animation registered under `name`.
    ///
    /// A stale index is rebuilt before the handle is returned. Removed
    /// animations and animations whose rule left the document yield `None`.
    pub fn get(&self, name: &str) -> Option<AnimationHandle> {
        let handle = self.animations.get(name)?.as_ref()?;
        if let Ok(mut animation) = handle.try_borrow_mut() {
            if !animation.is_attached() {
                return None;
            }
            if animation.is_stale() {
                tracing::debug!(animation = %name, "re-indexing stale animation");
                animation.reindex();
            }
        }
        Some(Rc::clone(handle))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted.
    ///
    /// An animation that is mutably borrowed elsewhere is listed as attached.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .animations
            .iter()
            .filter(|(_, slot)| {
                slot.as_ref()
                    .is_some_and(|a| a.try_borrow().map_or(true, |a| a.is_attached()))
            })
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sheet that hosts animations created at runtime, created on first use.
    pub fn dynamic_sheet(&mut self) -> SheetRef {
        if let Some(sheet) = &self.dynamic_sheet {
            if sheet.borrow().is_attached() {
                return Rc::clone(sheet);
            }
        }
        let sheet = self.document.borrow_mut().create_style_sheet();
        self.dynamic_sheet = Some(Rc::clone(&sheet));
        sheet
    }

    /// Create an empty animation at the end of the dynamic sheet.
    ///
    /// Without a name (or with an empty one) a name is generated from the
    /// configured prefix and a random number in `0..name_space`. If the host
    /// rejects the standard `@keyframes` syntax, the vendor-prefixed form is
    /// tried once; any other failure is returned as is.
    pub fn create(&mut self, name: Option<&str>) -> Result<AnimationHandle> {
        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.generate_name()?,
        };

        let sheet = self.dynamic_sheet();
        let index = sheet.borrow().len()?;
        let inserted = sheet
            .borrow_mut()
            .insert_rule(&format!("@keyframes {} {{}}", name), index);
        let index = match inserted {
            Ok(index) => index,
            Err(err) if err.is_syntax_error() => {
                let prefix = VendorPrefix::from_name(&self.config.fallback_prefix)
                    .unwrap_or(VendorPrefix::Webkit);
                tracing::debug!(animation = %name, prefix = %prefix, error = %err, "retrying with prefixed @keyframes");
                sheet
                    .borrow_mut()
                    .insert_rule(&format!("@{}keyframes {} {{}}", prefix, name), index)?
            }
            Err(err) => return Err(err.into()),
        };

        let rule = sheet
            .borrow()
            .keyframes_at(index)?
            .ok_or(KeyframesError::UnexpectedRule { index })?;
        let handle = KeyframeAnimation::new(rule).into_handle();
        self.animations.insert(name, Some(Rc::clone(&handle)));
        Ok(handle)
    }

    /// Forget the animation and delete every keyframe-group rule of that name
    /// from every readable sheet. Returns how many rules were deleted.
    pub fn remove<'a>(&mut self, target: impl Into<AnimationTarget<'a>>) -> Result<usize> {
        let name = self.target_name(target.into());
        self.animations.insert(name.clone(), None);

        let sheets = self.document.borrow().style_sheets().to_vec();
        let max_depth = self.document.borrow().features().max_import_depth;
        let mut matches: Vec<(SheetRef, usize)> = Vec::new();
        discover(&sheets, max_depth, |found| {
            if found.rule.borrow().name() == name {
                matches.push((Rc::clone(found.parent), found.index));
            }
        });

        // Highest index first so earlier positions in the same sheet stay valid.
        matches.sort_by(|a, b| b.1.cmp(&a.1));
        for (sheet, index) in &matches {
            sheet.borrow_mut().delete_rule(*index)?;
        }
        if !matches.is_empty() {
            tracing::debug!(animation = %name, rules = matches.len(), "removed keyframes rules");
        }
        Ok(matches.len())
    }

    /// Serializable view of every registered animation, sorted by name.
    /// Animations mutably borrowed elsewhere are left out.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let animations = self
            .names()
            .iter()
            .filter_map(|name| self.get(name))
            .filter_map(|handle| {
                let animation = handle.try_borrow().ok()?;
                Some(AnimationSnapshot::from_animation(&animation))
            })
            .collect();
        RegistrySnapshot {
            animations,
            denied_sheets: self.last_report.denied.clone(),
        }
    }

    // A handle is matched by identity first so a borrowed animation can still be removed.
    fn target_name(&self, target: AnimationTarget<'_>) -> String {
        let handle = match target {
            AnimationTarget::Name(name) => return name.to_string(),
            AnimationTarget::Animation(handle) => handle,
        };
        let registered = self.animations.iter().find_map(|(name, slot)| {
            slot.as_ref()
                .filter(|a| Rc::ptr_eq(a, handle))
                .map(|_| name.clone())
        });
        match registered {
            Some(name) => name,
            None => handle.borrow().name().to_string(),
        }
    }

    fn generate_name(&mut self) -> Result<String> {
        let space = self.config.name_space.max(1);
        if !self.config.unique_names {
            return Ok(format!("{}{}", self.config.name_prefix, self.rng.gen_range(0..space)));
        }
        for _ in 0..UNIQUE_NAME_ATTEMPTS {
            let name = format!("{}{}", self.config.name_prefix, self.rng.gen_range(0..space));
            if !self.contains(&name) {
                return Ok(name);
            }
        }
        Err(KeyframesError::NameSpaceExhausted {
            attempts: UNIQUE_NAME_ATTEMPTS,
        })
    }
}
