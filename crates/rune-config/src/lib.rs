//! Rune keyframes configuration system
//!
//! This crate provides centralized configuration for the keyframe index and the
//! in-memory stylesheet host, loading settings from `rune.toml` and letting
//! environment variables override individual values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuneConfig {
    /// Animation registry settings
    pub animations: AnimationsConfig,
    /// Stylesheet host settings
    pub cssom: CssomConfig,
}

/// Animation registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationsConfig {
    /// Prefix of generated animation names (`anim` -> `anim4821`)
    pub name_prefix: String,
    /// Generated suffixes are drawn uniformly from `0..name_space`
    pub name_space: u32,
    /// Re-draw generated names that are already registered
    pub unique_names: bool,
    /// Vendor prefix tried when the host rejects a standard `@keyframes` rule
    /// (`webkit` or `moz`)
    pub fallback_prefix: String,
}

/// Stylesheet host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssomConfig {
    /// Whether the host accepts unprefixed `@keyframes` rules
    pub standard_keyframes: bool,
    /// Maximum `@import` nesting followed while loading and scanning sheets
    pub max_import_depth: usize,
}

impl Default for AnimationsConfig {
    fn default() -> Self {
        Self {
            name_prefix: "anim".to_string(),
            name_space: 100_000,
            unique_names: false,
            fallback_prefix: "webkit".to_string(),
        }
    }
}

impl Default for CssomConfig {
    fn default() -> Self {
        Self {
            standard_keyframes: true,
            max_import_depth: 16,
        }
    }
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl RuneConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `rune.toml` in the current directory, or the
    /// defaults when the file is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Values that fail to parse are ignored.
    pub fn merge_with_env(&mut self) {
        if let Ok(prefix) = std::env::var("RUNE_ANIM_NAME_PREFIX") {
            self.animations.name_prefix = prefix;
        }
        if let Ok(val) = std::env::var("RUNE_ANIM_NAME_SPACE") {
            if let Ok(space) = val.parse::<u32>() {
                self.animations.name_space = space;
            }
        }
        if let Ok(val) = std::env::var("RUNE_ANIM_UNIQUE_NAMES") {
            self.animations.unique_names = env_flag(&val);
        }
        if let Ok(prefix) = std::env::var("RUNE_ANIM_FALLBACK_PREFIX") {
            self.animations.fallback_prefix = prefix;
        }

        if let Ok(val) = std::env::var("RUNE_CSSOM_STANDARD_KEYFRAMES") {
            self.cssom.standard_keyframes = env_flag(&val);
        }
        if let Ok(val) = std::env::var("RUNE_CSSOM_MAX_IMPORT_DEPTH") {
            if let Ok(depth) = val.parse::<usize>() {
                self.cssom.max_import_depth = depth;
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
