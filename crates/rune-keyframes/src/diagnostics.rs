//! Opt-in diagnostic events for the keyframes index.
//!
//! `RUNE_DIAGNOSTICS=keyframes` (or `all`) turns on summary `info!` events
//! such as the per-scan rule counts logged by the registry.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Category gating registry scan summaries.
pub const KEYFRAMES: &str = "keyframes";

/// Whether `RUNE_DIAGNOSTICS` (comma list, or `all`) enables `category`.
/// The variable is read once per process.
pub fn diagnostics_enabled(category: &str) -> bool {
    static ENABLED: OnceLock<HashSet<String>> = OnceLock::new();
    let enabled = ENABLED.get_or_init(|| parse_categories(&std::env::var("RUNE_DIAGNOSTICS").unwrap_or_default()));
    category_enabled(enabled, category)
}

fn parse_categories(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn category_enabled(enabled: &HashSet<String>, category: &str) -> bool {
    enabled.contains("all") || enabled.contains(&category.to_ascii_lowercase())
}
