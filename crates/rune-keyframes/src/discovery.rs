//! Walks stylesheets (and their `@import` chains) for keyframe-group rules.

use rune_cssom::{CssRule, KeyframesRef, RuleKind, SheetRef};

/// Outcome of reading one sheet's rule list.
#[derive(Debug, Clone)]
pub enum SheetAccess {
    Rules(Vec<CssRule>),
    /// The host refused access (cross-origin sheet).
    Denied { href: Option<String> },
}

impl SheetAccess {
    /// Snapshot the rule list of `sheet`.
    pub fn of(sheet: &SheetRef) -> Self {
        let sheet = sheet.borrow();
        match sheet.css_rules() {
            Ok(rules) => Self::Rules(rules.to_vec()),
            Err(_) => Self::Denied {
                href: sheet.href().map(str::to_string),
            },
        }
    }
}

/// A keyframe-group rule found during a scan.
#[derive(Debug, Clone, Copy)]
pub struct Discovered<'a> {
    pub rule: &'a KeyframesRef,
    /// Sheet whose rule list holds `rule`.
    pub parent: &'a SheetRef,
    /// Position of `rule` in `parent` at scan time.
    pub index: usize,
    pub kind: RuleKind,
}

/// What a scan saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub sheets_visited: usize,
    pub keyframes_found: usize,
    /// Hrefs of sheets whose rules could not be read (`None` for inline sheets).
    pub denied: Vec<Option<String>>,
}

/// Visit every keyframe-group rule in `sheets`, following `@import` up to
/// `max_depth` levels.
///
/// Each rule list is snapshotted before its rules are visited. A denied sheet
/// is recorded in the report and the scan moves on.
pub fn discover<F>(sheets: &[SheetRef], max_depth: usize, mut visit: F) -> DiscoveryReport
where
    F: FnMut(Discovered<'_>),
{
    let mut report = DiscoveryReport::default();
    for sheet in sheets {
        walk_sheet(sheet, 0, max_depth, &mut visit, &mut report);
    }
    report
}

fn walk_sheet<F>(
    sheet: &SheetRef,
    depth: usize,
    max_depth: usize,
    visit: &mut F,
    report: &mut DiscoveryReport,
) where
    F: FnMut(Discovered<'_>),
{
    report.sheets_visited += 1;
    let rules = match SheetAccess::of(sheet) {
        SheetAccess::Rules(rules) => rules,
        SheetAccess::Denied { href } => {
            tracing::debug!(href = ?href, "stylesheet rules not accessible, skipping");
            report.denied.push(href);
            return;
        }
    };

    for (index, rule) in rules.iter().enumerate() {
        let kind = rule.kind();
        match rule {
            CssRule::Import(import) => {
                let Some(imported) = &import.style_sheet else {
                    continue;
                };
                if depth >= max_depth {
                    tracing::warn!(href = %import.href, depth, "import depth exceeded during scan");
                    continue;
                }
                walk_sheet(imported, depth + 1, max_depth, visit, report);
            }
            CssRule::Keyframes(keyframes) => {
                report.keyframes_found += 1;
                visit(Discovered {
                    rule: keyframes,
                    parent: sheet,
                    index,
                    kind,
                });
            }
            _ => {}
        }
    }
}
