use std::rc::Rc;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rune_config::AnimationsConfig;
use rune_cssom::{CssRule, Document, DocumentRef, HostFeatures, ResourceOrigin, SheetRef, VendorPrefix};
use rune_keyframes::{AnimationRegistry, declaration_map};

const SPIN: &str =
    "@keyframes spin { 0% { transform: rotate(0deg); } 100% { transform: rotate(360deg); } }";

fn registry_for(doc: Document) -> (DocumentRef, AnimationRegistry) {
    let doc = doc.into_ref();
    let registry = AnimationRegistry::initialize_with_rng(
        Rc::clone(&doc),
        AnimationsConfig::default(),
        StdRng::seed_from_u64(42),
    );
    (doc, registry)
}

fn keyframes_named(sheet: &SheetRef, name: &str) -> Result<Vec<String>> {
    let sheet = sheet.borrow();
    Ok(sheet
        .css_rules()?
        .iter()
        .filter_map(CssRule::as_keyframes)
        .filter(|rule| rule.borrow().name() == name)
        .map(|rule| rule.borrow().css_text())
        .collect())
}

#[test]
fn spin_steps_are_indexed() -> Result<()> {
    let mut doc = Document::new();
    doc.add_style_sheet(SPIN);
    let (_doc, registry) = registry_for(doc);

    let spin = registry.get("spin").expect("spin registered");
    let spin = spin.borrow();
    assert_eq!(spin.selectors(), ["0%", "100%"]);
    assert_eq!(
        spin.step("0%").map(|s| s.declarations().clone()),
        Some(declaration_map([("transform", "rotate(0deg)")]))
    );
    Ok(())
}

#[test]
fn pulse_create_set_step_and_remove() -> Result<()> {
    let mut doc = Document::new();
    doc.add_style_sheet(SPIN);
    let (doc, mut registry) = registry_for(doc);

    let pulse = registry.create(Some("pulse"))?;
    pulse
        .borrow_mut()
        .set_step("50%", &declaration_map([("opacity", "0.5")]))?;

    let reread = registry.get("pulse").expect("pulse registered");
    assert_eq!(
        reread.borrow().step("50%").and_then(|s| s.get("opacity")),
        Some("0.5")
    );

    let dynamic = registry.dynamic_sheet();
    assert_eq!(
        keyframes_named(&dynamic, "pulse")?,
        ["@keyframes pulse { 50% { opacity:0.5; } }"]
    );
    assert_eq!(doc.borrow().style_sheets().len(), 2);

    assert_eq!(registry.remove("pulse")?, 1);
    assert!(registry.get("pulse").is_none());
    for sheet in doc.borrow().style_sheets() {
        assert!(keyframes_named(sheet, "pulse")?.is_empty());
    }
    assert!(registry.get("spin").is_some());
    Ok(())
}

#[test]
fn remove_is_idempotent() -> Result<()> {
    let mut doc = Document::new();
    doc.add_style_sheet("@keyframes fade { to { opacity: 0 } }");
    doc.add_style_sheet("@keyframes fade { from { opacity: 1 } } @keyframes keep { to { top: 0 } }");
    let (doc, mut registry) = registry_for(doc);

    assert_eq!(registry.remove("fade")?, 2);
    let after_first: Vec<usize> = doc
        .borrow()
        .style_sheets()
        .iter()
        .map(|s| s.borrow().len())
        .collect::<std::result::Result<_, _>>()?;

    assert_eq!(registry.remove("fade")?, 0);
    let after_second: Vec<usize> = doc
        .borrow()
        .style_sheets()
        .iter()
        .map(|s| s.borrow().len())
        .collect::<std::result::Result<_, _>>()?;

    assert_eq!(after_first, [0, 1]);
    assert_eq!(after_first, after_second);
    assert_eq!(registry.names(), ["keep"]);
    Ok(())
}

#[test]
fn discovery_counts_every_rule_and_later_sheets_win() -> Result<()> {
    let mut doc = Document::new();
    doc.add_style_sheet("@keyframes a { to { top: 1px } } @keyframes b { to { top: 0 } }");
    doc.add_style_sheet("body { margin: 0 }");
    doc.add_style_sheet("@-moz-keyframes a { to { top: 2px } } @keyframes c { to { top: 0 } }");
    let (_doc, registry) = registry_for(doc);

    assert_eq!(registry.last_report().keyframes_found, 4);
    assert_eq!(registry.last_report().sheets_visited, 3);
    assert_eq!(registry.names(), ["a", "b", "c"]);

    let a = registry.get("a").expect("a registered");
    assert_eq!(a.borrow().vendor_prefix(), Some(VendorPrefix::Moz));
    assert_eq!(a.borrow().step("to").and_then(|s| s.get("top")), Some("2px"));
    Ok(())
}

#[test]
fn cross_origin_sheets_are_skipped() -> Result<()> {
    let mut doc = Document::new();
    doc.register_resource(
        "https://fonts.example/anim.css",
        "@keyframes remote { to { top: 0 } }",
        ResourceOrigin::CrossOrigin,
    );
    doc.register_resource(
        "local.css",
        "@import url(https://fonts.example/anim.css); @keyframes local { to { top: 0 } }",
        ResourceOrigin::SameOrigin,
    );
    doc.add_style_sheet("@keyframes first { to { top: 0 } }");
    doc.link_style_sheet("https://fonts.example/anim.css");
    doc.add_style_sheet("@import url(local.css); @keyframes last { to { top: 0 } }");
    let (_doc, registry) = registry_for(doc);

    assert_eq!(registry.names(), ["first", "last", "local"]);
    assert!(registry.get("remote").is_none());
    assert_eq!(
        registry.last_report().denied,
        [
            Some("https://fonts.example/anim.css".to_string()),
            Some("https://fonts.example/anim.css".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn generated_names_are_in_range() -> Result<()> {
    let (_doc, mut registry) = registry_for(Document::new());
    for _ in 0..50 {
        let anim = registry.create(None)?;
        let name = anim.borrow().name().to_string();
        let digits = name.strip_prefix("anim").expect("anim prefix");
        assert!(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()), "{name}");
        assert!(digits.parse::<u32>()? < 100_000);
    }
    Ok(())
}

#[test]
fn prefix_only_host_gets_webkit_rules() -> Result<()> {
    let doc = Document::with_features(HostFeatures {
        standard_keyframes: false,
        ..HostFeatures::default()
    });
    let (_doc, mut registry) = registry_for(doc);

    let bounce = registry.create(Some("bounce"))?;
    bounce
        .borrow_mut()
        .set_step("from", &declaration_map([("top", "0")]))?;
    assert_eq!(bounce.borrow().vendor_prefix(), Some(VendorPrefix::Webkit));
    assert_eq!(
        keyframes_named(&registry.dynamic_sheet(), "bounce")?,
        ["@-webkit-keyframes bounce { from { top:0; } }"]
    );
    Ok(())
}

#[test]
fn get_refreshes_after_out_of_band_edits() -> Result<()> {
    let mut doc = Document::new();
    let sheet = doc.add_style_sheet(SPIN);
    let (_doc, registry) = registry_for(doc);

    let rule = sheet.borrow().keyframes_at(0)?.expect("keyframes at 0");
    rule.borrow_mut().delete_rule("100%")?;
    rule.borrow_mut().append_rule("to { transform: rotate(1turn); }")?;

    let spin = registry.get("spin").expect("spin registered");
    assert!(!spin.borrow().is_stale());
    assert_eq!(spin.borrow().selectors(), ["0%", "to"]);
    Ok(())
}

#[test]
fn clear_empties_the_live_rule() -> Result<()> {
    let mut doc = Document::new();
    let sheet = doc.add_style_sheet(SPIN);
    let (_doc, registry) = registry_for(doc);

    let spin = registry.get("spin").expect("spin registered");
    spin.borrow_mut().clear()?;
    assert_eq!(
        keyframes_named(&sheet, "spin")?,
        ["@keyframes spin { }"]
    );
    assert!(registry.get("spin").expect("still registered").borrow().steps().is_empty());
    Ok(())
}

#[test]
fn unique_names_do_not_collide() -> Result<()> {
    let config = AnimationsConfig {
        name_prefix: "fx".to_string(),
        name_space: 3,
        unique_names: true,
        ..AnimationsConfig::default()
    };
    let mut registry = AnimationRegistry::initialize_with_rng(
        Document::new().into_ref(),
        config,
        StdRng::seed_from_u64(3),
    );
    for _ in 0..3 {
        registry.create(None)?;
    }
    let names = registry.names();
    assert_eq!(names, ["fx0", "fx1", "fx2"]);
    assert!(names.iter().all(|n| n.starts_with("fx")));
    assert!(registry.create(None).is_err());
    Ok(())
}
