//! Flat declaration lists of keyframe steps.

use std::collections::BTreeMap;

/// Property name -> value. Ordered by property so serialization is stable.
pub type DeclarationMap = BTreeMap<String, String>;

/// Parse a flat `prop: value; prop: value` list.
///
/// Each `;`-separated piece is split on its first `:`; pieces without a colon
/// are skipped. Property and value are trimmed and may be empty. Later
/// duplicates win.
pub fn parse_declarations(source: &str) -> DeclarationMap {
    source
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Rule text for one step: `"<selector> { prop:value; prop:value; }"`.
pub fn serialize_step(selector: &str, declarations: &DeclarationMap) -> String {
    let mut out = format!("{} {{ ", selector);
    for (name, value) in declarations {
        out.push_str(name);
        out.push(':');
        out.push_str(value);
        out.push_str("; ");
    }
    out.push('}');
    out
}

/// Build a map from `(property, value)` pairs.
pub fn declaration_map<I, K, V>(pairs: I) -> DeclarationMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
