//! Rule text parsing on top of the `cssparser` tokenizer.
//!
//! Only the structure needed by the object model is recovered: rule
//! boundaries, at-rule names, preludes and raw block bodies. Declaration
//! blocks are kept as text.

use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};

use crate::document::HostFeatures;
use crate::error::{CssomError, Result};
use crate::rule::{
    CssRule, ImportRule, KeyframeRule, KeyframesRule, StyleRule, VendorPrefix, normalize_key_text,
};
use crate::sheet::SheetRef;

/// Resolves an `@import` href to a loaded sheet.
pub(crate) type ImportResolver<'a> = dyn Fn(&str) -> Option<SheetRef> + 'a;

type RuleParseError<'i> = ParseError<'i, ()>;

/// Resolver for contexts that never load imported sheets.
pub(crate) fn no_imports(_href: &str) -> Option<SheetRef> {
    None
}

enum Step {
    Continue,
    Block,
    End,
}

/// Split source text into top-level rule texts. A rule ends at a top-level
/// `;` or after its first `{}` block.
pub(crate) fn split_rules(css: &str) -> Vec<&str> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut out = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }
        let start = parser.position();
        loop {
            let step = match parser.next() {
                Ok(Token::Semicolon) => Step::End,
                Ok(Token::CurlyBracketBlock) => Step::Block,
                Ok(_) => Step::Continue,
                Err(_) => Step::End,
            };
            match step {
                Step::Continue => {}
                Step::Block => {
                    let _ = block_contents(&mut parser);
                    break;
                }
                Step::End => break,
            }
        }
        let text = parser.slice_from(start).trim();
        if !text.is_empty() {
            out.push(text);
        }
    }
    out
}

/// Parse every top-level rule of a sheet, skipping the ones that fail.
pub(crate) fn parse_stylesheet_rules(
    css: &str,
    features: &HostFeatures,
    resolve: &ImportResolver<'_>,
) -> Vec<CssRule> {
    let mut rules = Vec::new();
    for text in split_rules(css) {
        match parse_rule(text, features, resolve) {
            Ok(rule) => rules.push(rule),
            Err(err) => tracing::debug!(rule = %text, error = %err, "skipped unparsable rule"),
        }
    }
    rules
}

/// Parse exactly one rule, as `insertRule` does.
pub(crate) fn parse_single_rule(
    text: &str,
    features: &HostFeatures,
    resolve: &ImportResolver<'_>,
) -> Result<CssRule> {
    match split_rules(text).as_slice() {
        [single] => parse_rule(single, features, resolve),
        [] => Err(CssomError::syntax("empty rule text")),
        _ => Err(CssomError::syntax(format!(
            "expected a single rule in `{}`",
            text.trim()
        ))),
    }
}

pub(crate) fn parse_rule(
    text: &str,
    features: &HostFeatures,
    resolve: &ImportResolver<'_>,
) -> Result<CssRule> {
    if text.trim_start().starts_with('@') {
        parse_at_rule(text, features, resolve)
    } else {
        let (selector, body) = split_block_rule(text)?;
        Ok(CssRule::Style(StyleRule {
            selector_text: selector.to_string(),
            style: body.to_string(),
        }))
    }
}

/// Parse `"<keys> { <declarations> }"` into a keyframe step.
pub(crate) fn parse_keyframe_rule(text: &str) -> Result<KeyframeRule> {
    let (keys, body) = split_block_rule(text)?;
    let key_text = normalize_key_text(keys)?;
    Ok(KeyframeRule::new(key_text, body.to_string()))
}

fn parse_at_rule(
    text: &str,
    features: &HostFeatures,
    resolve: &ImportResolver<'_>,
) -> Result<CssRule> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let at = match parser.next() {
        Ok(Token::AtKeyword(name)) => name.to_ascii_lowercase(),
        _ => return Err(CssomError::syntax(format!("expected an at-rule in `{}`", text))),
    };

    let prefix = match at.as_str() {
        "import" => {
            let href = parser
                .expect_url_or_string()
                .map(|url| String::from(&*url))
                .map_err(|_| CssomError::syntax(format!("missing @import url in `{}`", text)))?;
            let style_sheet = resolve(&href);
            if style_sheet.is_none() {
                tracing::debug!(href = %href, "unresolved @import");
            }
            return Ok(CssRule::Import(ImportRule { href, style_sheet }));
        }
        "keyframes" => None,
        "-webkit-keyframes" => Some(VendorPrefix::Webkit),
        "-moz-keyframes" => Some(VendorPrefix::Moz),
        _ => return Ok(CssRule::Other(text.trim().to_string())),
    };

    if prefix.is_none() && !features.standard_keyframes {
        return Err(CssomError::syntax("@keyframes is not supported by this host"));
    }

    let name = match parser.next() {
        Ok(Token::Ident(name)) if !is_reserved_name(name) => String::from(&**name),
        Ok(Token::QuotedString(name)) if !name.is_empty() => String::from(&**name),
        _ => {
            return Err(CssomError::syntax(format!(
                "invalid keyframes name in `{}`",
                text.trim()
            )));
        }
    };

    let body = keyframes_body(&mut parser)
        .map_err(|_| CssomError::syntax(format!("malformed keyframes block in `{}`", text.trim())))?;

    let mut steps = Vec::new();
    for step in split_rules(body) {
        match parse_keyframe_rule(step) {
            Ok(rule) => steps.push(rule),
            Err(err) => {
                tracing::debug!(keyframes = %name, step = %step, error = %err, "skipped keyframe step")
            }
        }
    }
    Ok(CssRule::Keyframes(
        KeyframesRule::with_rules(name, prefix, steps).into_ref(),
    ))
}

fn is_reserved_name(name: &str) -> bool {
    ["none", "initial", "inherit", "unset", "default"]
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
}

fn keyframes_body<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<&'i str, RuleParseError<'i>> {
    parser.expect_curly_bracket_block()?;
    let body = block_contents(parser)?;
    parser.expect_exhausted()?;
    Ok(body)
}

/// Split `"<prelude> { <body> }"` into trimmed prelude and body.
fn split_block_rule(text: &str) -> Result<(&str, &str)> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let (prelude, body) = prelude_and_block(&mut parser)
        .map_err(|_| CssomError::syntax(format!("malformed rule `{}`", text.trim())))?;
    if prelude.is_empty() {
        return Err(CssomError::syntax(format!("missing selector in `{}`", text.trim())));
    }
    Ok((prelude, body))
}

fn prelude_and_block<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<(&'i str, &'i str), RuleParseError<'i>> {
    let start = parser.position();
    parser.parse_until_before(Delimiter::CurlyBracketBlock, |p| {
        while p.next().is_ok() {}
        Ok::<(), RuleParseError<'i>>(())
    })?;
    let prelude = parser.slice_from(start).trim();
    parser.expect_curly_bracket_block()?;
    let body = block_contents(parser)?;
    parser.expect_exhausted()?;
    Ok((prelude, body))
}

/// Raw text between the braces of the block that was just opened.
fn block_contents<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<&'i str, RuleParseError<'i>> {
    parser.parse_nested_block(|block| {
        let start = block.position();
        while block.next().is_ok() {}
        Ok::<&'i str, RuleParseError<'i>>(block.slice_from(start).trim())
    })
}
