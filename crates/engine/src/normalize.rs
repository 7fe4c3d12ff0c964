//! Argument normalization
//!
//! Raw argument text is reduced to structural tokens: literal values are
//! erased, object literals collapse to their sorted key sets, and everything
//! else passes through with quoted attribute values blanked. Two versions of
//! a call that differ only in literal values normalize to the same tokens.

use crate::syntax::{CodeChars, mask_nested, mask_strings, matching_close, split_top_level};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Placeholder for a bare `{{path}}` interpolation
pub const VALUE_TOKEN: &str = "value";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d+(?:\.\d+)?$").expect("Failed to compile number pattern")
});

static TEMPLATE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\{\s*@?[A-Za-z_$][\w$-]*(?:\.[A-Za-z_$][\w$-]*)*\s*\}\}$")
        .expect("Failed to compile template path pattern")
});

static QUOTED_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(@?[A-Za-z_$][\w$.-]*)\s*=\s*(?:"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')"#)
        .expect("Failed to compile attribute pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace pattern"));

static METHOD_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:async\s+)?(?:get\s+|set\s+)?\*?\s*([A-Za-z_$][\w$]*)\s*\(")
        .expect("Failed to compile method key pattern")
});

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*$").expect("Failed to compile identifier pattern")
});

static HASH_HELPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\(|\{\{)\s*(lazyHash|hash)(?:\s|\}\}|\))").expect("Failed to compile hash pattern")
});

static HASH_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(@?[A-Za-z_$][\w$-]*)\s*=").expect("Failed to compile hash key pattern")
});

/// Normalize a raw argument list into one token per top-level argument
///
/// ```
/// use hookscope_engine::normalize::normalize_arguments;
///
/// let tokens = normalize_arguments(r#"topic, { post, user: this.currentUser }, "x", 3"#);
/// assert_eq!(tokens, ["topic", "{post,user}", "string", "number"]);
/// ```
#[must_use]
pub fn normalize_arguments(raw: &str) -> Vec<String> {
    split_top_level(raw, ',')
        .into_iter()
        .map(normalize_argument)
        .collect()
}

/// Normalize one argument expression
#[must_use]
pub fn normalize_argument(token: &str) -> String {
    let token = token.trim();

    if let Some(keys) = object_keys(token) {
        return format!("{{{}}}", keys.into_iter().collect::<Vec<_>>().join(","));
    }

    if TEMPLATE_PATH.is_match(token) {
        return VALUE_TOKEN.to_string();
    }

    if let Some(kind) = literal_kind(token) {
        return kind.to_string();
    }

    let erased = QUOTED_ATTRIBUTE.replace_all(token, "${1}=string");
    WHITESPACE.replace_all(erased.trim(), " ").into_owned()
}

fn literal_kind(token: &str) -> Option<&'static str> {
    if is_quoted(token) {
        return Some("string");
    }
    if NUMBER.is_match(token) {
        return Some("number");
    }
    match token {
        "true" | "false" => return Some("boolean"),
        "null" => return Some("null"),
        _ => {}
    }
    if token.starts_with('[') && matching_close(token, 0) == Some(token.len() - 1) {
        return Some("array");
    }
    None
}

/// A whole-token string literal, not two literals joined by an operator
fn is_quoted(token: &str) -> bool {
    let Some(quote) = token.chars().next() else {
        return false;
    };
    if !matches!(quote, '"' | '\'' | '`') || token.len() < 2 {
        return false;
    }
    // A single string literal contributes no code characters at all
    token.ends_with(quote) && CodeChars::new(token).next().is_none()
}

/// Contents of a plain string literal
///
/// Template literals with interpolation are not plain and yield `None`.
pub(crate) fn literal_contents(token: &str) -> Option<&str> {
    let token = token.trim();
    if !is_quoted(token) {
        return None;
    }
    let inner = &token[1..token.len() - 1];
    if token.starts_with('`') && inner.contains("${") {
        return None;
    }
    Some(inner)
}

/// Sorted key set of an object literal, or `None` if `token` is not one
fn object_keys(token: &str) -> Option<BTreeSet<String>> {
    if !token.starts_with('{') || token.starts_with("{{") {
        return None;
    }
    if matching_close(token, 0) != Some(token.len() - 1) {
        return None;
    }

    let body = &token[1..token.len() - 1];
    Some(
        split_top_level(body, ',')
            .into_iter()
            .filter_map(object_key)
            .collect(),
    )
}

fn object_key(entry: &str) -> Option<String> {
    if let Some(spread) = entry.strip_prefix("...") {
        return Some(format!("...{}", WHITESPACE.replace_all(spread.trim(), "")));
    }

    if let Some(caps) = METHOD_KEY.captures(entry) {
        // `name(...) { }` is a method; `name: fn(...)` falls through to the colon
        let colon_first = top_level_colon(entry).is_some_and(|colon| colon < caps[0].len());
        if !colon_first {
            return Some(caps[1].to_string());
        }
    }

    let key = match top_level_colon(entry) {
        Some(colon) => entry[..colon].trim(),
        None => entry.trim(),
    };
    let key = key
        .strip_prefix(['"', '\''])
        .and_then(|k| k.strip_suffix(['"', '\'']))
        .unwrap_or(key);

    (!key.is_empty()).then(|| key.to_string())
}

fn top_level_colon(entry: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in CodeChars::new(entry) {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return Some(index),
            _ => {}
        }
    }
    None
}

/// Key names of every `hash`/`lazyHash` argument bag in an outlet invocation
///
/// Only keys are kept; values are discarded. The result is sorted and free
/// of duplicates.
#[must_use]
pub fn outlet_argument_keys(text: &str) -> Vec<String> {
    let mut keys = BTreeSet::new();
    let mut search_from = 0;

    while let Some(caps) = HASH_HELPER.captures_at(text, search_from) {
        let (Some(found), Some(helper)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let opener = found.start();
        let body_start = helper.end();
        let body_end = if text[opener..].starts_with("{{") {
            text[body_start..]
                .find("}}")
                .map_or(text.len(), |i| body_start + i)
        } else {
            matching_close(text, opener).unwrap_or(text.len())
        };

        let body = mask_strings(&mask_nested(&text[body_start..body_end]));
        for key in HASH_KEY.captures_iter(&body) {
            keys.insert(key[1].to_string());
        }

        search_from = body_end.max(found.end());
    }

    keys.into_iter().collect()
}

/// Whether `token` is a bare identifier
pub(crate) fn is_identifier(token: &str) -> bool {
    IDENTIFIER.is_match(token)
}
