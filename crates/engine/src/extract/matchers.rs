//! Pattern families for the four hook kinds
//!
//! Each matcher finds the head of its construct with a regex, then uses the
//! bracket-aware scanner to find where the construct ends. A construct whose
//! end cannot be found is cut at the end of the line it starts on and marked
//! incomplete.

use crate::normalize::{literal_contents, normalize_arguments, outlet_argument_keys};
use crate::syntax::{find_unnested, mask_nested, matching_close, split_once_top_level};
use hookscope_core::HookType;
use regex::Regex;
use std::sync::LazyLock;

static VALUE_TRANSFORMER_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bapply(?:Mutable)?ValueTransformer\s*\(")
        .expect("Failed to compile value transformer pattern")
});

static APP_EVENT_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bappEvents\s*\??\.\s*trigger\s*\(").expect("Failed to compile app event pattern")
});

static BEHAVIOR_TRANSFORMER_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bapplyBehaviorTransformer\s*\(")
        .expect("Failed to compile behavior transformer pattern")
});

static OUTLET_TAG_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<PluginOutlet\b").expect("Failed to compile outlet tag pattern"));

static OUTLET_TAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@name\s*=\s*(?:"([^"]*)"|'([^']*)'|\{\{\s*"([^"]*)"\s*\}\}|\{\{\s*'([^']*)'\s*\}\})"#)
        .expect("Failed to compile outlet name pattern")
});

static OUTLET_MUSTACHE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{#?plugin-outlet\b").expect("Failed to compile legacy outlet pattern")
});

static OUTLET_MUSTACHE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)name\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("Failed to compile legacy outlet name pattern")
});

static POSITIONAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:"([^"]*)"|'([^']*)')"#).expect("Failed to compile positional name pattern")
});

/// One syntactic match in a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Byte offset of the construct start
    pub start: usize,
    /// Byte offset just past the construct end
    pub end: usize,
    /// Declared name, empty when it is not a literal
    pub name: String,
    /// Normalized argument tokens
    pub arguments: Vec<String>,
    /// Whether the construct's closing delimiter was found
    pub complete: bool,
}

/// A pattern family for one hook kind
pub trait HookMatcher: Send + Sync {
    /// Kind of hook this matcher finds
    fn hook_type(&self) -> HookType;

    /// Every match in `text`, in order of appearance
    fn find_all(&self, text: &str) -> Vec<RawMatch>;
}

/// The matchers for every hook kind, in a fixed order
pub fn default_matchers() -> Vec<Box<dyn HookMatcher>> {
    vec![
        Box::new(OutletTagMatcher),
        Box::new(LegacyOutletMatcher),
        Box::new(CallMatcher::value_transformer()),
        Box::new(CallMatcher::app_event()),
        Box::new(CallMatcher::behavior_transformer()),
    ]
}

fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}

fn first_capture(caps: &regex::Captures<'_>) -> String {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Function-call hooks: `fn("name", arg, ...)`
///
/// The first argument is the name; the rest are normalized. Definitions of
/// the hook functions themselves (`function applyValueTransformer(`) are
/// skipped.
pub struct CallMatcher {
    hook_type: HookType,
    head: &'static Regex,
}

impl CallMatcher {
    /// `applyValueTransformer` and `applyMutableValueTransformer`
    pub fn value_transformer() -> Self {
        Self {
            hook_type: HookType::ValueTransformer,
            head: &VALUE_TRANSFORMER_HEAD,
        }
    }

    /// `appEvents.trigger`
    pub fn app_event() -> Self {
        Self {
            hook_type: HookType::AppEventTrigger,
            head: &APP_EVENT_HEAD,
        }
    }

    /// `applyBehaviorTransformer`
    pub fn behavior_transformer() -> Self {
        Self {
            hook_type: HookType::BehaviorTransformer,
            head: &BEHAVIOR_TRANSFORMER_HEAD,
        }
    }

    fn is_definition(text: &str, start: usize) -> bool {
        let before = text[..start].trim_end();
        before.ends_with("function") || before.ends_with("function*")
    }
}

impl HookMatcher for CallMatcher {
    fn hook_type(&self) -> HookType {
        self.hook_type
    }

    fn find_all(&self, text: &str) -> Vec<RawMatch> {
        let mut matches = Vec::new();

        for head in self.head.find_iter(text) {
            if Self::is_definition(text, head.start()) {
                continue;
            }

            let open = head.end() - 1;
            let (inner_end, end, complete) = match matching_close(text, open) {
                Some(close) => (close, close + 1, true),
                None => {
                    let end = line_end(text, open);
                    (end, end, false)
                }
            };

            let (first, rest) = split_once_top_level(&text[open + 1..inner_end], ',');
            let name = literal_contents(first).unwrap_or_default().to_string();
            let arguments = match rest {
                Some(rest) if self.hook_type.tracks_arguments() => normalize_arguments(rest),
                _ => Vec::new(),
            };

            matches.push(RawMatch {
                start: head.start(),
                end,
                name,
                arguments,
                complete,
            });
        }

        matches
    }
}

/// Angle-bracket outlets: `<PluginOutlet @name="..." @outletArgs={{hash ...}} />`
pub struct OutletTagMatcher;

impl HookMatcher for OutletTagMatcher {
    fn hook_type(&self) -> HookType {
        HookType::PluginOutlet
    }

    fn find_all(&self, text: &str) -> Vec<RawMatch> {
        OUTLET_TAG_HEAD
            .find_iter(text)
            .map(|head| {
                let (end, complete) = match find_unnested(text, head.end(), ">") {
                    Some(end) => (end, true),
                    None => (line_end(text, head.end()), false),
                };
                let tag = &text[head.start()..end];
                let name = OUTLET_TAG_NAME
                    .captures(tag)
                    .map(|caps| first_capture(&caps))
                    .unwrap_or_default();

                RawMatch {
                    start: head.start(),
                    end,
                    name,
                    arguments: outlet_argument_keys(tag),
                    complete,
                }
            })
            .collect()
    }
}

/// Mustache outlets: `{{plugin-outlet name="..." args=(hash ...)}}`
///
/// Both the inline and the block (`{{#plugin-outlet}}`) forms are matched,
/// with the name given either as `name=` or as the first positional argument.
pub struct LegacyOutletMatcher;

impl HookMatcher for LegacyOutletMatcher {
    fn hook_type(&self) -> HookType {
        HookType::PluginOutlet
    }

    fn find_all(&self, text: &str) -> Vec<RawMatch> {
        OUTLET_MUSTACHE_HEAD
            .find_iter(text)
            .map(|head| {
                let (end, complete) = match find_unnested(text, head.end(), "}}") {
                    Some(end) => (end, true),
                    None => (line_end(text, head.end()), false),
                };
                let body_end = if complete { end - 2 } else { end };
                let body = &text[head.end()..body_end];

                let masked = mask_nested(body);
                let name = OUTLET_MUSTACHE_NAME
                    .captures(&masked)
                    .or_else(|| POSITIONAL_NAME.captures(&masked))
                    .map(|caps| first_capture(&caps))
                    .unwrap_or_default();

                RawMatch {
                    start: head.start(),
                    end,
                    name,
                    arguments: outlet_argument_keys(body),
                    complete,
                }
            })
            .collect()
    }
}
