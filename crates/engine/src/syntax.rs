//! Quote- and bracket-aware scanning of JavaScript and template text
//!
//! The extractor does not parse its input. It only needs three things from
//! the text around a match: where a bracketed construct ends, where its
//! top-level commas are, and which lines it spans. All three skip string
//! literals (honouring backslash escapes) and `//` / `/* */` comments.

use std::iter::Peekable;
use std::str::CharIndices;

/// Iterator over the characters of `text` that are code
///
/// String literal contents, their delimiting quotes and comments are skipped.
/// Offsets are byte offsets into the original text.
pub struct CodeChars<'a> {
    chars: Peekable<CharIndices<'a>>,
    quotes: bool,
    pending: Option<(usize, char)>,
}

impl<'a> CodeChars<'a> {
    /// Start scanning `text`
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            quotes: false,
            pending: None,
        }
    }

    /// Like [`CodeChars::new`], but a string literal yields its first and
    /// last character so its extent stays visible
    #[must_use]
    pub fn with_quotes(text: &'a str) -> Self {
        Self {
            quotes: true,
            ..Self::new(text)
        }
    }

    /// Consume a string literal; returns its last character (normally the
    /// closing quote)
    fn skip_string(&mut self, quote: char) -> Option<(usize, char)> {
        let mut escaped = false;
        let mut last = None;
        for (index, c) in self.chars.by_ref() {
            last = Some((index, c));
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                break;
            }
        }
        last
    }

    fn skip_line_comment(&mut self) {
        while let Some((_, c)) = self.chars.peek() {
            if *c == '\n' {
                return;
            }
            self.chars.next();
        }
    }

    fn skip_block_comment(&mut self) {
        let mut star = false;
        for (_, c) in self.chars.by_ref() {
            if star && c == '/' {
                return;
            }
            star = c == '*';
        }
    }
}

impl Iterator for CodeChars<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        loop {
            let (index, c) = self.chars.next()?;
            match c {
                '"' | '\'' | '`' => {
                    let last = self.skip_string(c);
                    if self.quotes {
                        self.pending = last;
                        return Some((index, c));
                    }
                }
                '/' if matches!(self.chars.peek(), Some((_, '/'))) => self.skip_line_comment(),
                '/' if matches!(self.chars.peek(), Some((_, '*'))) => {
                    self.chars.next();
                    self.skip_block_comment();
                }
                _ => return Some((index, c)),
            }
        }
    }
}

const fn opens(c: char) -> bool {
    matches!(c, '(' | '[' | '{')
}

const fn closes(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

/// Split `text` on `separator` where it appears outside brackets and strings
///
/// Parts are trimmed of whitespace and of comments at either end; empty
/// parts (e.g. from a trailing comma) are dropped.
///
/// ```
/// use hookscope_engine::syntax::split_top_level;
///
/// let parts = split_top_level("a, {b: 1, c: 2}, [1,2]", ',');
/// assert_eq!(parts, ["a", "{b: 1, c: 2}", "[1,2]"]);
/// ```
#[must_use]
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, c) in CodeChars::new(text) {
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth = depth.saturating_sub(1);
        } else if c == separator && depth == 0 {
            parts.push(trim_code(&text[start..index]));
            start = index + c.len_utf8();
        }
    }
    parts.push(trim_code(&text[start..]));

    parts.retain(|part| !part.is_empty());
    parts
}

/// Split `text` at the first `separator` outside brackets and strings
///
/// The head is trimmed with [`trim_code`]; the tail (if any) is returned
/// untrimmed.
#[must_use]
pub fn split_once_top_level(text: &str, separator: char) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (index, c) in CodeChars::new(text) {
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth = depth.saturating_sub(1);
        } else if c == separator && depth == 0 {
            return (trim_code(&text[..index]), Some(&text[index + c.len_utf8()..]));
        }
    }
    (trim_code(text), None)
}

/// Trim whitespace and leading or trailing comments from `text`
///
/// Comments between code characters are kept.
#[must_use]
pub fn trim_code(text: &str) -> &str {
    let mut span: Option<(usize, usize)> = None;
    for (index, c) in CodeChars::with_quotes(text) {
        if c.is_whitespace() {
            continue;
        }
        let end = index + c.len_utf8();
        span = Some(span.map_or((index, end), |(start, _)| (start, end)));
    }
    span.map_or("", |(start, end)| &text[start..end])
}

/// Byte offset of the bracket closing the one at `open`
///
/// `text[open..]` must start with `(`, `[` or `{`. Returns `None` when the
/// construct is not closed before the end of `text`.
#[must_use]
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let tail = text.get(open..)?;
    if !tail.starts_with(opens) {
        return None;
    }

    let mut depth = 0usize;
    for (index, c) in CodeChars::new(tail) {
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(open + index);
            }
        }
    }
    None
}

/// Offset just past the first `terminator` found outside brackets and strings
///
/// Scanning starts at `from`. Returns `None` if the terminator never appears
/// at depth zero.
#[must_use]
pub fn find_unnested(text: &str, from: usize, terminator: &str) -> Option<usize> {
    let tail = text.get(from..)?;
    let first = terminator.chars().next()?;
    let mut depth = 0usize;

    for (index, c) in CodeChars::new(tail) {
        if depth == 0 && c == first && tail[index..].starts_with(terminator) {
            return Some(from + index + terminator.len());
        }
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth = depth.saturating_sub(1);
        }
    }
    None
}

/// Replace everything nested inside brackets with spaces
///
/// Byte offsets are preserved, so matches found in the masked text map
/// directly back onto the original.
#[must_use]
pub fn mask_nested(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        let in_code = quote.is_none();
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
        } else if matches!(c, '"' | '\'' | '`') {
            quote = Some(c);
        } else if closes(c) {
            depth = depth.saturating_sub(1);
        }

        if depth > 0 {
            masked.extend(std::iter::repeat_n(' ', c.len_utf8()));
        } else {
            masked.push(c);
        }

        if in_code && opens(c) {
            depth += 1;
        }
    }

    masked
}

/// Replace the contents of string literals with spaces
///
/// Delimiting quotes are kept and byte offsets are preserved.
#[must_use]
pub fn mask_strings(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        match quote {
            Some(open) if !escaped && c == open => {
                quote = None;
                masked.push(c);
            }
            Some(_) => {
                escaped = !escaped && c == '\\';
                masked.extend(std::iter::repeat_n(' ', c.len_utf8()));
            }
            None => {
                if matches!(c, '"' | '\'' | '`') {
                    quote = Some(c);
                }
                masked.push(c);
            }
        }
    }

    masked
}

/// Maps byte offsets to 1-based line numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    /// Index the newlines of `text`
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            newlines: text
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Line containing `offset` (newlines before it, plus one)
    #[must_use]
    pub fn line_of(&self, offset: usize) -> u32 {
        let before = self.newlines.partition_point(|&nl| nl < offset);
        u32::try_from(before + 1).unwrap_or(u32::MAX)
    }

    /// First and last line of the match `start..end`
    ///
    /// The last line is the first line plus the newlines inside the match.
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> (u32, u32) {
        (self.line_of(start), self.line_of(end.max(start)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_split_ignores_nested_commas() {
        let parts = split_top_level("a, {b: 1, c: 2}, [1,2]", ',');
        assert_eq!(parts, vec!["a", "{b: 1, c: 2}", "[1,2]"]);
    }

    #[test]
    fn test_split_ignores_commas_in_strings() {
        let parts = split_top_level(r#""a,b", 'c,d', `e,${f, g}`, fn(x, y)"#, ',');
        assert_eq!(parts, vec![r#""a,b""#, "'c,d'", "`e,${f, g}`", "fn(x, y)"]);
    }

    #[test]
    fn test_split_handles_escaped_quotes() {
        let parts = split_top_level(r#""say \"hi, there\"", other"#, ',');
        assert_eq!(parts, vec![r#""say \"hi, there\"""#, "other"]);
    }

    #[test]
    fn test_split_drops_trailing_comma_and_empty_input() {
        assert_eq!(split_top_level("a,\n  b,\n", ','), vec!["a", "b"]);
        assert!(split_top_level("   ", ',').is_empty());
    }

    #[test]
    fn test_split_skips_comments() {
        let parts = split_top_level("a, // don't, split\n b", ',');
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1], "b");
    }

    #[test]
    fn test_split_drops_comments_around_arguments() {
        let text = "\n topic, // the topic\n user /* current */,\n /* only a note */\n";
        assert_eq!(split_top_level(text, ','), vec!["topic", "user"]);
    }

    #[test]
    fn test_trim_code_keeps_strings_and_inner_comments() {
        assert_eq!(trim_code("  \"a // b\"  // tail"), "\"a // b\"");
        assert_eq!(trim_code("/* x */ a /* y */ + b // z"), "a /* y */ + b");
        assert_eq!(trim_code("'unterminated"), "'unterminated");
        assert_eq!(trim_code(" // only\n "), "");
    }

    #[test]
    fn test_split_once_drops_leading_comment() {
        let (head, tail) = split_once_top_level("// name\n \"card-title\", x", ',');
        assert_eq!(head, "\"card-title\"");
        assert_eq!(tail, Some(" x"));
    }

    #[test]
    fn test_split_once_top_level() {
        let (head, tail) = split_once_top_level(" \"a,b\" , x, (y, z)", ',');
        assert_eq!(head, "\"a,b\"");
        assert_eq!(tail, Some(" x, (y, z)"));
        assert_eq!(split_once_top_level("only", ','), ("only", None));
    }

    #[test]
    fn test_matching_close_multiline() {
        let text = "call(a, {\n  b: \")\",\n}, [c])";
        let close = matching_close(text, 4).unwrap();
        assert_eq!(close, text.len() - 1);
    }

    #[test]
    fn test_matching_close_unterminated() {
        assert_eq!(matching_close("call(a, b", 4), None);
        assert_eq!(matching_close("abc", 0), None);
    }

    #[test]
    fn test_find_unnested_skips_braces() {
        let text = "<X @a={{if x \">\" y}} />rest";
        let end = find_unnested(text, 2, ">").unwrap();
        assert_eq!(&text[..end], "<X @a={{if x \">\" y}} />");
    }

    #[test]
    fn test_mask_nested_preserves_offsets() {
        let text = r#"name="x" args=(hash name="y" a=b)"#;
        let masked = mask_nested(text);
        assert_eq!(masked.len(), text.len());
        assert!(masked.starts_with(r#"name="x" args=("#));
        assert!(!masked.contains('y'));
        assert_eq!(masked.matches("name").count(), 1);
    }

    #[test]
    fn test_mask_strings_blanks_literal_contents() {
        let text = r#"title="a for=b" c='x\'y=z' d=e"#;
        let masked = mask_strings(text);
        assert_eq!(masked.len(), text.len());
        assert_eq!(masked, r#"title="       " c='      ' d=e"#);
    }

    #[test]
    fn test_line_index_span() {
        let text = "one\ntwo\nthree(\nfour)\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(4), 2);

        let start = text.find("three").unwrap();
        let end = text.find(')').unwrap() + 1;
        assert_eq!(index.span(start, end), (3, 4));
        assert_eq!(index.span(0, 3), (1, 1));
    }
}
