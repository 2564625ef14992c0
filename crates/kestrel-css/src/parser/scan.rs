//! Structural scanning shared by the rule and declaration splitters.

use std::str::CharIndices;

/// Characters of `text` that sit outside quoted strings, with their byte
/// offsets. A backslash hides the character after it, so `\"` never opens
/// or closes a string.
pub(super) struct Structural<'a> {
    chars: CharIndices<'a>,
    quote: Option<char>,
    escaped: bool,
}

impl<'a> Structural<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices(),
            quote: None,
            escaped: false,
        }
    }
}

impl Iterator for Structural<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, c) = self.chars.next()?;
            if self.escaped {
                self.escaped = false;
                continue;
            }
            if c == '\\' {
                self.escaped = true;
                continue;
            }
            match self.quote {
                Some(q) => {
                    if c == q {
                        self.quote = None;
                    }
                }
                None if c == '"' || c == '\'' => self.quote = Some(c),
                None => return Some((i, c)),
            }
        }
    }
}

/// Byte offset of the `}` that closes the block whose `{` is at `open`.
pub(super) fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in Structural::new(&text[open..]) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// First character from `targets` that is outside strings and outside
/// `()`/`[]` nesting.
pub(super) fn find_top_level(text: &str, targets: &[char]) -> Option<(usize, char)> {
    let mut depth = 0usize;
    for (i, c) in Structural::new(text) {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && targets.contains(&c) => return Some((i, c)),
            _ => {}
        }
    }
    None
}

/// Split `text` at every top-level `separator`.
pub(super) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some((i, _)) = find_top_level(rest, &[separator]) {
        parts.push(&rest[..i]);
        rest = &rest[i + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// Remove `/* ... */` comments. An unterminated comment runs to the end.
pub(super) fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braces_in_strings_are_ignored() {
        let text = r#"a { content: "}"; } b"#;
        assert_eq!(matching_brace(text, 2), Some(18));
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let text = r#"{ content: "a\"}"; }"#;
        assert_eq!(matching_brace(text, 0), Some(text.len() - 1));
    }

    #[test]
    fn test_split_respects_parentheses() {
        assert_eq!(
            split_top_level("a: url(x;y); b: 1", ';'),
            vec!["a: url(x;y)", " b: 1"]
        );
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a/* x */b/* open"), "ab");
    }
}
