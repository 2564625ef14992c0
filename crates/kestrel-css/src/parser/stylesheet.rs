use kestrel_common::warning::warn_once;

use super::scan::{find_top_level, matching_brace, split_top_level, strip_comments};
use super::{CascadeRule, MediaRule, Stylesheet, parse_declarations};
use crate::selector::SelectorCache;

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// Parse CSS text. Never fails; the result holds whatever could be
/// recovered.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let text = strip_comments(css);
    let mut sheet = Stylesheet::default();
    let mut cache = SelectorCache::new();
    parse_rule_list(&text, &mut sheet, &mut cache, false);
    sheet
}

/// Walk a list of rules and at-rules. Inside an `@media` block (`nested`),
/// at-rules are skipped.
fn parse_rule_list(text: &str, sheet: &mut Stylesheet, cache: &mut SelectorCache, nested: bool) {
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        let after = if rest.starts_with('@') {
            parse_at_rule(rest, sheet, cache, nested)
        } else if let Some(stray) = rest.strip_prefix('}') {
            warn_once("CSS", "skipped unmatched '}'");
            stray
        } else {
            parse_style_rule(rest, sheet, cache)
        };
        rest = after.trim_start();
    }
}

/// Parse the at-rule at the start of `text`; returns the text after it.
fn parse_at_rule<'a>(
    text: &'a str,
    sheet: &mut Stylesheet,
    cache: &mut SelectorCache,
    nested: bool,
) -> &'a str {
    let name_len = text[1..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(text.len() - 1);
    let name = text[1..=name_len].to_ascii_lowercase();

    match find_top_level(text, &[';', '{']) {
        Some((end, ';')) => {
            let prelude = text[1 + name_len..end].trim();
            match name.as_str() {
                "charset" if !nested => {
                    if sheet.charset.is_none() {
                        sheet.charset = Some(unquote(prelude).to_string());
                    }
                }
                "import" if !nested => {
                    if let Some(target) = import_target(prelude) {
                        sheet.imports.push(target);
                    }
                }
                _ => warn_once("CSS", &format!("skipped unsupported at-rule @{name}")),
            }
            &text[end + 1..]
        }
        Some((open, _)) => {
            let close = matching_brace(text, open);
            let body = &text[open + 1..close.unwrap_or(text.len())];
            if name == "media" && !nested {
                let mut inner = Stylesheet::default();
                parse_rule_list(body, &mut inner, cache, true);
                sheet.media_rules.push(MediaRule {
                    query: text[1 + name_len..open].trim().to_string(),
                    rules: inner.rules,
                });
            } else {
                warn_once("CSS", &format!("skipped unsupported at-rule @{name}"));
            }
            close.map_or("", |c| &text[c + 1..])
        }
        None => {
            warn_once("CSS", &format!("dropped unterminated at-rule @{name}"));
            ""
        }
    }
}

/// Parse `selectors { declarations }` at the start of `text`; returns the
/// text after it.
fn parse_style_rule<'a>(
    text: &'a str,
    sheet: &mut Stylesheet,
    cache: &mut SelectorCache,
) -> &'a str {
    let Some((open, c)) = find_top_level(text, &['{', '}', ';']) else {
        warn_once("CSS", &format!("dropped rule without '{{' ({})", text.trim()));
        return "";
    };
    if c != '{' {
        let dropped = text[..open].trim();
        warn_once("CSS", &format!("dropped rule without '{{' ({dropped})"));
        return &text[open + 1..];
    }

    let close = matching_brace(text, open);
    let body = &text[open + 1..close.unwrap_or(text.len())];
    let rest = close.map_or("", |c| &text[c + 1..]);

    let selectors: Vec<String> = split_top_level(&text[..open], ',')
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if selectors.is_empty() {
        warn_once("CSS", "dropped rule with an empty selector list");
        return rest;
    }

    let rule = CascadeRule::new(selectors, parse_declarations(body), cache);
    for (selector, parsed) in rule.selectors.iter().zip(&rule.parsed) {
        if parsed.is_none() {
            warn_once("CSS", &format!("unsupported selector '{selector}'"));
        }
    }
    sheet.rules.push(rule);
    rest
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}

/// The URL of `@import url(x) ...`, `@import "x" ...` or `@import x`.
fn import_target(prelude: &str) -> Option<String> {
    let target = if prelude
        .get(..4)
        .is_some_and(|head| head.eq_ignore_ascii_case("url("))
    {
        let end = prelude.find(')')?;
        unquote(&prelude[4..end])
    } else if let Some(quote @ ('"' | '\'')) = prelude.chars().next() {
        let end = prelude[1..].find(quote)?;
        &prelude[1..=end]
    } else {
        prelude.split_whitespace().next()?
    };
    (!target.is_empty()).then(|| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_forms() {
        assert_eq!(import_target("url(\"a.css\") screen").as_deref(), Some("a.css"));
        assert_eq!(import_target("'b.css'").as_deref(), Some("b.css"));
        assert_eq!(import_target("c.css").as_deref(), Some("c.css"));
        assert_eq!(import_target("\"\""), None);
        assert_eq!(import_target("\"éé\"").as_deref(), Some("éé"));
        assert_eq!(import_target("ü").as_deref(), Some("ü"));
    }

    #[test]
    fn test_stray_semicolon_text_is_skipped() {
        let sheet = parse_stylesheet("garbage; p { color: red }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, vec!["p"]);
    }
}
