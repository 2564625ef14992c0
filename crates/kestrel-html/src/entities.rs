//! Character reference decoding for text and attribute values.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
//!
//! The full table has 2,231 entries; this covers the ones that show up in
//! ordinary prose. Unknown references are left exactly as written.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Entity name (without `&` and `;`) to replacement text.
static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("quot", "\""),
        ("apos", "'"),
        ("nbsp", "\u{00A0}"),
        ("copy", "\u{00A9}"),
        ("reg", "\u{00AE}"),
        ("trade", "\u{2122}"),
        ("hellip", "\u{2026}"),
        ("mdash", "\u{2014}"),
        ("ndash", "\u{2013}"),
        ("laquo", "\u{00AB}"),
        ("raquo", "\u{00BB}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("bull", "\u{2022}"),
        ("middot", "\u{00B7}"),
        ("times", "\u{00D7}"),
        ("divide", "\u{00F7}"),
        ("deg", "\u{00B0}"),
        ("euro", "\u{20AC}"),
        ("pound", "\u{00A3}"),
        ("yen", "\u{00A5}"),
        ("cent", "\u{00A2}"),
        ("sect", "\u{00A7}"),
        ("para", "\u{00B6}"),
        ("larr", "\u{2190}"),
        ("rarr", "\u{2192}"),
        ("eacute", "\u{00E9}"),
        ("egrave", "\u{00E8}"),
        ("aacute", "\u{00E1}"),
        ("auml", "\u{00E4}"),
        ("ouml", "\u{00F6}"),
        ("uuml", "\u{00FC}"),
        ("ccedil", "\u{00E7}"),
        ("ntilde", "\u{00F1}"),
    ])
});

/// Legacy names that are recognised even without the trailing `;`.
const LEGACY_NO_SEMICOLON: &[&str] = &["amp", "lt", "gt", "quot"];

/// Longest entity name worth scanning for before giving up.
const MAX_NAME_LEN: usize = 8;

/// Look up a named reference by name, without `&` or `;`.
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

/// Decode `&name;`, `&#NN;` and `&#xHH;` references in `text`.
///
/// Borrows when there is nothing to decode.
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_one(after) {
            Some((replacement, consumed)) => {
                out.push_str(&replacement);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode the reference at the start of `s` (just past the `&`). Returns the
/// replacement and the number of bytes consumed.
fn decode_one(s: &str) -> Option<(String, usize)> {
    if let Some(numeric) = s.strip_prefix('#') {
        let (digits, radix, prefix_len) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, 2),
            None => (numeric, 10, 1),
        };
        let len = digits
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(digits.len());
        if len == 0 {
            return None;
        }
        let value = u32::from_str_radix(&digits[..len], radix).ok()?;
        let ch = char::from_u32(value)
            .filter(|&c| c != '\0')
            .unwrap_or('\u{FFFD}');
        let semicolon = usize::from(digits[len..].starts_with(';'));
        return Some((ch.to_string(), prefix_len + len + semicolon));
    }

    let len = s
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(s.len());
    if len == 0 || len > MAX_NAME_LEN {
        return None;
    }
    let name = &s[..len];
    let replacement = lookup_entity(name)?;

    if s[len..].starts_with(';') {
        Some((replacement.to_string(), len + 1))
    } else if LEGACY_NO_SEMICOLON.contains(&name) {
        Some((replacement.to_string(), len))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_references() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&copy; 2024"), "\u{00A9} 2024");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("&#0;"), "\u{FFFD}");
    }

    #[test]
    fn test_unknown_and_bare_ampersands_are_kept() {
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("&copy"), "&copy");
        assert_eq!(decode_entities("&#;"), "&#;");
    }

    #[test]
    fn test_legacy_without_semicolon() {
        assert_eq!(decode_entities("a&ampb"), "a&ampb");
        assert_eq!(decode_entities("x &amp y"), "x & y");
    }

    #[test]
    fn test_no_allocation_without_ampersand() {
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }
}
