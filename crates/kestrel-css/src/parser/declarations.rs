use kestrel_common::warning::warn_once;

use super::Declaration;
use super::scan::split_top_level;

/// [§ 5.3.8 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
///
/// Parse the body of a rule block or a `style=""` attribute. Declarations
/// are separated by `;` outside strings and parentheses. A piece without a
/// `:`, with an empty name or with an empty value is dropped.
#[must_use]
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    for piece in split_top_level(text, ';') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let Some((property, value)) = piece.split_once(':') else {
            warn_once("CSS", &format!("dropped declaration without ':' ({piece})"));
            continue;
        };
        let property = property.trim();
        let (value, important) = strip_important(value);
        if property.is_empty() || value.is_empty() {
            warn_once("CSS", &format!("dropped empty declaration ({piece})"));
            continue;
        }
        declarations.push(Declaration::new(property, value, important));
    }

    declarations
}

/// Split a trailing `! important` (any case, optional space after `!`) off
/// a value.
fn strip_important(value: &str) -> (&str, bool) {
    if let Some(bang) = value.rfind('!')
        && value[bang + 1..].trim().eq_ignore_ascii_case("important")
    {
        return (value[..bang].trim(), true);
    }
    (value.trim(), false)
}
