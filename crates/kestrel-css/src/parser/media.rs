use crate::values::ROOT_FONT_SIZE_PX;

/// [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/)
///
/// Evaluate a media query against a screen of `viewport_width` pixels.
///
/// - Comma-separated queries match if any does.
/// - `and` joins conditions that must all hold.
/// - `all` and `screen` match, `print` never does.
/// - `(min-width: N)` and `(max-width: N)` compare against the width, with
///   `px` or `em` lengths.
/// - Anything else is assumed to match, as is an empty query.
#[must_use]
pub fn evaluate_media_query(query: &str, viewport_width: f32) -> bool {
    let query = query.trim().to_ascii_lowercase();
    if query.is_empty() {
        return true;
    }
    query
        .split(',')
        .any(|alternative| evaluate_alternative(alternative, viewport_width))
}

fn evaluate_alternative(alternative: &str, viewport_width: f32) -> bool {
    let alternative = alternative.trim();
    let alternative = alternative.strip_prefix("only ").unwrap_or(alternative);
    alternative
        .split(" and ")
        .all(|condition| evaluate_condition(condition.trim(), viewport_width))
}

fn evaluate_condition(condition: &str, viewport_width: f32) -> bool {
    match condition {
        "print" => false,
        "all" | "screen" | "" => true,
        _ => {
            let Some(inner) = condition
                .strip_prefix('(')
                .and_then(|c| c.strip_suffix(')'))
            else {
                return true;
            };
            let Some((feature, value)) = inner.split_once(':') else {
                return true;
            };
            let Some(width) = parse_width(value.trim()) else {
                return true;
            };
            match feature.trim() {
                "min-width" => viewport_width >= width,
                "max-width" => viewport_width <= width,
                _ => true,
            }
        }
    }
}

fn parse_width(value: &str) -> Option<f32> {
    if let Some(px) = value.strip_suffix("px") {
        px.trim().parse().ok()
    } else if let Some(em) = value.strip_suffix("em") {
        em.trim().parse::<f32>().ok().map(|v| v * ROOT_FONT_SIZE_PX)
    } else {
        value.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_types() {
        assert!(evaluate_media_query("screen", 800.0));
        assert!(evaluate_media_query("ALL", 800.0));
        assert!(!evaluate_media_query("print", 800.0));
        assert!(evaluate_media_query("", 800.0));
        assert!(evaluate_media_query("speech", 800.0));
    }

    #[test]
    fn test_width_features() {
        assert!(evaluate_media_query("(min-width: 600px)", 800.0));
        assert!(!evaluate_media_query("(min-width: 900px)", 800.0));
        assert!(evaluate_media_query("(max-width: 800px)", 800.0));
        assert!(!evaluate_media_query("screen and (max-width: 40em)", 800.0));
        assert!(evaluate_media_query("only screen and (min-width:100px)", 800.0));
    }

    #[test]
    fn test_alternatives() {
        assert!(evaluate_media_query("print, (max-width: 900px)", 800.0));
        assert!(!evaluate_media_query("print, (min-width: 900px)", 800.0));
    }
}
