//! Declared values.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//!
//! A [`StyleValue`] keeps the raw declaration text alongside its
//! classification. Relative lengths (`em`, `rem`, `%`) stay unresolved until
//! a base font size is known.

mod color;

pub use color::Color;

use std::fmt;

use serde::Serialize;

/// Pixels per `rem`. The root font size is fixed.
pub const ROOT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    /// Pixels.
    Px,
    /// Relative to the element's font size.
    Em,
    /// Relative to the root font size.
    Rem,
    /// Points, 1pt = 1/72in.
    Pt,
    /// Picas, 1pc = 12pt.
    Pc,
    /// Inches.
    In,
    /// Centimeters.
    Cm,
    /// Millimeters.
    Mm,
    /// x-height.
    Ex,
    /// Advance of the `0` glyph.
    Ch,
    /// 1% of viewport width.
    Vw,
    /// 1% of viewport height.
    Vh,
    /// Anything else, lowercased.
    Other(String),
}

impl Unit {
    /// Classify a unit suffix (case-insensitive).
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix.to_ascii_lowercase().as_str() {
            "px" => Self::Px,
            "em" => Self::Em,
            "rem" => Self::Rem,
            "pt" => Self::Pt,
            "pc" => Self::Pc,
            "in" => Self::In,
            "cm" => Self::Cm,
            "mm" => Self::Mm,
            "ex" => Self::Ex,
            "ch" => Self::Ch,
            "vw" => Self::Vw,
            "vh" => Self::Vh,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Px => "px",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Pt => "pt",
            Self::Pc => "pc",
            Self::In => "in",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::Ex => "ex",
            Self::Ch => "ch",
            Self::Vw => "vw",
            Self::Vh => "vh",
            Self::Other(other) => other,
        };
        f.write_str(s)
    }
}

/// [§ 6 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
///
/// Convert `value` in `unit` to pixels. `em` resolves against
/// `base_font_size`, `rem` against the fixed root size. Units without a
/// conversion are taken as pixels.
#[must_use]
pub fn to_px(value: f32, unit: &Unit, base_font_size: f32) -> f32 {
    match unit {
        Unit::Em => value * base_font_size,
        Unit::Rem => value * ROOT_FONT_SIZE_PX,
        Unit::Pt => value * 96.0 / 72.0,
        Unit::Pc => value * 16.0,
        Unit::In => value * 96.0,
        Unit::Cm => value * 37.795,
        Unit::Mm => value * 3.7795,
        Unit::Px | Unit::Ex | Unit::Ch | Unit::Vw | Unit::Vh | Unit::Other(_) => value,
    }
}

/// Classification of a declared value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValueKind {
    /// A bare identifier or anything unclassified, e.g. `block`, `0 auto`.
    Keyword(String),
    /// A unitless number.
    Number(f32),
    /// A number with a unit.
    Length(f32, Unit),
    /// `<number>%`
    Percentage(f32),
    /// Any color form [`Color::parse`] accepts.
    Color(Color),
    /// `url(...)` with quotes removed.
    Url(String),
    /// A quoted string with quotes removed.
    Str(String),
    /// `name(args, ...)`
    Function {
        /// Lowercased function name.
        name: String,
        /// Comma-separated arguments, trimmed.
        args: Vec<String>,
    },
    /// Comma-separated keywords, e.g. a `font-family` list.
    KeywordList(Vec<String>),
}

/// A declared value with its original text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleValue {
    /// The value as written, trimmed.
    pub raw: String,
    /// What the value was classified as.
    pub kind: ValueKind,
}

impl StyleValue {
    /// [§ 2 Value Definition Syntax](https://www.w3.org/TR/css-values-4/#value-defs)
    ///
    /// Classify `raw`, trying in order: `url()`, quoted string, function
    /// (with `rgb()`/`rgba()` recognized as colors), color, number with an
    /// optional unit or `%`, comma-separated list, keyword.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();

        let kind = if lower.starts_with("url(") && raw.ends_with(')') {
            ValueKind::Url(unquote(raw[4..raw.len() - 1].trim()).to_string())
        } else if let Some(inner) = quoted(raw) {
            ValueKind::Str(inner.to_string())
        } else if let Some((name, args)) = function_parts(raw) {
            match Color::parse(raw) {
                Some(color) if name == "rgb" || name == "rgba" => ValueKind::Color(color),
                _ => ValueKind::Function { name, args },
            }
        } else if let Some(color) = Color::parse(raw) {
            ValueKind::Color(color)
        } else if let Some(numeric) = parse_numeric(raw) {
            numeric
        } else if raw.contains(',') {
            ValueKind::KeywordList(
                raw.split(',')
                    .map(|part| unquote(part.trim()).to_string())
                    .filter(|part| !part.is_empty())
                    .collect(),
            )
        } else {
            ValueKind::Keyword(raw.to_string())
        };

        Self {
            raw: raw.to_string(),
            kind,
        }
    }

    /// A pixel length.
    #[must_use]
    pub fn px(value: f32) -> Self {
        Self {
            raw: format!("{value}px"),
            kind: ValueKind::Length(value, Unit::Px),
        }
    }

    /// A keyword.
    #[must_use]
    pub fn keyword(value: &str) -> Self {
        Self {
            raw: value.to_string(),
            kind: ValueKind::Keyword(value.to_string()),
        }
    }

    /// The color this value denotes, if any.
    #[must_use]
    pub const fn as_color(&self) -> Option<Color> {
        match &self.kind {
            ValueKind::Color(color) => Some(*color),
            _ => None,
        }
    }

    /// Resolve to pixels. Lengths and unitless numbers convert with
    /// [`to_px`]; percentages are taken of `base_font_size`. Anything else
    /// (including `auto`) has no pixel value.
    #[must_use]
    pub fn to_px(&self, base_font_size: f32) -> Option<f32> {
        match &self.kind {
            ValueKind::Length(value, unit) => Some(to_px(*value, unit, base_font_size)),
            ValueKind::Number(value) => Some(*value),
            ValueKind::Percentage(value) => Some(value / 100.0 * base_font_size),
            _ => None,
        }
    }

    /// The value as a lowercased keyword, if it is one.
    #[must_use]
    pub fn as_keyword(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The contents of `s` when it is wrapped in matching quotes.
fn quoted(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if s.len() >= 2 && (first == '"' || first == '\'') && s.ends_with(first) {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

fn unquote(s: &str) -> &str {
    quoted(s).unwrap_or(s)
}

/// Split `name(a, b)` into its lowercased name and trimmed arguments.
fn function_parts(s: &str) -> Option<(String, Vec<String>)> {
    let open = s.find('(')?;
    if !s.ends_with(')') || open == 0 {
        return None;
    }
    let name = &s[..open];
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }
    let args = s[open + 1..s.len() - 1]
        .split(',')
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
        .collect();
    Some((name.to_ascii_lowercase(), args))
}

/// `12`, `-1.5em`, `50%`, `.5rem`. The whole string must be one number
/// followed by an optional alphabetic unit or `%`.
fn parse_numeric(s: &str) -> Option<ValueKind> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        if b.is_ascii_digit() {
            end += 1;
        } else if b == b'.' && !seen_dot {
            seen_dot = true;
            end += 1;
        } else {
            break;
        }
    }
    let number = &s[..end];
    if !number[digits_start..].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: f32 = number.parse().ok()?;
    let suffix = &s[end..];

    if suffix.is_empty() {
        Some(ValueKind::Number(value))
    } else if suffix == "%" {
        Some(ValueKind::Percentage(value))
    } else if suffix.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(ValueKind::Length(value, Unit::from_suffix(suffix)))
    } else {
        None
    }
}
