//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! "The computed value is the result of resolving the specified value..."

use std::collections::{BTreeMap, BTreeSet};

use kestrel_common::warning::warn_once;
use serde::Serialize;

use crate::parser::Declaration;
use crate::values::{Color, ROOT_FONT_SIZE_PX, StyleValue, ValueKind};

/// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
///
/// Properties copied from the parent's computed style before the element's
/// own rules apply.
pub const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "cursor",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "letter-spacing",
    "line-height",
    "list-style",
    "list-style-position",
    "list-style-type",
    "text-align",
    "text-transform",
    "visibility",
    "white-space",
    "word-spacing",
];

/// Whether `property` inherits by default.
#[must_use]
pub fn is_inherited(property: &str) -> bool {
    INHERITED_PROPERTIES.contains(&property)
}

/// Box sides in shorthand order.
const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Property name to value for one element, plus the set of properties whose
/// value came from an `!important` declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComputedStyle {
    /// Current value per property.
    pub properties: BTreeMap<String, StyleValue>,
    /// Properties locked by `!important`.
    pub important: BTreeSet<String>,
}

impl ComputedStyle {
    /// The value of `property`, if set.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.properties.get(property)
    }

    /// Set `property` unconditionally.
    pub fn set(&mut self, property: &str, value: StyleValue) {
        let _ = self.properties.insert(property.to_string(), value);
    }

    /// Whether `property` holds an `!important` value.
    #[must_use]
    pub fn is_important(&self, property: &str) -> bool {
        self.important.contains(property)
    }

    /// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// Copy every inherited property `parent` has into this style.
    /// Importance is not inherited.
    pub fn inherit_from(&mut self, parent: &Self) {
        for &property in INHERITED_PROPERTIES {
            if let Some(value) = parent.get(property) {
                self.set(property, value.clone());
            }
        }
    }

    /// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    ///
    /// Apply one declaration on top of what is already here. A property
    /// already set by an `!important` declaration is only replaced by another
    /// `!important` one. Shorthands expand to their longhands first.
    pub fn apply_declaration(&mut self, decl: &Declaration) {
        match decl.property.as_str() {
            // [§ 9.2 Shorthand properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
            "margin" | "padding" => self.apply_box_shorthand(decl),
            // [§ 3.10 background](https://www.w3.org/TR/css-backgrounds-3/#background)
            "background" => {
                self.write("background", decl.value.clone(), decl.important);
                if let Some(color) = background_color_of(&decl.value) {
                    self.write(
                        "background-color",
                        StyleValue {
                            raw: decl.value.raw.clone(),
                            kind: ValueKind::Color(color),
                        },
                        decl.important,
                    );
                }
            }
            property => self.write(property, decl.value.clone(), decl.important),
        }
    }

    fn write(&mut self, property: &str, value: StyleValue, important: bool) {
        if important {
            let _ = self.important.insert(property.to_string());
        } else if self.is_important(property) {
            return;
        }
        self.set(property, value);
    }

    /// `margin: 1px 2px` and friends: one to four values mapped onto
    /// top, right, bottom, left.
    fn apply_box_shorthand(&mut self, decl: &Declaration) {
        let parts: Vec<StyleValue> = decl
            .value
            .raw
            .split_whitespace()
            .map(StyleValue::parse)
            .collect();
        let [top, right, bottom, left] = match parts.as_slice() {
            [all] => [all, all, all, all],
            [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
            [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
            [top, right, bottom, left] => [top, right, bottom, left],
            _ => {
                warn_once(
                    "CSS",
                    &format!("dropped {} shorthand '{}'", decl.property, decl.value.raw),
                );
                return;
            }
        };
        for (side, value) in SIDES.iter().zip([top, right, bottom, left]) {
            self.write(
                &format!("{}-{side}", decl.property),
                value.clone(),
                decl.important,
            );
        }
    }

    /// A property as a keyword string, or `default`.
    fn keyword<'a>(&'a self, property: &str, default: &'a str) -> &'a str {
        self.get(property).map_or(default, |v| v.raw.as_str())
    }

    /// `color`, black when unset or not a color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.get("color")
            .and_then(StyleValue::as_color)
            .unwrap_or(Color::BLACK)
    }

    /// `background-color`, if it is a color with any opacity.
    #[must_use]
    pub fn background_color(&self) -> Option<Color> {
        self.get("background-color")
            .and_then(StyleValue::as_color)
            .filter(Color::is_visible)
    }

    /// The resolved `font-size` in pixels. After the cascade this is
    /// always an absolute length; before, relative sizes resolve against the
    /// root size.
    #[must_use]
    pub fn font_size_px(&self) -> f32 {
        self.get("font-size")
            .and_then(|v| v.to_px(ROOT_FONT_SIZE_PX))
            .unwrap_or(ROOT_FONT_SIZE_PX)
    }

    /// `display`, lowercased. Unset means `inline`.
    #[must_use]
    pub fn display(&self) -> String {
        self.keyword("display", "inline").to_ascii_lowercase()
    }

    /// Whether the element generates no box.
    #[must_use]
    pub fn is_display_none(&self) -> bool {
        self.display() == "none"
    }

    /// `white-space`, lowercased. Unset means `normal`.
    #[must_use]
    pub fn white_space(&self) -> String {
        self.keyword("white-space", "normal").to_ascii_lowercase()
    }

    /// `text-transform`, lowercased. Unset means `none`.
    #[must_use]
    pub fn text_transform(&self) -> String {
        self.keyword("text-transform", "none").to_ascii_lowercase()
    }

    /// `text-decoration`, lowercased. Unset means `none`.
    #[must_use]
    pub fn text_decoration(&self) -> String {
        self.keyword("text-decoration", "none").to_ascii_lowercase()
    }

    /// Whether text is drawn with an underline.
    #[must_use]
    pub fn is_underlined(&self) -> bool {
        self.text_decoration()
            .split_whitespace()
            .any(|word| word == "underline")
    }

    /// A length property in pixels, with relative units against `base`.
    /// Unset, `auto` and other non-lengths count as 0.
    #[must_use]
    pub fn length_px(&self, property: &str, base: f32) -> f32 {
        self.get(property)
            .and_then(|v| v.to_px(base))
            .unwrap_or(0.0)
    }
}

/// The color a `background` shorthand sets: the whole value if it is a
/// color, else its first color token.
fn background_color_of(value: &StyleValue) -> Option<Color> {
    value
        .as_color()
        .or_else(|| value.raw.split_whitespace().find_map(Color::parse))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(property: &str, value: &str, important: bool) -> Declaration {
        Declaration::new(property, value, important)
    }

    #[test]
    fn test_important_blocks_later_normal_declarations() {
        let mut style = ComputedStyle::default();
        style.apply_declaration(&decl("color", "red", true));
        style.apply_declaration(&decl("color", "blue", false));
        assert_eq!(style.color(), Color::rgb(255, 0, 0));
        style.apply_declaration(&decl("color", "green", true));
        assert_eq!(style.color(), Color::rgb(0, 128, 0));
    }

    #[test]
    fn test_margin_shorthand_expansion() {
        let mut style = ComputedStyle::default();
        style.apply_declaration(&decl("margin", "1px 2px 3px", false));
        assert_eq!(style.length_px("margin-top", 16.0), 1.0);
        assert_eq!(style.length_px("margin-right", 16.0), 2.0);
        assert_eq!(style.length_px("margin-bottom", 16.0), 3.0);
        assert_eq!(style.length_px("margin-left", 16.0), 2.0);
    }

    #[test]
    fn test_auto_margin_is_zero() {
        let mut style = ComputedStyle::default();
        style.apply_declaration(&decl("margin", "0 auto", false));
        assert_eq!(style.get("margin-left").map(|v| v.raw.as_str()), Some("auto"));
        assert_eq!(style.length_px("margin-left", 16.0), 0.0);
    }

    #[test]
    fn test_padding_shorthand_respects_important_longhand() {
        let mut style = ComputedStyle::default();
        style.apply_declaration(&decl("padding-top", "9px", true));
        style.apply_declaration(&decl("padding", "1em", false));
        assert_eq!(style.length_px("padding-top", 16.0), 9.0);
        assert_eq!(style.length_px("padding-left", 10.0), 10.0);
    }

    #[test]
    fn test_background_shorthand_sets_color() {
        let mut style = ComputedStyle::default();
        style.apply_declaration(&decl("background", "url(x.png) #ff0000 no-repeat", false));
        assert_eq!(style.background_color(), Some(Color::rgb(255, 0, 0)));
        style.apply_declaration(&decl("background", "transparent", false));
        assert_eq!(style.background_color(), None);
    }

    #[test]
    fn test_inheritance_copies_only_inherited_properties() {
        let mut parent = ComputedStyle::default();
        parent.apply_declaration(&decl("color", "red", true));
        parent.apply_declaration(&decl("margin-top", "5px", false));
        let mut child = ComputedStyle::default();
        child.inherit_from(&parent);
        assert_eq!(child.color(), Color::rgb(255, 0, 0));
        assert!(child.get("margin-top").is_none());
        assert!(!child.is_important("color"));
    }
}
