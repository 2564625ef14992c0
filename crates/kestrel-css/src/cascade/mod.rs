//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! Every element's style is built in layers, each applied over the last:
//!
//! 1. UA base defaults
//! 2. inherited properties from the parent's computed style
//! 3. UA tag defaults
//! 4. author rules, ascending by specificity, ties in source order
//! 5. the inline `style` attribute
//!
//! A property set by an `!important` declaration ignores every later
//! non-important declaration for that property. `font-size` is then resolved
//! to pixels against the parent's resolved size.

use std::collections::HashMap;

use kestrel_dom::{DomTree, NodeId, NodeType};

use crate::parser::{CascadeRule, Stylesheet, parse_declarations};
use crate::style::ComputedStyle;
use crate::ua_stylesheet::{base_defaults, ua_stylesheet};
use crate::values::{StyleValue, ValueKind, to_px};

/// Computed style per element of one document. Text and comment nodes have
/// no entry; they render with their parent's style.
pub type StyleTable = HashMap<NodeId, ComputedStyle>;

/// Root font size when nothing says otherwise.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;
/// Smallest font size the cascade produces.
pub const MIN_FONT_SIZE_PX: f32 = 8.0;
/// Largest font size the cascade produces.
pub const MAX_FONT_SIZE_PX: f32 = 72.0;

/// Ratio between adjacent sizes for `smaller` and `larger`.
const FONT_SIZE_STEP: f32 = 1.2;

/// [§ 3.5 Absolute size keywords](https://www.w3.org/TR/css-fonts-4/#absolute-size-mapping)
const FONT_SIZE_KEYWORDS: &[(&str, f32)] = &[
    ("xx-small", 9.0),
    ("x-small", 10.0),
    ("small", 13.0),
    ("medium", 16.0),
    ("large", 18.0),
    ("x-large", 24.0),
    ("xx-large", 32.0),
];

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// Compute styles for every element under the document root. `author` is
/// the page's own CSS; media blocks are filtered against `viewport_width`.
#[must_use]
pub fn compute_styles(tree: &DomTree, author: &Stylesheet, viewport_width: f32) -> StyleTable {
    let mut pass = CascadePass {
        tree,
        ua_rules: ua_stylesheet().applicable_rules(viewport_width).collect(),
        author_rules: author.applicable_rules(viewport_width).collect(),
        font_sizes: HashMap::new(),
        styles: HashMap::new(),
    };
    pass.visit(tree.root(), None);
    log::debug!(
        "cascade: {} styled elements, {} author rules",
        pass.styles.len(),
        pass.author_rules.len()
    );
    pass.styles
}

/// State for one cascade over one tree.
struct CascadePass<'a> {
    tree: &'a DomTree,
    ua_rules: Vec<&'a CascadeRule>,
    author_rules: Vec<&'a CascadeRule>,
    /// Resolved font sizes keyed by (declared text, parent px bits).
    font_sizes: HashMap<(String, u32), f32>,
    styles: StyleTable,
}

impl CascadePass<'_> {
    /// Recursively compute styles for a node and its children.
    fn visit(&mut self, id: NodeId, parent: Option<&ComputedStyle>) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else { return };

        match &node.node_type {
            NodeType::Element(element) => {
                let mut style = base_defaults().clone();
                if let Some(parent) = parent {
                    style.inherit_from(parent);
                }
                apply_rules(&mut style, &self.ua_rules, tree, id);
                apply_rules(&mut style, &self.author_rules, tree, id);
                if let Some(inline) = element.get_attribute("style") {
                    for decl in parse_declarations(inline) {
                        style.apply_declaration(&decl);
                    }
                }

                let parent_px = parent.map_or(DEFAULT_FONT_SIZE_PX, ComputedStyle::font_size_px);
                if let Some(declared) = style.get("font-size") {
                    let px = self.resolve_font_size(declared, parent_px);
                    style.set("font-size", StyleValue::px(px));
                }

                for &child in tree.children(id) {
                    self.visit(child, Some(&style));
                }
                let _ = self.styles.insert(id, style);
            }
            NodeType::Document => {
                for &child in tree.children(id) {
                    self.visit(child, parent);
                }
            }
            NodeType::Text(_) | NodeType::Comment(_) => {}
        }
    }

    /// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    ///
    /// "Percentages: refer to parent element's font size". `em` does too.
    fn resolve_font_size(&mut self, declared: &StyleValue, parent_px: f32) -> f32 {
        let key = (declared.raw.clone(), parent_px.to_bits());
        if let Some(&px) = self.font_sizes.get(&key) {
            return px;
        }
        let px = font_size_px(declared, parent_px).clamp(MIN_FONT_SIZE_PX, MAX_FONT_SIZE_PX);
        let _ = self.font_sizes.insert(key, px);
        px
    }
}

/// Apply every rule in `rules` that matches `id`, lowest specificity first.
/// A rule's weight is that of its most specific matching selector.
fn apply_rules(style: &mut ComputedStyle, rules: &[&CascadeRule], tree: &DomTree, id: NodeId) {
    let mut matched: Vec<(u32, &CascadeRule)> = rules
        .iter()
        .filter_map(|rule| rule.matching_specificity(tree, id).map(|s| (s, *rule)))
        .collect();
    matched.sort_by_key(|(specificity, _)| *specificity);

    for (_, rule) in matched {
        for decl in &rule.declarations {
            style.apply_declaration(decl);
        }
    }
}

fn font_size_px(declared: &StyleValue, parent_px: f32) -> f32 {
    match &declared.kind {
        ValueKind::Length(value, unit) => to_px(*value, unit, parent_px),
        ValueKind::Percentage(value) => value / 100.0 * parent_px,
        ValueKind::Number(value) => *value,
        _ => {
            let keyword = declared.raw.to_ascii_lowercase();
            match keyword.as_str() {
                "smaller" => parent_px / FONT_SIZE_STEP,
                "larger" => parent_px * FONT_SIZE_STEP,
                _ => FONT_SIZE_KEYWORDS
                    .iter()
                    .find(|(name, _)| *name == keyword)
                    .map_or(parent_px, |(_, px)| *px),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(raw: &str, parent: f32) -> f32 {
        font_size_px(&StyleValue::parse(raw), parent)
    }

    #[test]
    fn test_font_size_units() {
        assert!((size("2em", 10.0) - 20.0).abs() < 0.001);
        assert!((size("150%", 10.0) - 15.0).abs() < 0.001);
        assert!((size("2rem", 10.0) - 32.0).abs() < 0.001);
        assert!((size("12pt", 10.0) - 16.0).abs() < 0.01);
    }

    #[test]
    fn test_font_size_keywords() {
        assert!((size("x-large", 10.0) - 24.0).abs() < 0.001);
        assert!((size("larger", 10.0) - 12.0).abs() < 0.001);
        assert!((size("smaller", 12.0) - 10.0).abs() < 0.001);
        assert!((size("inherit", 14.0) - 14.0).abs() < 0.001);
    }
}
