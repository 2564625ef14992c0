use kestrel_dom::{DomTree, NodeId, NodeType};

use crate::cascade::StyleTable;
use crate::style::ComputedStyle;
use crate::ua_stylesheet::base_defaults;

use super::cache::LayoutCache;
use super::layout_box::{BoxKind, LayoutBox};

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// Build the box tree for the document element. Returns `None` when there
/// is no document element or it is `display: none`.
///
/// - `head` and everything under it, and `display: none` subtrees, produce
///   no box.
/// - `br` becomes a one-line Inline box.
/// - `pre` becomes a Preformatted box whose text descendants never wrap.
/// - Comments produce nothing.
#[must_use]
pub fn build_layout_tree(tree: &DomTree, styles: &StyleTable) -> Option<LayoutBox> {
    let root = tree.document_element()?;
    let mut builder = BoxBuilder {
        tree,
        styles,
        cache: LayoutCache::new(),
    };
    let root_box = builder.build_element(root, false);
    log::debug!(
        "layout: {} boxes, {} cached conversions",
        root_box.as_ref().map_or(0, LayoutBox::box_count),
        builder.cache.len()
    );
    root_box
}

struct BoxBuilder<'a> {
    tree: &'a DomTree,
    styles: &'a StyleTable,
    cache: LayoutCache,
}

/// Elements the cascade did not reach start from the base defaults.
fn style_of(styles: &StyleTable, id: NodeId) -> &ComputedStyle {
    styles.get(&id).unwrap_or_else(|| base_defaults())
}

impl BoxBuilder<'_> {
    fn build_element(&mut self, id: NodeId, in_pre: bool) -> Option<LayoutBox> {
        let tree = self.tree;
        let tag = tree.tag_name(id)?;
        if tag == "head" {
            return None;
        }
        let style = style_of(self.styles, id);
        if style.is_display_none() {
            return None;
        }

        let kind = match tag {
            "br" => {
                let mut line_break = LayoutBox::new(BoxKind::Inline, Some(id));
                line_break.text = "\n".to_string();
                self.apply_text_style(&mut line_break, style);
                return Some(line_break);
            }
            "html" => BoxKind::Document,
            "pre" => BoxKind::Preformatted,
            _ => BoxKind::Block,
        };
        let in_pre = in_pre || kind == BoxKind::Preformatted;

        let mut layout_box = LayoutBox::new(kind, Some(id));
        self.apply_text_style(&mut layout_box, style);
        if kind != BoxKind::Document {
            let font_size = layout_box.font_size;
            layout_box.margin = self.cache.edges(style, "margin", font_size);
            layout_box.padding = self.cache.edges(style, "padding", font_size);
            layout_box.background = style.background_color();
        }

        for &child in tree.children(id) {
            let child_box = match tree.get(child).map(|node| &node.node_type) {
                Some(NodeType::Element(_)) => self.build_element(child, in_pre),
                Some(NodeType::Text(text)) => self.build_text(child, text, style, in_pre),
                _ => None,
            };
            if let Some(child_box) = child_box {
                layout_box.children.push(child_box);
            }
        }
        Some(layout_box)
    }

    /// A text node renders with its parent element's style.
    fn build_text(
        &mut self,
        id: NodeId,
        text: &str,
        parent_style: &ComputedStyle,
        in_pre: bool,
    ) -> Option<LayoutBox> {
        if text.is_empty() {
            return None;
        }
        let white_space = parent_style.white_space();
        let mut processed = transform_text(
            &process_whitespace(text, &white_space),
            &parent_style.text_transform(),
        );

        if processed.is_empty() && !keeps_all_whitespace(&white_space) {
            if !self.is_significant_whitespace(id) {
                return None;
            }
            processed = " ".to_string();
        }

        let kind = if in_pre {
            BoxKind::PreformattedInline
        } else {
            BoxKind::Inline
        };
        let mut text_box = LayoutBox::new(kind, Some(id));
        text_box.text = processed;
        text_box.preserve_newlines =
            matches!(white_space.as_str(), "pre" | "pre-wrap" | "pre-line");
        self.apply_text_style(&mut text_box, parent_style);
        Some(text_box)
    }

    fn apply_text_style(&mut self, layout_box: &mut LayoutBox, style: &ComputedStyle) {
        layout_box.font_size = self.cache.font_size(style);
        if let Some(color) = style.get("color") {
            layout_box.color = self.cache.color(color);
        }
        layout_box.underline = style.is_underlined();
    }

    /// Whitespace between two elements separates them; anywhere else it
    /// collapses away.
    fn is_significant_whitespace(&self, id: NodeId) -> bool {
        let tree = self.tree;
        tree.preceding_siblings(id)
            .any(|s| tree.as_element(s).is_some())
            && tree
                .following_siblings(id)
                .any(|s| tree.as_element(s).is_some())
    }
}

fn keeps_all_whitespace(white_space: &str) -> bool {
    matches!(white_space, "pre" | "pre-wrap")
}

/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
#[must_use]
pub fn process_whitespace(text: &str, white_space: &str) -> String {
    match white_space {
        "pre" | "pre-wrap" => text.to_string(),
        "pre-line" => collapse_whitespace(text, true),
        _ => collapse_whitespace(text, false).trim().to_string(),
    }
}

/// Collapse runs of spaces and tabs to one space. Line breaks either become
/// spaces too, or, with `keep_newlines`, survive as one `\n` per run with
/// the spaces after them dropped.
fn collapse_whitespace(text: &str, keep_newlines: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_space = false;
    let mut after_newline = false;

    for c in text.chars() {
        match c {
            '\n' | '\r' if keep_newlines => {
                if !after_newline {
                    out.push('\n');
                    after_newline = true;
                    after_space = false;
                }
            }
            '\n' | '\r' | ' ' | '\t' => {
                if !after_space && !after_newline {
                    out.push(' ');
                    after_space = true;
                }
            }
            _ => {
                out.push(c);
                after_space = false;
                after_newline = false;
            }
        }
    }
    out
}

/// [§ 2.1 Case Transforms: the text-transform property](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[must_use]
pub fn transform_text(text: &str, transform: &str) -> String {
    match transform {
        "uppercase" => text.to_uppercase(),
        "lowercase" => text.to_lowercase(),
        "capitalize" => {
            let mut out = String::with_capacity(text.len());
            let mut word_start = true;
            for c in text.chars() {
                if word_start && c.is_alphabetic() {
                    out.extend(c.to_uppercase());
                } else {
                    out.push(c);
                }
                word_start = c.is_whitespace();
            }
            out
        }
        _ => text.to_string(),
    }
}
