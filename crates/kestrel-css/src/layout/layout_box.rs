//! Layout box types and the layout pass.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)

use std::fmt::Write as _;

use kestrel_dom::NodeId;
use serde::Serialize;
use strum_macros::Display;

use crate::values::Color;

use super::box_model::{EdgeSizes, Rect};
use super::{CHAR_WIDTH_RATIO, DEFAULT_FONT_SIZE_PX, LINE_HEIGHT_RATIO};

/// The closed set of box kinds the layout engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum BoxKind {
    /// Root box for the `html` element. Stacks its children with no margin.
    Document,
    /// [§ 9.2.1 Block-level elements](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    Block,
    /// A run of text, wrapped greedily to the available width.
    Inline,
    /// A `pre` element: block box model, whitespace kept in descendants.
    Preformatted,
    /// Text under a `pre` element. Never wraps.
    PreformattedInline,
}

impl BoxKind {
    /// Whether this kind holds child boxes rather than text.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Document | Self::Block | Self::Preformatted)
    }
}

/// One box of the layout tree. Container kinds own child boxes; text kinds
/// own their text and, after layout, the lines it was broken into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBox {
    /// What kind of box this is.
    pub kind: BoxKind,
    /// The node this box was generated for.
    pub node: Option<NodeId>,
    /// Child boxes in document order.
    pub children: Vec<LayoutBox>,
    /// Whitespace-processed text of a text box.
    pub text: String,
    /// Resolved margins in pixels.
    pub margin: EdgeSizes,
    /// Resolved padding in pixels.
    pub padding: EdgeSizes,
    /// Border box, filled in by [`LayoutBox::layout`].
    pub rect: Rect,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text colour.
    pub color: Color,
    /// Background colour, when one is visible.
    pub background: Option<Color>,
    /// Whether text is underlined.
    pub underline: bool,
    /// Break only on `\n`, never wrap.
    pub preserve_newlines: bool,
    /// Lines of text after layout.
    pub lines: Vec<String>,
}

impl LayoutBox {
    /// An empty box of `kind` for `node`, with default font and colour.
    #[must_use]
    pub const fn new(kind: BoxKind, node: Option<NodeId>) -> Self {
        Self {
            kind,
            node,
            children: Vec::new(),
            text: String::new(),
            margin: EdgeSizes {
                top: 0.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            },
            padding: EdgeSizes {
                top: 0.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            },
            rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            font_size: DEFAULT_FONT_SIZE_PX,
            color: Color::BLACK,
            background: None,
            underline: false,
            preserve_newlines: false,
            lines: Vec::new(),
        }
    }

    /// Height of one line of text.
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_RATIO
    }

    /// Lay this box out with its top-left corner at `(x, y)` inside
    /// `available_width`, and return the height it uses including margins.
    pub fn layout(&mut self, x: f32, y: f32, available_width: f32) -> f32 {
        match self.kind {
            BoxKind::Document => self.layout_document(x, y, available_width),
            BoxKind::Block | BoxKind::Preformatted => self.layout_block(x, y, available_width),
            BoxKind::Inline | BoxKind::PreformattedInline => {
                self.layout_text(x, y, available_width)
            }
        }
    }

    fn layout_document(&mut self, x: f32, y: f32, width: f32) -> f32 {
        let mut cursor = y;
        for child in &mut self.children {
            cursor += child.layout(x, cursor, width);
        }
        self.rect = Rect::new(x, y, width, cursor - y);
        self.rect.height
    }

    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    ///
    /// The box fills the available width less its horizontal margins.
    /// Children stack from the top of the content box.
    fn layout_block(&mut self, x: f32, y: f32, available_width: f32) -> f32 {
        let width = (available_width - self.margin.horizontal()).max(0.0);
        let content_x = x + self.margin.left + self.padding.left;
        let content_y = y + self.margin.top + self.padding.top;
        let content_width = (width - self.padding.horizontal()).max(0.0);

        let mut cursor = content_y;
        for child in &mut self.children {
            cursor += child.layout(content_x, cursor, content_width);
        }

        let used = (cursor - y) + self.padding.bottom + self.margin.bottom;
        self.rect = Rect::new(
            x + self.margin.left,
            y + self.margin.top,
            width,
            used - self.margin.vertical(),
        );
        used
    }

    fn layout_text(&mut self, x: f32, y: f32, width: f32) -> f32 {
        self.lines = if self.text.is_empty() {
            Vec::new()
        } else if self.kind == BoxKind::PreformattedInline || self.preserve_newlines {
            self.text.split('\n').map(str::to_string).collect()
        } else {
            wrap_text(&self.text, chars_per_line(width, self.font_size))
        };
        let height = self.lines.len() as f32 * self.line_height();
        self.rect = Rect::new(x, y, width, height);
        height
    }

    /// The first box in this subtree generated for `node`, in pre-order.
    #[must_use]
    pub fn find(&self, node: NodeId) -> Option<&Self> {
        if self.node == Some(node) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(node))
    }

    /// Number of boxes in this subtree, this one included.
    #[must_use]
    pub fn box_count(&self) -> usize {
        1 + self.children.iter().map(Self::box_count).sum::<usize>()
    }

    /// Indented one-line-per-box dump for debugging.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let r = &self.rect;
        let _ = write!(
            out,
            "{:indent$}{} ({:.1}, {:.1}) {:.1}x{:.1}",
            "",
            self.kind,
            r.x,
            r.y,
            r.width,
            r.height,
            indent = depth * 2
        );
        if !self.kind.is_container() {
            let _ = write!(out, " {:?}", self.text);
        }
        out.push('\n');
        for child in &self.children {
            child.dump_into(out, depth + 1);
        }
    }
}

/// Characters that fit on one line at `font_size`; never less than one.
#[must_use]
pub fn chars_per_line(width: f32, font_size: f32) -> usize {
    let char_width = font_size * CHAR_WIDTH_RATIO;
    if char_width <= 0.0 {
        return 1;
    }
    ((width / char_width).floor() as usize).max(1)
}

/// Break `text` into lines of at most `max_chars` characters, at word
/// boundaries. A word longer than a line gets a line of its own. Each
/// source line break starts a new line; a blank source line stays blank.
#[must_use]
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;
        for word in source_line.split_whitespace() {
            let word_len = word.chars().count();
            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }
        lines.push(current);
    }
    lines
}
