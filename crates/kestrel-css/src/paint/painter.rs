//! Painter - generates display list from layout tree
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! The painter walks the layout tree in document order: a block's
//! background first, then its descendants. Commands that fall outside the
//! viewport are never added.

use crate::layout::{BoxKind, CHAR_WIDTH_RATIO, LayoutBox};

use super::{DisplayList, PaintCommand, Viewport};

/// Underline stroke width in pixels.
const UNDERLINE_WIDTH: f32 = 1.0;

/// Painter that generates a display list from a layout tree.
pub struct Painter<'a> {
    viewport: &'a Viewport,
}

impl<'a> Painter<'a> {
    /// Create a painter that culls against `viewport`.
    #[must_use]
    pub const fn new(viewport: &'a Viewport) -> Self {
        Self { viewport }
    }

    /// Paint a laid-out tree and return the display list. The list's
    /// height is left for the caller to set.
    #[must_use]
    pub fn paint(&self, root: &LayoutBox) -> DisplayList {
        let mut display_list = DisplayList::new();
        self.paint_box(root, &mut display_list);
        display_list
    }

    fn paint_box(&self, layout_box: &LayoutBox, display_list: &mut DisplayList) {
        match layout_box.kind {
            BoxKind::Document => {}
            BoxKind::Block | BoxKind::Preformatted => {
                // [§ 14.2 The background](https://www.w3.org/TR/CSS2/colors.html#background)
                if let Some(color) = layout_box.background {
                    let _ = display_list.push_culled(
                        PaintCommand::Rect {
                            rect: layout_box.rect,
                            color,
                            node: layout_box.node,
                        },
                        self.viewport,
                    );
                }
            }
            BoxKind::Inline | BoxKind::PreformattedInline => {
                self.paint_text(layout_box, display_list);
            }
        }

        for child in &layout_box.children {
            self.paint_box(child, display_list);
        }
    }

    /// One command per non-empty line. Blank lines still take up their
    /// line height.
    fn paint_text(&self, layout_box: &LayoutBox, display_list: &mut DisplayList) {
        let line_height = layout_box.line_height();
        let font_size = layout_box.font_size;

        for (i, line) in layout_box.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let x = layout_box.rect.x;
            let y = layout_box.rect.y + i as f32 * line_height;
            let _ = display_list.push_culled(
                PaintCommand::Text {
                    x,
                    y,
                    text: line.clone(),
                    font_size,
                    color: layout_box.color,
                    node: layout_box.node,
                },
                self.viewport,
            );

            // [§ 2.1 text-decoration-line](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
            if layout_box.underline {
                let baseline = y + font_size;
                let width = line.chars().count() as f32 * font_size * CHAR_WIDTH_RATIO;
                let _ = display_list.push_culled(
                    PaintCommand::Line {
                        x1: x,
                        y1: baseline,
                        x2: x + width,
                        y2: baseline,
                        width: UNDERLINE_WIDTH,
                        color: layout_box.color,
                        node: layout_box.node,
                    },
                    self.viewport,
                );
            }
        }
    }
}
