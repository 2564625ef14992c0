//! Display List - a sequence of drawing commands
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! The display list is the output of the painting phase. Commands are kept
//! in document order, so later commands paint over earlier ones and hit
//! testing scans from the back.

use kestrel_dom::NodeId;
use serde::Serialize;

use crate::layout::{CHAR_WIDTH_RATIO, Rect, TEXT_CULL_SLACK_LINES};
use crate::values::Color;

/// The visible part of the page, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Visible width; also the layout width.
    pub width: f32,
    /// Visible height.
    pub height: f32,
    /// How far the page is scrolled down.
    pub scroll_y: f32,
}

impl Viewport {
    /// A viewport scrolled to the top.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    /// The same viewport scrolled to `scroll_y`.
    #[must_use]
    pub const fn with_scroll(mut self, scroll_y: f32) -> Self {
        self.scroll_y = scroll_y;
        self
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}

/// A single drawing command.
///
/// [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
///
/// Every command remembers the node it was painted for; the reference is
/// only an index and says nothing about whether the node still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PaintCommand {
    /// Draw one line of text with its top-left corner at `(x, y)`.
    Text {
        /// X coordinate of the text origin.
        x: f32,
        /// Y coordinate of the top of the line.
        y: f32,
        /// The text content to draw.
        text: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text color.
        color: Color,
        /// The node the text came from.
        node: Option<NodeId>,
    },
    /// Fill a rectangle with a solid color.
    Rect {
        /// Area to fill.
        rect: Rect,
        /// Fill color.
        color: Color,
        /// The element whose background this is.
        node: Option<NodeId>,
    },
    /// Stroke a straight line.
    Line {
        /// Start X.
        x1: f32,
        /// Start Y.
        y1: f32,
        /// End X.
        x2: f32,
        /// End Y.
        y2: f32,
        /// Stroke width.
        width: f32,
        /// Stroke color.
        color: Color,
        /// The node the line decorates.
        node: Option<NodeId>,
    },
}

impl PaintCommand {
    /// The area this command covers in document coordinates. Text is
    /// measured with the fixed character-width approximation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Text {
                x,
                y,
                text,
                font_size,
                ..
            } => Rect::new(
                *x,
                *y,
                text.chars().count() as f32 * font_size * CHAR_WIDTH_RATIO,
                *font_size,
            ),
            Self::Rect { rect, .. } => *rect,
            Self::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                ..
            } => {
                let half = width / 2.0;
                let (left, right) = (x1.min(*x2), x1.max(*x2));
                let (top, bottom) = (y1.min(*y2), y1.max(*y2));
                Rect::new(
                    left - half,
                    top - half,
                    right - left + width,
                    bottom - top + width,
                )
            }
        }
    }

    /// The node this command was painted for.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Text { node, .. } | Self::Rect { node, .. } | Self::Line { node, .. } => *node,
        }
    }

    /// Vertical slack added around the viewport before culling. Text gets
    /// a couple of lines so it does not pop in while scrolling.
    #[must_use]
    pub fn cull_slack(&self) -> f32 {
        match self {
            Self::Text { font_size, .. } => TEXT_CULL_SLACK_LINES * font_size,
            Self::Rect { .. } | Self::Line { .. } => 0.0,
        }
    }
}

/// A list of drawing commands in painting order, plus the total height of
/// the document they were painted from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    commands: Vec<PaintCommand>,
    height: f32,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            height: 0.0,
        }
    }

    /// Add a command to the display list.
    pub fn push(&mut self, command: PaintCommand) {
        self.commands.push(command);
    }

    /// Add `command` only if its scroll-adjusted bounds intersect the
    /// viewport grown by the command's slack. Returns whether it was added.
    pub fn push_culled(&mut self, command: PaintCommand, viewport: &Viewport) -> bool {
        let slack = command.cull_slack();
        let visible = Rect::new(
            0.0,
            -slack,
            viewport.width,
            viewport.height + 2.0 * slack,
        );
        let on_screen = command
            .bounds()
            .translate(0.0, -viewport.scroll_y)
            .intersects(&visible);
        if on_screen {
            self.push(command);
        }
        on_screen
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the display list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Total height of the laid-out document, culled content included.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Record the total document height.
    pub const fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    /// The node under viewport point `(x, y)` when the page is scrolled to
    /// `scroll_y`. The topmost (last painted) command containing the point
    /// wins.
    #[must_use]
    pub fn find_element_at(&self, x: f32, y: f32, scroll_y: f32) -> Option<NodeId> {
        self.commands
            .iter()
            .rev()
            .find(|command| command.bounds().translate(0.0, -scroll_y).contains(x, y))
            .and_then(PaintCommand::node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_cmd(y: f32, node: usize) -> PaintCommand {
        PaintCommand::Rect {
            rect: Rect::new(0.0, y, 100.0, 50.0),
            color: Color::BLACK,
            node: Some(NodeId(node)),
        }
    }

    #[test]
    fn test_line_bounds_inflated_by_width() {
        let line = PaintCommand::Line {
            x1: 10.0,
            y1: 20.0,
            x2: 30.0,
            y2: 20.0,
            width: 2.0,
            color: Color::BLACK,
            node: None,
        };
        assert_eq!(line.bounds(), Rect::new(9.0, 19.0, 22.0, 2.0));
    }

    #[test]
    fn test_push_culled_respects_scroll() {
        let viewport = Viewport::new(800.0, 600.0).with_scroll(1000.0);
        let mut list = DisplayList::new();
        assert!(!list.push_culled(rect_cmd(0.0, 1), &viewport));
        assert!(list.push_culled(rect_cmd(1100.0, 2), &viewport));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_text_slack_keeps_nearby_lines() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut list = DisplayList::new();
        let text = |y: f32| PaintCommand::Text {
            x: 0.0,
            y,
            text: "hi".to_string(),
            font_size: 10.0,
            color: Color::BLACK,
            node: None,
        };
        assert!(list.push_culled(text(615.0), &viewport));
        assert!(!list.push_culled(text(625.0), &viewport));
    }

    #[test]
    fn test_find_element_at_scroll_adjusted() {
        let mut list = DisplayList::new();
        list.push(rect_cmd(100.0, 7));
        assert_eq!(list.find_element_at(10.0, 10.0, 100.0), Some(NodeId(7)));
        assert_eq!(list.find_element_at(10.0, 10.0, 0.0), None);
    }
}
