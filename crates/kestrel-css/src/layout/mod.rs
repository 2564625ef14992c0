//! CSS Layout Engine
//!
//! A single recursive pass over a box tree built from the styled DOM:
//! blocks stack their children vertically inside their content box, and
//! text runs wrap greedily using a fixed character-width approximation in
//! place of real font metrics.
//!
//! # Relevant Specifications
//!
//! - [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Rectangles and edge sizes
//! - [`layout_box`] - Box kinds, the layout pass and text wrapping
//! - `builder` - Box tree construction from the DOM and style table
//! - `cache` - Per-pass memo of value conversions

pub mod box_model;
mod builder;
mod cache;
pub mod layout_box;

pub use box_model::{EdgeSizes, Rect};
pub use builder::{build_layout_tree, process_whitespace, transform_text};
pub use cache::LayoutCache;
pub use layout_box::{BoxKind, LayoutBox, chars_per_line, wrap_text};

pub use crate::cascade::{DEFAULT_FONT_SIZE_PX, MAX_FONT_SIZE_PX, MIN_FONT_SIZE_PX};

use kestrel_dom::DomTree;
use serde::Serialize;

use crate::cascade::StyleTable;
use crate::paint::{DisplayList, Painter, Viewport};

/// Width of one character as a fraction of the font size.
pub const CHAR_WIDTH_RATIO: f32 = 0.6;
/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f32 = 1.2;
/// Lines of slack kept above and below the viewport when culling text.
pub const TEXT_CULL_SLACK_LINES: f32 = 2.0;

/// Output of one layout pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutResult {
    /// The laid-out box tree, if the document produced any boxes.
    pub root: Option<LayoutBox>,
    /// Paint commands for the visible part of the page.
    pub display_list: DisplayList,
}

/// Build, lay out and paint a styled document at the viewport's width.
///
/// The display list only holds commands near the viewport, but its
/// [`DisplayList::height`] is the height of the whole document.
#[must_use]
pub fn layout_document(tree: &DomTree, styles: &StyleTable, viewport: &Viewport) -> LayoutResult {
    let Some(mut root) = build_layout_tree(tree, styles) else {
        return LayoutResult::default();
    };
    let height = root.layout(0.0, 0.0, viewport.width);

    let mut display_list = Painter::new(viewport).paint(&root);
    display_list.set_height(height);
    log::debug!(
        "paint: {} commands, document height {height:.1}",
        display_list.len()
    );

    LayoutResult {
        root: Some(root),
        display_list,
    }
}
