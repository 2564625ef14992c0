//! CSS Painting
//!
//! [CSS 2.1 Appendix E - Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! This module converts a laid-out box tree into a display list of drawing
//! commands. The display list is handed to whatever rasterizes the page and
//! is also what hit testing runs against.
//!
//! ```text
//! Style → Layout → Paint → Render
//!                    ↓
//!              DisplayList
//! ```

mod display_list;
mod painter;

pub use display_list::{DisplayList, PaintCommand, Viewport};
pub use painter::Painter;
