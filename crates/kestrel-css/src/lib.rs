//! Stylesheet parsing, selector matching, cascade, layout and painting for
//! the Kestrel render core.
//!
//! # Scope
//!
//! - **Values** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//!   - Classified declaration values with their raw text
//!   - Named, hex and `rgb()`/`rgba()` colors
//!   - Absolute and font-relative length units
//!
//! - **Stylesheet parser** ([CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/))
//!   - Style rules, `@charset`, `@import` and `@media`
//!   - Brace matching that ignores quoted and escaped braces
//!   - Recovery by dropping the offending rule or declaration
//!
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, universal, class, ID and attribute selectors
//!   - Structural pseudo-classes and `:link`
//!   - Descendant, child and sibling combinators
//!   - Scalar specificity
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - UA defaults, inheritance, author rules, inline styles
//!   - `!important`
//!   - Font size resolution
//!
//! - **Layout and paint**
//!   - Block stacking with margins and padding
//!   - Greedy text wrapping on an approximate character width
//!   - A culled display list with hit testing
//!
//! # Not Implemented
//!
//! - Real font metrics and text shaping
//! - Inline formatting contexts (every element is a block)
//! - Floats, positioning, flex, grid and tables
//! - Incremental re-layout

/// Cascade and style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Box tree and layout.
pub mod layout;
/// Display list and painting per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html).
pub mod paint;
/// Stylesheet parser per [CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/).
pub mod parser;
/// Selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Computed style representation.
pub mod style;
/// User-agent stylesheet per [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;
/// Declaration values.
pub mod values;

// Re-exports for convenience
pub use cascade::{StyleTable, compute_styles};
pub use layout::{
    BoxKind, EdgeSizes, LayoutBox, LayoutResult, Rect, build_layout_tree, layout_document,
};
pub use paint::{DisplayList, PaintCommand, Painter, Viewport};
pub use parser::{
    CascadeRule, Declaration, MediaRule, Stylesheet, evaluate_media_query, parse_declarations,
    parse_stylesheet,
};
pub use selector::{ParsedSelector, SelectorCache, parse_selector, specificity};
pub use style::ComputedStyle;
pub use values::{Color, StyleValue, Unit, ValueKind};
