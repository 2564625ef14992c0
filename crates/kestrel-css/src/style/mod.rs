//! Computed style representation.
//!
//! - [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//! - [CSS Box Model Level 3](https://www.w3.org/TR/css-box-3/)

mod computed;

pub use computed::{ComputedStyle, INHERITED_PROPERTIES, is_inherited};
