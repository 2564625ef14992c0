use std::collections::HashMap;

use crate::style::ComputedStyle;
use crate::values::{Color, StyleValue};

use super::box_model::EdgeSizes;

/// Conversions memoized across one layout pass. Documents repeat the same
/// few colours and lengths, so each raw value is parsed once.
#[derive(Debug, Default)]
pub struct LayoutCache {
    colors: HashMap<String, Color>,
    lengths: HashMap<(String, u32), f32>,
    font_sizes: HashMap<String, f32>,
}

impl LayoutCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A colour value. Anything that is not a colour reads as black.
    pub fn color(&mut self, value: &StyleValue) -> Color {
        if let Some(&color) = self.colors.get(&value.raw) {
            return color;
        }
        let color = value.as_color().unwrap_or(Color::BLACK);
        let _ = self.colors.insert(value.raw.clone(), color);
        color
    }

    /// A length in pixels with relative units against `base`. Non-lengths
    /// such as `auto` count as 0.
    pub fn length(&mut self, value: &StyleValue, base: f32) -> f32 {
        let key = (value.raw.clone(), base.to_bits());
        if let Some(&px) = self.lengths.get(&key) {
            return px;
        }
        let px = value.to_px(base).unwrap_or(0.0);
        let _ = self.lengths.insert(key, px);
        px
    }

    /// A resolved `font-size`. The cascade already made it absolute, so
    /// this only has to read the number back.
    pub fn font_size(&mut self, style: &ComputedStyle) -> f32 {
        let Some(value) = style.get("font-size") else {
            return style.font_size_px();
        };
        if let Some(&px) = self.font_sizes.get(&value.raw) {
            return px;
        }
        let px = style.font_size_px();
        let _ = self.font_sizes.insert(value.raw.clone(), px);
        px
    }

    /// The four sides of `margin` or `padding` in pixels.
    pub fn edges(&mut self, style: &ComputedStyle, property: &str, base: f32) -> EdgeSizes {
        let mut side = |name: &str| {
            style
                .get(&format!("{property}-{name}"))
                .map_or(0.0, |value| self.length(value, base))
        };
        EdgeSizes {
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
            left: side("left"),
        }
    }

    /// Number of distinct values converted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len() + self.lengths.len() + self.font_sizes.len()
    }

    /// Whether nothing has been converted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
