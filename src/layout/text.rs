//! Adaptive text layout.
//!
//! The font size search is a bounded linear walk downwards from a width-derived start size in
//! steps of [`FONT_STEP_PX`], stopping at the first size whose wrapped block fills less than
//! [`FILL_RATIO`] of the box height, or at [`MIN_FONT_PX`]. Step size and thresholds are fixed so
//! that wrapping is reproducible given the same font metrics.

use crate::foundation::core::Canvas;

/// Smallest font size the search will try.
pub const MIN_FONT_PX: u32 = 18;
/// Decrement between search steps.
pub const FONT_STEP_PX: u32 = 2;
/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.25;
/// Fraction of the box height a text block may occupy.
pub const FILL_RATIO: f64 = 0.7;
/// Horizontal margin on each side, as a fraction of canvas width.
pub const MARGIN_RATIO: f64 = 0.08;

const INITIAL_FONT_FLOOR_PX: u32 = 28;
const INITIAL_FONT_DIVISOR: u32 = 13;

/// Measures the advance width of a single line of text.
///
/// Implementations must be deterministic: the same `(text, font_size_px)` always yields the same
/// width.
pub trait TextMeasure {
    /// Pixel width of `text` set on one line at `font_size_px`, bold sans-serif.
    fn measure(&mut self, text: &str, font_size_px: u32) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &mut T {
    fn measure(&mut self, text: &str, font_size_px: u32) -> f32 {
        (**self).measure(text, font_size_px)
    }
}

/// Font-free measurer that gives every character the same advance.
///
/// Width is `chars * font_size_px * advance_em`. Useful for tests and for estimating layouts
/// when no font is available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasure {
    /// Per-character advance in ems.
    pub advance_em: f32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self { advance_em: 0.6 }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn measure(&mut self, text: &str, font_size_px: u32) -> f32 {
        text.chars().count() as f32 * font_size_px as f32 * self.advance_em
    }
}

/// Bounding box for a layout search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutBox {
    /// Maximum line width before wrapping.
    pub max_width_px: f32,
    /// Height the block is measured against.
    pub max_height_px: f32,
    /// First font size tried.
    pub initial_font_px: u32,
}

impl LayoutBox {
    /// Box of the given size, starting the search at `max(28, floor(width / 13))`.
    pub fn new(max_width_px: f32, max_height_px: f32) -> Self {
        Self {
            max_width_px,
            max_height_px,
            initial_font_px: initial_font_px(max_width_px.max(0.0) as u32),
        }
    }

    /// Slide geometry for a canvas.
    ///
    /// Lines wrap inside an inset of `floor(width * 0.08)` per side, the block is measured against
    /// the full canvas height, and the start size derives from the full canvas width.
    pub fn for_canvas(canvas: Canvas) -> Self {
        let margin = margin_px(canvas.width);
        Self {
            max_width_px: canvas.width.saturating_sub(margin * 2) as f32,
            max_height_px: canvas.height as f32,
            initial_font_px: initial_font_px(canvas.width),
        }
    }
}

/// Per-side horizontal margin for a canvas of `width` pixels.
pub fn margin_px(width: u32) -> u32 {
    (f64::from(width) * MARGIN_RATIO).floor() as u32
}

fn initial_font_px(width: u32) -> u32 {
    INITIAL_FONT_FLOOR_PX.max(width / INITIAL_FONT_DIVISOR)
}

/// Chosen font size and wrapped lines for one slide.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LayoutResult {
    /// Font size in pixels, never below [`MIN_FONT_PX`].
    pub font_size_px: u32,
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
}

impl LayoutResult {
    /// Line advance in pixels.
    pub fn line_height_px(&self) -> f64 {
        f64::from(self.font_size_px) * LINE_HEIGHT_FACTOR
    }

    /// Estimated block height: `lines * font_size * 1.25`.
    pub fn block_height_px(&self) -> f64 {
        self.lines.len() as f64 * self.line_height_px()
    }
}

/// Find the largest stepped font size whose wrapped block fits the box.
///
/// Overflow at [`MIN_FONT_PX`] is accepted as-is. Words are never split, so a word wider than
/// the box ends up alone on its own line.
pub fn layout_text(text: &str, bbox: &LayoutBox, measure: &mut dyn TextMeasure) -> LayoutResult {
    let words: Vec<&str> = text.split_whitespace().collect();
    let limit = FILL_RATIO * f64::from(bbox.max_height_px);

    let mut font_size_px = bbox.initial_font_px.max(MIN_FONT_PX);
    loop {
        let lines = wrap_words(&words, font_size_px, bbox.max_width_px, measure);
        let out = LayoutResult {
            font_size_px,
            lines,
        };
        if out.block_height_px() < limit || font_size_px < MIN_FONT_PX + FONT_STEP_PX {
            return out;
        }
        font_size_px -= FONT_STEP_PX;
    }
}

/// Greedy word wrap at a fixed font size.
pub fn wrap_words(
    words: &[&str],
    font_size_px: u32,
    max_width_px: f32,
    measure: &mut dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for &word in words {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure.measure(&candidate, font_size_px) > max_width_px {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
