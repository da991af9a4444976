//! Pure coordinate math for surfaces, drags, and hit testing.
//!
//! All functions here are pure and testable without any surface or browser.
//! Positions are percentages of canvas width/height anchored at the field's
//! center; pointer deltas arrive in screen pixels on a surface rendered at
//! some scale factor.

use crate::types::Position;

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// Scale all coordinates by a uniform factor (canvas px → surface px).
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Convert a pointer delta in surface pixels to a normalized percentage
/// delta against one canvas dimension.
///
/// The surface renders the canvas at `scale` (thumbnails < 1, full size 1),
/// so the delta is first unscaled to canvas pixels, then normalized:
///
/// ```
/// # use slideforge::geometry::drag_delta_percent;
/// // 54 px right on a half-scale 1080-wide canvas → 10% of the width
/// assert_eq!(drag_delta_percent(54.0, 0.5, 1080), 10.0);
/// ```
pub fn drag_delta_percent(delta_px: f64, scale: f64, dimension_px: u32) -> f64 {
    (delta_px / scale) * 100.0 / dimension_px as f64
}

/// Percentage offset → canvas pixel offset.
pub fn percent_to_px(percent: f64, dimension_px: u32) -> f64 {
    percent * dimension_px as f64 / 100.0
}

/// Canvas pixel offset → percentage offset.
pub fn px_to_percent(px: f64, dimension_px: u32) -> f64 {
    px * 100.0 / dimension_px as f64
}

/// Average glyph advance as a fraction of the font size. Text boxes are
/// estimated, not measured — good enough for drag hit targets.
const GLYPH_WIDTH_FACTOR: f64 = 0.55;

/// Line height as a fraction of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.3;

/// Fields wrap at this fraction of the canvas width.
const MAX_WIDTH_FACTOR: f64 = 0.8;

/// Estimate the rendered bounding box of a text field.
///
/// The box is centered on `position` (the field's anchor point is its own
/// center). Width is the longest line's estimated advance, capped at 80% of
/// the canvas; height is the wrapped line count times the line height.
/// Empty text still yields a one-line box so the field stays clickable.
pub fn estimate_field_rect(
    position: Position,
    font_size_px: u32,
    text: &str,
    canvas_width: u32,
    canvas_height: u32,
) -> Rect {
    let font = font_size_px as f64;
    let max_width = canvas_width as f64 * MAX_WIDTH_FACTOR;
    let chars_per_line = (max_width / (font * GLYPH_WIDTH_FACTOR)).floor().max(1.0) as usize;

    let mut lines = 0usize;
    let mut longest = 0usize;
    for raw_line in text.split('\n') {
        let count = raw_line.chars().count();
        if count == 0 {
            lines += 1;
            continue;
        }
        lines += count.div_ceil(chars_per_line);
        longest = longest.max(count.min(chars_per_line));
    }
    if lines == 0 {
        lines = 1;
    }

    let width = (longest.max(1) as f64 * font * GLYPH_WIDTH_FACTOR).min(max_width);
    let height = lines as f64 * font * LINE_HEIGHT_FACTOR;
    let cx = percent_to_px(position.x, canvas_width);
    let cy = percent_to_px(position.y, canvas_height);

    Rect {
        x: cx - width / 2.0,
        y: cy - height / 2.0,
        width,
        height,
    }
}
