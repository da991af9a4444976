//! Override model: per-slide, per-field position and style deviations.
//!
//! The stored form is sparse ([`TextStyle`] with optional properties,
//! optional [`Position`]); the rendered form is the *effective* value —
//! the override when present, else the template's default. Updates are
//! immutable: every setter returns a new [`Slide`] and never touches the
//! other field or any other slide.
//!
//! Interactive edits clamp positions to [`ClampRange::Interactive`]
//! (`[10, 90]`) so dragged text stays inside the visible margin; the
//! export path re-applies stored values with [`ClampRange::Full`]
//! (`[0, 100]`) since nothing is being dragged there.

use crate::template::Template;
use crate::types::{FieldKind, FontSize, Position, Slide, TextAlign, TextStyle};

/// Clamp range applied when a position is written or rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampRange {
    /// Drag-safe margin: keeps field centers inside `[10, 90]`.
    Interactive,
    /// Full canvas: `[0, 100]`, used by the export path.
    Full,
}

impl ClampRange {
    pub fn bounds(self) -> (f64, f64) {
        match self {
            ClampRange::Interactive => (10.0, 90.0),
            ClampRange::Full => (0.0, 100.0),
        }
    }

    pub fn apply(self, position: Position) -> Position {
        let (min, max) = self.bounds();
        position.clamped(min, max)
    }
}

/// A fully resolved style: every property has a value, override or
/// template default.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_size: FontSize,
    pub color: String,
    pub text_align: TextAlign,
}

/// What actually renders for one field: effective position + style.
#[derive(Debug, Clone, PartialEq)]
pub struct Effective {
    pub position: Position,
    pub style: ResolvedStyle,
}

/// Resolve the effective position/style for a field without mutating the
/// slide. Explicit overrides win property-by-property; everything absent
/// comes from the template's defaults.
pub fn effective(template: &Template, slide: &Slide, field: FieldKind) -> Effective {
    let defaults = template.defaults(field);
    let style = slide.style(field);
    Effective {
        position: slide.position(field).unwrap_or(defaults.position),
        style: ResolvedStyle {
            font_size: style
                .and_then(|s| s.font_size)
                .unwrap_or(defaults.font_size),
            color: style
                .and_then(|s| s.color.clone())
                .unwrap_or_else(|| defaults.color.to_string()),
            text_align: style
                .and_then(|s| s.text_align)
                .unwrap_or(defaults.text_align),
        },
    }
}

/// Set a field's position, clamped to the interactive range. Returns the
/// updated slide; the other field's storage is untouched.
pub fn set_position(slide: &Slide, field: FieldKind, position: Position) -> Slide {
    let clamped = ClampRange::Interactive.apply(position);
    let mut next = slide.clone();
    match field {
        FieldKind::Title => next.title_position = Some(clamped),
        FieldKind::Content => next.content_position = Some(clamped),
    }
    next
}

/// Merge a style patch into a field, property-by-property. Changing the
/// color never resets the font size.
pub fn set_style(slide: &Slide, field: FieldKind, patch: &TextStyle) -> Slide {
    let merged = merge_style(slide.style(field), patch);
    let mut next = slide.clone();
    match field {
        FieldKind::Title => next.title_style = Some(merged),
        FieldKind::Content => next.content_style = Some(merged),
    }
    next
}

fn merge_style(base: Option<&TextStyle>, patch: &TextStyle) -> TextStyle {
    TextStyle {
        font_size: patch.font_size.or_else(|| base.and_then(|b| b.font_size)),
        color: patch
            .color
            .clone()
            .or_else(|| base.and_then(|b| b.color.clone())),
        text_align: patch
            .text_align
            .or_else(|| base.and_then(|b| b.text_align)),
    }
}
