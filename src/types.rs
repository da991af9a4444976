//! Shared data model for the composition and export pipeline.
//!
//! These types are serialized to JSON session documents and must match the
//! wire format the upstream collaborators produce (camelCase keys, `type`
//! for the slide kind). Everything downstream — templates, overrides,
//! surfaces, export — works on these values.

use serde::{Deserialize, Serialize};

/// The role a slide plays in a carousel narrative.
///
/// Produced upstream by the content generator; the composition core only
/// uses it for the optional `{{TYPE}}` template token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Hook,
    Tension,
    Value,
    Insight,
    Cta,
}

impl SlideKind {
    /// Fixed display label substituted for the `{{TYPE}}` token.
    pub fn label(self) -> &'static str {
        match self {
            SlideKind::Hook => "Hook",
            SlideKind::Tension => "Tension",
            SlideKind::Value => "Value",
            SlideKind::Insight => "Insight",
            SlideKind::Cta => "CTA",
        }
    }
}

/// One of the two editable text fields on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Title,
    Content,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Title => "title",
            FieldKind::Content => "content",
        }
    }
}

/// Font size in pixels, clamped to the supported range on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    pub const MIN: u32 = 12;
    pub const MAX: u32 = 120;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for FontSize {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

/// Horizontal text alignment within a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// A user's styling deviation from the template for one field.
///
/// Sparse by design: absent properties fall back to the template's
/// defaults, and merging is property-by-property (changing the color never
/// resets the font size).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    /// Hex color string, e.g. `#1a1a2e`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl TextStyle {
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none() && self.color.is_none() && self.text_align.is_none()
    }
}

/// Normalized field position: percentage offsets of canvas width/height,
/// anchored at the field's own center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into `[min, max]`.
    pub fn clamped(self, min: f64, max: f64) -> Self {
        Self {
            x: self.x.clamp(min, max),
            y: self.y.clamp(min, max),
        }
    }
}

/// One unit of carousel content with optional per-field overrides.
///
/// Mutations go through [`crate::overrides`] and produce new `Slide`
/// values; the core never adds or removes slides from a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(rename = "type")]
    pub kind: SlideKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_position: Option<Position>,
}

impl Slide {
    pub fn new(kind: SlideKind, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            title_style: None,
            content_style: None,
            title_position: None,
            content_position: None,
        }
    }

    pub fn text(&self, field: FieldKind) -> &str {
        match field {
            FieldKind::Title => &self.title,
            FieldKind::Content => &self.content,
        }
    }

    pub fn position(&self, field: FieldKind) -> Option<Position> {
        match field {
            FieldKind::Title => self.title_position,
            FieldKind::Content => self.content_position,
        }
    }

    pub fn style(&self, field: FieldKind) -> Option<&TextStyle> {
        match field {
            FieldKind::Title => self.title_style.as_ref(),
            FieldKind::Content => self.content_style.as_ref(),
        }
    }
}

/// Fixed output canvas sizes. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasFormat {
    Square,
    Portrait,
}

impl CanvasFormat {
    pub fn width(self) -> u32 {
        1080
    }

    pub fn height(self) -> u32 {
        match self {
            CanvasFormat::Square => 1080,
            CanvasFormat::Portrait => 1350,
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// An editing session as read from the persistence collaborator.
///
/// Expiry and deletion are the collaborator's concern and are not
/// represented here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub token: String,
    pub slides: Vec<Slide>,
    pub template_id: String,
    pub format: CanvasFormat,
    /// Session-level background photo for templates that support photo
    /// mode. Absent for purely typographic templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
}
