//! Template registry: the built-in visual layouts.
//!
//! A template is a markup skeleton with literal placeholder tokens
//! (`{{TITLE}}`, `{{WIDTH}}`, …) plus the metadata the rest of the pipeline
//! needs: default position/style per field, the selector fallback chain used
//! to find the editable nodes, and whether the layout supports a photo
//! background.
//!
//! ## Maud-Authored Skeletons
//!
//! Layouts are written as [maud](https://maud.lambda.xyz/) functions and
//! rendered once into skeleton strings when the registry is built. This
//! keeps the markup compile-time checked while the substitution engine
//! stays a plain string transform — tokens are ordinary text to maud.
//!
//! ## Field Discovery Contract
//!
//! Every layout marks its title with `.slide-title` (or an `h1`, or the
//! `.headline` alternate) and its body with `.slide-content` (or a `p`, or
//! `.caption`). The shared fallback chains in [`TITLE_SELECTORS`] and
//! [`CONTENT_SELECTORS`] encode that contract in priority order; the first
//! match wins. A layout that matches neither simply has no interactive
//! field — that is allowed.

use crate::types::{FieldKind, FontSize, Position, TextAlign};
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// One step in a field discovery chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Matches any element carrying the class.
    Class(&'static str),
    /// Matches by tag name.
    Tag(&'static str),
}

/// Ordered fallback chain for locating the title node.
pub const TITLE_SELECTORS: &[Selector] = &[
    Selector::Class("slide-title"),
    Selector::Tag("h1"),
    Selector::Class("headline"),
];

/// Ordered fallback chain for locating the content node.
pub const CONTENT_SELECTORS: &[Selector] = &[
    Selector::Class("slide-content"),
    Selector::Tag("p"),
    Selector::Class("caption"),
];

/// Template-authored defaults for one field: where it sits and how it
/// reads when the user has not overridden anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefaults {
    pub position: Position,
    pub font_size: FontSize,
    pub color: &'static str,
    pub text_align: TextAlign,
}

/// A named visual layout. Read-only registry data, never mutated at
/// runtime.
#[derive(Debug, Clone)]
pub struct Template {
    id: &'static str,
    name: &'static str,
    skeleton: String,
    title_defaults: FieldDefaults,
    content_defaults: FieldDefaults,
    /// Class of the affordance element hidden when a photo background is
    /// injected.
    hint_class: Option<&'static str>,
    supports_photo: bool,
}

impl Template {
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw markup skeleton with all tokens still in place.
    pub fn skeleton(&self) -> &str {
        &self.skeleton
    }

    pub fn defaults(&self, field: FieldKind) -> &FieldDefaults {
        match field {
            FieldKind::Title => &self.title_defaults,
            FieldKind::Content => &self.content_defaults,
        }
    }

    pub fn selectors(&self, field: FieldKind) -> &'static [Selector] {
        match field {
            FieldKind::Title => TITLE_SELECTORS,
            FieldKind::Content => CONTENT_SELECTORS,
        }
    }

    pub fn hint_class(&self) -> Option<&'static str> {
        self.hint_class
    }

    pub fn supports_photo(&self) -> bool {
        self.supports_photo
    }
}

/// The set of known layouts, keyed by id.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// Registry with every built-in layout.
    pub fn builtin() -> Self {
        Self {
            templates: vec![notebook(), gradient(), minimal(), photo(), bold()],
        }
    }

    /// Look up a layout. Unknown ids are `None`, never an error — the
    /// caller renders a placeholder instead.
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

// ============================================================================
// Skeleton assembly
// ============================================================================

/// Wrap a layout's stylesheet and canvas content into a full document.
///
/// The canvas div carries the `{{WIDTH}}`/`{{HEIGHT}}` tokens through its
/// stylesheet so one skeleton serves both canvas formats.
fn page(css: &str, canvas: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                style { (PreEscaped(css)) }
            }
            body {
                div class="canvas" {
                    (canvas)
                }
            }
        }
    }
    .into_string()
}

/// Stylesheet boilerplate shared by every layout: zero-margin body and a
/// token-sized, clipped canvas.
fn base_css() -> String {
    "\
body { margin: 0; padding: 0; }\n\
.canvas { position: relative; width: {{WIDTH}}px; height: {{HEIGHT}}px; overflow: hidden; }\n\
.slide-index { position: absolute; right: 4%; bottom: 3%; font-size: 20px; opacity: 0.6; }\n"
        .to_string()
}

/// Absolute, center-anchored placement rule for one field.
fn field_css(class: &str, d: &FieldDefaults) -> String {
    format!(
        ".{class} {{ position: absolute; left: {x}%; top: {y}%; transform: translate(-50%, -50%); \
width: 80%; margin: 0; font-size: {size}px; color: {color}; text-align: {align}; }}\n",
        class = class,
        x = d.position.x,
        y = d.position.y,
        size = d.font_size.value(),
        color = d.color,
        align = d.text_align.as_css(),
    )
}

fn notebook() -> Template {
    let title = FieldDefaults {
        position: Position::new(50.0, 35.0),
        font_size: FontSize::new(48),
        color: "#2b2b35",
        text_align: TextAlign::Center,
    };
    let content = FieldDefaults {
        position: Position::new(50.0, 60.0),
        font_size: FontSize::new(24),
        color: "#44444e",
        text_align: TextAlign::Center,
    };
    let css = format!(
        "{}\
.canvas {{ background: #fdf6e3; background-image: repeating-linear-gradient(#fdf6e3 0px, #fdf6e3 38px, #e8dcc2 39px); }}\n\
.slide-title {{ font-family: Georgia, 'Times New Roman', serif; }}\n\
.slide-content {{ font-family: Georgia, 'Times New Roman', serif; line-height: 1.5; }}\n\
{}{}",
        base_css(),
        field_css("slide-title", &title),
        field_css("slide-content", &content),
    );
    let canvas = html! {
        h1 class="slide-title" { "{{TITLE}}" }
        p class="slide-content" { "{{CONTENT}}" }
        div class="slide-index" { "{{SLIDE_NUMBER}} / {{TOTAL_SLIDES}}" }
    };
    Template {
        id: "notebook",
        name: "Notebook",
        skeleton: page(&css, canvas),
        title_defaults: title,
        content_defaults: content,
        hint_class: None,
        supports_photo: false,
    }
}

fn gradient() -> Template {
    let title = FieldDefaults {
        position: Position::new(50.0, 40.0),
        font_size: FontSize::new(56),
        color: "#ffffff",
        text_align: TextAlign::Center,
    };
    let content = FieldDefaults {
        position: Position::new(50.0, 65.0),
        font_size: FontSize::new(26),
        color: "#f0eefc",
        text_align: TextAlign::Center,
    };
    let css = format!(
        "{}\
.canvas {{ background: linear-gradient(135deg, #5b2a86 0%, #2d81c4 100%); }}\n\
.slide-title {{ font-family: 'Helvetica Neue', Arial, sans-serif; font-weight: 700; }}\n\
.slide-content {{ font-family: 'Helvetica Neue', Arial, sans-serif; line-height: 1.5; }}\n\
.slide-kind {{ position: absolute; left: 4%; top: 3%; font-size: 18px; letter-spacing: 2px; \
text-transform: uppercase; color: #d8ccf0; }}\n\
{}{}",
        base_css(),
        field_css("slide-title", &title),
        field_css("slide-content", &content),
    );
    let canvas = html! {
        div class="slide-kind" { "{{TYPE}}" }
        h1 class="slide-title" { "{{TITLE}}" }
        p class="slide-content" { "{{CONTENT}}" }
        div class="slide-index" { "{{SLIDE_NUMBER}} / {{TOTAL_SLIDES}}" }
    };
    Template {
        id: "gradient",
        name: "Gradient",
        skeleton: page(&css, canvas),
        title_defaults: title,
        content_defaults: content,
        hint_class: None,
        supports_photo: false,
    }
}

fn minimal() -> Template {
    let title = FieldDefaults {
        position: Position::new(50.0, 30.0),
        font_size: FontSize::new(52),
        color: "#111111",
        text_align: TextAlign::Left,
    };
    let content = FieldDefaults {
        position: Position::new(50.0, 55.0),
        font_size: FontSize::new(24),
        color: "#333333",
        text_align: TextAlign::Left,
    };
    // Bare h1/p exercise the tag step of the discovery chain.
    let css = format!(
        "{}\
.canvas {{ background: #ffffff; }}\n\
h1 {{ position: absolute; left: 50%; top: 30%; transform: translate(-50%, -50%); width: 80%; \
margin: 0; font-family: Arial, sans-serif; font-size: 52px; color: #111111; text-align: left; }}\n\
p {{ position: absolute; left: 50%; top: 55%; transform: translate(-50%, -50%); width: 80%; \
margin: 0; font-family: Arial, sans-serif; font-size: 24px; color: #333333; text-align: left; \
line-height: 1.6; }}\n",
        base_css(),
    );
    let canvas = html! {
        h1 { "{{TITLE}}" }
        p { "{{CONTENT}}" }
        div class="slide-index" { "{{SLIDE_NUMBER}} / {{TOTAL_SLIDES}}" }
    };
    Template {
        id: "minimal",
        name: "Minimal",
        skeleton: page(&css, canvas),
        title_defaults: title,
        content_defaults: content,
        hint_class: None,
        supports_photo: false,
    }
}

fn photo() -> Template {
    let title = FieldDefaults {
        position: Position::new(50.0, 70.0),
        font_size: FontSize::new(48),
        color: "#ffffff",
        text_align: TextAlign::Center,
    };
    let content = FieldDefaults {
        position: Position::new(50.0, 82.0),
        font_size: FontSize::new(22),
        color: "#e8e8e8",
        text_align: TextAlign::Center,
    };
    // The headline/caption classes exercise the alternate step of the
    // discovery chain. The swipe hint is hidden once a photo is injected.
    let css = format!(
        "{}\
.canvas {{ background: #1c1c22; }}\n\
.headline {{ font-family: 'Helvetica Neue', Arial, sans-serif; font-weight: 700; \
text-shadow: 0 2px 12px rgba(0, 0, 0, 0.7); }}\n\
.caption {{ font-family: 'Helvetica Neue', Arial, sans-serif; line-height: 1.4; \
text-shadow: 0 1px 8px rgba(0, 0, 0, 0.7); }}\n\
.swipe-hint {{ position: absolute; left: 50%; top: 8%; transform: translate(-50%, -50%); \
font-size: 18px; color: #cccccc; letter-spacing: 1px; }}\n\
{}{}",
        base_css(),
        field_css("headline", &title),
        field_css("caption", &content),
    );
    let canvas = html! {
        div class="swipe-hint" { "add a background photo" }
        div class="headline" { "{{TITLE}}" }
        div class="caption" { "{{CONTENT}}" }
        div class="slide-index" { "{{SLIDE_NUMBER}} / {{TOTAL_SLIDES}}" }
    };
    Template {
        id: "photo",
        name: "Photo",
        skeleton: page(&css, canvas),
        title_defaults: title,
        content_defaults: content,
        hint_class: Some("swipe-hint"),
        supports_photo: true,
    }
}

fn bold() -> Template {
    let title = FieldDefaults {
        position: Position::new(50.0, 45.0),
        font_size: FontSize::new(72),
        color: "#fafafa",
        text_align: TextAlign::Center,
    };
    let content = FieldDefaults {
        position: Position::new(50.0, 72.0),
        font_size: FontSize::new(24),
        color: "#c8c8d0",
        text_align: TextAlign::Center,
    };
    let css = format!(
        "{}\
.canvas {{ background: #16161c; }}\n\
.slide-title {{ font-family: 'Arial Black', Arial, sans-serif; text-transform: uppercase; \
letter-spacing: -1px; }}\n\
.slide-content {{ font-family: Arial, sans-serif; line-height: 1.5; }}\n\
.accent-bar {{ position: absolute; left: 50%; top: 58%; transform: translate(-50%, -50%); \
width: 12%; height: 6px; background: #ff5a5f; }}\n\
{}{}",
        base_css(),
        field_css("slide-title", &title),
        field_css("slide-content", &content),
    );
    let canvas = html! {
        h1 class="slide-title" { "{{TITLE}}" }
        div class="accent-bar" {}
        p class="slide-content" { "{{CONTENT}}" }
        div class="slide-index" { "{{SLIDE_NUMBER}} / {{TOTAL_SLIDES}}" }
    };
    Template {
        id: "bold",
        name: "Bold",
        skeleton: page(&css, canvas),
        title_defaults: title,
        content_defaults: content,
        hint_class: None,
        supports_photo: false,
    }
}
