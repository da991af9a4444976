//! Token substitution: named layout + slide text → renderable markup.
//!
//! Substitution is literal, case-sensitive, replace-all string work in a
//! fixed order (title, content, type, counts, geometry). Every occurrence
//! of each token is replaced — counts and dimensions legitimately appear
//! more than once in a skeleton. If user text itself mimics a token that
//! is substituted later in the order, that occurrence is substituted too;
//! this matches the reference pipeline and keeps the engine a plain string
//! transform.
//!
//! User text is **not** HTML-escaped. The built-in skeletons are
//! maud-authored and give user text no structural role, so escaping is a
//! policy choice rather than a safety requirement here; the decision is
//! recorded in DESIGN.md.

use crate::template::{Template, TemplateRegistry};
use crate::types::{CanvasFormat, SlideKind};

pub const TITLE_TOKEN: &str = "{{TITLE}}";
pub const CONTENT_TOKEN: &str = "{{CONTENT}}";
pub const TYPE_TOKEN: &str = "{{TYPE}}";
pub const SLIDE_NUMBER_TOKEN: &str = "{{SLIDE_NUMBER}}";
pub const TOTAL_SLIDES_TOKEN: &str = "{{TOTAL_SLIDES}}";
pub const WIDTH_TOKEN: &str = "{{WIDTH}}";
pub const HEIGHT_TOKEN: &str = "{{HEIGHT}}";

/// Everything a skeleton needs to become renderable markup for one slide.
#[derive(Debug, Clone, Copy)]
pub struct SlideTokens<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub kind: SlideKind,
    /// 1-based position of the slide within the carousel.
    pub slide_number: usize,
    pub total_slides: usize,
    pub format: CanvasFormat,
}

/// Resolve a layout's skeleton against one slide's values.
pub fn resolve(template: &Template, tokens: &SlideTokens) -> String {
    let (width, height) = tokens.format.dimensions();
    template
        .skeleton()
        .replace(TITLE_TOKEN, tokens.title)
        .replace(CONTENT_TOKEN, tokens.content)
        .replace(TYPE_TOKEN, tokens.kind.label())
        .replace(SLIDE_NUMBER_TOKEN, &tokens.slide_number.to_string())
        .replace(TOTAL_SLIDES_TOKEN, &tokens.total_slides.to_string())
        .replace(WIDTH_TOKEN, &width.to_string())
        .replace(HEIGHT_TOKEN, &height.to_string())
}

/// Registry-level resolution: `None` for an unknown id means "nothing to
/// render" — the caller shows a placeholder, never an error.
pub fn resolve_id(registry: &TemplateRegistry, id: &str, tokens: &SlideTokens) -> Option<String> {
    registry.get(id).map(|t| resolve(t, tokens))
}

/// Inject a photo background into resolved markup.
///
/// The declaration is appended just before the stylesheet's closing
/// boundary so it wins the cascade over the layout's own background, and
/// the layout's hint affordance (if any) is force-hidden.
pub fn inject_background(template: &Template, markup: &str, url: &str) -> String {
    let Some(boundary) = markup.rfind("</style>") else {
        return markup.to_string();
    };
    let safe_url = url.replace('\'', "%27");
    let mut extra = format!(
        "\n.canvas {{ background-image: url('{safe_url}'); background-size: cover; \
background-position: center; }}\n"
    );
    if let Some(hint) = template.hint_class() {
        extra.push_str(&format!(".{hint} {{ display: none !important; }}\n"));
    }
    let mut out = String::with_capacity(markup.len() + extra.len());
    out.push_str(&markup[..boundary]);
    out.push_str(&extra);
    out.push_str(&markup[boundary..]);
    out
}
