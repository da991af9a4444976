//! Rendering surfaces: one isolated document model per slide.
//!
//! A [`SlideSurface`] owns the fully resolved, styled markup for a single
//! slide plus the geometry of its editable fields. Each surface is built
//! from scratch out of session data — surfaces never share nodes or styles
//! with each other, so one template's selectors can never bleed into
//! another slide's document.
//!
//! ## Field Discovery
//!
//! The two editable fields are located by walking the markup with a
//! streaming reader and applying the template's ordered selector fallback
//! chain: all elements are tried against the primary selector first, then
//! the next, until one matches. A field with no match is simply not
//! interactive for that slide — a degraded state, not an error.
//!
//! ## Override Application
//!
//! Discovered fields get an inline `style` attribute: absolute positioning
//! at the effective center-anchored position always, font size / color /
//! alignment only when the user explicitly overrode them. Template CSS
//! stays in charge of everything the user never touched.

use crate::geometry::{self, Rect};
use crate::overrides::{self, ClampRange, Effective};
use crate::substitute::{self, SlideTokens};
use crate::template::{Selector, Template};
use crate::types::{CanvasFormat, FieldKind, Position, Slide};
use log::debug;
use maud::{DOCTYPE, PreEscaped, html};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("markup rewrite error: {0}")]
    Markup(String),
}

/// Everything a surface needs to compose one slide.
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    /// 1-based slide position within the carousel.
    pub slide_number: usize,
    pub total_slides: usize,
    pub format: CanvasFormat,
    /// Render scale: 1.0 for full resolution, smaller for thumbnails.
    pub scale: f64,
    /// Only the active slide's surface accepts pointer input.
    pub interactive: bool,
    pub background_url: Option<&'a str>,
    pub clamp: ClampRange,
    /// Optimistic in-drag position, applied to the surface without being
    /// committed to the slide.
    pub live_position: Option<(FieldKind, Position)>,
}

impl<'a> ComposeContext<'a> {
    /// Context for an interactive editing surface.
    pub fn interactive(
        slide_number: usize,
        total_slides: usize,
        format: CanvasFormat,
        scale: f64,
    ) -> Self {
        Self {
            slide_number,
            total_slides,
            format,
            scale,
            interactive: true,
            background_url: None,
            clamp: ClampRange::Interactive,
            live_position: None,
        }
    }

    /// Context for the export path: full resolution, full clamp range,
    /// read-only.
    pub fn export(slide_number: usize, total_slides: usize, format: CanvasFormat) -> Self {
        Self {
            slide_number,
            total_slides,
            format,
            scale: 1.0,
            interactive: false,
            background_url: None,
            clamp: ClampRange::Full,
            live_position: None,
        }
    }
}

/// A discovered, styled field node.
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub kind: FieldKind,
    pub effective: Effective,
    /// Estimated bounding box in canvas pixels (unscaled).
    pub rect: Rect,
}

/// One slide's isolated rendering context.
#[derive(Debug, Clone)]
pub struct SlideSurface {
    markup: String,
    fields: Vec<FieldNode>,
    scale: f64,
    interactive: bool,
    placeholder: bool,
}

impl SlideSurface {
    /// Compose a surface for one slide: resolve the skeleton, inject the
    /// photo background if any, apply effective overrides, and discover
    /// field geometry.
    pub fn compose(
        template: &Template,
        slide: &Slide,
        ctx: &ComposeContext,
    ) -> Result<SlideSurface, SurfaceError> {
        let tokens = SlideTokens {
            title: &slide.title,
            content: &slide.content,
            kind: slide.kind,
            slide_number: ctx.slide_number,
            total_slides: ctx.total_slides,
            format: ctx.format,
        };
        let mut markup = substitute::resolve(template, &tokens);
        if let Some(url) = ctx.background_url
            && template.supports_photo()
        {
            markup = substitute::inject_background(template, &markup, url);
        }

        let renders: Vec<FieldRender> = [FieldKind::Title, FieldKind::Content]
            .into_iter()
            .map(|field| {
                let mut eff = overrides::effective(template, slide, field);
                if let Some((live_field, live_pos)) = ctx.live_position
                    && live_field == field
                {
                    eff.position = live_pos;
                }
                eff.position = ctx.clamp.apply(eff.position);
                FieldRender {
                    kind: field,
                    css: inline_style(&eff, slide, field),
                    effective: eff,
                }
            })
            .collect();

        let elements = scan_elements(&markup)?;
        let claims = claim_fields(template, &renders, &elements);
        for render in &renders {
            if !claims.iter().any(|c| c.kind == render.kind) {
                debug!(
                    "no {} node found for template '{}'; field is not interactive",
                    render.kind.as_str(),
                    template.id()
                );
            }
        }
        let styled = rewrite_with_styles(&markup, &renders, &claims)?;

        let (width, height) = ctx.format.dimensions();
        let fields = claims
            .iter()
            .map(|claim| {
                let render = renders.iter().find(|r| r.kind == claim.kind).unwrap();
                FieldNode {
                    kind: claim.kind,
                    rect: geometry::estimate_field_rect(
                        render.effective.position,
                        render.effective.style.font_size.value(),
                        slide.text(claim.kind),
                        width,
                        height,
                    ),
                    effective: render.effective.clone(),
                }
            })
            .collect();

        Ok(SlideSurface {
            markup: styled,
            fields,
            scale: ctx.scale,
            interactive: ctx.interactive,
            placeholder: false,
        })
    }

    /// Non-fatal stand-in shown when a session references an unknown
    /// template. No fields, never interactive.
    pub fn placeholder(format: CanvasFormat, scale: f64) -> SlideSurface {
        let (width, height) = format.dimensions();
        let css = format!(
            "body {{ margin: 0; }} .canvas {{ width: {width}px; height: {height}px; \
background: #2a2a30; display: flex; align-items: center; justify-content: center; }} \
.notice {{ font-family: Arial, sans-serif; color: #9a9aa4; font-size: 28px; }}"
        );
        let markup = html! {
            (DOCTYPE)
            html {
                head {
                    style { (PreEscaped(css)) }
                }
                body {
                    div class="canvas" {
                        div class="notice" { "This layout is unavailable." }
                    }
                }
            }
        }
        .into_string();
        SlideSurface {
            markup,
            fields: Vec::new(),
            scale,
            interactive: false,
            placeholder: true,
        }
    }

    /// The fully resolved, styled markup this surface renders.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn fields(&self) -> &[FieldNode] {
        &self.fields
    }

    pub fn field(&self, kind: FieldKind) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// A field's bounding box in surface pixels (canvas rect × scale).
    pub fn display_rect(&self, kind: FieldKind) -> Option<Rect> {
        self.field(kind).map(|f| f.rect.scaled(self.scale))
    }

    /// Hit-test a pointer location in surface pixels. Read-only surfaces
    /// never report a field — background thumbnails reject pointer input.
    pub fn field_at(&self, x: f64, y: f64) -> Option<FieldKind> {
        if !self.interactive {
            return None;
        }
        self.fields
            .iter()
            .find(|f| f.rect.scaled(self.scale).contains(x, y))
            .map(|f| f.kind)
    }
}

// ============================================================================
// Field discovery
// ============================================================================

struct FieldRender {
    kind: FieldKind,
    effective: Effective,
    css: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ElementInfo {
    /// Position in document order, counting start and empty tags.
    index: usize,
    tag: String,
    classes: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct FieldClaim {
    kind: FieldKind,
    element_index: usize,
}

/// First streaming pass: list every element with its tag and classes.
fn scan_elements(markup: &str) -> Result<Vec<ElementInfo>, SurfaceError> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);
    let mut elements = Vec::new();
    let mut index = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                elements.push(element_info(&e, index));
                index += 1;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(SurfaceError::Markup(e.to_string())),
        }
    }
    Ok(elements)
}

fn element_info(e: &BytesStart, index: usize) -> ElementInfo {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let classes = e
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"class")
        .map(|a| {
            String::from_utf8_lossy(&a.value)
                .split_whitespace()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    ElementInfo { index, tag, classes }
}

fn selector_matches(selector: Selector, element: &ElementInfo) -> bool {
    match selector {
        Selector::Class(class) => element.classes.iter().any(|c| c == class),
        Selector::Tag(tag) => element.tag == tag,
    }
}

/// Resolve the fallback chains against the element list. Selectors are
/// tried in priority order across the whole document; the first element
/// matching the highest-priority selector wins. An element claimed by the
/// title can not also become the content.
fn claim_fields(
    template: &Template,
    renders: &[FieldRender],
    elements: &[ElementInfo],
) -> Vec<FieldClaim> {
    let mut claims: Vec<FieldClaim> = Vec::new();
    for render in renders {
        let chain = template.selectors(render.kind);
        let claimed: Vec<usize> = claims.iter().map(|c| c.element_index).collect();
        let hit = chain.iter().find_map(|&selector| {
            elements
                .iter()
                .find(|el| selector_matches(selector, el) && !claimed.contains(&el.index))
        });
        if let Some(el) = hit {
            claims.push(FieldClaim {
                kind: render.kind,
                element_index: el.index,
            });
        }
    }
    claims
}

// ============================================================================
// Override application
// ============================================================================

/// Inline declarations for a field: placement always, style properties
/// only when the user explicitly set them (the template's CSS keeps
/// authority over everything else).
fn inline_style(effective: &Effective, slide: &Slide, field: FieldKind) -> String {
    let mut css = format!(
        "position: absolute; left: {}%; top: {}%; transform: translate(-50%, -50%);",
        effective.position.x, effective.position.y
    );
    if let Some(style) = slide.style(field) {
        if let Some(size) = style.font_size {
            css.push_str(&format!(" font-size: {}px;", size.value()));
        }
        if let Some(color) = &style.color {
            css.push_str(&format!(" color: {color};"));
        }
        if let Some(align) = style.text_align {
            css.push_str(&format!(" text-align: {};", align.as_css()));
        }
    }
    css
}

/// Second streaming pass: copy the document, appending the computed style
/// attribute to each claimed element. Existing inline declarations are
/// kept and ours appended after them, so the override wins the cascade.
fn rewrite_with_styles(
    markup: &str,
    renders: &[FieldRender],
    claims: &[FieldClaim],
) -> Result<String, SurfaceError> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut index = 0usize;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| SurfaceError::Markup(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let claim = claims.iter().find(|c| c.element_index == index);
                index += 1;
                let out = match claim {
                    Some(claim) => restyled(&e, field_css(renders, claim.kind)).map_err(SurfaceError::Markup)?,
                    None => e.into_owned(),
                };
                writer
                    .write_event(Event::Start(out))
                    .map_err(|e| SurfaceError::Markup(e.to_string()))?;
            }
            Event::Empty(e) => {
                let claim = claims.iter().find(|c| c.element_index == index);
                index += 1;
                let out = match claim {
                    Some(claim) => restyled(&e, field_css(renders, claim.kind)).map_err(SurfaceError::Markup)?,
                    None => e.into_owned(),
                };
                writer
                    .write_event(Event::Empty(out))
                    .map_err(|e| SurfaceError::Markup(e.to_string()))?;
            }
            other => {
                writer
                    .write_event(other)
                    .map_err(|e| SurfaceError::Markup(e.to_string()))?;
            }
        }
    }
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| SurfaceError::Markup(e.to_string()))
}

fn field_css(renders: &[FieldRender], kind: FieldKind) -> &str {
    renders
        .iter()
        .find(|r| r.kind == kind)
        .map(|r| r.css.as_str())
        .unwrap_or("")
}

/// Rebuild an element with our style appended to any existing one.
fn restyled(e: &BytesStart, css: &str) -> Result<BytesStart<'static>, String> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut out = BytesStart::new(tag);
    let mut existing_style = String::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == b"style" {
            existing_style = String::from_utf8_lossy(&attr.value).to_string();
        } else {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|e| e.to_string())?.to_string();
            out.push_attribute((key.as_str(), value.as_str()));
        }
    }
    let merged = if existing_style.is_empty() {
        css.to_string()
    } else {
        format!("{existing_style}; {css}")
    };
    out.push_attribute(("style", merged.as_str()));
    Ok(out)
}
