//! Shared test fixtures for the slideforge test suite.
//!
//! Builders for sessions and slides that the editor, export, and CLI
//! formatting tests all use. Titles and bodies are numbered so assertions
//! can pin slides to their index.

use crate::types::{CanvasFormat, SessionData, Slide, SlideKind};

/// A carousel of `count` slides cycling through the narrative kinds.
pub fn sample_slides(count: usize) -> Vec<Slide> {
    let kinds = [
        SlideKind::Hook,
        SlideKind::Tension,
        SlideKind::Value,
        SlideKind::Insight,
        SlideKind::Cta,
    ];
    (1..=count)
        .map(|n| {
            Slide::new(
                kinds[(n - 1) % kinds.len()],
                format!("Slide {n} title"),
                format!("Slide {n} body text"),
            )
        })
        .collect()
}

/// A square notebook session with no overrides.
pub fn sample_session(token: &str, slide_count: usize) -> SessionData {
    SessionData {
        token: token.to_string(),
        slides: sample_slides(slide_count),
        template_id: "notebook".to_string(),
        format: CanvasFormat::Square,
        background_url: None,
    }
}
