//! CLI output formatting for the studio commands.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! Display is information-centric: the primary line for every entity is
//! its semantic identity (positional index + title), with details as
//! indented context lines underneath.

use crate::export::{ExportEvent, ExportReport};
use crate::template::TemplateRegistry;
use crate::types::{CanvasFormat, SessionData};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Shorten body text for one-line context display.
fn excerpt(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}…")
    }
}

fn format_name(format: CanvasFormat) -> &'static str {
    match format {
        CanvasFormat::Square => "square 1080x1080",
        CanvasFormat::Portrait => "portrait 1080x1350",
    }
}

// ============================================================================
// Templates
// ============================================================================

pub fn format_templates(registry: &TemplateRegistry) -> Vec<String> {
    let mut lines = vec!["Templates".to_string()];
    for (i, t) in registry.templates().iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), t.name()));
        lines.push(format!("{}Id: {}", indent(1), t.id()));
        if t.supports_photo() {
            lines.push(format!("{}Photo background: supported", indent(1)));
        }
    }
    lines
}

pub fn print_templates(registry: &TemplateRegistry) {
    for line in format_templates(registry) {
        println!("{line}");
    }
}

// ============================================================================
// Session check
// ============================================================================

pub fn format_session(data: &SessionData, template_known: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "Session {} ({}, {})",
        data.token,
        data.template_id,
        format_name(data.format)
    )];
    if !template_known {
        lines.push(format!(
            "{}Warning: unknown template '{}' - slides will render as placeholders",
            indent(1),
            data.template_id
        ));
    }
    for (i, slide) in data.slides.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            excerpt(&slide.title, 40),
            slide.kind.label()
        ));
        lines.push(format!("{}Content: {}", indent(1), excerpt(&slide.content, 60)));
        let mut custom = Vec::new();
        if slide.title_position.is_some() || slide.title_style.is_some() {
            custom.push("title");
        }
        if slide.content_position.is_some() || slide.content_style.is_some() {
            custom.push("content");
        }
        if !custom.is_empty() {
            lines.push(format!("{}Customized: {}", indent(1), custom.join(", ")));
        }
    }
    lines
}

pub fn print_session(data: &SessionData, template_known: bool) {
    for line in format_session(data, template_known) {
        println!("{line}");
    }
}

// ============================================================================
// Export progress
// ============================================================================

pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::SlideStarted { index, total, percent } => {
            vec![format!(
                "[{percent:>3}%] slide {}/{} rendering",
                index + 1,
                total
            )]
        }
        ExportEvent::SlideFinished { index, total, percent, file } => {
            vec![format!(
                "[{percent:>3}%] slide {}/{} -> {}",
                index + 1,
                total,
                file.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| file.display().to_string())
            )]
        }
        ExportEvent::SlideFailed { index, total, message } => {
            vec![format!("[ ...] slide {}/{} failed: {message}", index + 1, total)]
        }
    }
}

pub fn format_export_report(report: &ExportReport) -> Vec<String> {
    let mut lines = vec![format!("{report}")];
    for failure in &report.failures {
        lines.push(format!(
            "{}slide {}: {}",
            indent(1),
            failure.index + 1,
            failure.message
        ));
    }
    lines
}

pub fn print_export_report(report: &ExportReport) {
    for line in format_export_report(report) {
        println!("{line}");
    }
}
