//! Browser export tests — drives the real Chrome backend end to end.
//!
//! Run with: `cargo test --test browser_export -- --ignored`

use slideforge::export::{ExportOptions, Exporter};
use slideforge::raster::{ChromeBackend, RasterBackend};
use slideforge::substitute::{self, SlideTokens};
use slideforge::template::TemplateRegistry;
use slideforge::types::{CanvasFormat, SessionData, Slide, SlideKind};
use std::time::Duration;
use tempfile::TempDir;

fn session(format: CanvasFormat, slide_count: usize) -> SessionData {
    SessionData {
        token: "browser-test".to_string(),
        slides: (1..=slide_count)
            .map(|n| {
                Slide::new(
                    SlideKind::Hook,
                    format!("Browser slide {n}"),
                    format!("Rendered for real in slide {n}"),
                )
            })
            .collect(),
        template_id: "notebook".to_string(),
        format,
        background_url: None,
    }
}

fn backend(scratch: &TempDir) -> ChromeBackend {
    ChromeBackend::new(scratch.path(), Duration::from_millis(300), (1280, 1500))
        .expect("failed to launch Chrome")
}

#[test]
#[ignore]
fn rasterizes_resolved_markup_at_native_size() {
    let scratch = TempDir::new().unwrap();
    let backend = backend(&scratch);
    let registry = TemplateRegistry::builtin();

    let tokens = SlideTokens {
        title: "Five rules",
        content: "Details here",
        kind: SlideKind::Hook,
        slide_number: 1,
        total_slides: 1,
        format: CanvasFormat::Square,
    };
    let markup = substitute::resolve_id(&registry, "notebook", &tokens).unwrap();

    let png = backend.rasterize(&markup, 1080, 1080).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(image::GenericImageView::dimensions(&img), (1080, 1080));
}

#[test]
#[ignore]
fn exports_square_session_to_ordered_files() {
    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let backend = backend(&scratch);
    let registry = TemplateRegistry::builtin();
    let exporter = Exporter::new(&backend, &registry);

    let options = ExportOptions {
        output_dir: out.path().to_path_buf(),
        pacing_delay: Duration::from_millis(100),
    };
    let report = exporter.export(&session(CanvasFormat::Square, 3), &options, None).unwrap();

    assert_eq!(report.completed(), 3);
    assert!(!report.is_partial());
    for name in ["slide-01.png", "slide-02.png", "slide-03.png"] {
        let path = out.path().join(name);
        assert!(path.exists(), "missing: {}", path.display());
        let img = image::load_from_memory(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(image::GenericImageView::dimensions(&img), (1080, 1080));
    }
}

#[test]
#[ignore]
fn exports_portrait_at_full_height() {
    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let backend = backend(&scratch);
    let registry = TemplateRegistry::builtin();
    let exporter = Exporter::new(&backend, &registry);

    let options = ExportOptions {
        output_dir: out.path().to_path_buf(),
        pacing_delay: Duration::from_millis(100),
    };
    exporter
        .export(&session(CanvasFormat::Portrait, 1), &options, None)
        .unwrap();

    let png = std::fs::read(out.path().join("slide-01.png")).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(image::GenericImageView::dimensions(&img), (1080, 1350));
}
