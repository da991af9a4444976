//! Rasterization backends: styled markup in, PNG bytes out.
//!
//! The [`RasterBackend`] trait is the seam between the export pipeline
//! (which decides *what* to rasterize) and the pixel work. The production
//! implementation is [`ChromeBackend`]: markup is written to a scratch
//! file, navigated in a headless browser, and screenshotted clipped to the
//! native canvas size. A recording mock lives in the test module so the
//! pipeline can be exercised without a browser.
//!
//! Backends are used strictly sequentially — one render at a time on one
//! reused tab. Concurrent off-screen renders contend for the same browser
//! resources, so the export pipeline never overlaps calls.

use image::GenericImageView;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Trait for rasterization backends.
pub trait RasterBackend {
    /// Render `markup` and return a PNG at exactly `width` × `height`.
    fn rasterize(&self, markup: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError>;
}

/// Headless-Chrome backend. One browser, one reused tab.
pub struct ChromeBackend {
    // Owns the browser process; dropping it closes Chrome.
    _browser: Browser,
    tab: Arc<Tab>,
    scratch_dir: PathBuf,
    settle: Duration,
}

impl ChromeBackend {
    /// Launch a headless browser sized to hold the largest canvas.
    ///
    /// `settle` is the post-navigation floor waited before every capture
    /// so fonts and background images finish loading; navigation itself
    /// is awaited via the browser's load signal, so the floor only covers
    /// late-arriving resources.
    pub fn new(
        scratch_dir: impl Into<PathBuf>,
        settle: Duration,
        window: (u32, u32),
    ) -> Result<Self, RasterError> {
        let browser = Browser::new(LaunchOptions {
            window_size: Some(window),
            ..Default::default()
        })
        .map_err(|e| RasterError::Browser(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RasterError::Browser(e.to_string()))?;
        Ok(Self {
            _browser: browser,
            tab,
            scratch_dir: scratch_dir.into(),
            settle,
        })
    }
}

impl RasterBackend for ChromeBackend {
    fn rasterize(&self, markup: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        let path = self.scratch_dir.join("scratch-slide.html");
        std::fs::write(&path, markup)?;

        self.tab
            .navigate_to(&format!("file://{}", path.display()))
            .map_err(|e| RasterError::Browser(e.to_string()))?
            .wait_until_navigated()
            .map_err(|e| RasterError::Browser(e.to_string()))?;
        std::thread::sleep(self.settle);

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
            scale: 1.0,
        };
        let png = self
            .tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                Some(clip),
                true,
            )
            .map_err(|e| RasterError::Browser(e.to_string()))?;
        normalize_png(png, width, height)
    }
}

/// Ensure the capture is exactly the native canvas size. The clip usually
/// guarantees this; a window smaller than the canvas or a device scale
/// factor can still produce a differently sized bitmap, which is cropped
/// or rejected here rather than silently shipped.
fn normalize_png(png: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
    let img = image::load_from_memory(&png)?;
    if img.dimensions() == (width, height) {
        return Ok(png);
    }
    if img.width() < width || img.height() < height {
        return Err(RasterError::Browser(format!(
            "capture {}x{} smaller than canvas {width}x{height}",
            img.width(),
            img.height()
        )));
    }
    let cropped = img.crop_imm(0, 0, width, height);
    let mut out = Cursor::new(Vec::new());
    cropped.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;

    /// Mock backend that records renders and synthesizes solid PNGs.
    /// Uses a Mutex (not RefCell) so it is Sync like the real backend.
    #[derive(Default)]
    pub struct RecordingBackend {
        pub operations: Mutex<Vec<RecordedRaster>>,
        /// 0-based call indices that should fail.
        pub fail_calls: Mutex<Vec<usize>>,
        calls: Mutex<usize>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRaster {
        pub width: u32,
        pub height: u32,
        pub markup: String,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(calls: Vec<usize>) -> Self {
            Self {
                fail_calls: Mutex::new(calls),
                ..Self::default()
            }
        }

        pub fn recorded(&self) -> Vec<RecordedRaster> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl RasterBackend for RecordingBackend {
        fn rasterize(&self, markup: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let n = *calls;
                *calls += 1;
                n
            };
            if self.fail_calls.lock().unwrap().contains(&call) {
                return Err(RasterError::Browser("synthetic render failure".to_string()));
            }
            self.operations.lock().unwrap().push(RecordedRaster {
                width,
                height,
                markup: markup.to_string(),
            });
            let img = RgbaImage::from_pixel(width, height, Rgba([28, 28, 36, 255]));
            let mut out = Cursor::new(Vec::new());
            image::DynamicImage::ImageRgba8(img).write_to(&mut out, image::ImageFormat::Png)?;
            Ok(out.into_inner())
        }
    }

    #[test]
    fn recording_backend_emits_png_at_native_size() {
        let backend = RecordingBackend::new();
        let png = backend.rasterize("<html></html>", 1080, 1350).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.dimensions(), (1080, 1350));
    }

    #[test]
    fn recording_backend_records_in_order() {
        let backend = RecordingBackend::new();
        backend.rasterize("<p>a</p>", 10, 10).unwrap();
        backend.rasterize("<p>b</p>", 20, 20).unwrap();
        let ops = backend.recorded();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].markup, "<p>a</p>");
        assert_eq!(ops[1].width, 20);
    }

    #[test]
    fn failure_injection_targets_exact_call() {
        let backend = RecordingBackend::failing_on(vec![1]);
        assert!(backend.rasterize("<p>a</p>", 10, 10).is_ok());
        assert!(backend.rasterize("<p>b</p>", 10, 10).is_err());
        assert!(backend.rasterize("<p>c</p>", 10, 10).is_ok());
        // Failed calls are not recorded.
        assert_eq!(backend.recorded().len(), 2);
    }

    #[test]
    fn normalize_accepts_exact_capture() {
        let img = RgbaImage::from_pixel(100, 80, Rgba([0, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img).write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let bytes = buf.into_inner();
        let out = normalize_png(bytes.clone(), 100, 80).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn normalize_crops_oversized_capture() {
        let img = RgbaImage::from_pixel(120, 90, Rgba([0, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img).write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let out = normalize_png(buf.into_inner(), 100, 80).unwrap();
        let cropped = image::load_from_memory(&out).unwrap();
        assert_eq!(cropped.dimensions(), (100, 80));
    }

    #[test]
    fn normalize_rejects_undersized_capture() {
        let img = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img).write_to(&mut buf, image::ImageFormat::Png).unwrap();
        assert!(normalize_png(buf.into_inner(), 100, 80).is_err());
    }
}
