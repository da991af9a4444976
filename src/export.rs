//! Export pipeline: rasterize every slide at full resolution, in order.
//!
//! Export is strictly sequential — one off-screen render at a time — and
//! rebuilds each slide's surface from session data, never from any live
//! editing state. The pixels therefore always match the override model,
//! not whatever a drag was showing mid-gesture.
//!
//! Per slide: re-resolve markup at 1× scale, re-apply effective overrides
//! (full `[0,100]` range), rasterize via the backend (which waits for the
//! load signal plus a settle floor), write `slide-NN.png`, then pace
//! before the next slide — rapid successive writes are throttled by
//! download managers, and skipping the pause silently loses files.
//!
//! One slide failing is logged and skipped; the remaining slides still
//! export and the report carries the partial-success summary.

use crate::raster::RasterBackend;
use crate::surface::{ComposeContext, SlideSurface};
use crate::template::TemplateRegistry;
use crate::types::SessionData;
use log::warn;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// A second export was requested while one was in flight. Both would
    /// contend over the same scratch surface and interleave downloads, so
    /// the trigger must stay disabled until the first finishes.
    #[error("an export is already running")]
    AlreadyRunning,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where files go and how exports are paced.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// Pause between consecutive slides.
    pub pacing_delay: Duration,
}

/// Progress feed for the caller, smooth rather than per-slide jumps.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    SlideStarted {
        /// 0-based slide index.
        index: usize,
        total: usize,
        /// Mid-slide progress: `round((index + 0.5) / total * 100)`.
        percent: u32,
    },
    SlideFinished {
        index: usize,
        total: usize,
        /// `round((index + 1) / total * 100)`.
        percent: u32,
        file: PathBuf,
    },
    SlideFailed {
        index: usize,
        total: usize,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideFailure {
    /// 0-based slide index.
    pub index: usize,
    pub message: String,
}

/// Aggregate outcome of one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub total: usize,
    /// Written files, in slide order.
    pub files: Vec<PathBuf>,
    pub failures: Vec<SlideFailure>,
}

impl ExportReport {
    pub fn completed(&self) -> usize {
        self.files.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            write!(f, "exported {} of {} slides", self.completed(), self.total)
        } else {
            write!(
                f,
                "exported {} of {} slides ({} failed)",
                self.completed(),
                self.total,
                self.failures.len()
            )
        }
    }
}

/// Output file name for a 1-based slide position: `slide-01.png`.
pub fn export_file_name(position: usize) -> String {
    format!("slide-{position:02}.png")
}

fn mid_percent(index: usize, total: usize) -> u32 {
    ((index as f64 + 0.5) / total as f64 * 100.0).round() as u32
}

fn done_percent(processed: usize, total: usize) -> u32 {
    (processed as f64 / total as f64 * 100.0).round() as u32
}

pub struct Exporter<'a, B: RasterBackend> {
    backend: &'a B,
    registry: &'a TemplateRegistry,
    in_flight: AtomicBool,
}

impl<'a, B: RasterBackend> Exporter<'a, B> {
    pub fn new(backend: &'a B, registry: &'a TemplateRegistry) -> Self {
        Self {
            backend,
            registry,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run the full pipeline over a session snapshot.
    ///
    /// Returns [`ExportError::AlreadyRunning`] if another export on this
    /// exporter has not finished. Individual slide failures do not abort
    /// the run; they are collected in the report.
    pub fn export(
        &self,
        session: &SessionData,
        options: &ExportOptions,
        events: Option<Sender<ExportEvent>>,
    ) -> Result<ExportReport, ExportError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(ExportError::AlreadyRunning);
        }
        let _guard = FlightGuard(&self.in_flight);

        std::fs::create_dir_all(&options.output_dir)?;
        let total = session.slides.len();
        let mut report = ExportReport {
            total,
            ..ExportReport::default()
        };

        for index in 0..total {
            emit(
                &events,
                ExportEvent::SlideStarted {
                    index,
                    total,
                    percent: mid_percent(index, total),
                },
            );

            match self.export_slide(session, index) {
                Ok(png) => {
                    let file = options.output_dir.join(export_file_name(index + 1));
                    match std::fs::write(&file, png) {
                        Ok(()) => {
                            report.files.push(file.clone());
                            emit(
                                &events,
                                ExportEvent::SlideFinished {
                                    index,
                                    total,
                                    percent: done_percent(index + 1, total),
                                    file,
                                },
                            );
                        }
                        Err(e) => {
                            record_failure(&mut report, &events, index, total, e.to_string());
                        }
                    }
                }
                Err(message) => {
                    record_failure(&mut report, &events, index, total, message);
                }
            }
            if index + 1 < total {
                std::thread::sleep(options.pacing_delay);
            }
        }
        Ok(report)
    }

    /// Rebuild one slide's surface from data and rasterize it at native
    /// canvas dimensions. Errors are stringly — they end up in the report
    /// and the log, never abort the run.
    fn export_slide(&self, session: &SessionData, index: usize) -> Result<Vec<u8>, String> {
        let template = self
            .registry
            .get(&session.template_id)
            .ok_or_else(|| format!("unknown template '{}'", session.template_id))?;

        let mut ctx = ComposeContext::export(index + 1, session.slides.len(), session.format);
        ctx.background_url = session.background_url.as_deref();

        let surface = SlideSurface::compose(template, &session.slides[index], &ctx)
            .map_err(|e| e.to_string())?;
        let (width, height) = session.format.dimensions();
        self.backend
            .rasterize(surface.markup(), width, height)
            .map_err(|e| e.to_string())
    }
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn emit(events: &Option<Sender<ExportEvent>>, event: ExportEvent) {
    if let Some(tx) = events {
        // The receiver may already be gone; progress is best-effort.
        let _ = tx.send(event);
    }
}

fn record_failure(
    report: &mut ExportReport,
    events: &Option<Sender<ExportEvent>>,
    index: usize,
    total: usize,
    message: String,
) {
    warn!("slide {} failed to export: {}", index + 1, message);
    emit(
        events,
        ExportEvent::SlideFailed {
            index,
            total,
            message: message.clone(),
        },
    );
    report.failures.push(SlideFailure { index, message });
}
