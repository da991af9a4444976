//! # slideforge
//!
//! A slide composition and export engine for AI-written carousel decks.
//! Upstream tooling generates slide text; slideforge composes it onto a
//! visual template, lets the user reposition and restyle the two text
//! fields of each slide, and rasterizes every slide to a standalone PNG.
//!
//! # Architecture: Compose, Edit, Export
//!
//! The engine moves session data through three cooperating layers:
//!
//! ```text
//! 1. Compose   template + slide  →  resolved markup   (tokens → text)
//! 2. Edit      pointer events    →  override model    (drag + restyle)
//! 3. Export    session snapshot  →  slide-NN.png      (sequential raster)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Fidelity**: export rebuilds every surface from session data, so the
//!   emitted pixels always match the override model, never transient drag
//!   state.
//! - **Isolation**: each slide owns its own document tree; templates can
//!   never leak selectors or styles into one another.
//! - **Testability**: composition and geometry are pure functions over
//!   data, so the whole editing core runs in unit tests without a browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared serde data model (`Slide`, `TextStyle`, `Position`, `CanvasFormat`, `SessionData`) |
//! | [`template`] | Registry of built-in layouts: maud-authored skeletons, selector chains, per-field defaults |
//! | [`substitute`] | Literal replace-all token resolution and photo-background injection |
//! | [`overrides`] | Effective position/style resolution and immutable slide updates with clamping |
//! | [`geometry`] | Pure coordinate math: normalized↔pixel, drag deltas, field rect estimation |
//! | [`surface`] | Per-slide isolated rendering contexts: field discovery, override application, hit testing |
//! | [`drag`] | Pointer-driven drag state machine, one active drag per session |
//! | [`session`] | `SessionStore` collaborator trait, JSON-file and in-memory stores, save supersede tracking |
//! | [`editor`] | Editing session coordination: active slide, selection, pointer entry points, saves |
//! | [`raster`] | `RasterBackend` trait + headless-Chrome production backend |
//! | [`export`] | Sequential export pipeline: settle, rasterize, pace, report partial failures |
//! | [`config`] | `config.toml` loading and validation for delays and browser settings |
//! | [`output`] | CLI output formatting — pure `format_*` functions with `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## Browser Rasterization
//!
//! Slides are laid out in HTML/CSS, and the only renderer that reproduces
//! that layout exactly is a browser engine. Export drives a headless
//! Chrome through [`raster::ChromeBackend`]: scratch file, `file://`
//! navigation, screenshot clipped to the native canvas. Everything above
//! the backend trait is browser-free and unit-tested against a recording
//! mock.
//!
//! ## Maud Over Template Files
//!
//! The built-in layouts are written with [Maud](https://maud.lambda.xyz/)
//! and rendered once into token skeletons at registry construction:
//! malformed markup is a compile error, and there is no template directory
//! to ship or get out of sync. Runtime substitution stays a plain string
//! transform over the skeleton.
//!
//! ## Strictly Sequential Export
//!
//! Slides export one at a time, with a settle wait before each capture
//! and a pacing pause between files. Concurrent off-screen renders
//! contend over the same browser tab, and unpaced bursts of downloads get
//! silently dropped by the receiving side. A slow, complete export beats
//! a fast, partial one.
//!
//! ## Supersede-Stale Saves
//!
//! Saves are fire-and-forget, so a slow older save could complete after a
//! newer one. Every write bumps a per-field generation counter and stale
//! completions are discarded, so the durability indicator can never be
//! overwritten by an out-of-order completion.

pub mod config;
pub mod drag;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod output;
pub mod overrides;
pub mod raster;
pub mod session;
pub mod substitute;
pub mod surface;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
