//! Editing session coordination.
//!
//! [`EditorSession`] wires the pieces together for one open session: the
//! slide list, the template registry, the drag controller, the save
//! tracker, and the persistence collaborator. All UI state — active slide,
//! selected field, in-flight drag — lives here, confined to this one
//! value; there is no ambient global state.
//!
//! Pointer events arrive in surface pixels of the active slide's preview.
//! Moves update an optimistic live position that only the rendered surface
//! sees; pointer-up commits through the override model and fires a save.
//! A click that never moves selects the field without committing anything.

use crate::drag::{DragCommit, DragController};
use crate::overrides;
use crate::session::{SaveStatus, SaveTracker, SessionError, SessionStore};
use crate::surface::{ComposeContext, SlideSurface};
use crate::template::TemplateRegistry;
use crate::types::{CanvasFormat, FieldKind, Position, SessionData, Slide, TextStyle};
use log::warn;
use thiserror::Error;

/// Scale the active slide's preview renders at.
const DEFAULT_PREVIEW_SCALE: f64 = 0.5;

/// Scale for read-only background thumbnails.
const DEFAULT_THUMBNAIL_SCALE: f64 = 0.2;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("session not found: {0}")]
    SessionNotFound(String),
}

#[derive(Debug)]
pub struct EditorSession<S: SessionStore> {
    store: S,
    registry: TemplateRegistry,
    token: String,
    slides: Vec<Slide>,
    template_id: String,
    format: CanvasFormat,
    background_url: Option<String>,
    active_slide: usize,
    selected_field: Option<FieldKind>,
    drag: DragController,
    /// Optimistic in-drag position; set by pointer moves, cleared on
    /// release. Doubles as the "did the pointer actually move" flag.
    live_position: Option<(FieldKind, Position)>,
    tracker: SaveTracker,
    preview_scale: f64,
    thumbnail_scale: f64,
}

impl<S: SessionStore> EditorSession<S> {
    /// Load a session from the store. Not-found is terminal for the open
    /// operation — there is nothing to edit.
    pub fn open(store: S, registry: TemplateRegistry, token: &str) -> Result<Self, EditorError> {
        let data = store
            .get(token)?
            .ok_or_else(|| EditorError::SessionNotFound(token.to_string()))?;
        Ok(Self {
            store,
            registry,
            token: data.token,
            slides: data.slides,
            template_id: data.template_id,
            format: data.format,
            background_url: data.background_url,
            active_slide: 0,
            selected_field: None,
            drag: DragController::new(),
            live_position: None,
            tracker: SaveTracker::new(),
            preview_scale: DEFAULT_PREVIEW_SCALE,
            thumbnail_scale: DEFAULT_THUMBNAIL_SCALE,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn format(&self) -> CanvasFormat {
        self.format
    }

    pub fn active_slide(&self) -> usize {
        self.active_slide
    }

    pub fn selected_field(&self) -> Option<FieldKind> {
        self.selected_field
    }

    pub fn set_preview_scale(&mut self, scale: f64) {
        self.preview_scale = scale;
    }

    /// Switch the interactive slide. Ignored mid-drag — the pointer is
    /// still down on the current surface.
    pub fn activate_slide(&mut self, index: usize) {
        if self.drag.is_dragging() || index >= self.slides.len() {
            return;
        }
        self.active_slide = index;
        self.selected_field = None;
    }

    /// Compose the rendering surface for one slide. Only the active slide
    /// is interactive and rendered at preview scale; every other slide is
    /// a read-only thumbnail. An unknown template yields a placeholder.
    pub fn surface(&self, index: usize) -> SlideSurface {
        let active = index == self.active_slide;
        let scale = if active {
            self.preview_scale
        } else {
            self.thumbnail_scale
        };
        let Some(template) = self.registry.get(&self.template_id) else {
            return SlideSurface::placeholder(self.format, scale);
        };
        let Some(slide) = self.slides.get(index) else {
            return SlideSurface::placeholder(self.format, scale);
        };
        let mut ctx = ComposeContext::interactive(index + 1, self.slides.len(), self.format, scale);
        ctx.interactive = active;
        ctx.background_url = self.background_url.as_deref();
        if active {
            ctx.live_position = self.live_position;
        }
        match SlideSurface::compose(template, slide, &ctx) {
            Ok(surface) => surface,
            Err(e) => {
                warn!("surface composition failed for slide {}: {e}", index + 1);
                SlideSurface::placeholder(self.format, scale)
            }
        }
    }

    /// Select a field for subsequent style edits. Never moves anything.
    pub fn select_field(&mut self, field: FieldKind) {
        self.selected_field = Some(field);
    }

    /// Pointer-down on the active preview. Hit-tests the surface; on a
    /// field, selects it and arms a drag. Returns the hit field.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<FieldKind> {
        let surface = self.surface(self.active_slide);
        let field = surface.field_at(x, y)?;
        self.selected_field = Some(field);
        let explicit = self.slides[self.active_slide].position(field);
        self.drag.begin(field, (x, y), explicit);
        Some(field)
    }

    /// Pointer move while dragging: update the optimistic live position.
    /// Purely local — nothing is committed or saved.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(live) = self.drag.position_at((x, y), self.preview_scale, self.format) {
            self.live_position = Some(live);
        }
    }

    /// Pointer release. A drag that actually moved commits its final
    /// position through the override model and fires a save; a plain
    /// click leaves positions untouched (it already selected the field).
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<DragCommit> {
        let commit = self.drag.finish((x, y), self.preview_scale, self.format);
        let moved = self.live_position.take().is_some();
        let commit = commit.filter(|_| moved)?;

        let slide = &self.slides[self.active_slide];
        self.slides[self.active_slide] =
            overrides::set_position(slide, commit.field, commit.position);
        self.save(self.active_slide, commit.field);
        Some(commit)
    }

    /// Apply a style patch to the selected field. Returns `false` when no
    /// field is selected.
    pub fn style_selected(&mut self, patch: &TextStyle) -> bool {
        let Some(field) = self.selected_field else {
            return false;
        };
        let slide = &self.slides[self.active_slide];
        self.slides[self.active_slide] = overrides::set_style(slide, field, patch);
        self.save(self.active_slide, field);
        true
    }

    /// Direct text edit of one field.
    pub fn set_text(&mut self, index: usize, field: FieldKind, text: impl Into<String>) {
        let Some(slide) = self.slides.get_mut(index) else {
            return;
        };
        match field {
            FieldKind::Title => slide.title = text.into(),
            FieldKind::Content => slide.content = text.into(),
        }
        self.save(index, field);
    }

    pub fn save_status(&self, slide: usize, field: FieldKind) -> SaveStatus {
        self.tracker.status(slide, field)
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// Immutable snapshot for the export pipeline.
    pub fn snapshot(&self) -> SessionData {
        SessionData {
            token: self.token.clone(),
            slides: self.slides.clone(),
            template_id: self.template_id.clone(),
            format: self.format,
            background_url: self.background_url.clone(),
        }
    }

    /// Fire-and-forget save of the whole slide list. Failure keeps the
    /// in-memory edits and leaves the field marked unsaved; nothing is
    /// retried automatically.
    fn save(&mut self, slide: usize, field: FieldKind) {
        let ticket = self.tracker.begin(slide, field);
        let result = self.store.put(&self.token, &self.slides);
        if let Err(e) = &result {
            warn!("saving session {} failed: {e}", self.token);
        }
        self.tracker.complete(ticket, result.is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use crate::test_helpers::sample_session;
    use crate::types::FontSize;

    fn editor(store: &MemoryStore) -> EditorSession<&MemoryStore> {
        let mut editor =
            EditorSession::open(store, TemplateRegistry::builtin(), "tok").unwrap();
        // Full-scale preview keeps test coordinates in canvas pixels.
        editor.set_preview_scale(1.0);
        editor
    }

    fn store_with(slide_count: usize) -> MemoryStore {
        MemoryStore::with_session(sample_session("tok", slide_count))
    }

    // Notebook title default center in canvas px: (50%, 35%) of 1080².
    const TITLE_CENTER: (f64, f64) = (540.0, 378.0);

    // =========================================================================
    // Opening
    // =========================================================================

    #[test]
    fn open_missing_session_is_terminal() {
        let store = MemoryStore::new();
        let err = EditorSession::open(&store, TemplateRegistry::builtin(), "absent").unwrap_err();
        assert!(matches!(err, EditorError::SessionNotFound(_)));
    }

    #[test]
    fn open_loads_slides_in_order() {
        let store = store_with(3);
        let editor = editor(&store);
        assert_eq!(editor.slides().len(), 3);
        assert_eq!(editor.slides()[2].title, "Slide 3 title");
        assert_eq!(editor.active_slide(), 0);
    }

    // =========================================================================
    // Surfaces and interactivity
    // =========================================================================

    #[test]
    fn only_active_slide_is_interactive() {
        let store = store_with(3);
        let editor = editor(&store);
        assert!(editor.surface(0).is_interactive());
        assert!(!editor.surface(1).is_interactive());
        assert!(!editor.surface(2).is_interactive());
    }

    #[test]
    fn background_thumbnails_render_smaller() {
        let store = store_with(2);
        let editor = editor(&store);
        assert!(editor.surface(1).scale() < editor.surface(0).scale());
    }

    #[test]
    fn unknown_template_renders_placeholder_not_crash() {
        // Scenario D.
        let mut session = sample_session("tok", 2);
        session.template_id = "nonexistent".to_string();
        let store = MemoryStore::with_session(session);
        let mut editor = editor(&store);
        let surface = editor.surface(0);
        assert!(surface.is_placeholder());
        assert_eq!(editor.pointer_down(540.0, 378.0), None);
    }

    // =========================================================================
    // Drag lifecycle
    // =========================================================================

    #[test]
    fn drag_commits_and_saves() {
        let store = store_with(2);
        let mut editor = editor(&store);

        let hit = editor.pointer_down(TITLE_CENTER.0, TITLE_CENTER.1);
        assert_eq!(hit, Some(FieldKind::Title));
        editor.pointer_move(TITLE_CENTER.0 + 108.0, TITLE_CENTER.1 - 54.0);
        let commit = editor
            .pointer_up(TITLE_CENTER.0 + 108.0, TITLE_CENTER.1 - 54.0)
            .unwrap();

        // A never-positioned field drags from the 50/50 baseline:
        // 108 px → +10%, -54 px → -5% on a square canvas.
        assert_eq!(commit.position, Position::new(60.0, 45.0));
        assert_eq!(
            editor.slides()[0].title_position,
            Some(Position::new(60.0, 45.0))
        );
        // The fire-and-forget save reached the collaborator.
        assert_eq!(
            store.slides("tok").unwrap()[0].title_position,
            Some(Position::new(60.0, 45.0))
        );
        assert_eq!(editor.save_status(0, FieldKind::Title), SaveStatus::Saved);
    }

    #[test]
    fn live_position_previews_without_committing() {
        let store = store_with(1);
        let mut editor = editor(&store);

        editor.pointer_down(TITLE_CENTER.0, TITLE_CENTER.1);
        editor.pointer_move(TITLE_CENTER.0 + 108.0, TITLE_CENTER.1);

        // The surface shows the live position (50/50 baseline, +10% x)…
        let surface = editor.surface(0);
        assert!(surface.markup().contains("left: 60%; top: 50%;"));
        // …while the slide and the store remain untouched.
        assert_eq!(editor.slides()[0].title_position, None);
        assert_eq!(store.slides("tok").unwrap()[0].title_position, None);
    }

    #[test]
    fn click_selects_without_moving() {
        let store = store_with(1);
        let mut editor = editor(&store);

        editor.pointer_down(TITLE_CENTER.0, TITLE_CENTER.1);
        let commit = editor.pointer_up(TITLE_CENTER.0, TITLE_CENTER.1);

        assert_eq!(commit, None);
        assert_eq!(editor.selected_field(), Some(FieldKind::Title));
        assert_eq!(editor.slides()[0].title_position, None);
    }

    #[test]
    fn drag_is_clamped_to_margin() {
        let store = store_with(1);
        let mut editor = editor(&store);

        editor.pointer_down(TITLE_CENTER.0, TITLE_CENTER.1);
        editor.pointer_move(TITLE_CENTER.0 + 5000.0, TITLE_CENTER.1 - 5000.0);
        let commit = editor
            .pointer_up(TITLE_CENTER.0 + 5000.0, TITLE_CENTER.1 - 5000.0)
            .unwrap();
        assert_eq!(commit.position, Position::new(90.0, 10.0));
    }

    #[test]
    fn pointer_down_outside_fields_is_inert() {
        let store = store_with(1);
        let mut editor = editor(&store);
        assert_eq!(editor.pointer_down(5.0, 5.0), None);
        assert_eq!(editor.pointer_up(5.0, 5.0), None);
    }

    #[test]
    fn activate_slide_ignored_mid_drag() {
        let store = store_with(2);
        let mut editor = editor(&store);
        editor.pointer_down(TITLE_CENTER.0, TITLE_CENTER.1);
        editor.activate_slide(1);
        assert_eq!(editor.active_slide(), 0);
        editor.pointer_up(TITLE_CENTER.0, TITLE_CENTER.1);
        editor.activate_slide(1);
        assert_eq!(editor.active_slide(), 1);
    }

    // =========================================================================
    // Saves and failure
    // =========================================================================

    #[test]
    fn failed_save_keeps_edits_and_marks_unsaved() {
        let store = store_with(1);
        let mut editor = editor(&store);
        store.set_fail_puts(true);

        editor.pointer_down(TITLE_CENTER.0, TITLE_CENTER.1);
        editor.pointer_move(TITLE_CENTER.0 + 108.0, TITLE_CENTER.1);
        editor.pointer_up(TITLE_CENTER.0 + 108.0, TITLE_CENTER.1);

        // In-memory edit is intact, only durability is lost.
        assert_eq!(
            editor.slides()[0].title_position,
            Some(Position::new(60.0, 50.0))
        );
        assert_eq!(store.slides("tok").unwrap()[0].title_position, None);
        assert_eq!(editor.save_status(0, FieldKind::Title), SaveStatus::Unsaved);
        assert!(editor.is_dirty());
    }

    #[test]
    fn style_edit_applies_to_selected_field_only() {
        let store = store_with(1);
        let mut editor = editor(&store);

        // Nothing selected yet.
        assert!(!editor.style_selected(&TextStyle::default()));

        editor.select_field(FieldKind::Content);
        let applied = editor.style_selected(&TextStyle {
            font_size: Some(FontSize::new(30)),
            ..TextStyle::default()
        });
        assert!(applied);
        let slide = &editor.slides()[0];
        assert_eq!(
            slide.content_style.as_ref().unwrap().font_size,
            Some(FontSize::new(30))
        );
        assert_eq!(slide.title_style, None);
    }

    #[test]
    fn set_text_edits_and_saves() {
        let store = store_with(2);
        let mut editor = editor(&store);
        editor.set_text(1, FieldKind::Title, "Rewritten");
        assert_eq!(editor.slides()[1].title, "Rewritten");
        assert_eq!(store.slides("tok").unwrap()[1].title, "Rewritten");
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    #[test]
    fn snapshot_reflects_current_edits() {
        let store = store_with(1);
        let mut editor = editor(&store);
        editor.set_text(0, FieldKind::Content, "final body");
        let snap = editor.snapshot();
        assert_eq!(snap.slides[0].content, "final body");
        assert_eq!(snap.template_id, "notebook");
    }
}
