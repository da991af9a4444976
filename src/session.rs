//! Session persistence surface and save bookkeeping.
//!
//! Persistence is an external collaborator consumed through the narrow
//! [`SessionStore`] trait: `get` a session by opaque token, `put` a whole
//! replacement slide list. Not-found and failure are terminal for the
//! current operation — the core never retries automatically, it keeps the
//! in-memory state correct and reports "unsaved" instead.
//!
//! [`SaveTracker`] implements the supersede rule for fire-and-forget
//! saves: every write to a (slide, field) bumps a generation counter, and
//! a completion carrying a stale generation is discarded. An out-of-order
//! completion can therefore never overwrite the status of a newer edit.

use crate::types::{FieldKind, SessionData, Slide};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("invalid session token: {0:?}")]
    InvalidToken(String),
}

/// The read/write surface consumed from the persistence collaborator.
pub trait SessionStore {
    fn get(&self, token: &str) -> Result<Option<SessionData>, SessionError>;

    /// Replace the session's slide list wholesale, preserving order and
    /// count. The session must already exist — the core never creates or
    /// deletes sessions.
    fn put(&self, token: &str, slides: &[Slide]) -> Result<(), SessionError>;
}

impl<S: SessionStore + ?Sized> SessionStore for &S {
    fn get(&self, token: &str) -> Result<Option<SessionData>, SessionError> {
        (**self).get(token)
    }

    fn put(&self, token: &str, slides: &[Slide]) -> Result<(), SessionError> {
        (**self).put(token, slides)
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// One pretty-printed JSON document per token under a store directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Seed a session document. Used by upstream tooling and tests; the
    /// editing core itself only ever reads and replaces slides.
    pub fn create(&self, data: &SessionData) -> Result<(), SessionError> {
        let path = self.path_for(&data.token)?;
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Tokens are opaque but must stay filesystem-safe; anything else is
    /// rejected before it can touch a path.
    fn path_for(&self, token: &str) -> Result<PathBuf, SessionError> {
        let safe = !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(SessionError::InvalidToken(token.to_string()));
        }
        Ok(self.dir.join(format!("{token}.json")))
    }
}

impl SessionStore for JsonFileStore {
    fn get(&self, token: &str) -> Result<Option<SessionData>, SessionError> {
        let path = self.path_for(token)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn put(&self, token: &str, slides: &[Slide]) -> Result<(), SessionError> {
        let mut data = self
            .get(token)?
            .ok_or_else(|| SessionError::NotFound(token.to_string()))?;
        data.slides = slides.to_vec();
        let json = serde_json::to_string_pretty(&data)?;
        std::fs::write(self.path_for(token)?, json)?;
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Collaborator stub backed by a map. Uses a Mutex (not RefCell) so it is
/// Sync and can be shared with a printer or test thread.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, SessionData>>,
    fail_puts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(data: SessionData) -> Self {
        let store = Self::new();
        store
            .sessions
            .lock()
            .unwrap()
            .insert(data.token.clone(), data);
        store
    }

    /// Make every subsequent `put` fail, for exercising the save-failure
    /// path.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Current stored slides for a token, if any.
    pub fn slides(&self, token: &str) -> Option<Vec<Slide>> {
        self.sessions
            .lock()
            .unwrap()
            .get(token)
            .map(|d| d.slides.clone())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, token: &str) -> Result<Option<SessionData>, SessionError> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    fn put(&self, token: &str, slides: &[Slide]) -> Result<(), SessionError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(SessionError::Io(std::io::Error::other("store unavailable")));
        }
        let mut sessions = self.sessions.lock().unwrap();
        let data = sessions
            .get_mut(token)
            .ok_or_else(|| SessionError::NotFound(token.to_string()))?;
        data.slides = slides.to_vec();
        Ok(())
    }
}

// ============================================================================
// Save bookkeeping
// ============================================================================

/// User-visible durability state of one field's edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Everything committed is durable.
    Saved,
    /// A save is in flight.
    Saving,
    /// The last save failed; in-memory edits are intact but not durable.
    Unsaved,
}

/// Handle for one in-flight save. Completing with a ticket older than the
/// latest write for the same field is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    slide: usize,
    field: FieldKind,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The completion was current and the status was updated.
    Applied,
    /// A newer write superseded this save; the completion was discarded.
    Superseded,
}

#[derive(Debug, Default)]
pub struct SaveTracker {
    generations: HashMap<(usize, FieldKind), u64>,
    statuses: HashMap<(usize, FieldKind), SaveStatus>,
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a save for one field and get the ticket its
    /// completion must present.
    pub fn begin(&mut self, slide: usize, field: FieldKind) -> SaveTicket {
        let generation = self
            .generations
            .entry((slide, field))
            .and_modify(|g| *g += 1)
            .or_insert(1);
        self.statuses.insert((slide, field), SaveStatus::Saving);
        SaveTicket {
            slide,
            field,
            generation: *generation,
        }
    }

    /// Report a save completion. Stale tickets are discarded so a slow
    /// older save can never mask the state of a newer one.
    pub fn complete(&mut self, ticket: SaveTicket, success: bool) -> SaveOutcome {
        let key = (ticket.slide, ticket.field);
        let current = self.generations.get(&key).copied().unwrap_or(0);
        if ticket.generation < current {
            return SaveOutcome::Superseded;
        }
        let status = if success {
            SaveStatus::Saved
        } else {
            SaveStatus::Unsaved
        };
        self.statuses.insert(key, status);
        SaveOutcome::Applied
    }

    /// A field with no history is trivially saved.
    pub fn status(&self, slide: usize, field: FieldKind) -> SaveStatus {
        self.statuses
            .get(&(slide, field))
            .copied()
            .unwrap_or(SaveStatus::Saved)
    }

    /// True when any field has unsaved or in-flight edits.
    pub fn is_dirty(&self) -> bool {
        self.statuses.values().any(|s| *s != SaveStatus::Saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanvasFormat, SlideKind};
    use tempfile::TempDir;

    fn session(token: &str) -> SessionData {
        SessionData {
            token: token.to_string(),
            slides: vec![
                Slide::new(SlideKind::Hook, "One", "first"),
                Slide::new(SlideKind::Cta, "Two", "second"),
            ],
            template_id: "notebook".to_string(),
            format: CanvasFormat::Square,
            background_url: None,
        }
    }

    // =========================================================================
    // JsonFileStore
    // =========================================================================

    #[test]
    fn file_store_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        store.create(&session("tok-1")).unwrap();

        let loaded = store.get("tok-1").unwrap().unwrap();
        assert_eq!(loaded, session("tok-1"));
    }

    #[test]
    fn file_store_missing_token_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn file_store_put_replaces_slides_only() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        store.create(&session("tok-1")).unwrap();

        let mut slides = session("tok-1").slides;
        slides[0].title = "Edited".to_string();
        store.put("tok-1", &slides).unwrap();

        let loaded = store.get("tok-1").unwrap().unwrap();
        assert_eq!(loaded.slides[0].title, "Edited");
        assert_eq!(loaded.slides.len(), 2);
        assert_eq!(loaded.template_id, "notebook");
    }

    #[test]
    fn file_store_put_to_missing_session_fails() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        let err = store.put("absent", &session("x").slides).unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[test]
    fn file_store_rejects_path_shaped_tokens() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        for token in ["../escape", "a/b", "", "dot.dot"] {
            assert!(matches!(
                store.get(token),
                Err(SessionError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn file_store_corrupt_document_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("bad.json"), "not json").unwrap();
        let store = JsonFileStore::new(tmp.path());
        assert!(matches!(store.get("bad"), Err(SessionError::Json(_))));
    }

    // =========================================================================
    // MemoryStore
    // =========================================================================

    #[test]
    fn memory_store_put_and_get() {
        let store = MemoryStore::with_session(session("tok"));
        let mut slides = session("tok").slides;
        slides[1].content = "changed".to_string();
        store.put("tok", &slides).unwrap();
        assert_eq!(store.slides("tok").unwrap()[1].content, "changed");
    }

    #[test]
    fn memory_store_failure_mode() {
        let store = MemoryStore::with_session(session("tok"));
        store.set_fail_puts(true);
        assert!(store.put("tok", &session("tok").slides).is_err());
        store.set_fail_puts(false);
        assert!(store.put("tok", &session("tok").slides).is_ok());
    }

    // =========================================================================
    // SaveTracker — supersede rule
    // =========================================================================

    #[test]
    fn untouched_field_reads_saved() {
        let tracker = SaveTracker::new();
        assert_eq!(tracker.status(0, FieldKind::Title), SaveStatus::Saved);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn begin_marks_saving() {
        let mut tracker = SaveTracker::new();
        tracker.begin(0, FieldKind::Title);
        assert_eq!(tracker.status(0, FieldKind::Title), SaveStatus::Saving);
        assert!(tracker.is_dirty());
    }

    #[test]
    fn successful_completion_marks_saved() {
        let mut tracker = SaveTracker::new();
        let ticket = tracker.begin(0, FieldKind::Title);
        assert_eq!(tracker.complete(ticket, true), SaveOutcome::Applied);
        assert_eq!(tracker.status(0, FieldKind::Title), SaveStatus::Saved);
    }

    #[test]
    fn failed_completion_marks_unsaved() {
        let mut tracker = SaveTracker::new();
        let ticket = tracker.begin(0, FieldKind::Title);
        tracker.complete(ticket, false);
        assert_eq!(tracker.status(0, FieldKind::Title), SaveStatus::Unsaved);
        assert!(tracker.is_dirty());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut tracker = SaveTracker::new();
        let old = tracker.begin(0, FieldKind::Title);
        let new = tracker.begin(0, FieldKind::Title);

        // The newer save lands first…
        assert_eq!(tracker.complete(new, true), SaveOutcome::Applied);
        // …then the stale one arrives and must not downgrade the status.
        assert_eq!(tracker.complete(old, false), SaveOutcome::Superseded);
        assert_eq!(tracker.status(0, FieldKind::Title), SaveStatus::Saved);
    }

    #[test]
    fn fields_are_tracked_independently() {
        let mut tracker = SaveTracker::new();
        let title = tracker.begin(0, FieldKind::Title);
        tracker.begin(0, FieldKind::Content);

        tracker.complete(title, true);
        assert_eq!(tracker.status(0, FieldKind::Title), SaveStatus::Saved);
        assert_eq!(tracker.status(0, FieldKind::Content), SaveStatus::Saving);
        // A different slide's field is untouched.
        assert_eq!(tracker.status(3, FieldKind::Title), SaveStatus::Saved);
    }
}
