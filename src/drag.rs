//! Drag state machine for repositioning fields.
//!
//! One controller per editing session, owning a single explicit state
//! value — `Idle` or `Dragging` — so at most one drag is active across all
//! slides (only the active slide's surface accepts pointer-down in the
//! first place). Pointer deltas arrive in surface pixels and are converted
//! to normalized percentage deltas against the canvas dimensions.
//!
//! Moves are optimistic: [`DragController::position_at`] feeds the live
//! surface without committing anything. Only pointer-up produces a
//! [`DragCommit`], which the caller writes through the override model and
//! saves. Releasing the pointer always commits; there is no cancel
//! gesture.

use crate::geometry::drag_delta_percent;
use crate::overrides::ClampRange;
use crate::types::{CanvasFormat, FieldKind, Position};

/// Start position used when a field has never been positioned explicitly.
const UNSET_START: Position = Position { x: 50.0, y: 50.0 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        field: FieldKind,
        /// Pointer location at drag start, surface pixels.
        start_pointer: (f64, f64),
        /// Field position at drag start, normalized.
        start_position: Position,
    },
}

/// The result of releasing a drag: where the field ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragCommit {
    pub field: FieldKind,
    pub position: Position,
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self { state: DragState::Idle }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Enter `Dragging` from `Idle`. Returns `false` (and changes nothing)
    /// if a drag is already active. A field with no explicit position
    /// starts from the 50/50 center.
    pub fn begin(
        &mut self,
        field: FieldKind,
        pointer: (f64, f64),
        explicit_position: Option<Position>,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging {
            field,
            start_pointer: pointer,
            start_position: explicit_position.unwrap_or(UNSET_START),
        };
        true
    }

    /// The live, clamped position for the current pointer location.
    /// `None` when idle. Does not mutate any state — rapid moves update
    /// the surface only, never persistence.
    pub fn position_at(
        &self,
        pointer: (f64, f64),
        scale: f64,
        format: CanvasFormat,
    ) -> Option<(FieldKind, Position)> {
        let DragState::Dragging { field, start_pointer, start_position } = self.state else {
            return None;
        };
        let dx = drag_delta_percent(pointer.0 - start_pointer.0, scale, format.width());
        let dy = drag_delta_percent(pointer.1 - start_pointer.1, scale, format.height());
        let position = ClampRange::Interactive
            .apply(Position::new(start_position.x + dx, start_position.y + dy));
        Some((field, position))
    }

    /// Release the pointer: return to `Idle` and report the final
    /// position for the caller to commit.
    pub fn finish(
        &mut self,
        pointer: (f64, f64),
        scale: f64,
        format: CanvasFormat,
    ) -> Option<DragCommit> {
        let commit = self
            .position_at(pointer, scale, format)
            .map(|(field, position)| DragCommit { field, position });
        self.state = DragState::Idle;
        commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // State transitions
    // =========================================================================

    #[test]
    fn begins_idle() {
        let drag = DragController::new();
        assert_eq!(drag.state(), DragState::Idle);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn pointer_down_enters_dragging() {
        let mut drag = DragController::new();
        assert!(drag.begin(FieldKind::Title, (100.0, 100.0), Some(Position::new(50.0, 35.0))));
        assert!(drag.is_dragging());
    }

    #[test]
    fn second_drag_refused_while_active() {
        let mut drag = DragController::new();
        assert!(drag.begin(FieldKind::Title, (100.0, 100.0), None));
        assert!(!drag.begin(FieldKind::Content, (200.0, 200.0), None));
        // The original drag is untouched.
        match drag.state() {
            DragState::Dragging { field, .. } => assert_eq!(field, FieldKind::Title),
            DragState::Idle => panic!("drag was dropped"),
        }
    }

    #[test]
    fn release_returns_to_idle() {
        let mut drag = DragController::new();
        drag.begin(FieldKind::Title, (0.0, 0.0), None);
        drag.finish((0.0, 0.0), 1.0, CanvasFormat::Square);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn finish_while_idle_is_none() {
        let mut drag = DragController::new();
        assert_eq!(drag.finish((10.0, 10.0), 1.0, CanvasFormat::Square), None);
    }

    // =========================================================================
    // Delta math (drag round-trip property)
    // =========================================================================

    #[test]
    fn full_scale_square_round_trip() {
        // (dx, dy) = (108, -54) at scale 1 on 1080×1080 → (+10%, -5%).
        let mut drag = DragController::new();
        drag.begin(FieldKind::Title, (500.0, 500.0), Some(Position::new(50.0, 35.0)));
        let commit = drag.finish((608.0, 446.0), 1.0, CanvasFormat::Square).unwrap();
        assert_eq!(commit.position, Position::new(60.0, 30.0));
    }

    #[test]
    fn scaled_portrait_round_trip() {
        // Preview at 0.4 on 1080×1350: 43.2 px right is 10% of width,
        // 54 px down is 10% of height.
        let mut drag = DragController::new();
        drag.begin(FieldKind::Content, (100.0, 100.0), Some(Position::new(50.0, 60.0)));
        let commit = drag
            .finish((143.2, 154.0), 0.4, CanvasFormat::Portrait)
            .unwrap();
        assert!((commit.position.x - 60.0).abs() < 1e-9);
        assert!((commit.position.y - 70.0).abs() < 1e-9);
    }

    #[test]
    fn moves_are_clamped_to_margin() {
        let mut drag = DragController::new();
        drag.begin(FieldKind::Title, (0.0, 0.0), Some(Position::new(50.0, 50.0)));
        let (_, live) = drag
            .position_at((10_000.0, -10_000.0), 1.0, CanvasFormat::Square)
            .unwrap();
        assert_eq!(live, Position::new(90.0, 10.0));
    }

    #[test]
    fn unset_position_starts_from_center() {
        let mut drag = DragController::new();
        drag.begin(FieldKind::Title, (0.0, 0.0), None);
        let (_, live) = drag.position_at((0.0, 0.0), 1.0, CanvasFormat::Square).unwrap();
        assert_eq!(live, Position::new(50.0, 50.0));
    }

    #[test]
    fn moves_do_not_accumulate() {
        // Every move is computed from the drag start, not the previous
        // move, so replaying the same pointer location is idempotent.
        let mut drag = DragController::new();
        drag.begin(FieldKind::Title, (0.0, 0.0), Some(Position::new(50.0, 50.0)));
        let a = drag.position_at((54.0, 0.0), 1.0, CanvasFormat::Square).unwrap();
        let b = drag.position_at((54.0, 0.0), 1.0, CanvasFormat::Square).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn position_at_while_idle_is_none() {
        let drag = DragController::new();
        assert_eq!(drag.position_at((5.0, 5.0), 1.0, CanvasFormat::Square), None);
    }
}
