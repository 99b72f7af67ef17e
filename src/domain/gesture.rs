//! Drag gesture interpretation for the topmost card
//!
//! The interpreter only turns pointer deltas into decisions. Applying them to
//! the deck and the display is the session's job.

use super::{CardId, Outcome, Transform};

/// Horizontal distance past which a released drag commits
pub const SWIPE_THRESHOLD_PX: f64 = 100.0;
/// Horizontal release velocity past which a drag commits, in input units (px/ms)
pub const VELOCITY_THRESHOLD: f64 = 0.4;
/// Tilt applied per pixel of horizontal displacement while dragging
pub const ROTATION_PER_PX: f64 = 0.05;
/// Tilt of a card leaving the screen
pub const EXIT_ROTATION_DEG: f64 = 30.0;
/// Exit distance as a multiple of the viewport width
pub const EXIT_DISTANCE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
}

/// Pointer interaction in progress on one card
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub card_id: CardId,
    pub dx: f64,
    pub dy: f64,
    pub velocity_x: f64,
    pub phase: GesturePhase,
}

/// Display update produced by a drag move
#[derive(Debug, Clone, PartialEq)]
pub struct DragFrame {
    pub card_id: CardId,
    /// True for the move that started the drag
    pub started: bool,
    pub transform: Transform,
    /// Which overlay to show; never both
    pub overlay: Outcome,
}

/// What a released drag amounts to
#[derive(Debug, Clone, PartialEq)]
pub enum GestureDecision {
    /// Snap back; the card stays active
    Cancelled { card_id: CardId },
    /// Swipe the card off screen
    Committed {
        card_id: CardId,
        outcome: Outcome,
        exit: Transform,
    },
}

impl GestureDecision {
    pub fn card_id(&self) -> CardId {
        match self {
            GestureDecision::Cancelled { card_id } => *card_id,
            GestureDecision::Committed { card_id, .. } => *card_id,
        }
    }
}

/// Transform while the card follows the pointer
pub fn drag_transform(dx: f64, dy: f64) -> Transform {
    Transform {
        translate_x: dx,
        translate_y: dy,
        rotate_deg: dx * ROTATION_PER_PX,
    }
}

/// Transform that throws the card fully off screen in the outcome's direction
pub fn exit_transform(outcome: Outcome, viewport_width: f64, translate_y: f64) -> Transform {
    let dir = outcome.direction();
    Transform {
        translate_x: dir * viewport_width * EXIT_DISTANCE_FACTOR,
        translate_y,
        rotate_deg: dir * EXIT_ROTATION_DEG,
    }
}

/// Whether a release at (dx, velocity_x) should commit
pub fn moved_enough(dx: f64, velocity_x: f64) -> bool {
    dx.abs() > SWIPE_THRESHOLD_PX || velocity_x.abs() > VELOCITY_THRESHOLD
}

#[derive(Debug, Default)]
pub struct GestureInterpreter {
    state: Option<GestureState>,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        self.state
            .as_ref()
            .map_or(GesturePhase::Idle, |state| state.phase)
    }

    /// Feeds a drag move with deltas measured from the gesture origin.
    ///
    /// Moves without horizontal motion are filtered out. The first nonzero
    /// move binds the gesture to `topmost`.
    pub fn on_drag_move(&mut self, topmost: Option<CardId>, dx: f64, dy: f64) -> Option<DragFrame> {
        if dx == 0.0 {
            return None;
        }

        let started = self.state.is_none();
        if started {
            let card_id = topmost?;
            tracing::debug!(card = card_id, "drag started");
            self.state = Some(GestureState {
                card_id,
                dx: 0.0,
                dy: 0.0,
                velocity_x: 0.0,
                phase: GesturePhase::Dragging,
            });
        }

        let state = self.state.as_mut()?;
        state.dx = dx;
        state.dy = dy;

        Some(DragFrame {
            card_id: state.card_id,
            started,
            transform: drag_transform(dx, dy),
            overlay: Outcome::from_dx(dx),
        })
    }

    /// Ends the gesture and decides between snapping back and committing.
    ///
    /// A release without any prior horizontal move still applies to `topmost`,
    /// so a fast flick is judged on its velocity alone.
    pub fn on_drag_end(
        &mut self,
        topmost: Option<CardId>,
        dx: f64,
        dy: f64,
        velocity_x: f64,
        viewport_width: f64,
    ) -> Option<GestureDecision> {
        let mut state = match self.state.take() {
            Some(state) => state,
            None => GestureState {
                card_id: topmost?,
                dx: 0.0,
                dy: 0.0,
                velocity_x: 0.0,
                phase: GesturePhase::Idle,
            },
        };
        state.dx = dx;
        state.dy = dy;
        state.velocity_x = velocity_x;

        if !moved_enough(state.dx, state.velocity_x) {
            tracing::debug!(card = state.card_id, dx, velocity_x, "drag cancelled");
            return Some(GestureDecision::Cancelled {
                card_id: state.card_id,
            });
        }

        let outcome = Outcome::from_dx(state.dx);
        Some(GestureDecision::Committed {
            card_id: state.card_id,
            outcome,
            exit: exit_transform(outcome, viewport_width, state.dy),
        })
    }

    /// Drops any gesture in progress.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: f64 = 800.0;

    #[test]
    fn test_zero_horizontal_move_is_ignored() {
        let mut gesture = GestureInterpreter::new();

        assert!(gesture.on_drag_move(Some(0), 0.0, 25.0).is_none());
        assert_eq!(gesture.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_first_move_starts_drag() {
        let mut gesture = GestureInterpreter::new();

        let frame = gesture.on_drag_move(Some(4), 20.0, 5.0).unwrap();
        assert!(frame.started);
        assert_eq!(frame.card_id, 4);
        assert_eq!(frame.overlay, Outcome::Accept);
        assert_eq!(gesture.phase(), GesturePhase::Dragging);

        let frame = gesture.on_drag_move(Some(4), -40.0, 5.0).unwrap();
        assert!(!frame.started);
        assert_eq!(frame.overlay, Outcome::Reject);
    }

    #[test]
    fn test_drag_transform_rotation() {
        let transform = drag_transform(60.0, -10.0);
        assert_eq!(transform.translate_x, 60.0);
        assert_eq!(transform.translate_y, -10.0);
        assert!((transform.rotate_deg - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_topmost_no_drag() {
        let mut gesture = GestureInterpreter::new();
        assert!(gesture.on_drag_move(None, 30.0, 0.0).is_none());
        assert!(gesture.on_drag_end(None, 300.0, 0.0, 0.0, VIEWPORT).is_none());
    }

    #[test]
    fn test_short_slow_release_cancels() {
        let mut gesture = GestureInterpreter::new();
        gesture.on_drag_move(Some(0), 100.0, 0.0);

        let decision = gesture.on_drag_end(Some(0), 100.0, 0.0, 0.4, VIEWPORT);
        assert_eq!(decision, Some(GestureDecision::Cancelled { card_id: 0 }));
        assert_eq!(gesture.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_distance_commits() {
        let mut gesture = GestureInterpreter::new();
        gesture.on_drag_move(Some(2), 101.0, 0.0);

        match gesture.on_drag_end(Some(2), 101.0, 12.0, 0.0, VIEWPORT) {
            Some(GestureDecision::Committed {
                card_id,
                outcome,
                exit,
            }) => {
                assert_eq!(card_id, 2);
                assert_eq!(outcome, Outcome::Accept);
                assert_eq!(exit.translate_x, 1200.0);
                assert_eq!(exit.translate_y, 12.0);
                assert_eq!(exit.rotate_deg, 30.0);
            }
            other => panic!("expected commit, got {:?}", other),
        }
    }

    #[test]
    fn test_velocity_commits_left() {
        let mut gesture = GestureInterpreter::new();
        gesture.on_drag_move(Some(0), -10.0, 0.0);

        match gesture.on_drag_end(Some(0), -10.0, 0.0, -0.9, VIEWPORT) {
            Some(GestureDecision::Committed { outcome, exit, .. }) => {
                assert_eq!(outcome, Outcome::Reject);
                assert_eq!(exit.translate_x, -1200.0);
                assert_eq!(exit.rotate_deg, -30.0);
            }
            other => panic!("expected commit, got {:?}", other),
        }
    }

    #[test]
    fn test_release_keeps_bound_card() {
        let mut gesture = GestureInterpreter::new();
        gesture.on_drag_move(Some(1), 50.0, 0.0);

        let decision = gesture.on_drag_end(Some(2), 150.0, 0.0, 0.0, VIEWPORT).unwrap();
        assert_eq!(decision.card_id(), 1);
    }

    #[test]
    fn test_flick_without_move_uses_topmost() {
        let mut gesture = GestureInterpreter::new();

        let decision = gesture.on_drag_end(Some(3), 0.0, 0.0, 1.2, VIEWPORT).unwrap();
        assert!(matches!(
            decision,
            GestureDecision::Committed {
                card_id: 3,
                outcome: Outcome::Reject,
                ..
            }
        ));
    }

    #[test]
    fn test_moved_enough_boundaries() {
        assert!(!moved_enough(100.0, 0.0));
        assert!(!moved_enough(-100.0, -0.4));
        assert!(moved_enough(100.5, 0.0));
        assert!(moved_enough(0.0, 0.41));
    }
}
