//! Display and input capabilities consumed by the swipe session

use crate::domain::{Card, CardId, Outcome, StackParams, Summary, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Accept,
    Reject,
}

impl From<Outcome> for OverlayKind {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Accept => OverlayKind::Accept,
            Outcome::Reject => OverlayKind::Reject,
        }
    }
}

/// Something that can show the card stack, overlays, progress and summary.
///
/// All distances are in pixels; a front end with another unit converts on
/// its side.
pub trait DisplaySurface {
    /// Width used to throw committed cards off screen
    fn viewport_width(&self) -> f64;

    fn render_card(&mut self, card: &Card);

    fn apply_transform(&mut self, card_id: CardId, transform: Transform);

    /// Marks a card as following the pointer
    fn set_moving(&mut self, card_id: CardId, moving: bool);

    fn set_stack_params(&mut self, card_id: CardId, params: StackParams);

    /// Takes a swiped card out of the stack; it no longer receives stack params
    fn remove_card(&mut self, card_id: CardId);

    fn set_overlay(&mut self, kind: OverlayKind, visible: bool);

    fn set_progress(&mut self, percent: f64, label: &str);

    /// Hides the deck and shows the summary
    fn show_summary(&mut self, summary: &Summary);
}

/// Input scoped to the topmost card
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved; deltas are measured from where the drag began
    DragMove { dx: f64, dy: f64 },
    /// Pointer released; `velocity_x` in px/ms
    DragEnd { dx: f64, dy: f64, velocity_x: f64 },
    /// Accept or reject button pressed
    Button(Outcome),
}
