use super::{PX_PER_COL, PX_PER_ROW};
use crate::domain::Outcome;
use crate::surface::InputEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::{Duration, Instant};

/// A release this long after the last drag sample counts as a stopped pointer
const VELOCITY_STALE_AFTER: Duration = Duration::from_millis(100);

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Accept button
    Accept,
    /// Reject button
    Reject,
    /// Start a new round from the summary screen
    Restart,
    /// No action
    None,
}

impl KeyAction {
    /// Input event for the button actions
    pub fn as_input(&self) -> Option<InputEvent> {
        match self {
            KeyAction::Accept => Some(InputEvent::Button(Outcome::Accept)),
            KeyAction::Reject => Some(InputEvent::Button(Outcome::Reject)),
            _ => None,
        }
    }
}

/// Maps keyboard events to actions while the deck is shown
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Accept: Right arrow or l
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Accept,
        (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::Accept,

        // Reject: Left arrow or h
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::Reject,
        (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::Reject,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events on the summary screen: r restarts, anything else quits
pub fn handle_summary_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Restart,
        _ => KeyAction::Quit,
    }
}

/// Turns left-button mouse drags into drag events in pixels
#[derive(Debug, Default)]
pub struct PointerTracker {
    origin: Option<(u16, u16)>,
    /// Horizontal delta and time of the last drag sample
    last_sample: Option<(f64, Instant)>,
    velocity_x: f64,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, at: Instant) -> Option<InputEvent> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some((event.column, event.row));
                self.last_sample = Some((0.0, at));
                self.velocity_x = 0.0;
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let (dx, dy) = self.delta(event)?;
                if let Some((last_dx, last_at)) = self.last_sample {
                    let elapsed_ms =
                        at.saturating_duration_since(last_at).as_micros() as f64 / 1000.0;
                    if elapsed_ms > 0.0 {
                        self.velocity_x = (dx - last_dx) / elapsed_ms;
                    }
                }
                self.last_sample = Some((dx, at));
                Some(InputEvent::DragMove { dx, dy })
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (dx, dy) = self.delta(event)?;
                let stale = self
                    .last_sample
                    .map_or(true, |(_, last_at)| {
                        at.saturating_duration_since(last_at) > VELOCITY_STALE_AFTER
                    });
                let velocity_x = if stale { 0.0 } else { self.velocity_x };

                *self = Self::default();
                Some(InputEvent::DragEnd { dx, dy, velocity_x })
            }
            _ => None,
        }
    }

    fn delta(&self, event: MouseEvent) -> Option<(f64, f64)> {
        let (col, row) = self.origin?;
        let dx = (f64::from(event.column) - f64::from(col)) * PX_PER_COL;
        let dy = (f64::from(event.row) - f64::from(row)) * PX_PER_ROW;
        Some((dx, dy))
    }
}
