//! Swipe session controller
//!
//! Owns the deck, accepted list, gesture state and deferred actions for one
//! round, and pushes every visible change to a [`DisplaySurface`]. Each method
//! runs to completion; callers feed it input events and clock ticks from a
//! single event loop.

use crate::domain::gesture::{exit_transform, GestureDecision};
use crate::domain::{
    AcceptedList, CardId, CompletionDetector, Deck, GestureInterpreter, Outcome, Progress,
    Summary, Transform,
};
use crate::error::{Result, SwipeError};
use crate::provider::FetchedImage;
use crate::scheduler::{DeferredAction, Scheduler, RESTACK_DELAY, SUMMARY_DELAY};
use crate::surface::{DisplaySurface, InputEvent, OverlayKind};
use std::time::Duration;

/// Vertical offset of a card thrown off screen by a button
pub const BUTTON_EXIT_OFFSET_Y: f64 = -100.0;

pub struct SwipeSession<D: DisplaySurface> {
    display: D,
    deck: Deck,
    accepted: AcceptedList,
    gesture: GestureInterpreter,
    scheduler: Scheduler,
    completion: CompletionDetector,
    summary: Option<Summary>,
}

impl<D: DisplaySurface> SwipeSession<D> {
    /// Starts a round over `images` and draws the initial stack.
    pub fn new(display: D, images: Vec<FetchedImage>) -> Self {
        let mut session = Self {
            display,
            deck: Deck::default(),
            accepted: AcceptedList::new(),
            gesture: GestureInterpreter::new(),
            scheduler: Scheduler::new(),
            completion: CompletionDetector::new(),
            summary: None,
        };
        session.reset(images);
        session
    }

    /// Discards the current round and starts a fresh one.
    pub fn reset(&mut self, images: Vec<FetchedImage>) {
        self.deck = Deck::populate(images);
        self.accepted.clear();
        self.gesture.reset();
        self.scheduler.clear();
        self.completion.reset();
        self.summary = None;

        for card in self.deck.cards() {
            self.display.render_card(card);
        }
        self.restack();
        self.push_progress();
        self.completion.observe(self.deck.count_active());

        tracing::info!(cards = self.deck.len(), "swipe session started");
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn accepted(&self) -> &AcceptedList {
        &self.accepted
    }

    pub fn progress(&self) -> Progress {
        Progress::of(&self.deck)
    }

    /// The summary, once it has been shown
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Time of the next deferred action, if any is pending
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Routes one input event. Invalid-state errors are logged and returned;
    /// the session state is unchanged when one occurs.
    pub fn handle(&mut self, event: InputEvent, now: Duration) -> Result<()> {
        tracing::trace!(?event, "input");
        match event {
            InputEvent::DragMove { dx, dy } => {
                self.drag_move(dx, dy);
                Ok(())
            }
            InputEvent::DragEnd { dx, dy, velocity_x } => {
                self.drag_end(dx, dy, velocity_x, now).map(|_| ())
            }
            InputEvent::Button(outcome) => self.swipe(outcome, now).map(|_| ()),
        }
    }

    /// Follows the pointer with the topmost card.
    pub fn drag_move(&mut self, dx: f64, dy: f64) {
        let topmost = self.deck.topmost().map(|card| card.id);
        let Some(frame) = self.gesture.on_drag_move(topmost, dx, dy) else {
            return;
        };

        if !self.is_active(frame.card_id) {
            return;
        }

        if frame.started {
            self.display.set_moving(frame.card_id, true);
        }
        let shown = OverlayKind::from(frame.overlay);
        let hidden = match shown {
            OverlayKind::Accept => OverlayKind::Reject,
            OverlayKind::Reject => OverlayKind::Accept,
        };
        self.display.set_overlay(hidden, false);
        self.display.set_overlay(shown, true);
        self.display.apply_transform(frame.card_id, frame.transform);
    }

    /// Releases the pointer. Returns the outcome if the card was committed.
    pub fn drag_end(
        &mut self,
        dx: f64,
        dy: f64,
        velocity_x: f64,
        now: Duration,
    ) -> Result<Option<Outcome>> {
        let topmost = self.deck.topmost().map(|card| card.id);
        let viewport_width = self.display.viewport_width();
        let decision = self
            .gesture
            .on_drag_end(topmost, dx, dy, velocity_x, viewport_width);

        self.display.set_overlay(OverlayKind::Accept, false);
        self.display.set_overlay(OverlayKind::Reject, false);

        let Some(decision) = decision else {
            return Ok(None);
        };
        self.display.set_moving(decision.card_id(), false);

        match decision {
            GestureDecision::Cancelled { card_id } => {
                if self.is_active(card_id) {
                    self.display.apply_transform(card_id, Transform::NEUTRAL);
                }
                Ok(None)
            }
            GestureDecision::Committed {
                card_id,
                outcome,
                exit,
            } => {
                self.commit(card_id, outcome, exit, now)?;
                Ok(Some(outcome))
            }
        }
    }

    /// Commits the topmost card without a gesture. Returns the swiped card,
    /// or `None` when the deck is exhausted.
    pub fn swipe(&mut self, outcome: Outcome, now: Duration) -> Result<Option<CardId>> {
        let Some(card_id) = self.deck.topmost().map(|card| card.id) else {
            return Ok(None);
        };

        let exit = exit_transform(
            outcome,
            self.display.viewport_width(),
            BUTTON_EXIT_OFFSET_Y,
        );
        self.commit(card_id, outcome, exit, now)?;
        Ok(Some(card_id))
    }

    /// Resolves a specific card, failing unless it is the topmost active one.
    pub fn resolve(&mut self, card_id: CardId, outcome: Outcome, now: Duration) -> Result<()> {
        if self.deck.topmost().is_none() {
            let err = SwipeError::NoActiveCard;
            tracing::warn!(error = %err, card = card_id, ?outcome, "commit rejected");
            return Err(err);
        }
        let exit = exit_transform(outcome, self.display.viewport_width(), 0.0);
        self.commit(card_id, outcome, exit, now)
    }

    /// Runs every deferred action due at `now`.
    pub fn tick(&mut self, now: Duration) {
        for action in self.scheduler.take_due(now) {
            match action {
                DeferredAction::Restack => self.restack(),
                DeferredAction::ShowSummary => self.show_summary(),
            }
        }
    }

    fn commit(
        &mut self,
        card_id: CardId,
        outcome: Outcome,
        exit: Transform,
        now: Duration,
    ) -> Result<()> {
        let image_ref = self
            .deck
            .resolve(card_id, outcome)
            .inspect_err(|e| {
                tracing::warn!(error = %e, card = card_id, ?outcome, "commit rejected")
            })?
            .image_ref
            .clone();
        self.display.apply_transform(card_id, exit);
        self.display.remove_card(card_id);

        if outcome == Outcome::Accept && !self.accepted.push(&image_ref) {
            tracing::debug!(card = card_id, %image_ref, "image already accepted");
        }
        tracing::info!(card = card_id, ?outcome, "card committed");

        self.push_progress();
        self.scheduler.schedule(now, RESTACK_DELAY, DeferredAction::Restack);

        if self.completion.observe(self.deck.count_active()) {
            tracing::info!(accepted = self.accepted.len(), "deck exhausted");
            self.scheduler
                .schedule(now, SUMMARY_DELAY, DeferredAction::ShowSummary);
        }

        Ok(())
    }

    fn is_active(&self, card_id: CardId) -> bool {
        self.deck.get(card_id).is_some_and(|card| card.is_active())
    }

    fn restack(&mut self) {
        for (card_id, params) in self.deck.restack() {
            self.display.set_stack_params(card_id, params);
        }
    }

    fn push_progress(&mut self) {
        let progress = Progress::of(&self.deck);
        self.display.set_progress(progress.percent, progress.label);
    }

    fn show_summary(&mut self) {
        if self.summary.is_some() {
            return;
        }

        let summary = Summary::build(&self.accepted, self.deck.len());
        self.display.show_summary(&summary);
        self.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::progress::{COMPLETE_LABEL, START_LABEL};
    use crate::domain::{Card, StackParams};
    use std::collections::{HashMap, HashSet};

    const VIEWPORT: f64 = 400.0;

    #[derive(Debug, Default)]
    struct RecordingDisplay {
        rendered: Vec<CardId>,
        transforms: HashMap<CardId, Transform>,
        stack: HashMap<CardId, StackParams>,
        removed: Vec<CardId>,
        moving: HashSet<CardId>,
        overlays: HashSet<OverlayKind>,
        progress: Vec<(f64, String)>,
        summaries: Vec<Summary>,
    }

    impl DisplaySurface for RecordingDisplay {
        fn viewport_width(&self) -> f64 {
            VIEWPORT
        }

        fn render_card(&mut self, card: &Card) {
            self.rendered.push(card.id);
        }

        fn apply_transform(&mut self, card_id: CardId, transform: Transform) {
            self.transforms.insert(card_id, transform);
        }

        fn set_moving(&mut self, card_id: CardId, moving: bool) {
            if moving {
                self.moving.insert(card_id);
            } else {
                self.moving.remove(&card_id);
            }
        }

        fn set_stack_params(&mut self, card_id: CardId, params: StackParams) {
            self.stack.insert(card_id, params);
        }

        fn remove_card(&mut self, card_id: CardId) {
            self.stack.remove(&card_id);
            self.removed.push(card_id);
        }

        fn set_overlay(&mut self, kind: OverlayKind, visible: bool) {
            if visible {
                self.overlays.insert(kind);
            } else {
                self.overlays.remove(&kind);
            }
        }

        fn set_progress(&mut self, percent: f64, label: &str) {
            self.progress.push((percent, label.to_string()));
        }

        fn show_summary(&mut self, summary: &Summary) {
            self.summaries.push(summary.clone());
        }
    }

    fn images(n: usize) -> Vec<FetchedImage> {
        (0..n)
            .map(|id| FetchedImage {
                id,
                image_ref: format!("ref{}", id),
            })
            .collect()
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn session(n: usize) -> SwipeSession<RecordingDisplay> {
        SwipeSession::new(RecordingDisplay::default(), images(n))
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_start_renders_and_stacks() {
            let session = session(4);
            let display = session.display();

            assert_eq!(display.rendered, vec![0, 1, 2, 3]);
            assert_eq!(display.stack.len(), 4);
            assert_eq!(display.stack[&0].z_index, 4);
            assert_eq!(display.progress.last().unwrap(), &(0.0, START_LABEL.to_string()));
            assert_eq!(session.deck().count_active(), 4);
        }

        #[test]
        fn test_reset_starts_new_round() {
            let mut session = session(2);
            session.swipe(Outcome::Accept, ms(0)).unwrap();
            session.swipe(Outcome::Accept, ms(0)).unwrap();
            session.tick(ms(1000));
            assert!(session.is_finished());

            session.reset(images(3));

            assert!(!session.is_finished());
            assert!(session.accepted().is_empty());
            assert_eq!(session.deck().count_active(), 3);
            assert!(session.next_deadline().is_none());
        }
    }

    mod gesture_tests {
        use super::*;

        #[test]
        fn test_drag_shows_overlay_and_tilts() {
            let mut session = session(3);

            session.drag_move(0.0, 10.0);
            assert!(session.display().moving.is_empty());

            session.drag_move(40.0, 10.0);
            let display = session.display();
            assert!(display.moving.contains(&0));
            assert!(display.overlays.contains(&OverlayKind::Accept));
            assert!(!display.overlays.contains(&OverlayKind::Reject));
            assert!((display.transforms[&0].rotate_deg - 2.0).abs() < 1e-9);

            session.drag_move(-20.0, 10.0);
            let display = session.display();
            assert!(display.overlays.contains(&OverlayKind::Reject));
            assert!(!display.overlays.contains(&OverlayKind::Accept));
        }

        #[test]
        fn test_small_drag_snaps_back() {
            let mut session = session(3);
            session.drag_move(80.0, 5.0);

            let outcome = session.drag_end(80.0, 5.0, 0.3, ms(0)).unwrap();

            assert!(outcome.is_none());
            let display = session.display();
            assert_eq!(display.transforms[&0], Transform::NEUTRAL);
            assert!(display.overlays.is_empty());
            assert!(display.moving.is_empty());
            assert_eq!(session.deck().count_active(), 3);
            assert!(session.next_deadline().is_none());
        }

        #[test]
        fn test_far_drag_accepts() {
            let mut session = session(3);
            session.drag_move(150.0, 20.0);

            let outcome = session.drag_end(150.0, 20.0, 0.1, ms(0)).unwrap();

            assert_eq!(outcome, Some(Outcome::Accept));
            assert_eq!(session.deck().count_active(), 2);
            assert_eq!(session.accepted().as_slice(), &["ref0".to_string()]);
            let exit = session.display().transforms[&0];
            assert_eq!(exit.translate_x, 600.0);
            assert_eq!(exit.translate_y, 20.0);
            assert_eq!(exit.rotate_deg, 30.0);
            assert!(session.display().overlays.is_empty());
        }

        #[test]
        fn test_fast_flick_rejects() {
            let mut session = session(3);
            session.drag_move(-30.0, 0.0);

            let outcome = session.drag_end(-30.0, 0.0, -0.8, ms(0)).unwrap();

            assert_eq!(outcome, Some(Outcome::Reject));
            assert!(session.accepted().is_empty());
            assert_eq!(session.deck().topmost().unwrap().id, 1);
        }

        #[test]
        fn test_restack_is_deferred() {
            let mut session = session(3);
            session.drag_end(200.0, 0.0, 0.0, ms(1000)).unwrap();

            assert_eq!(session.display().stack[&1].z_index, 2);
            session.tick(ms(1299));
            assert_eq!(session.display().stack[&1].z_index, 2);

            session.tick(ms(1300));
            assert_eq!(session.display().stack[&1].z_index, 3);
            assert_eq!(session.display().stack[&1].opacity, 1.0);
        }
    }

    mod button_tests {
        use super::*;
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[test]
        fn test_button_swipe_exit_transform() {
            let mut session = session(2);

            let swiped = session.swipe(Outcome::Reject, ms(0)).unwrap();

            assert_eq!(swiped, Some(0));
            let exit = session.display().transforms[&0];
            assert_eq!(exit.translate_x, -600.0);
            assert_eq!(exit.translate_y, BUTTON_EXIT_OFFSET_Y);
            assert_eq!(exit.rotate_deg, -30.0);
            assert_eq!(session.display().removed, vec![0]);
            assert!(!session.display().stack.contains_key(&0));

            session.tick(ms(300));
            assert!(!session.display().stack.contains_key(&0));
            assert_eq!(session.display().stack[&1].z_index, 2);
        }

        #[test]
        fn test_button_on_empty_deck_is_noop() {
            let mut session = session(1);
            session.swipe(Outcome::Accept, ms(0)).unwrap();

            assert_eq!(session.swipe(Outcome::Accept, ms(0)).unwrap(), None);
            assert_eq!(session.accepted().len(), 1);
        }

        #[test]
        fn test_button_during_drag_wins_once() {
            let mut session = session(3);
            session.drag_move(60.0, 0.0);
            session.swipe(Outcome::Accept, ms(0)).unwrap();

            // The release still belongs to card 0, which is already gone.
            session.drag_move(140.0, 0.0);
            let err = session
                .handle(
                    InputEvent::DragEnd {
                        dx: 160.0,
                        dy: 0.0,
                        velocity_x: 0.0,
                    },
                    ms(10),
                )
                .unwrap_err();

            assert!(matches!(err, SwipeError::AlreadyResolved(0)));
            assert_eq!(session.deck().count_active(), 2);
            assert_eq!(session.accepted().len(), 1);
            assert!(session.deck().get(1).unwrap().is_active());
        }

        #[derive(Clone, Default)]
        struct LogBuffer(Arc<Mutex<Vec<u8>>>);

        impl Write for LogBuffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        #[test]
        fn test_rejected_commits_are_logged_without_handle() {
            let logs = LogBuffer::default();
            let writer = logs.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::WARN)
                .finish();

            tracing::subscriber::with_default(subscriber, || {
                let mut session = session(3);
                assert!(session.resolve(2, Outcome::Accept, ms(0)).is_err());

                session.drag_move(60.0, 0.0);
                session.swipe(Outcome::Reject, ms(0)).unwrap();
                assert!(session.drag_end(160.0, 0.0, 0.0, ms(5)).is_err());
            });

            let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
            assert_eq!(text.matches("commit rejected").count(), 2);
            assert!(text.contains("WARN"));
            assert!(text.contains("not the topmost card"));
            assert!(text.contains("already been resolved"));
        }

        #[test]
        fn test_resolve_out_of_turn() {
            let mut session = session(3);
            let err = session.resolve(2, Outcome::Accept, ms(0)).unwrap_err();

            assert!(err.is_invalid_state());
            assert_eq!(session.deck().count_active(), 3);
        }
    }

    mod completion_tests {
        use super::*;

        #[test]
        fn test_accept_even_cards_summary() {
            let mut session = session(10);
            for id in 0..10 {
                let outcome = if matches!(id, 0 | 2 | 4) {
                    Outcome::Accept
                } else {
                    Outcome::Reject
                };
                session
                    .handle(InputEvent::Button(outcome), ms(id * 100))
                    .unwrap();
                assert_eq!(
                    session.progress().swiped + session.deck().count_active(),
                    10
                );
            }

            assert!(session.summary().is_none());
            session.tick(ms(900 + 599));
            assert!(session.summary().is_none());
            session.tick(ms(900 + 600));

            let summary = session.summary().unwrap();
            assert_eq!(summary.accepted_count, 3);
            assert_eq!(summary.total, 10);
            assert_eq!(summary.accepted_refs, vec!["ref0", "ref2", "ref4"]);
            assert_eq!(
                session.display().progress.last().unwrap(),
                &(100.0, COMPLETE_LABEL.to_string())
            );
        }

        #[test]
        fn test_shared_fallback_dedup() {
            let shared = (0..3)
                .map(|id| FetchedImage {
                    id,
                    image_ref: "https://cataas.com/cat".to_string(),
                })
                .collect();
            let mut session = SwipeSession::new(RecordingDisplay::default(), shared);

            for _ in 0..3 {
                session.swipe(Outcome::Accept, ms(0)).unwrap();
            }
            session.tick(ms(600));

            let summary = session.summary().unwrap();
            assert_eq!(summary.accepted_count, 1);
            assert_eq!(summary.accepted_refs.len(), 1);
        }

        #[test]
        fn test_shared_ref_dedup_by_drag() {
            let shared = (0..2)
                .map(|id| FetchedImage {
                    id,
                    image_ref: "https://cataas.com/cat".to_string(),
                })
                .collect();
            let mut session = SwipeSession::new(RecordingDisplay::default(), shared);

            for remaining in [1, 0] {
                session.drag_move(150.0, 0.0);
                let outcome = session.drag_end(150.0, 0.0, 0.0, ms(0)).unwrap();

                assert_eq!(outcome, Some(Outcome::Accept));
                assert_eq!(session.deck().count_active(), remaining);
                assert_eq!(session.accepted().len(), 1);
            }

            session.tick(ms(600));
            assert_eq!(
                session.summary().unwrap().accepted_refs,
                vec!["https://cataas.com/cat"]
            );
        }

        #[test]
        fn test_summary_shown_once() {
            let mut session = session(2);
            session.swipe(Outcome::Accept, ms(0)).unwrap();
            session.swipe(Outcome::Accept, ms(0)).unwrap();

            // Further input after exhaustion changes nothing.
            assert_eq!(session.swipe(Outcome::Reject, ms(5)).unwrap(), None);
            assert!(session.resolve(1, Outcome::Reject, ms(5)).is_err());
            session.drag_end(300.0, 0.0, 0.0, ms(5)).unwrap();

            session.tick(ms(700));
            session.tick(ms(5000));
            assert_eq!(session.display().summaries.len(), 1);
            assert_eq!(session.summary().unwrap().accepted_count, 2);
        }

        #[test]
        fn test_progress_labels_during_round() {
            let mut session = session(10);
            for _ in 0..5 {
                session.swipe(Outcome::Reject, ms(0)).unwrap();
            }

            let progress = session.progress();
            assert_eq!(progress.swiped, 5);
            assert_eq!(progress.percent, 50.0);
            assert_eq!(progress.label, "So many cuties!");
        }
    }
}
