pub mod completion;
pub mod gesture;
pub mod progress;

pub use completion::{CompletionDetector, Summary};
pub use gesture::{GestureDecision, GestureInterpreter, GesturePhase, GestureState};
pub use progress::Progress;

use crate::error::{Result, SwipeError};
use crate::provider::FetchedImage;

/// Stable card identifier, equal to the card's fetch index.
pub type CardId = usize;

/// Lower bound for the opacity of the deepest stacked card
pub const MIN_STACK_OPACITY: f64 = 0.1;
/// Lower bound for the scale of the deepest stacked card
pub const MIN_STACK_SCALE: f64 = 0.05;
/// Vertical offset between two stacked cards, in pixels
pub const STACK_OFFSET_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Active,
    Removed,
}

/// Result of committing a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    Reject,
}

impl Outcome {
    /// Horizontal exit direction: +1 for accept, -1 for reject.
    pub fn direction(self) -> f64 {
        match self {
            Outcome::Accept => 1.0,
            Outcome::Reject => -1.0,
        }
    }

    /// Outcome implied by the sign of a horizontal delta. Zero counts as reject.
    pub fn from_dx(dx: f64) -> Self {
        if dx > 0.0 {
            Outcome::Accept
        } else {
            Outcome::Reject
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub image_ref: String,
    pub title: String,
    pub state: CardState,
}

impl Card {
    fn new(id: CardId, image_ref: String) -> Self {
        Self {
            id,
            image_ref,
            title: format!("Kitty #{}", id + 1),
            state: CardState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == CardState::Active
    }
}

/// Translation and rotation applied to a single card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotate_deg: f64,
}

impl Transform {
    pub const NEUTRAL: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        rotate_deg: 0.0,
    };
}

/// Visual stacking parameters for an active card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackParams {
    pub z_index: usize,
    pub scale: f64,
    pub translate_y: f64,
    pub opacity: f64,
}

impl StackParams {
    /// Parameters for the card at `depth` (0 = topmost) in a deck of `total` cards.
    pub fn at_depth(depth: usize, total: usize) -> Self {
        let i = depth as f64;
        Self {
            z_index: total.saturating_sub(depth),
            scale: ((20.0 - i) / 20.0).max(MIN_STACK_SCALE),
            translate_y: -STACK_OFFSET_PX * i,
            opacity: ((10.0 - i) / 10.0).max(MIN_STACK_OPACITY),
        }
    }
}

/// Ordered card deck with an explicit cursor on the topmost active card
#[derive(Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
    /// Index of the first active card; equals `cards.len()` once exhausted
    cursor: usize,
}

impl Deck {
    /// Builds a deck from fetched images, ordered by their fetch index.
    ///
    /// Card ids are reassigned to 0..N-1 following that order, so gaps or
    /// duplicates in the incoming indices never leak into the deck.
    pub fn populate(mut images: Vec<FetchedImage>) -> Self {
        images.sort_by_key(|image| image.id);
        let cards = images
            .into_iter()
            .enumerate()
            .map(|(id, image)| Card::new(id, image.image_ref))
            .collect();

        Self { cards, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The first active card, if any remain
    pub fn topmost(&self) -> Option<&Card> {
        self.cards.get(self.cursor)
    }

    pub fn count_active(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn swiped_count(&self) -> usize {
        self.cursor
    }

    /// Active cards in stacking order, topmost first
    pub fn active(&self) -> impl Iterator<Item = &Card> {
        self.cards[self.cursor..].iter()
    }

    /// Marks the topmost card as removed.
    ///
    /// Only the topmost card may be resolved; anything else is an
    /// invalid-state error and leaves the deck untouched.
    pub fn resolve(&mut self, id: CardId, outcome: Outcome) -> Result<&Card> {
        let topmost = self.topmost().map(|card| card.id);
        let card = self.cards.get(id).ok_or(SwipeError::UnknownCard(id))?;

        if !card.is_active() {
            return Err(SwipeError::AlreadyResolved(id));
        }

        match topmost {
            None => return Err(SwipeError::NoActiveCard),
            Some(top) if top != id => {
                return Err(SwipeError::NotTopmost {
                    card: id,
                    topmost: top,
                })
            }
            Some(_) => {}
        }

        self.cards[id].state = CardState::Removed;
        self.cursor += 1;
        tracing::debug!(card = id, ?outcome, remaining = self.count_active(), "card resolved");

        Ok(&self.cards[id])
    }

    /// Recomputes stacking parameters for every active card.
    pub fn restack(&self) -> Vec<(CardId, StackParams)> {
        let total = self.len();
        self.active()
            .enumerate()
            .map(|(depth, card)| (card.id, StackParams::at_depth(depth, total)))
            .collect()
    }
}

/// Order-preserving, duplicate-free list of accepted image refs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedList {
    refs: Vec<String>,
}

impl AcceptedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `image_ref` unless it is already present. Returns whether it was added.
    pub fn push(&mut self, image_ref: &str) -> bool {
        if self.contains(image_ref) {
            return false;
        }
        self.refs.push(image_ref.to_string());
        true
    }

    pub fn contains(&self, image_ref: &str) -> bool {
        self.refs.iter().any(|r| r == image_ref)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.refs
    }

    pub fn clear(&mut self) {
        self.refs.clear();
    }
}
