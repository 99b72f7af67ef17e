//! Error types for the swipe session

use crate::domain::CardId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("card {0} does not exist in the deck")]
    UnknownCard(CardId),

    #[error("card {0} has already been resolved")]
    AlreadyResolved(CardId),

    #[error("card {card} is not the topmost card (topmost is {topmost})")]
    NotTopmost { card: CardId, topmost: CardId },

    #[error("no active card left to resolve")]
    NoActiveCard,

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl SwipeError {
    /// True for the errors raised when a card is resolved out of turn.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            SwipeError::UnknownCard(_)
                | SwipeError::AlreadyResolved(_)
                | SwipeError::NotTopmost { .. }
                | SwipeError::NoActiveCard
        )
    }
}

pub type Result<T> = std::result::Result<T, SwipeError>;
