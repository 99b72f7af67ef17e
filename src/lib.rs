//! Catswp - a swipe-card deck library
//!
//! This crate provides the headless card lifecycle (deck, gesture
//! interpretation, progress, completion and summary) behind display and input
//! capabilities, plus a terminal front end built on top of it.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod provider;
pub mod scheduler;
pub mod session;
pub mod surface;
pub mod tui;

// Re-export primary types for convenience
pub use config::UserConfig;
pub use domain::{
    AcceptedList, Card, CardId, CardState, CompletionDetector, Deck, GestureDecision,
    GestureInterpreter, Outcome, Progress, StackParams, Summary, Transform,
};
pub use error::{Result, SwipeError};
pub use provider::{fetch_images, FetchedImage, HttpImageProvider, ImageProvider};
pub use session::SwipeSession;
pub use surface::{DisplaySurface, InputEvent, OverlayKind};
