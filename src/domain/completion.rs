use super::AcceptedList;
use serde::Serialize;

/// Edge-triggered detector for the deck running out of active cards
#[derive(Debug, Default)]
pub struct CompletionDetector {
    /// Set once a nonzero active count has been observed
    armed: bool,
    fired: bool,
}

impl CompletionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the current active count. Returns true exactly once, on the
    /// first zero after a nonzero count.
    pub fn observe(&mut self, count_active: usize) -> bool {
        if count_active > 0 {
            self.armed = true;
            return false;
        }

        if self.armed && !self.fired {
            self.fired = true;
            return true;
        }

        false
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Final report of a swipe round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub accepted_count: usize,
    pub total: usize,
    pub accepted_refs: Vec<String>,
}

impl Summary {
    pub fn build(accepted: &AcceptedList, total: usize) -> Self {
        Self {
            accepted_count: accepted.len(),
            total,
            accepted_refs: accepted.as_slice().to_vec(),
        }
    }
}
