use super::Deck;

pub const START_LABEL: &str = "Let's go!";
pub const COMPLETE_LABEL: &str = "All done!";

/// Labels for a deck that is partly swiped, in order of progress
pub const STAGE_LABELS: [&str; 5] = [
    "Let's go!",
    "Too adorable!",
    "Halfway there!",
    "So many cuties!",
    "Almost done!",
];

/// Progress through the deck, derived from its active count
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub swiped: usize,
    pub total: usize,
    pub percent: f64,
    pub label: &'static str,
}

impl Progress {
    pub fn new(swiped: usize, total: usize) -> Self {
        let swiped = swiped.min(total);
        let percent = if total == 0 {
            0.0
        } else {
            100.0 * swiped as f64 / total as f64
        };

        Self {
            swiped,
            total,
            percent,
            label: label_for(swiped, total),
        }
    }

    pub fn of(deck: &Deck) -> Self {
        Self::new(deck.swiped_count(), deck.len())
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.swiped == self.total
    }
}

/// Index into [`STAGE_LABELS`] for a partly swiped deck
pub fn stage_index(swiped: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (swiped * 6 / total).min(STAGE_LABELS.len() - 1)
}

fn label_for(swiped: usize, total: usize) -> &'static str {
    if swiped == 0 {
        START_LABEL
    } else if swiped == total {
        COMPLETE_LABEL
    } else {
        STAGE_LABELS[stage_index(swiped, total)]
    }
}
