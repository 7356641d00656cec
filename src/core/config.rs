//! Session setup parameters.

use serde::{Deserialize, Serialize};

/// Parameters fixed at session creation.
///
/// The board geometry itself is not configurable; only the deal and the
/// opening-move allowance are.
///
/// ## Example
///
/// ```
/// use mapduel::core::GameSetup;
///
/// let setup = GameSetup::new(42).cards_per_hand(4).opening_pieces(8);
/// assert_eq!(setup.cards_per_hand, 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// Cards dealt to each hand at game start (excluding the opening-move card).
    pub cards_per_hand: usize,

    /// Pieces placed during each player's opening move.
    pub opening_pieces: u32,

    /// Deck shuffle seed.
    pub seed: u64,
}

impl GameSetup {
    /// Create a setup with the default deal (5 cards, 10 opening pieces).
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            cards_per_hand: 5,
            opening_pieces: 10,
            seed,
        }
    }

    /// Set the number of cards dealt per hand.
    ///
    /// Two hands are dealt from a 21-card deck, so at most 10 per hand.
    #[must_use]
    pub fn cards_per_hand(mut self, count: usize) -> Self {
        assert!((1..=10).contains(&count), "Cards per hand must be 1-10");
        self.cards_per_hand = count;
        self
    }

    /// Set the opening-move piece allowance.
    #[must_use]
    pub fn opening_pieces(mut self, count: u32) -> Self {
        assert!(count > 0, "Opening move must place at least one piece");
        self.opening_pieces = count;
        self
    }
}

impl Default for GameSetup {
    fn default() -> Self {
        Self::new(0)
    }
}
