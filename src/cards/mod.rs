//! Card system: identifiers, static definitions, and the registry.
//!
//! ## Key Types
//!
//! - `CardId`: identifier for a card definition (1-21, plus the sentinel
//!   opening-move card 99)
//! - `ExecutionKind`: how the session state machine drives a card
//! - `CardDef`: immutable card data (pattern, play count, reach)
//! - `CardRegistry`: definition lookup and deck composition

mod catalog;
pub mod effects;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Unique identifier for a card definition.
///
/// This identifies the card type, not a physical copy; each type appears
/// once per game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u8);

impl CardId {
    pub const CREATE_FEATURES: CardId = CardId(1);
    pub const ERASE_FEATURES: CardId = CardId(2);
    pub const CLIP: CardId = CardId(3);
    pub const FIELD_COLLECTION: CardId = CardId(4);
    pub const INTERPOLATE: CardId = CardId(5);
    pub const DISSOLVE: CardId = CardId(6);
    pub const GROUND_TRUTH: CardId = CardId(7);
    pub const BUFFER: CardId = CardId(8);
    pub const DISCARD_EDITS: CardId = CardId(9);
    pub const FILL_SINKS: CardId = CardId(10);
    pub const PROJECT: CardId = CardId(11);
    pub const SPATIAL_JOIN: CardId = CardId(12);
    pub const TURN_OFF_LAYER: CardId = CardId(13);
    pub const CRUNCH_TIME: CardId = CardId(14);
    pub const HOTSPOT_ANALYSIS: CardId = CardId(15);
    pub const NEAREST_NEIGHBOR: CardId = CardId(16);
    pub const TESSELATE: CardId = CardId(17);
    pub const CTRL_Z: CardId = CardId(18);
    pub const COLLABORATION: CardId = CardId(19);
    pub const MODEL_BUILDER: CardId = CardId(20);
    pub const DATA_VALIDATION: CardId = CardId(21);

    /// The sentinel opening-move card dealt to both hands at game start.
    pub const OPENING_MOVES: CardId = CardId(99);

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card {}", self.0)
    }
}

/// How the session state machine drives a card's interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionKind {
    /// One or more single-cell clicks applying a fixed offset pattern.
    Placement,
    /// No click; applies to the whole board instantly.
    Immediate,
    /// Modal four-way direction choice, then a whole-board transform.
    ChooseDirection,
    /// Modal layer-category choice, then whole-board removal.
    ChooseLayer,
    /// Up to six two-click single-step piece moves.
    GroundTruth,
    /// Precomputed valid-square set; one placement click per detected feature.
    SpatialJoin,
    /// Anchor placement, then four two-click free-range moves that must
    /// close a polygon around the anchor.
    Hotspot,
    /// No board effect now; enqueues a deferred end-game action.
    Crunch,
    /// Modal pick from the discard pile, resolved immediately.
    DiscardRecall,
    /// Modal pick from the top five of the deck; deferred to end-game.
    DeckPreview,
    /// Reveal one opponent card; use it or force its discard.
    OpponentReveal,
}

/// Immutable card definition.
#[derive(Clone, Debug)]
pub struct CardDef {
    pub id: CardId,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ExecutionKind,
    /// Flat offsets applied from the clicked origin (placement cards).
    pub pattern: SmallVec<[i32; 8]>,
    /// Clicks (placement) or moves (ground truth, hotspot) in one play.
    pub plays: u32,
    /// Validator distance for the pattern's offsets.
    pub reach: u32,
}

impl CardDef {
    pub(crate) fn new(id: CardId, name: &'static str, description: &'static str, kind: ExecutionKind) -> Self {
        Self {
            id,
            name,
            description,
            kind,
            pattern: SmallVec::new(),
            plays: 1,
            reach: 1,
        }
    }

    pub(crate) fn with_pattern(mut self, pattern: &[i32]) -> Self {
        self.pattern = SmallVec::from_slice(pattern);
        self
    }

    pub(crate) fn with_plays(mut self, plays: u32) -> Self {
        self.plays = plays;
        self
    }

    pub(crate) fn with_reach(mut self, reach: u32) -> Self {
        self.reach = reach;
        self
    }
}

/// Registry of all card definitions.
#[derive(Clone, Debug)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDef>,
}

impl CardRegistry {
    /// Build the full catalog (cards 1-21 plus the opening-move sentinel).
    #[must_use]
    pub fn new() -> Self {
        let mut cards = FxHashMap::default();
        for card in catalog::all_cards() {
            let previous = cards.insert(card.id, card);
            debug_assert!(previous.is_none(), "duplicate card id in catalog");
        }
        Self { cards }
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDef> {
        self.cards.get(&id)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// The ids shuffled into a fresh deck (1..=21, without the sentinel).
    #[must_use]
    pub fn deck_ids(&self) -> Vec<CardId> {
        (1..=21).map(CardId).collect()
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the registry is empty (it never is after `new`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for CardRegistry {
    fn default() -> Self {
        Self::new()
    }
}
