//! Explicit choice suspension points.
//!
//! Cards that need a modal decision (direction, layer, a card pick) park
//! the session in a [`PendingChoice`] and wait; the UI answers through
//! `Session::resolve_choice` with a matching [`ChoiceValue`]. No other game
//! input is processed while a choice is pending.

use serde::{Deserialize, Serialize};

use crate::board::Direction;
use crate::cards::CardId;

/// Layer categories for Turn Off Layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Points,
    Lines,
    Polygons,
}

impl LayerKind {
    /// All three categories.
    pub const ALL: [LayerKind; 3] = [LayerKind::Points, LayerKind::Lines, LayerKind::Polygons];
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LayerKind::Points => "Points",
            LayerKind::Lines => "Lines",
            LayerKind::Polygons => "Polygons",
        };
        write!(f, "{name}")
    }
}

/// Why a deck pick was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckPickReason {
    /// Model Builder: the pick is queued for the end-game.
    ModelBuilder,
    /// Crunch Time's end-game pick: the card resolves immediately.
    CrunchTime,
}

/// What to do with a revealed opponent card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentCardAction {
    /// Resolve it for the active player.
    Use,
    /// Move it from the opponent's hand to the discard pile.
    Discard,
}

/// A modal choice the session is suspended on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingChoice {
    /// Four-way compass choice (Project, Nearest Neighbor).
    Direction,
    /// Layer category choice (Turn Off Layer).
    Layer,
    /// Pick one card from the discard pile (Ctrl+Z).
    DiscardPick { options: Vec<CardId> },
    /// Pick one of the top cards of the deck (Model Builder, end-game Crunch).
    DeckPick {
        options: Vec<CardId>,
        reason: DeckPickReason,
    },
    /// Reveal one opponent card and decide its fate (Collaboration).
    OpponentCard { options: Vec<CardId> },
}

/// The value answering a [`PendingChoice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceValue {
    Direction(Direction),
    Layer(LayerKind),
    Card(CardId),
    OpponentCard {
        card: CardId,
        action: OpponentCardAction,
    },
    /// Abort the card without playing it.
    Cancel,
}
