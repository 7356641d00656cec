//! # mapduel
//!
//! A two-player, turn-based territory-control card game engine on a 10x10
//! grid. Each turn the active player plays a card that mutates the shared
//! board: pattern placements, whole-board transforms, directional shifts,
//! flood-fill-driven conversions, and multi-step interactive moves.
//!
//! ## Design Principles
//!
//! 1. **Explicit aggregate**: every engine call takes the [`Session`];
//!    there is no ambient state.
//!
//! 2. **Pure board value**: the [`Board`] holds cells and nothing else.
//!    Per-card transient state (anchors, valid-square sets) lives in the
//!    session's resolving context and dies with the card.
//!
//! 3. **Suspension as state**: modal choices are a [`PendingChoice`] the
//!    session parks on, advanced only by `resolve_choice` - no callbacks.
//!
//! 4. **Recoverable rejections**: invalid input returns a [`PlayError`]
//!    and mutates nothing; the player retries.
//!
//! ## Modules
//!
//! - `core`: players, deterministic RNG, setup, activity log
//! - `board`: grid geometry and the move validator
//! - `features`: flood-fill polygon/line classification
//! - `cards`: the card catalog and its board effects
//! - `session`: the session aggregate and turn state machine
//! - `score`: end-game scoring
//! - `error`: the rejection taxonomy

pub mod board;
pub mod cards;
pub mod core;
pub mod error;
pub mod features;
pub mod score;
pub mod session;

// Re-export commonly used types
pub use crate::board::{is_valid_move, Board, Direction, CELL_COUNT, GRID_COLS, GRID_ROWS};

pub use crate::cards::{CardDef, CardId, CardRegistry, ExecutionKind};

pub use crate::core::{ActivityLog, GameRng, GameRngState, GameSetup, Player, PlayerMap};

pub use crate::error::PlayError;

pub use crate::features::{
    feature_at, features_of, line_at, polygon_at, Feature, FeatureKind, LINE_MIN_SIZE,
    POLYGON_MIN_SIZE,
};

pub use crate::score::{calculate_game_score, GameScore, ScoreBreakdown};

pub use crate::session::{
    ChoiceValue, DeckPickReason, DiscardEntry, LayerKind, MemoryStore, OpponentCardAction,
    PendingAction, PendingChoice, PlayedCard, Progress, Session, SessionSnapshot, SnapshotError,
    SyncStore,
};
