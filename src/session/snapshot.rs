//! The flat session record shared with the sync collaborator.
//!
//! The engine never talks to a network; it converts to and from
//! [`SessionSnapshot`], and a [`SyncStore`] implementation owns persistence.
//! Snapshots have turn-boundary granularity: a restored session always
//! starts at card selection, since mid-card click state is client-local.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Board;
use crate::cards::{CardId, CardRegistry};
use crate::core::{ActivityLog, GameRng, GameRngState, GameSetup, Player, PlayerMap};

use super::{DiscardEntry, PendingAction, PlayedCard, Session, SessionPhase};

/// Why a snapshot failed to restore.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("board encoding is not 100 cells of 0/1/2")]
    BadBoard,

    #[error("{0} is not a known card")]
    UnknownCard(CardId),

    #[error(transparent)]
    Encoding(#[from] bincode::Error),
}

/// The flat record the sync collaborator persists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// 100 cells of 0 (empty), 1, or 2.
    pub board: Vec<u8>,
    pub current_player: Player,
    pub player_one_hand: Vec<CardId>,
    pub player_two_hand: Vec<CardId>,
    pub discard_pile: Vec<DiscardEntry>,
    pub last_played: Option<(PlayedCard, Player)>,
    /// Remaining deck, top last.
    pub remaining_deck: Vec<CardId>,
    pub pending_moves: Vec<PendingAction>,
    pub played_first_turn: [bool; 2],
    pub plays_remaining: u32,
    pub opening_pieces: u32,
    pub cards_per_hand: usize,
    pub game_log: Vec<String>,
    pub rng: GameRngState,
}

impl SessionSnapshot {
    /// Encode for the wire.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the wire.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl Session {
    /// Capture the durable session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board.to_codes(),
            current_player: self.current_player,
            player_one_hand: self.hands[Player::One].clone(),
            player_two_hand: self.hands[Player::Two].clone(),
            discard_pile: self.discard.clone(),
            last_played: self.last_played,
            remaining_deck: self.deck.clone(),
            pending_moves: self.pending.iter().copied().collect(),
            played_first_turn: [
                self.played_first_turn[Player::One],
                self.played_first_turn[Player::Two],
            ],
            plays_remaining: self.plays_remaining(),
            opening_pieces: self.setup.opening_pieces,
            cards_per_hand: self.setup.cards_per_hand,
            game_log: self.log.to_vec(),
            rng: self.rng.state(),
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// The restored session starts at card selection. The Discard Edits
    /// restore points are seeded with the snapshot board, since each
    /// client's mid-game restore points are local to it.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Result<Self, SnapshotError> {
        let registry = CardRegistry::new();
        let board = Board::from_codes(&snapshot.board).ok_or(SnapshotError::BadBoard)?;

        for &card in snapshot
            .player_one_hand
            .iter()
            .chain(&snapshot.player_two_hand)
            .chain(&snapshot.remaining_deck)
        {
            if !registry.contains(card) {
                return Err(SnapshotError::UnknownCard(card));
            }
        }

        let rng = GameRng::from_state(&snapshot.rng);
        let setup = GameSetup {
            cards_per_hand: snapshot.cards_per_hand,
            opening_pieces: snapshot.opening_pieces,
            seed: snapshot.rng.seed,
        };

        let mut hands: PlayerMap<Vec<CardId>> = PlayerMap::with_default();
        hands[Player::One] = snapshot.player_one_hand.clone();
        hands[Player::Two] = snapshot.player_two_hand.clone();

        let mut played_first_turn = PlayerMap::with_value(false);
        played_first_turn[Player::One] = snapshot.played_first_turn[0];
        played_first_turn[Player::Two] = snapshot.played_first_turn[1];

        Ok(Session {
            setup,
            registry,
            turn_end_boards: PlayerMap::with_value(board.clone()),
            board,
            hands,
            deck: snapshot.remaining_deck.clone(),
            discard: snapshot.discard_pile.clone(),
            pending: snapshot.pending_moves.iter().copied().collect(),
            current_player: snapshot.current_player,
            last_played: snapshot.last_played,
            played_first_turn,
            log: ActivityLog::from_entries(snapshot.game_log.clone()),
            phase: SessionPhase::AwaitingCard,
            in_endgame: false,
            rng,
        })
    }
}

/// The persistence boundary.
///
/// Implementations own where snapshots live (a realtime database, a file,
/// memory). The engine only produces and consumes [`SessionSnapshot`]s;
/// write conflicts are the store's problem (last writer wins).
pub trait SyncStore {
    /// Fetch the latest snapshot for a game, if one exists.
    fn load_session(&self, game_id: &str) -> Option<SessionSnapshot>;

    /// Persist a snapshot, notifying any subscribers.
    fn save_session(&mut self, game_id: &str, snapshot: &SessionSnapshot);

    /// Register a callback invoked with every snapshot saved for `game_id`.
    fn subscribe(&mut self, game_id: &str, on_change: Box<dyn FnMut(&SessionSnapshot) + Send>);
}

/// In-process store for tests and local play.
#[derive(Default)]
pub struct MemoryStore {
    games: FxHashMap<String, SessionSnapshot>,
    watchers: FxHashMap<String, Vec<Box<dyn FnMut(&SessionSnapshot) + Send>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncStore for MemoryStore {
    fn load_session(&self, game_id: &str) -> Option<SessionSnapshot> {
        self.games.get(game_id).cloned()
    }

    fn save_session(&mut self, game_id: &str, snapshot: &SessionSnapshot) {
        self.games.insert(game_id.to_string(), snapshot.clone());
        if let Some(watchers) = self.watchers.get_mut(game_id) {
            for watcher in watchers {
                watcher(snapshot);
            }
        }
    }

    fn subscribe(&mut self, game_id: &str, on_change: Box<dyn FnMut(&SessionSnapshot) + Send>) {
        self.watchers
            .entry(game_id.to_string())
            .or_default()
            .push(on_change);
    }
}
