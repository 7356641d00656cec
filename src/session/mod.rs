//! The session aggregate and turn state machine.
//!
//! A [`Session`] owns everything both clients share: the board, both hands,
//! the deck, the discard pile, the deferred end-game queue, and the activity
//! log. Engine calls mutate the session through four entry points:
//!
//! - [`Session::select_card`]: the active player picks a card
//! - [`Session::click`]: a board click while a card resolves
//! - [`Session::resolve_choice`]: answers a pending modal choice
//! - [`Session::end_turn_early`]: gives up remaining plays
//!
//! Each returns a [`Progress`] telling the caller how far the session
//! advanced, or a [`PlayError`] meaning the input was rejected and nothing
//! changed (rejections are also appended to the activity log).
//!
//! Re-entrant cards (Ctrl+Z, Collaboration's "use") replace the current
//! resolving context with one for the recalled card rather than recursing,
//! so dispatch stays iterative. Turn completion runs the skip cascade and,
//! once both hands are empty, drains the pending end-game queue before
//! scoring.

mod choice;
mod snapshot;

pub use choice::{ChoiceValue, DeckPickReason, LayerKind, OpponentCardAction, PendingChoice};
pub use snapshot::{MemoryStore, SessionSnapshot, SnapshotError, SyncStore};

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::{Board, CELL_COUNT};
use crate::cards::{effects, CardId, CardRegistry, ExecutionKind};
use crate::cards::effects::GroundTruthMove;
use crate::core::{ActivityLog, GameRng, GameSetup, Player, PlayerMap};
use crate::error::PlayError;
use crate::features::polygon_at;
use crate::score::{calculate_game_score, GameScore};

/// A discard pile record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardEntry {
    pub card: CardId,
    pub player: Player,
}

/// A deferred end-game action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    /// Model Builder: play the stored card for the stored player.
    ModelBuilder { player: Player, card: CardId },
    /// Crunch Time: the stored player picks from the top 3 of the deck.
    Crunch { player: Player },
}

/// What a completed turn recorded as played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayedCard {
    Card(CardId),
    /// The synthetic marker for a turn skipped on an empty hand.
    Skip,
}

/// How far an accepted input advanced the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The card is still resolving; more clicks are expected.
    AwaitingMore,
    /// The session is suspended on a modal choice.
    ChoiceRequired,
    /// The card was cancelled; the turn is back at card selection.
    Cancelled,
    /// The turn completed and play passed to the other player.
    TurnEnded,
    /// Scoring ran and the session is over.
    GameOver,
}

/// Kind-specific interaction state for the card being resolved.
#[derive(Clone, Debug)]
enum ResolveMode {
    /// Single-click pattern placements.
    Placement,
    /// Ground Truth's two-click moves.
    PieceMoves { first: Option<usize> },
    /// Hotspot Analysis. `anchor` is `None` until the anchor is placed.
    Hotspot {
        anchor: Option<usize>,
        first: Option<usize>,
    },
    /// Spatial Join's precomputed placement squares.
    SpatialJoin { valid: FxHashSet<usize> },
    /// Suspended on a modal choice.
    Choice(PendingChoice),
}

/// The card currently being resolved.
#[derive(Clone, Debug)]
struct Resolving {
    card: CardId,
    actor: Player,
    /// The card to remove from the actor's hand when the turn completes.
    /// `None` for end-game executions, which have no hand bookkeeping.
    hand_card: Option<CardId>,
    plays_remaining: u32,
    /// End-game resolutions return to the pending queue instead of ending
    /// a turn.
    endgame: bool,
    mode: ResolveMode,
}

#[derive(Clone, Debug)]
enum SessionPhase {
    AwaitingCard,
    Resolving(Resolving),
    Over(GameScore),
}

/// The shared game session.
pub struct Session {
    setup: GameSetup,
    registry: CardRegistry,
    board: Board,
    /// Board as it stood when each player's own last turn ended; the
    /// Discard Edits restore point.
    turn_end_boards: PlayerMap<Board>,
    hands: PlayerMap<Vec<CardId>>,
    /// Remaining deck; the top is the end of the `Vec`.
    deck: Vec<CardId>,
    discard: Vec<DiscardEntry>,
    pending: VecDeque<PendingAction>,
    current_player: Player,
    last_played: Option<(PlayedCard, Player)>,
    played_first_turn: PlayerMap<bool>,
    log: ActivityLog,
    phase: SessionPhase,
    in_endgame: bool,
    rng: GameRng,
}

impl Session {
    /// Create a fresh session: zeroed board, shuffled deck, hands dealt,
    /// opening-move sentinel appended to both hands.
    #[must_use]
    pub fn new(setup: GameSetup) -> Self {
        let registry = CardRegistry::new();
        let mut rng = GameRng::new(setup.seed);
        let (hands, deck) = deal(&registry, &mut rng, setup.cards_per_hand);

        Self {
            setup,
            registry,
            board: Board::empty(),
            turn_end_boards: PlayerMap::with_value(Board::empty()),
            hands,
            deck,
            discard: Vec::new(),
            pending: VecDeque::new(),
            current_player: Player::One,
            last_played: None,
            played_first_turn: PlayerMap::with_value(false),
            log: ActivityLog::new(),
            phase: SessionPhase::AwaitingCard,
            in_endgame: false,
            rng,
        }
    }

    /// Reinitialize for a rematch: same geometry, fresh shuffle from a
    /// forked RNG, everything else reset.
    pub fn play_again(&mut self) {
        let mut rng = self.rng.fork();
        let (hands, deck) = deal(&self.registry, &mut rng, self.setup.cards_per_hand);

        self.board = Board::empty();
        self.turn_end_boards = PlayerMap::with_value(Board::empty());
        self.hands = hands;
        self.deck = deck;
        self.discard.clear();
        self.pending.clear();
        self.current_player = Player::One;
        self.last_played = None;
        self.played_first_turn = PlayerMap::with_value(false);
        self.log = ActivityLog::new();
        self.phase = SessionPhase::AwaitingCard;
        self.in_endgame = false;
        self.rng = rng;
    }

    // === Entry points ===

    /// The active player selects a card from their hand.
    pub fn select_card(&mut self, card: CardId) -> Result<Progress, PlayError> {
        match &self.phase {
            SessionPhase::Over(_) => return Err(self.refuse(PlayError::GameOver)),
            SessionPhase::Resolving(r) => {
                let err = if matches!(r.mode, ResolveMode::Choice(_)) {
                    PlayError::ChoicePending
                } else {
                    PlayError::TurnInProgress
                };
                return Err(self.refuse(err));
            }
            SessionPhase::AwaitingCard => {}
        }

        let player = self.current_player;
        if !self.hands[player].contains(&card) {
            return Err(self.refuse(PlayError::CardNotInHand(card)));
        }
        let name = self.card_name(card);
        self.log.push(format!("{player} selected {name}"));
        tracing::debug!(player = player.number(), card = card.raw(), "card selected");
        self.start_card(card, player, Some(card), false)
    }

    /// A board click while a card resolves.
    ///
    /// `square` is a raw index so that Ground Truth can express off-board
    /// destinations; every other interaction rejects indices outside 0-99.
    /// If no card is selected and the active player has not played their
    /// opening move yet, the opening-move card is auto-selected first.
    pub fn click(&mut self, square: i32) -> Result<Progress, PlayError> {
        match &self.phase {
            SessionPhase::Over(_) => return Err(self.refuse(PlayError::GameOver)),
            SessionPhase::AwaitingCard => {
                let player = self.current_player;
                if self.in_endgame || self.played_first_turn[player] {
                    return Err(self.refuse(PlayError::NoCardSelected));
                }
                let name = self.card_name(CardId::OPENING_MOVES);
                self.log.push(format!("{player} auto-selected {name}"));
                self.start_card(CardId::OPENING_MOVES, player, Some(CardId::OPENING_MOVES), false)?;
            }
            SessionPhase::Resolving(_) => {}
        }
        self.handle_click(square)
    }

    /// Answer the pending modal choice.
    pub fn resolve_choice(&mut self, value: ChoiceValue) -> Result<Progress, PlayError> {
        if matches!(self.phase, SessionPhase::Over(_)) {
            return Err(self.refuse(PlayError::GameOver));
        }
        let choice = match &self.phase {
            SessionPhase::Resolving(r) => match &r.mode {
                ResolveMode::Choice(choice) => choice.clone(),
                _ => return Err(self.refuse(PlayError::NoChoicePending)),
            },
            _ => return Err(self.refuse(PlayError::NoChoicePending)),
        };

        if matches!(value, ChoiceValue::Cancel) {
            let resolving = self.take_resolving();
            let name = self.card_name(resolving.card);
            self.log.push(format!("Cancelled {name}"));
            return Ok(if resolving.endgame {
                self.advance_end_game()
            } else {
                Progress::Cancelled
            });
        }

        match (choice, value) {
            (PendingChoice::Direction, ChoiceValue::Direction(direction)) => {
                self.log.push(format!("Chosen Direction: {direction}"));
                let resolving = self.take_resolving();
                match resolving.card {
                    CardId::PROJECT => {
                        effects::project(&mut self.board, direction);
                        self.log.push(format!("Project: Moved all pieces {direction}"));
                    }
                    CardId::NEAREST_NEIGHBOR => {
                        let filled =
                            effects::nearest_neighbor(&mut self.board, direction, resolving.actor);
                        self.log.push(format!(
                            "Nearest Neighbor: Filled {filled} squares to the {direction}"
                        ));
                    }
                    _ => {}
                }
                Ok(self.complete(resolving))
            }
            (PendingChoice::Layer, ChoiceValue::Layer(layer)) => {
                self.log.push(format!("Chosen Layer Type: {layer}"));
                let resolving = self.take_resolving();
                let removed = effects::turn_off_layer(&mut self.board, layer);
                self.log.push(format!("Turn Off Layer: Removed {removed} {layer}"));
                Ok(self.complete(resolving))
            }
            (PendingChoice::DiscardPick { options }, ChoiceValue::Card(chosen)) => {
                if !options.contains(&chosen) {
                    return Err(self.refuse(PlayError::NotOffered(chosen)));
                }
                let resolving = self.take_resolving();
                let name = self.card_name(chosen);
                self.log.push(format!("{} selected {name}", resolving.actor));
                self.start_card(chosen, resolving.actor, resolving.hand_card, resolving.endgame)
            }
            (PendingChoice::DeckPick { options, reason }, ChoiceValue::Card(chosen)) => {
                if !options.contains(&chosen) {
                    return Err(self.refuse(PlayError::NotOffered(chosen)));
                }
                match reason {
                    DeckPickReason::ModelBuilder => {
                        let resolving = self.take_resolving();
                        self.pending.push_back(PendingAction::ModelBuilder {
                            player: resolving.actor,
                            card: chosen,
                        });
                        self.log.push(format!(
                            "Model Builder: {chosen} queued for {} at end of game",
                            resolving.actor
                        ));
                        Ok(self.complete(resolving))
                    }
                    DeckPickReason::CrunchTime => {
                        let resolving = self.take_resolving();
                        let name = self.card_name(chosen);
                        self.log.push(format!("{} selected {name}", resolving.actor));
                        self.start_card(chosen, resolving.actor, None, true)
                    }
                }
            }
            (PendingChoice::OpponentCard { options }, ChoiceValue::OpponentCard { card: chosen, action }) => {
                if !options.contains(&chosen) {
                    return Err(self.refuse(PlayError::NotOffered(chosen)));
                }
                let resolving = self.take_resolving();
                let opponent = resolving.actor.opponent();
                if let Some(pos) = self.hands[opponent].iter().position(|&c| c == chosen) {
                    self.hands[opponent].remove(pos);
                }
                match action {
                    OpponentCardAction::Use => {
                        let name = self.card_name(chosen);
                        self.log.push(format!("Using opponent's card: {name}"));
                        self.discard.push(DiscardEntry {
                            card: chosen,
                            player: resolving.actor,
                        });
                        self.start_card(chosen, resolving.actor, resolving.hand_card, resolving.endgame)
                    }
                    OpponentCardAction::Discard => {
                        self.log.push(format!("Forcing opponent to discard {chosen}"));
                        self.discard.push(DiscardEntry {
                            card: chosen,
                            player: opponent,
                        });
                        Ok(self.complete(resolving))
                    }
                }
            }
            _ => Err(self.refuse(PlayError::ChoiceMismatch)),
        }
    }

    /// Complete the turn now, forfeiting any remaining plays.
    pub fn end_turn_early(&mut self) -> Result<Progress, PlayError> {
        match &self.phase {
            SessionPhase::Over(_) => return Err(self.refuse(PlayError::GameOver)),
            SessionPhase::AwaitingCard => return Err(self.refuse(PlayError::NoCardSelected)),
            SessionPhase::Resolving(r) if r.endgame => {
                return Err(self.refuse(PlayError::TurnInProgress))
            }
            SessionPhase::Resolving(_) => {}
        }
        let resolving = self.take_resolving();
        Ok(self.finish_turn(resolving.actor, PlayedCard::Card(resolving.card), resolving.hand_card))
    }

    // === Accessors ===

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    #[must_use]
    pub fn hand(&self, player: Player) -> &[CardId] {
        &self.hands[player]
    }

    /// The remaining deck, top last.
    #[must_use]
    pub fn deck(&self) -> &[CardId] {
        &self.deck
    }

    #[must_use]
    pub fn discard_pile(&self) -> &[DiscardEntry] {
        &self.discard
    }

    /// Deferred end-game actions, in resolution order.
    pub fn pending_actions(&self) -> impl Iterator<Item = &PendingAction> {
        self.pending.iter()
    }

    #[must_use]
    pub fn last_played(&self) -> Option<(PlayedCard, Player)> {
        self.last_played
    }

    #[must_use]
    pub fn played_first_turn(&self, player: Player) -> bool {
        self.played_first_turn[player]
    }

    #[must_use]
    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    #[must_use]
    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    #[must_use]
    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    /// True once scoring has run.
    #[must_use]
    pub fn is_over(&self) -> bool {
        matches!(self.phase, SessionPhase::Over(_))
    }

    /// True while the end-game queue is draining.
    #[must_use]
    pub fn in_end_game(&self) -> bool {
        self.in_endgame && !self.is_over()
    }

    /// The final score, once the game is over.
    #[must_use]
    pub fn final_score(&self) -> Option<&GameScore> {
        match &self.phase {
            SessionPhase::Over(score) => Some(score),
            _ => None,
        }
    }

    /// The card currently resolving, if any.
    #[must_use]
    pub fn resolving_card(&self) -> Option<CardId> {
        match &self.phase {
            SessionPhase::Resolving(r) => Some(r.card),
            _ => None,
        }
    }

    /// Remaining plays of the resolving card (0 when idle).
    #[must_use]
    pub fn plays_remaining(&self) -> u32 {
        match &self.phase {
            SessionPhase::Resolving(r) => r.plays_remaining,
            _ => 0,
        }
    }

    /// The pending modal choice and the player who must answer it.
    #[must_use]
    pub fn pending_choice(&self) -> Option<(&PendingChoice, Player)> {
        match &self.phase {
            SessionPhase::Resolving(r) => match &r.mode {
                ResolveMode::Choice(choice) => Some((choice, r.actor)),
                _ => None,
            },
            _ => None,
        }
    }

    /// The piece selected by the first click of a two-click move.
    #[must_use]
    pub fn pending_move_source(&self) -> Option<usize> {
        match &self.phase {
            SessionPhase::Resolving(r) => match &r.mode {
                ResolveMode::PieceMoves { first } | ResolveMode::Hotspot { first, .. } => *first,
                _ => None,
            },
            _ => None,
        }
    }

    /// The Hotspot Analysis anchor, once placed.
    #[must_use]
    pub fn hotspot_anchor(&self) -> Option<usize> {
        match &self.phase {
            SessionPhase::Resolving(r) => match &r.mode {
                ResolveMode::Hotspot { anchor, .. } => *anchor,
                _ => None,
            },
            _ => None,
        }
    }

    /// Spatial Join's remaining valid placement squares.
    #[must_use]
    pub fn join_squares(&self) -> Option<&FxHashSet<usize>> {
        match &self.phase {
            SessionPhase::Resolving(r) => match &r.mode {
                ResolveMode::SpatialJoin { valid } => Some(valid),
                _ => None,
            },
            _ => None,
        }
    }

    // === Scenario setup (trusted clients, tests) ===

    /// Replace the board wholesale.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Replace a player's hand.
    pub fn set_hand(&mut self, player: Player, hand: Vec<CardId>) {
        self.hands[player] = hand;
    }

    /// Replace the remaining deck (top last).
    pub fn set_deck(&mut self, deck: Vec<CardId>) {
        self.deck = deck;
    }

    // === Card dispatch ===

    /// Begin resolving a card for `actor`. Shared by card selection,
    /// re-entrant dispatch, and the end-game queue.
    fn start_card(
        &mut self,
        card: CardId,
        actor: Player,
        hand_card: Option<CardId>,
        endgame: bool,
    ) -> Result<Progress, PlayError> {
        let def = self
            .registry
            .get(card)
            .ok_or(PlayError::UnknownCard(card))?;
        let kind = def.kind;
        let plays = if card == CardId::OPENING_MOVES {
            self.setup.opening_pieces
        } else {
            def.plays
        };
        let mut resolving = Resolving {
            card,
            actor,
            hand_card,
            plays_remaining: plays,
            endgame,
            mode: ResolveMode::Placement,
        };

        match kind {
            ExecutionKind::Placement => {
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::AwaitingMore)
            }
            ExecutionKind::Immediate => {
                self.run_immediate(card, actor);
                Ok(self.complete(resolving))
            }
            ExecutionKind::ChooseDirection => {
                resolving.mode = ResolveMode::Choice(PendingChoice::Direction);
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::ChoiceRequired)
            }
            ExecutionKind::ChooseLayer => {
                resolving.mode = ResolveMode::Choice(PendingChoice::Layer);
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::ChoiceRequired)
            }
            ExecutionKind::GroundTruth => {
                resolving.mode = ResolveMode::PieceMoves { first: None };
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::AwaitingMore)
            }
            ExecutionKind::Hotspot => {
                resolving.mode = ResolveMode::Hotspot {
                    anchor: None,
                    first: None,
                };
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::AwaitingMore)
            }
            ExecutionKind::SpatialJoin => {
                let (count, valid) = effects::spatial_join_targets(&self.board, actor);
                if count == 0 {
                    self.log.push("No line or polygon features found");
                    return Ok(self.complete(resolving));
                }
                self.log.push(format!("Spatial Join: {count} feature(s) found"));
                resolving.plays_remaining = count as u32;
                resolving.mode = ResolveMode::SpatialJoin { valid };
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::AwaitingMore)
            }
            ExecutionKind::Crunch => {
                self.pending.push_back(PendingAction::Crunch { player: actor });
                self.log.push(format!(
                    "Crunch Time: {actor} will choose a card at end of game"
                ));
                Ok(self.complete(resolving))
            }
            ExecutionKind::DiscardRecall => {
                if self.discard.is_empty() {
                    self.log.push("No cards in discard pile");
                    return Ok(self.complete(resolving));
                }
                let options: Vec<CardId> = self.discard.iter().map(|entry| entry.card).collect();
                resolving.mode = ResolveMode::Choice(PendingChoice::DiscardPick { options });
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::ChoiceRequired)
            }
            ExecutionKind::DeckPreview => {
                if self.deck.is_empty() {
                    self.log.push("No cards in remaining deck");
                    return Ok(self.complete(resolving));
                }
                let options = self.deck_top(5);
                resolving.mode = ResolveMode::Choice(PendingChoice::DeckPick {
                    options,
                    reason: DeckPickReason::ModelBuilder,
                });
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::ChoiceRequired)
            }
            ExecutionKind::OpponentReveal => {
                let opponent = actor.opponent();
                if self.hands[opponent].is_empty() {
                    // No reveal, no choice: the opponent silently draws the
                    // deck top and the turn completes.
                    self.log
                        .push("Opponent has no cards, using top card from remaining deck");
                    if let Some(top) = self.deck.pop() {
                        self.hands[opponent].push(top);
                    }
                    return Ok(self.complete(resolving));
                }
                let options = self.hands[opponent].clone();
                resolving.mode = ResolveMode::Choice(PendingChoice::OpponentCard { options });
                self.phase = SessionPhase::Resolving(resolving);
                Ok(Progress::ChoiceRequired)
            }
        }
    }

    fn run_immediate(&mut self, card: CardId, actor: Player) {
        match card {
            CardId::INTERPOLATE => {
                let filled = effects::interpolate(&mut self.board, actor);
                self.log.push(format!("Interpolate: Filled {filled} squares"));
            }
            CardId::FILL_SINKS => {
                let filled = effects::fill_sinks(&mut self.board, actor);
                self.log.push(format!("Fill Sinks: Filled {filled} squares"));
            }
            CardId::DISCARD_EDITS => {
                self.board = self.turn_end_boards[actor].clone();
                self.log.push("Board reverted to previous state");
            }
            _ => {}
        }
    }

    // === Click handling ===

    fn handle_click(&mut self, raw: i32) -> Result<Progress, PlayError> {
        let (card, actor) = match &self.phase {
            SessionPhase::Resolving(r) => (r.card, r.actor),
            _ => return Err(self.refuse(PlayError::NoCardSelected)),
        };
        let kind = self
            .registry
            .get(card)
            .map(|def| def.kind)
            .ok_or(PlayError::UnknownCard(card))?;

        match kind {
            ExecutionKind::Placement => self.click_placement(raw, card, actor),
            ExecutionKind::GroundTruth => self.click_ground_truth(raw),
            ExecutionKind::Hotspot => self.click_hotspot(raw, actor),
            ExecutionKind::SpatialJoin => self.click_spatial_join(raw, actor),
            _ => Err(self.refuse(PlayError::ChoicePending)),
        }
    }

    fn click_placement(
        &mut self,
        raw: i32,
        card: CardId,
        actor: Player,
    ) -> Result<Progress, PlayError> {
        let square = self.on_board(raw)?;
        let message = self.apply_placement(card, square, actor)?;
        self.log.push(message);
        self.after_successful_play()
    }

    /// Run one placement-card click against the board, returning the log
    /// line for a success.
    fn apply_placement(
        &mut self,
        card: CardId,
        square: usize,
        actor: Player,
    ) -> Result<String, PlayError> {
        let def = self
            .registry
            .get(card)
            .ok_or(PlayError::UnknownCard(card))?;
        let pattern = def.pattern.clone();
        let reach = def.reach;

        let message = match card {
            CardId::CREATE_FEATURES => {
                let placed = effects::place_features(&mut self.board, square, actor, &pattern, reach)
                    .map_err(|err| self.refuse(err))?;
                format!("Created {placed} features at square {square}")
            }
            CardId::ERASE_FEATURES => {
                let erased = effects::erase_features(&mut self.board, square, &pattern, reach);
                format!("Erased {erased} features")
            }
            CardId::CLIP => {
                let converted = effects::clip(&mut self.board, square, actor, &pattern)
                    .map_err(|err| self.refuse(err))?;
                format!("Clipped {converted} opponent features")
            }
            CardId::FIELD_COLLECTION => {
                effects::place_single(&mut self.board, square, actor)
                    .map_err(|err| self.refuse(err))?;
                format!("Field Collection: Placed feature at square {square}")
            }
            CardId::DISSOLVE => {
                let size = effects::dissolve(&mut self.board, square, actor)
                    .map_err(|err| self.refuse(err))?;
                format!("Dissolved opponent polygon of {size} squares")
            }
            CardId::BUFFER => {
                let filled = effects::buffer(&mut self.board, square, actor)
                    .map_err(|err| self.refuse(err))?;
                format!("Buffer: Added {filled} features around polygon")
            }
            CardId::TESSELATE => {
                let placed = effects::place_features(&mut self.board, square, actor, &pattern, reach)
                    .map_err(|err| self.refuse(err))?;
                format!("Tesselate: Placed {placed} features")
            }
            CardId::DATA_VALIDATION => {
                effects::flip_single(&mut self.board, square, actor)
                    .map_err(|err| self.refuse(err))?;
                format!("Data Validation: Flipped square {square} to {actor}")
            }
            CardId::OPENING_MOVES => {
                effects::place_single(&mut self.board, square, actor)
                    .map_err(|err| self.refuse(err))?;
                format!("Opening Moves: Placed feature at square {square}")
            }
            _ => return Err(self.refuse(PlayError::UnknownCard(card))),
        };
        Ok(message)
    }

    fn click_ground_truth(&mut self, raw: i32) -> Result<Progress, PlayError> {
        let first = match &self.phase {
            SessionPhase::Resolving(Resolving {
                mode: ResolveMode::PieceMoves { first },
                ..
            }) => *first,
            _ => return Err(self.refuse(PlayError::NoCardSelected)),
        };

        match first {
            None => {
                let square = self.on_board(raw)?;
                if self.board.is_empty_at(square) {
                    return Err(self.refuse(PlayError::NoPieceAt(square)));
                }
                self.set_move_source(Some(square));
                self.log.push(format!("Selected piece at square {square} to move"));
                Ok(Progress::AwaitingMore)
            }
            Some(from) => {
                // The selection is spent whether or not the move lands.
                self.set_move_source(None);
                match effects::ground_truth_move(&mut self.board, from, raw) {
                    Ok(GroundTruthMove::Moved) => {
                        self.log.push(format!("Moved piece from square {from} to {raw}"));
                        self.after_successful_play()
                    }
                    Ok(GroundTruthMove::RemovedOffBoard) => {
                        self.log.push("Piece moved off edge and removed");
                        self.after_successful_play()
                    }
                    Err(err) => Err(self.refuse(err)),
                }
            }
        }
    }

    fn click_hotspot(&mut self, raw: i32, actor: Player) -> Result<Progress, PlayError> {
        let (anchor, first) = match &self.phase {
            SessionPhase::Resolving(Resolving {
                mode: ResolveMode::Hotspot { anchor, first },
                ..
            }) => (*anchor, *first),
            _ => return Err(self.refuse(PlayError::NoCardSelected)),
        };

        let Some(anchor_square) = anchor else {
            let square = self.on_board(raw)?;
            effects::hotspot_anchor(&mut self.board, square, actor)
                .map_err(|err| self.refuse(err))?;
            self.set_hotspot_anchor(Some(square));
            self.log.push(format!("Hotspot: Placed anchor piece at square {square}"));
            return Ok(Progress::AwaitingMore);
        };

        match first {
            None => {
                let square = self.on_board(raw)?;
                if self.board.get(square) != Some(actor) {
                    return Err(self.refuse(PlayError::NotYourPiece(square)));
                }
                self.set_move_source(Some(square));
                self.log.push(format!("Selected piece at square {square} to move"));
                Ok(Progress::AwaitingMore)
            }
            Some(from) => {
                self.set_move_source(None);
                let to = self.on_board(raw)?;
                effects::hotspot_move(&mut self.board, from, to, actor)
                    .map_err(|err| self.refuse(err))?;
                self.log.push(format!("Hotspot: Moved piece from square {from} to {to}"));

                let done = {
                    let r = self.resolving_mut();
                    r.plays_remaining -= 1;
                    r.plays_remaining == 0
                };
                if !done {
                    return Ok(Progress::AwaitingMore);
                }

                if polygon_at(&self.board, anchor_square, actor).is_some() {
                    self.log.push("Valid polygon formed!");
                    let resolving = self.take_resolving();
                    Ok(self.complete(resolving))
                } else {
                    // The attempt is rejected: anchor bookkeeping resets and
                    // the player restarts from the anchor phase. Pieces moved
                    // during the attempt stay where they landed.
                    self.log.push("Does not form a valid polygon");
                    self.log.push("Hotspot validation failed - turn cancelled");
                    let plays = self
                        .registry
                        .get(CardId::HOTSPOT_ANALYSIS)
                        .map_or(4, |def| def.plays);
                    let r = self.resolving_mut();
                    r.plays_remaining = plays;
                    r.mode = ResolveMode::Hotspot {
                        anchor: None,
                        first: None,
                    };
                    Ok(Progress::AwaitingMore)
                }
            }
        }
    }

    fn click_spatial_join(&mut self, raw: i32, actor: Player) -> Result<Progress, PlayError> {
        let square = self.on_board(raw)?;
        let is_valid_target = match &self.phase {
            SessionPhase::Resolving(Resolving {
                mode: ResolveMode::SpatialJoin { valid },
                ..
            }) => valid.contains(&square),
            _ => return Err(self.refuse(PlayError::NoCardSelected)),
        };
        if !is_valid_target {
            return Err(self.refuse(PlayError::NotAJoinSquare(square)));
        }
        if !self.board.is_empty_at(square) {
            return Err(self.refuse(PlayError::Occupied(square)));
        }

        self.board.set(square, Some(actor));
        if let SessionPhase::Resolving(Resolving {
            mode: ResolveMode::SpatialJoin { valid },
            ..
        }) = &mut self.phase
        {
            valid.remove(&square);
        }
        self.log.push(format!("Spatial Join: Placed piece at square {square}"));
        self.after_successful_play()
    }

    // === Turn lifecycle ===

    /// Decrement the play count and complete the card at zero.
    fn after_successful_play(&mut self) -> Result<Progress, PlayError> {
        let done = {
            let r = self.resolving_mut();
            r.plays_remaining -= 1;
            r.plays_remaining == 0
        };
        if done {
            let resolving = self.take_resolving();
            Ok(self.complete(resolving))
        } else {
            Ok(Progress::AwaitingMore)
        }
    }

    /// A card finished resolving: transient state drops here.
    fn complete(&mut self, resolving: Resolving) -> Progress {
        self.phase = SessionPhase::AwaitingCard;
        if resolving.endgame {
            self.advance_end_game()
        } else {
            self.finish_turn(
                resolving.actor,
                PlayedCard::Card(resolving.card),
                resolving.hand_card,
            )
        }
    }

    /// Turn completion bookkeeping, player switch, and the skip cascade.
    fn finish_turn(
        &mut self,
        actor: Player,
        played: PlayedCard,
        hand_card: Option<CardId>,
    ) -> Progress {
        if let Some(card) = hand_card {
            if let Some(pos) = self.hands[actor].iter().position(|&c| c == card) {
                self.hands[actor].remove(pos);
            }
            if card == CardId::OPENING_MOVES {
                self.played_first_turn[actor] = true;
                self.log.push(format!("{actor} has completed their first turn!"));
            } else {
                self.discard.push(DiscardEntry { card, player: actor });
            }
        }
        if let PlayedCard::Card(card) = played {
            let name = self.card_name(card);
            self.log.push(format!("{actor} played {name}"));
        }
        self.last_played = Some((played, actor));
        self.turn_end_boards[actor] = self.board.clone();
        tracing::debug!(player = actor.number(), "turn complete");

        let mut next = actor.opponent();
        self.current_player = next;
        self.log.push(format!("Switched to {next}'s turn"));

        loop {
            if self.hands[Player::One].is_empty() && self.hands[Player::Two].is_empty() {
                return self.begin_end_game();
            }
            if self.hands[next].is_empty() {
                self.log.push(format!("{next} has no cards left, skipping turn"));
                self.last_played = Some((PlayedCard::Skip, next));
                self.turn_end_boards[next] = self.board.clone();
                next = next.opponent();
                self.current_player = next;
                self.log.push(format!("Switched to {next}'s turn"));
                continue;
            }
            break;
        }
        Progress::TurnEnded
    }

    // === End game ===

    fn begin_end_game(&mut self) -> Progress {
        self.in_endgame = true;
        self.log.push("Beginning end game sequence...");
        tracing::info!("end game sequence started");
        if !self.pending.is_empty() {
            self.log.push(format!("Processing {} pending moves", self.pending.len()));
        }
        self.advance_end_game()
    }

    /// Drain the pending queue until an entry needs interaction or the
    /// queue is empty. Entries enqueued during the drain are processed too.
    fn advance_end_game(&mut self) -> Progress {
        loop {
            let Some(action) = self.pending.pop_front() else {
                return self.finish_game();
            };
            match action {
                PendingAction::ModelBuilder { player, card } => {
                    let name = self.card_name(card);
                    self.log.push(format!("Processing Model Builder for {player} with {name}"));
                    match self.start_card(card, player, None, true) {
                        Ok(progress) => return progress,
                        Err(_) => continue,
                    }
                }
                PendingAction::Crunch { player } => {
                    self.log.push(format!("Processing Crunch Time for {player}"));
                    if self.deck.is_empty() {
                        self.log.push("No cards in remaining deck");
                        continue;
                    }
                    let options = self.deck_top(3);
                    self.phase = SessionPhase::Resolving(Resolving {
                        card: CardId::CRUNCH_TIME,
                        actor: player,
                        hand_card: None,
                        plays_remaining: 0,
                        endgame: true,
                        mode: ResolveMode::Choice(PendingChoice::DeckPick {
                            options,
                            reason: DeckPickReason::CrunchTime,
                        }),
                    });
                    return Progress::ChoiceRequired;
                }
            }
        }
    }

    fn finish_game(&mut self) -> Progress {
        let score = calculate_game_score(&self.board);
        self.log.push(format!(
            "Final Score - Player One: {}, Player Two: {}",
            score.total(Player::One),
            score.total(Player::Two)
        ));
        let message = match score.winner() {
            Some(Player::One) => "Player One Wins!",
            Some(Player::Two) => "Player Two Wins!",
            None => "It's a Tie!",
        };
        self.log.push(message);
        tracing::info!(
            one = score.total(Player::One),
            two = score.total(Player::Two),
            "game over"
        );
        self.phase = SessionPhase::Over(score);
        Progress::GameOver
    }

    // === Helpers ===

    fn card_name(&self, card: CardId) -> &'static str {
        self.registry.get(card).map_or("Unknown Card", |def| def.name)
    }

    /// The top `count` deck cards, topmost first.
    fn deck_top(&self, count: usize) -> Vec<CardId> {
        self.deck.iter().rev().take(count).copied().collect()
    }

    fn on_board(&mut self, raw: i32) -> Result<usize, PlayError> {
        if (0..CELL_COUNT as i32).contains(&raw) {
            Ok(raw as usize)
        } else {
            Err(self.refuse(PlayError::OutOfBounds(raw)))
        }
    }

    /// Log a rejection and hand the error back unchanged.
    fn refuse(&mut self, err: PlayError) -> PlayError {
        self.log.push(err.to_string());
        tracing::debug!(%err, "input rejected");
        err
    }

    fn resolving_mut(&mut self) -> &mut Resolving {
        match &mut self.phase {
            SessionPhase::Resolving(r) => r,
            _ => unreachable!("no card is resolving"),
        }
    }

    fn take_resolving(&mut self) -> Resolving {
        match std::mem::replace(&mut self.phase, SessionPhase::AwaitingCard) {
            SessionPhase::Resolving(r) => r,
            _ => unreachable!("no card is resolving"),
        }
    }

    fn set_move_source(&mut self, source: Option<usize>) {
        if let SessionPhase::Resolving(r) = &mut self.phase {
            match &mut r.mode {
                ResolveMode::PieceMoves { first } | ResolveMode::Hotspot { first, .. } => {
                    *first = source;
                }
                _ => {}
            }
        }
    }

    fn set_hotspot_anchor(&mut self, square: Option<usize>) {
        if let SessionPhase::Resolving(Resolving {
            mode: ResolveMode::Hotspot { anchor, .. },
            ..
        }) = &mut self.phase
        {
            *anchor = square;
        }
    }
}

/// Shuffle a fresh deck and deal both hands, sentinel last.
fn deal(
    registry: &CardRegistry,
    rng: &mut GameRng,
    cards_per_hand: usize,
) -> (PlayerMap<Vec<CardId>>, Vec<CardId>) {
    let mut deck = registry.deck_ids();
    rng.shuffle(&mut deck);

    let mut hands: PlayerMap<Vec<CardId>> = PlayerMap::with_default();
    for _ in 0..cards_per_hand {
        for player in Player::BOTH {
            if let Some(card) = deck.pop() {
                hands[player].push(card);
            }
        }
    }
    for player in Player::BOTH {
        hands[player].push(CardId::OPENING_MOVES);
    }
    (hands, deck)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Session {
        Session::new(GameSetup::new(42))
    }

    #[test]
    fn test_new_session_deal() {
        let session = fresh();

        for player in Player::BOTH {
            let hand = session.hand(player);
            assert_eq!(hand.len(), 6, "5 dealt cards plus the opening sentinel");
            assert_eq!(*hand.last().unwrap(), CardId::OPENING_MOVES);
        }
        assert_eq!(session.deck().len(), 11);
        assert_eq!(session.current_player(), Player::One);
        assert!(!session.is_over());
        assert_eq!(session.board().count_owned(Player::One), 0);
    }

    #[test]
    fn test_deal_is_deterministic() {
        let a = fresh();
        let b = fresh();
        assert_eq!(a.hand(Player::One), b.hand(Player::One));
        assert_eq!(a.deck(), b.deck());
    }

    #[test]
    fn test_no_card_shared_between_zones() {
        let session = fresh();
        let mut seen = std::collections::HashSet::new();
        for card in session
            .hand(Player::One)
            .iter()
            .chain(session.hand(Player::Two))
            .chain(session.deck())
        {
            if *card != CardId::OPENING_MOVES {
                assert!(seen.insert(*card), "card {card} appears twice");
            }
        }
        assert_eq!(seen.len(), 21);
    }

    #[test]
    fn test_select_rejects_card_not_in_hand() {
        let mut session = fresh();
        let absent = session.deck()[0];

        let err = session.select_card(absent).unwrap_err();
        assert_eq!(err, PlayError::CardNotInHand(absent));
        assert_eq!(session.plays_remaining(), 0);
    }

    #[test]
    fn test_opening_auto_select_on_click() {
        let mut session = fresh();

        let progress = session.click(0).unwrap();
        assert_eq!(progress, Progress::AwaitingMore);
        assert_eq!(session.resolving_card(), Some(CardId::OPENING_MOVES));
        assert_eq!(session.plays_remaining(), 9);
        assert_eq!(session.board().get(0), Some(Player::One));
    }

    #[test]
    fn test_opening_turn_places_ten_and_passes() {
        let mut session = fresh();

        for square in 0..9 {
            assert_eq!(session.click(square).unwrap(), Progress::AwaitingMore);
        }
        let progress = session.click(9).unwrap();
        assert_eq!(progress, Progress::TurnEnded);

        assert!(session.played_first_turn(Player::One));
        assert_eq!(session.current_player(), Player::Two);
        assert_eq!(session.board().count_owned(Player::One), 10);
        assert_eq!(session.hand(Player::One).len(), 5, "sentinel removed");
        assert!(
            session.discard_pile().is_empty(),
            "the opening card is never discarded"
        );
    }

    #[test]
    fn test_opening_rejects_occupied_square() {
        let mut session = fresh();
        session.click(0).unwrap();

        let err = session.click(0).unwrap_err();
        assert_eq!(err, PlayError::Occupied(0));
        assert_eq!(session.plays_remaining(), 9, "failed play is not consumed");
    }

    #[test]
    fn test_second_player_opening_auto_select() {
        let mut session = fresh();
        for square in 0..10 {
            session.click(square).unwrap();
        }
        assert_eq!(session.current_player(), Player::Two);

        session.click(90).unwrap();
        assert_eq!(session.resolving_card(), Some(CardId::OPENING_MOVES));
        assert_eq!(session.board().get(90), Some(Player::Two));
    }

    #[test]
    fn test_end_turn_early_forfeits_plays() {
        let mut session = fresh();
        session.click(0).unwrap();
        assert_eq!(session.end_turn_early().unwrap(), Progress::TurnEnded);

        assert!(session.played_first_turn(Player::One));
        assert_eq!(session.current_player(), Player::Two);
        assert_eq!(session.board().count_owned(Player::One), 1);
    }

    #[test]
    fn test_click_without_selection_after_first_turn() {
        let mut session = fresh();
        for square in 0..10 {
            session.click(square).unwrap();
        }
        for square in 90..100 {
            session.click(square).unwrap();
        }
        assert_eq!(session.current_player(), Player::One);
        assert_eq!(session.click(50).unwrap_err(), PlayError::NoCardSelected);
    }
}
