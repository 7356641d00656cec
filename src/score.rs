//! End-game scoring.
//!
//! Both players are scanned through one shared visited set, Player One
//! first. The largest-polygon bonus moves only on strictly greater size, so
//! when the largest polygons tie across players the earlier-processed
//! player keeps it.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::{Player, PlayerMap};
use crate::features::{collect_features, Feature, FeatureKind};

/// Points per line feature.
const LINE_BONUS: u32 = 2;
/// Points per square of each polygon feature.
const POLYGON_BONUS_PER_SQUARE: u32 = 2;
/// One-time bonus for the single largest polygon on the board.
const LARGEST_POLYGON_BONUS: u32 = 3;

/// One player's score components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// One point per owned square, feature member or not.
    pub base_points: u32,
    /// Two points per line feature.
    pub line_bonus: u32,
    /// Two points per square of every polygon feature.
    pub polygon_bonus: u32,
    /// Three points if this player owns the single largest polygon.
    pub largest_bonus: u32,
}

impl ScoreBreakdown {
    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.base_points + self.line_bonus + self.polygon_bonus + self.largest_bonus
    }
}

/// Final scores for both players.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    pub breakdown: PlayerMap<ScoreBreakdown>,
    /// Owner and size of the largest polygon, if any polygon exists.
    pub largest_polygon: Option<(Player, usize)>,
    pub total_lines: usize,
    pub total_polygons: usize,
}

impl GameScore {
    /// The player with the strictly greater total; `None` on a tie.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        let one = self.breakdown[Player::One].total();
        let two = self.breakdown[Player::Two].total();
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Total for one player.
    #[must_use]
    pub fn total(&self, player: Player) -> u32 {
        self.breakdown[player].total()
    }
}

/// Score the final board.
#[must_use]
pub fn calculate_game_score(board: &Board) -> GameScore {
    let mut visited = FxHashSet::default();
    let mut features: PlayerMap<Vec<Feature>> = PlayerMap::with_default();

    for player in Player::BOTH {
        collect_features(board, player, &mut visited, &mut features[player]);
    }

    let mut breakdown: PlayerMap<ScoreBreakdown> = PlayerMap::with_default();
    let mut largest_polygon: Option<(Player, usize)> = None;
    let mut total_lines = 0;
    let mut total_polygons = 0;

    for player in Player::BOTH {
        let entry = &mut breakdown[player];
        entry.base_points = board.count_owned(player) as u32;

        for feature in &features[player] {
            match feature.kind {
                FeatureKind::Line => {
                    entry.line_bonus += LINE_BONUS;
                    total_lines += 1;
                }
                FeatureKind::Polygon => {
                    entry.polygon_bonus += POLYGON_BONUS_PER_SQUARE * feature.squares.len() as u32;
                    total_polygons += 1;
                    // Strictly greater only: on a tie the earlier holder keeps it.
                    if largest_polygon.map_or(true, |(_, size)| feature.squares.len() > size) {
                        largest_polygon = Some((player, feature.squares.len()));
                    }
                }
            }
        }
    }

    if let Some((player, _)) = largest_polygon {
        breakdown[player].largest_bonus = LARGEST_POLYGON_BONUS;
    }

    GameScore {
        breakdown,
        largest_polygon,
        total_lines,
        total_polygons,
    }
}
