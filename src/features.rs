//! Flood-fill classification of connected pieces into features.
//!
//! A connected group of one player's pieces is classified as at most one
//! feature:
//!
//! - **Polygon**: orthogonally connected, size >= 4. Takes priority.
//! - **Line**: 8-directionally connected, size >= 3, and the probed square
//!   is not part of a polygon.
//!
//! Smaller groups and isolated pieces are unclassified "points".
//!
//! The polygon check inside [`line_at`] is a negative filter keyed to the
//! probed square, not to the whole group: a diagonal outlier next to a
//! polygon yields a line whose members include the polygon's squares. The
//! rest of the engine (spatial join, layer removal, scoring) is built on
//! that exact behavior, so it must not be "fixed" here.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::{is_valid_move, Board, CELL_COUNT, EIGHT_WAY_OFFSETS, ORTHOGONAL_OFFSETS};
use crate::core::Player;

/// Minimum members for a polygon feature.
pub const POLYGON_MIN_SIZE: usize = 4;
/// Minimum members for a line feature.
pub const LINE_MIN_SIZE: usize = 3;

/// Feature classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Polygon,
    Line,
}

/// A classified connected group of one player's pieces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub squares: Vec<usize>,
}

/// Flood fill from `start` over squares owned by `player`.
///
/// Neighbor candidates are gated by the move validator at distance 1, which
/// is what stops a fill from leaking across a row boundary via index
/// arithmetic.
fn flood_fill(board: &Board, start: usize, player: Player, offsets: &[i32]) -> Vec<usize> {
    if board.get(start) != Some(player) {
        return Vec::new();
    }

    let mut visited = FxHashSet::default();
    let mut members = Vec::new();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(square) = stack.pop() {
        members.push(square);
        for &offset in offsets {
            let candidate = square as i32 + offset;
            if !is_valid_move(square, candidate, 1) {
                continue;
            }
            let neighbor = candidate as usize;
            if board.get(neighbor) == Some(player) && visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }

    members
}

/// The polygon containing `square`, if it is part of one.
///
/// Orthogonal connectivity, size >= [`POLYGON_MIN_SIZE`].
#[must_use]
pub fn polygon_at(board: &Board, square: usize, player: Player) -> Option<Vec<usize>> {
    let members = flood_fill(board, square, player, &ORTHOGONAL_OFFSETS);
    (members.len() >= POLYGON_MIN_SIZE).then_some(members)
}

/// The line containing `square`, if it is part of one.
///
/// 8-directional connectivity, size >= [`LINE_MIN_SIZE`]. Polygon
/// classification takes priority: a square that belongs to a polygon is
/// never also part of a line.
#[must_use]
pub fn line_at(board: &Board, square: usize, player: Player) -> Option<Vec<usize>> {
    if polygon_at(board, square, player).is_some() {
        return None;
    }
    let members = flood_fill(board, square, player, &EIGHT_WAY_OFFSETS);
    (members.len() >= LINE_MIN_SIZE).then_some(members)
}

/// The feature containing `square`, polygon first.
#[must_use]
pub fn feature_at(board: &Board, square: usize, player: Player) -> Option<Feature> {
    if let Some(squares) = polygon_at(board, square, player) {
        return Some(Feature {
            kind: FeatureKind::Polygon,
            squares,
        });
    }
    line_at(board, square, player).map(|squares| Feature {
        kind: FeatureKind::Line,
        squares,
    })
}

/// All features of one player, probing squares in index order with a shared
/// visited set so each feature is reported once.
#[must_use]
pub fn features_of(board: &Board, player: Player) -> Vec<Feature> {
    let mut visited = FxHashSet::default();
    let mut features = Vec::new();
    collect_features(board, player, &mut visited, &mut features);
    features
}

/// Feature scan sharing a visited set across calls.
///
/// Scoring scans both players through one visited set; by construction the
/// two players' features never share squares, so the shared set only
/// prevents re-probing within a player.
pub(crate) fn collect_features(
    board: &Board,
    player: Player,
    visited: &mut FxHashSet<usize>,
    out: &mut Vec<Feature>,
) {
    for square in 0..CELL_COUNT {
        if board.get(square) != Some(player) || visited.contains(&square) {
            continue;
        }
        if let Some(feature) = feature_at(board, square, player) {
            visited.extend(feature.squares.iter().copied());
            out.push(feature);
        }
    }
}

/// The whole-board layer partition used by layer removal.
///
/// Probes every square for both players: the polygon set is the union of all
/// polygon members, the line set the union of all line members, and points
/// are the occupied squares belonging to neither.
#[derive(Clone, Debug, Default)]
pub struct LayerPartition {
    pub polygons: FxHashSet<usize>,
    pub lines: FxHashSet<usize>,
    pub points: FxHashSet<usize>,
}

#[must_use]
pub fn layer_partition(board: &Board) -> LayerPartition {
    let mut partition = LayerPartition::default();

    for square in 0..CELL_COUNT {
        let Some(owner) = board.get(square) else {
            continue;
        };
        if let Some(members) = polygon_at(board, square, owner) {
            partition.polygons.extend(members);
        }
        if let Some(members) = line_at(board, square, owner) {
            partition.lines.extend(members);
        }
    }

    for square in 0..CELL_COUNT {
        if board.get(square).is_some()
            && !partition.polygons.contains(&square)
            && !partition.lines.contains(&square)
        {
            partition.points.insert(square);
        }
    }

    partition
}
