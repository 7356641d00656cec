//! Board transforms behind the card catalog.
//!
//! Each function mutates a [`Board`] (or refuses with a [`PlayError`],
//! leaving it untouched) and reports how many squares changed so the
//! session can log it. Whole-board passes that must not cascade
//! (Interpolate, Nearest Neighbor) read from a pre-mutation snapshot;
//! Fill Sinks deliberately cascades in index order and Project processes
//! the leading edge first.

use rustc_hash::FxHashSet;

use crate::board::{
    is_valid_move, Board, Direction, CELL_COUNT, EIGHT_WAY_OFFSETS, GRID_COLS, ORTHOGONAL_OFFSETS,
};
use crate::core::Player;
use crate::error::PlayError;
use crate::features::{feature_at, features_of, layer_partition, polygon_at, FeatureKind};
use crate::session::LayerKind;

/// Outcome of a Ground Truth move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundTruthMove {
    /// The piece moved to the target square.
    Moved,
    /// The target was off the board; the piece was removed.
    RemovedOffBoard,
}

/// Place the player's pieces on every empty pattern target.
///
/// Fails without touching the board if no target qualifies.
pub fn place_features(
    board: &mut Board,
    origin: usize,
    player: Player,
    pattern: &[i32],
    reach: u32,
) -> Result<u32, PlayError> {
    let targets: Vec<usize> = pattern
        .iter()
        .map(|&offset| origin as i32 + offset)
        .filter(|&target| is_valid_move(origin, target, reach))
        .map(|target| target as usize)
        .filter(|&target| board.is_empty_at(target))
        .collect();

    if targets.is_empty() {
        return Err(PlayError::NoValidTargets);
    }
    for &target in &targets {
        board.set(target, Some(player));
    }
    Ok(targets.len() as u32)
}

/// Clear every occupied pattern target. Never fails.
pub fn erase_features(board: &mut Board, origin: usize, pattern: &[i32], reach: u32) -> u32 {
    let mut erased = 0;
    for &offset in pattern {
        let target = origin as i32 + offset;
        if is_valid_move(origin, target, reach) && !board.is_empty_at(target as usize) {
            board.set(target as usize, None);
            erased += 1;
        }
    }
    erased
}

/// Convert every opponent-held pattern target to the player's pieces.
///
/// Fails without touching the board if no target qualifies.
pub fn clip(
    board: &mut Board,
    origin: usize,
    player: Player,
    pattern: &[i32],
) -> Result<u32, PlayError> {
    let targets: Vec<usize> = pattern
        .iter()
        .map(|&offset| origin as i32 + offset)
        .filter(|&target| is_valid_move(origin, target, 1))
        .map(|target| target as usize)
        .filter(|&target| board.get(target) == Some(player.opponent()))
        .collect();

    if targets.is_empty() {
        return Err(PlayError::NoValidTargets);
    }
    for &target in &targets {
        board.set(target, Some(player));
    }
    Ok(targets.len() as u32)
}

/// Place one piece on an empty square (Field Collection, opening moves).
pub fn place_single(board: &mut Board, square: usize, player: Player) -> Result<(), PlayError> {
    if !board.is_empty_at(square) {
        return Err(PlayError::Occupied(square));
    }
    board.set(square, Some(player));
    Ok(())
}

/// Flip one square that is not already the player's (Data Validation).
pub fn flip_single(board: &mut Board, square: usize, player: Player) -> Result<(), PlayError> {
    if board.get(square) == Some(player) {
        return Err(PlayError::AlreadyYours(square));
    }
    board.set(square, Some(player));
    Ok(())
}

/// Convert an opponent polygon that touches one of the player's features.
///
/// The clicked square must belong to an opponent polygon, and at least one
/// of its members must be orthogonally adjacent to a square inside one of
/// the player's own polygon or line features. Returns the polygon size.
pub fn dissolve(board: &mut Board, square: usize, player: Player) -> Result<usize, PlayError> {
    let opponent = player.opponent();
    let polygon = polygon_at(board, square, opponent).ok_or(PlayError::NotAnOpponentPolygon)?;

    let touching = polygon.iter().any(|&member| {
        ORTHOGONAL_OFFSETS.iter().any(|&offset| {
            let candidate = member as i32 + offset;
            if !is_valid_move(member, candidate, 1) {
                return false;
            }
            let neighbor = candidate as usize;
            board.get(neighbor) == Some(player) && feature_at(board, neighbor, player).is_some()
        })
    });

    if !touching {
        return Err(PlayError::NotTouchingOwnFeature);
    }

    for &member in &polygon {
        board.set(member, Some(player));
    }
    Ok(polygon.len())
}

/// Fill every empty square orthogonally adjacent to the player's polygon
/// containing `square`. Returns the number of squares filled.
pub fn buffer(board: &mut Board, square: usize, player: Player) -> Result<u32, PlayError> {
    let polygon = polygon_at(board, square, player).ok_or(PlayError::NotYourPolygon(square))?;

    let mut filled = 0;
    for &member in &polygon {
        for &offset in &ORTHOGONAL_OFFSETS {
            let candidate = member as i32 + offset;
            if is_valid_move(member, candidate, 1) && board.is_empty_at(candidate as usize) {
                board.set(candidate as usize, Some(player));
                filled += 1;
            }
        }
    }
    Ok(filled)
}

/// Fill every square with at least three of the player's pieces among its
/// eight neighbors, converting opponent pieces where it lands.
///
/// Neighbor counts come from the pre-mutation snapshot so fills cannot
/// cascade within one application.
pub fn interpolate(board: &mut Board, player: Player) -> u32 {
    let snapshot = board.clone();
    let mut filled = 0;

    for square in 0..CELL_COUNT {
        let neighbors = EIGHT_WAY_OFFSETS
            .iter()
            .filter(|&&offset| {
                let candidate = square as i32 + offset;
                is_valid_move(square, candidate, 1)
                    && snapshot.get(candidate as usize) == Some(player)
            })
            .count();
        if neighbors >= 3 {
            board.set(square, Some(player));
            filled += 1;
        }
    }
    filled
}

/// Fill every empty square whose four orthogonal neighbors are each filled
/// or off the board. The pass runs in index order over the mutating board,
/// so an early fill can complete a later sink.
pub fn fill_sinks(board: &mut Board, player: Player) -> u32 {
    let mut filled = 0;

    for square in 0..CELL_COUNT {
        if !board.is_empty_at(square) {
            continue;
        }
        let surrounding = ORTHOGONAL_OFFSETS
            .iter()
            .filter(|&&offset| {
                let candidate = square as i32 + offset;
                !is_valid_move(square, candidate, 1) || !board.is_empty_at(candidate as usize)
            })
            .count();
        if surrounding == 4 {
            board.set(square, Some(player));
            filled += 1;
        }
    }
    filled
}

/// Shift every piece one square in `direction`.
///
/// The leading edge is processed first (south/east iterate high to low) so
/// no piece moves twice in one pass. A piece whose target is off the board
/// is removed; a piece whose target is occupied stays put.
pub fn project(board: &mut Board, direction: Direction) {
    let forward: Box<dyn Iterator<Item = usize>> = match direction {
        Direction::South | Direction::East => Box::new((0..CELL_COUNT).rev()),
        Direction::North | Direction::West => Box::new(0..CELL_COUNT),
    };

    for square in forward {
        let Some(piece) = board.get(square) else {
            continue;
        };
        let target = square as i32 + direction.offset();
        if is_valid_move(square, target, 1) {
            if board.is_empty_at(target as usize) {
                board.set(target as usize, Some(piece));
                board.set(square, None);
            }
        } else {
            board.set(square, None);
        }
    }
}

/// Fill the empty neighbor in `direction` of every piece the player owns.
///
/// Purely additive and computed from the pre-mutation snapshot; sources do
/// not move.
pub fn nearest_neighbor(board: &mut Board, direction: Direction, player: Player) -> u32 {
    let snapshot = board.clone();
    let mut filled = 0;

    for square in 0..CELL_COUNT {
        if snapshot.get(square) != Some(player) {
            continue;
        }
        let target = square as i32 + direction.offset();
        if is_valid_move(square, target, 1) && snapshot.is_empty_at(target as usize) {
            board.set(target as usize, Some(player));
            filled += 1;
        }
    }
    filled
}

/// Remove every square of the chosen layer category, for both players.
pub fn turn_off_layer(board: &mut Board, layer: LayerKind) -> u32 {
    let partition = layer_partition(board);
    let doomed = match layer {
        LayerKind::Polygons => partition.polygons,
        LayerKind::Lines => partition.lines,
        LayerKind::Points => partition.points,
    };

    for &square in &doomed {
        board.set(square, None);
    }
    doomed.len() as u32
}

/// One Ground Truth move: any piece, one step, off-board removes.
///
/// `to` is a raw index so a step off any edge can be expressed; the
/// distance check uses floor-division rows so off-board targets still
/// count as one step from the edge.
pub fn ground_truth_move(board: &mut Board, from: usize, to: i32) -> Result<GroundTruthMove, PlayError> {
    let Some(piece) = board.get(from) else {
        return Err(PlayError::NoPieceAt(from));
    };

    let cols = GRID_COLS as i32;
    let row_delta = ((from as i32 / cols) - to.div_euclid(cols)).abs();
    let col_delta = ((from as i32 % cols) - to % cols).abs();
    if row_delta > 1 || col_delta > 1 || (row_delta == 0 && col_delta == 0) {
        return Err(PlayError::MoveTooFar);
    }

    if to < 0 || to >= CELL_COUNT as i32 {
        board.set(from, None);
        return Ok(GroundTruthMove::RemovedOffBoard);
    }

    let to = to as usize;
    if !board.is_empty_at(to) {
        return Err(PlayError::Occupied(to));
    }
    board.set(to, Some(piece));
    board.set(from, None);
    Ok(GroundTruthMove::Moved)
}

/// Place the Hotspot Analysis anchor piece.
pub fn hotspot_anchor(board: &mut Board, square: usize, player: Player) -> Result<(), PlayError> {
    if !board.is_empty_at(square) {
        return Err(PlayError::Occupied(square));
    }
    board.set(square, Some(player));
    Ok(())
}

/// One Hotspot Analysis move: the player's own piece to any empty square,
/// no distance limit.
pub fn hotspot_move(
    board: &mut Board,
    from: usize,
    to: usize,
    player: Player,
) -> Result<(), PlayError> {
    if board.get(from) != Some(player) {
        return Err(PlayError::NotYourPiece(from));
    }
    if !board.is_empty_at(to) {
        return Err(PlayError::Occupied(to));
    }
    board.set(to, Some(player));
    board.set(from, None);
    Ok(())
}

/// Detect the player's features and collect the empty squares adjacent to
/// them (orthogonal neighbors for polygons, 8-directional for lines).
///
/// Returns the feature count and the valid placement set.
pub fn spatial_join_targets(board: &Board, player: Player) -> (usize, FxHashSet<usize>) {
    let features = features_of(board, player);
    let mut valid = FxHashSet::default();

    for feature in &features {
        let offsets: &[i32] = match feature.kind {
            FeatureKind::Polygon => &ORTHOGONAL_OFFSETS,
            FeatureKind::Line => &EIGHT_WAY_OFFSETS,
        };
        for &member in &feature.squares {
            for &offset in offsets {
                let candidate = member as i32 + offset;
                if is_valid_move(member, candidate, 1) && board.is_empty_at(candidate as usize) {
                    valid.insert(candidate as usize);
                }
            }
        }
    }

    (features.len(), valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(player: Player, squares: &[usize]) -> Board {
        let mut board = Board::empty();
        for &square in squares {
            board.set(square, Some(player));
        }
        board
    }

    #[test]
    fn test_place_features_full_pattern() {
        let mut board = Board::empty();
        let placed = place_features(&mut board, 44, Player::One, &[0, 1, 10, 11], 1).unwrap();

        assert_eq!(placed, 4);
        for square in [44, 45, 54, 55] {
            assert_eq!(board.get(square), Some(Player::One));
        }
    }

    #[test]
    fn test_place_features_partial_at_edge() {
        // Origin in the last column: offsets +1 and +11 wrap and are rejected.
        let mut board = Board::empty();
        let placed = place_features(&mut board, 9, Player::One, &[0, 1, 10, 11], 1).unwrap();

        assert_eq!(placed, 2);
        assert_eq!(board.get(9), Some(Player::One));
        assert_eq!(board.get(19), Some(Player::One));
        assert!(board.is_empty_at(10));
    }

    #[test]
    fn test_place_features_rejects_fully_blocked() {
        let mut board = board_with(Player::Two, &[44, 45, 54, 55]);
        let before = board.clone();

        let result = place_features(&mut board, 44, Player::One, &[0, 1, 10, 11], 1);
        assert_eq!(result, Err(PlayError::NoValidTargets));
        assert_eq!(board, before, "a rejected play must not mutate the board");
    }

    #[test]
    fn test_erase_features_counts_occupied_only() {
        let mut board = board_with(Player::Two, &[0, 11]);
        board.set(21, Some(Player::One));

        let erased = erase_features(&mut board, 0, &[0, 1, 10, 11, 20, 21], 2);
        assert_eq!(erased, 3);
        assert!(board.is_empty_at(0));
        assert!(board.is_empty_at(11));
        assert!(board.is_empty_at(21));
    }

    #[test]
    fn test_clip_converts_only_opponent_pieces() {
        let mut board = board_with(Player::Two, &[44, 45]);
        board.set(54, Some(Player::One));

        let converted = clip(&mut board, 44, Player::One, &[0, 1, 10, 11]).unwrap();
        assert_eq!(converted, 2);
        assert_eq!(board.get(44), Some(Player::One));
        assert_eq!(board.get(45), Some(Player::One));
        assert_eq!(board.get(54), Some(Player::One));
        assert!(board.is_empty_at(55));
    }

    #[test]
    fn test_clip_rejects_empty_area() {
        let mut board = Board::empty();
        assert_eq!(
            clip(&mut board, 44, Player::One, &[0, 1, 10, 11]),
            Err(PlayError::NoValidTargets)
        );
    }

    #[test]
    fn test_flip_single_rejects_own_piece() {
        let mut board = board_with(Player::One, &[5]);
        assert_eq!(
            flip_single(&mut board, 5, Player::One),
            Err(PlayError::AlreadyYours(5))
        );
        flip_single(&mut board, 6, Player::One).unwrap();
        board.set(7, Some(Player::Two));
        flip_single(&mut board, 7, Player::One).unwrap();
        assert_eq!(board.get(7), Some(Player::One));
    }

    #[test]
    fn test_dissolve_requires_opponent_polygon() {
        let mut board = board_with(Player::Two, &[0, 1, 10]);
        assert_eq!(
            dissolve(&mut board, 0, Player::One),
            Err(PlayError::NotAnOpponentPolygon)
        );
    }

    #[test]
    fn test_dissolve_requires_touching_own_feature() {
        // Opponent polygon with only an unclassified point of ours nearby.
        let mut board = board_with(Player::Two, &[0, 1, 10, 11]);
        board.set(2, Some(Player::One));

        assert_eq!(
            dissolve(&mut board, 0, Player::One),
            Err(PlayError::NotTouchingOwnFeature)
        );
    }

    #[test]
    fn test_dissolve_converts_touching_polygon() {
        // Opponent polygon at 0,1,10,11; our line 2,3,4 touches square 1.
        let mut board = board_with(Player::Two, &[0, 1, 10, 11]);
        for square in [2, 3, 4] {
            board.set(square, Some(Player::One));
        }

        let size = dissolve(&mut board, 0, Player::One).unwrap();
        assert_eq!(size, 4);
        for square in [0, 1, 10, 11] {
            assert_eq!(board.get(square), Some(Player::One));
        }
    }

    #[test]
    fn test_buffer_fills_ring() {
        let mut board = board_with(Player::One, &[44, 45, 54, 55]);

        let filled = buffer(&mut board, 44, Player::One).unwrap();
        assert_eq!(filled, 8);
        for square in [34, 35, 43, 46, 53, 56, 64, 65] {
            assert_eq!(board.get(square), Some(Player::One));
        }
    }

    #[test]
    fn test_buffer_rejects_non_polygon() {
        let mut board = board_with(Player::One, &[44]);
        assert_eq!(
            buffer(&mut board, 44, Player::One),
            Err(PlayError::NotYourPolygon(44))
        );
    }

    #[test]
    fn test_interpolate_uses_snapshot() {
        // Three pieces around 44 fill it; the fill itself must not lift
        // other squares past the threshold within the same pass.
        let mut board = board_with(Player::One, &[33, 34, 35]);

        interpolate(&mut board, Player::One);

        assert_eq!(board.get(44), Some(Player::One), "44 sees 33,34,35");
        assert_eq!(board.get(24), Some(Player::One), "24 sees them too");
        assert!(
            board.is_empty_at(54),
            "54 only neighbors 44, which was empty in the snapshot"
        );
    }

    #[test]
    fn test_interpolate_converts_opponent() {
        let mut board = board_with(Player::One, &[33, 34, 35]);
        board.set(44, Some(Player::Two));

        interpolate(&mut board, Player::One);
        assert_eq!(board.get(44), Some(Player::One));
    }

    #[test]
    fn test_fill_sinks_corner() {
        // Corner 0 with 1 and 10 occupied: two off-board sides count as
        // filled, so the sink fills.
        let mut board = board_with(Player::One, &[1, 10]);

        let filled = fill_sinks(&mut board, Player::One);
        assert_eq!(filled, 1);
        assert_eq!(board.get(0), Some(Player::One));
    }

    #[test]
    fn test_fill_sinks_edge_cell() {
        // Top-row cell 5: the off-board north side counts as filled.
        let mut board = board_with(Player::Two, &[4, 6, 15]);

        let filled = fill_sinks(&mut board, Player::One);
        assert_eq!(filled, 1);
        assert_eq!(board.get(5), Some(Player::One));
    }

    #[test]
    fn test_fill_sinks_does_not_convert() {
        let mut board = board_with(Player::Two, &[5]);
        fill_sinks(&mut board, Player::One);
        assert_eq!(board.get(5), Some(Player::Two));
    }

    #[test]
    fn test_project_south_removes_bottom_row_piece() {
        let mut board = board_with(Player::One, &[90]);

        project(&mut board, Direction::South);
        assert!(board.is_empty_at(90));
        assert_eq!(board.count_owned(Player::One), 0);
    }

    #[test]
    fn test_project_moves_column_without_double_stepping() {
        let mut board = board_with(Player::One, &[0, 10, 20]);

        project(&mut board, Direction::South);
        assert!(board.is_empty_at(0));
        assert_eq!(board.get(10), Some(Player::One));
        assert_eq!(board.get(20), Some(Player::One));
        assert_eq!(board.get(30), Some(Player::One));
    }

    #[test]
    fn test_project_east_removes_last_column() {
        let mut board = board_with(Player::Two, &[8, 9]);

        project(&mut board, Direction::East);
        assert!(board.is_empty_at(8));
        assert_eq!(board.get(9), Some(Player::Two));
        assert_eq!(board.count_owned(Player::Two), 1);
    }

    #[test]
    fn test_project_north_followers_take_vacated_squares() {
        let mut board = Board::empty();
        board.set(10, Some(Player::One));
        board.set(20, Some(Player::Two));

        project(&mut board, Direction::North);
        // Player One's piece moves to 0; Player Two's follows into 10.
        assert_eq!(board.get(0), Some(Player::One));
        assert_eq!(board.get(10), Some(Player::Two));
    }

    #[test]
    fn test_nearest_neighbor_is_additive() {
        let mut board = board_with(Player::One, &[44, 45]);

        let filled = nearest_neighbor(&mut board, Direction::East, Player::One);
        assert_eq!(filled, 1, "45's east neighbor; 44's east neighbor was occupied");
        assert_eq!(board.get(46), Some(Player::One));
        assert_eq!(board.get(44), Some(Player::One), "sources do not move");
    }

    #[test]
    fn test_nearest_neighbor_does_not_fill_occupied() {
        let mut board = board_with(Player::One, &[44]);
        board.set(45, Some(Player::Two));

        let filled = nearest_neighbor(&mut board, Direction::East, Player::One);
        assert_eq!(filled, 0);
        assert_eq!(board.get(45), Some(Player::Two));
    }

    #[test]
    fn test_turn_off_layer_points() {
        let mut board = board_with(Player::One, &[0, 1, 10, 11]);
        board.set(55, Some(Player::Two));
        board.set(70, Some(Player::One));

        let removed = turn_off_layer(&mut board, LayerKind::Points);
        assert_eq!(removed, 2);
        assert!(board.is_empty_at(55));
        assert!(board.is_empty_at(70));
        assert_eq!(board.get(0), Some(Player::One), "polygon survives");
    }

    #[test]
    fn test_turn_off_layer_polygons_hits_both_players() {
        let mut board = board_with(Player::One, &[0, 1, 10, 11]);
        for square in [88, 89, 98, 99] {
            board.set(square, Some(Player::Two));
        }

        let removed = turn_off_layer(&mut board, LayerKind::Polygons);
        assert_eq!(removed, 8);
        assert_eq!(board.count_owned(Player::One), 0);
        assert_eq!(board.count_owned(Player::Two), 0);
    }

    #[test]
    fn test_turn_off_layer_twice_is_idempotent() {
        let mut board = board_with(Player::One, &[30, 31, 32]);

        assert_eq!(turn_off_layer(&mut board, LayerKind::Lines), 3);
        assert_eq!(turn_off_layer(&mut board, LayerKind::Lines), 0);
    }

    #[test]
    fn test_ground_truth_basic_move() {
        let mut board = board_with(Player::Two, &[44]);

        assert_eq!(
            ground_truth_move(&mut board, 44, 45),
            Ok(GroundTruthMove::Moved)
        );
        assert!(board.is_empty_at(44));
        assert_eq!(board.get(45), Some(Player::Two));
    }

    #[test]
    fn test_ground_truth_rejects_long_or_null_moves() {
        let mut board = board_with(Player::One, &[44]);

        assert_eq!(ground_truth_move(&mut board, 44, 46), Err(PlayError::MoveTooFar));
        assert_eq!(ground_truth_move(&mut board, 44, 44), Err(PlayError::MoveTooFar));
        assert_eq!(ground_truth_move(&mut board, 50, 51), Err(PlayError::NoPieceAt(50)));
    }

    #[test]
    fn test_ground_truth_off_board_removes() {
        let mut board = board_with(Player::One, &[90]);

        assert_eq!(
            ground_truth_move(&mut board, 90, 100),
            Ok(GroundTruthMove::RemovedOffBoard)
        );
        assert!(board.is_empty_at(90));
    }

    #[test]
    fn test_ground_truth_off_west_edge_removes() {
        let mut board = board_with(Player::One, &[0]);

        assert_eq!(
            ground_truth_move(&mut board, 0, -1),
            Ok(GroundTruthMove::RemovedOffBoard)
        );
        assert!(board.is_empty_at(0));
    }

    #[test]
    fn test_ground_truth_far_off_board_is_still_too_far() {
        let mut board = board_with(Player::One, &[0]);
        assert_eq!(ground_truth_move(&mut board, 0, -11), Err(PlayError::MoveTooFar));
    }

    #[test]
    fn test_hotspot_move_is_free_range() {
        let mut board = board_with(Player::One, &[0]);

        hotspot_move(&mut board, 0, 99, Player::One).unwrap();
        assert_eq!(board.get(99), Some(Player::One));
    }

    #[test]
    fn test_hotspot_move_rejects_foreign_piece() {
        let mut board = board_with(Player::Two, &[0]);
        assert_eq!(
            hotspot_move(&mut board, 0, 5, Player::One),
            Err(PlayError::NotYourPiece(0))
        );
    }

    #[test]
    fn test_spatial_join_targets_polygon_and_line() {
        let mut board = board_with(Player::One, &[0, 1, 10, 11]);
        for square in [66, 77, 88] {
            board.set(square, Some(Player::One));
        }

        let (count, valid) = spatial_join_targets(&board, Player::One);
        assert_eq!(count, 2);
        // Polygon neighbors are orthogonal only.
        assert!(valid.contains(&2));
        assert!(valid.contains(&20));
        assert!(!valid.contains(&22), "diagonal of the polygon is not valid");
        // Line neighbors include diagonals.
        assert!(valid.contains(&55));
        assert!(valid.contains(&99));
    }
}
