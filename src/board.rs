//! Board geometry and the move validator.
//!
//! The board is a fixed 10x10 grid of 100 cells, indexed 0-99 in row-major
//! order. Every adjacency and reach decision in the engine funnels through
//! [`is_valid_move`], which treats the grid as non-toroidal: a candidate
//! index that would wrap to a different row, or that falls outside 0-99,
//! is rejected.

use serde::{Deserialize, Serialize};

use crate::core::Player;

/// Columns per row.
pub const GRID_COLS: usize = 10;
/// Number of rows.
pub const GRID_ROWS: usize = 10;
/// Total cell count.
pub const CELL_COUNT: usize = GRID_COLS * GRID_ROWS;

/// Orthogonal neighbor offsets (west, east, north, south).
pub const ORTHOGONAL_OFFSETS: [i32; 4] = [-1, 1, -10, 10];

/// 8-directional neighbor offsets.
pub const EIGHT_WAY_OFFSETS: [i32; 8] = [-1, 1, -9, 9, -10, -11, 10, 11];

/// Row of a square (0-based, top row first).
#[must_use]
pub const fn row(square: usize) -> usize {
    square / GRID_COLS
}

/// Column of a square (0-based).
#[must_use]
pub const fn col(square: usize) -> usize {
    square % GRID_COLS
}

/// The single adjacency/distance primitive.
///
/// Returns true only if `to` is on the board and both the row delta and the
/// column delta from `from` are at most `max_distance`. Callers add raw
/// offsets to a start index and rely on this check to reject offsets that
/// would wrap to a different row or fall off an edge.
///
/// `max_distance` generalizes single steps (1, the common case) to the
/// larger placement patterns (2 or 3).
#[must_use]
pub fn is_valid_move(from: usize, to: i32, max_distance: u32) -> bool {
    if to < 0 || to >= CELL_COUNT as i32 {
        return false;
    }
    let to = to as usize;
    row(from).abs_diff(row(to)) <= max_distance as usize
        && col(from).abs_diff(col(to)) <= max_distance as usize
}

/// A compass direction for whole-board transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// The flat-index offset of one step in this direction.
    #[must_use]
    pub const fn offset(self) -> i32 {
        match self {
            Direction::North => -(GRID_COLS as i32),
            Direction::South => GRID_COLS as i32,
            Direction::East => 1,
            Direction::West => -1,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        };
        write!(f, "{name}")
    }
}

/// The shared 100-cell board.
///
/// A pure value type: each cell is empty or owned by one player, nothing
/// else. Per-card transient state (anchors, valid-square sets) lives in the
/// session's resolving context, never on the board.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Player>; CELL_COUNT],
}

impl Board {
    /// An all-empty board.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }

    /// The owner of a square, if any.
    #[must_use]
    pub fn get(&self, square: usize) -> Option<Player> {
        self.cells[square]
    }

    /// Set or clear a square.
    pub fn set(&mut self, square: usize, cell: Option<Player>) {
        self.cells[square] = cell;
    }

    /// True if the square holds no piece.
    #[must_use]
    pub fn is_empty_at(&self, square: usize) -> bool {
        self.cells[square].is_none()
    }

    /// Number of squares owned by a player.
    #[must_use]
    pub fn count_owned(&self, player: Player) -> usize {
        self.cells.iter().filter(|&&c| c == Some(player)).count()
    }

    /// Iterate `(square, owner)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<Player>)> + '_ {
        self.cells.iter().copied().enumerate()
    }

    /// All square indices in order.
    pub fn squares() -> impl Iterator<Item = usize> {
        0..CELL_COUNT
    }

    /// Encode as 100 bytes of 0 (empty), 1, or 2, for the sync record.
    #[must_use]
    pub fn to_codes(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|c| c.map_or(0, Player::number))
            .collect()
    }

    /// Decode from the sync record encoding.
    ///
    /// Returns `None` unless `codes` is exactly 100 values of 0, 1, or 2.
    #[must_use]
    pub fn from_codes(codes: &[u8]) -> Option<Self> {
        if codes.len() != CELL_COUNT {
            return None;
        }
        let mut board = Board::empty();
        for (square, &code) in codes.iter().enumerate() {
            board.cells[square] = match code {
                0 => None,
                n => Some(Player::from_number(n)?),
            };
        }
        Some(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Board:")?;
        for r in 0..GRID_ROWS {
            for c in 0..GRID_COLS {
                let ch = match self.cells[r * GRID_COLS + c] {
                    None => '.',
                    Some(Player::One) => '1',
                    Some(Player::Two) => '2',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_col() {
        assert_eq!(row(0), 0);
        assert_eq!(col(0), 0);
        assert_eq!(row(99), 9);
        assert_eq!(col(99), 9);
        assert_eq!(row(45), 4);
        assert_eq!(col(45), 5);
    }

    #[test]
    fn test_valid_move_basic_adjacency() {
        assert!(is_valid_move(45, 46, 1));
        assert!(is_valid_move(45, 44, 1));
        assert!(is_valid_move(45, 35, 1));
        assert!(is_valid_move(45, 55, 1));
        assert!(is_valid_move(45, 56, 1)); // diagonal
        assert!(is_valid_move(45, 45, 1)); // distance 0 is trivially valid
        assert!(is_valid_move(45, 45, 0));
    }

    #[test]
    fn test_valid_move_rejects_off_board() {
        assert!(!is_valid_move(0, -1, 1));
        assert!(!is_valid_move(0, -10, 1));
        assert!(!is_valid_move(99, 100, 1));
        assert!(!is_valid_move(90, 100, 1));
    }

    #[test]
    fn test_valid_move_rejects_row_wrap() {
        // 9 and 10 are adjacent indices but on different rows
        assert!(!is_valid_move(9, 10, 1));
        assert!(!is_valid_move(10, 9, 1));
        // wrapping diagonal: 19 + 1 = 20
        assert!(!is_valid_move(19, 20, 1));
    }

    #[test]
    fn test_valid_move_distance() {
        assert!(!is_valid_move(0, 2, 1));
        assert!(is_valid_move(0, 2, 2));
        assert!(is_valid_move(0, 22, 2));
        assert!(!is_valid_move(0, 33, 2));
        assert!(is_valid_move(0, 33, 3));
    }

    #[test]
    fn test_direction_offsets() {
        assert_eq!(Direction::North.offset(), -10);
        assert_eq!(Direction::South.offset(), 10);
        assert_eq!(Direction::East.offset(), 1);
        assert_eq!(Direction::West.offset(), -1);
    }

    #[test]
    fn test_board_set_get() {
        let mut board = Board::empty();
        assert!(board.is_empty_at(42));

        board.set(42, Some(Player::One));
        assert_eq!(board.get(42), Some(Player::One));
        assert_eq!(board.count_owned(Player::One), 1);
        assert_eq!(board.count_owned(Player::Two), 0);

        board.set(42, None);
        assert!(board.is_empty_at(42));
    }

    #[test]
    fn test_board_codes_round_trip() {
        let mut board = Board::empty();
        board.set(0, Some(Player::One));
        board.set(99, Some(Player::Two));

        let codes = board.to_codes();
        assert_eq!(codes.len(), CELL_COUNT);
        assert_eq!(codes[0], 1);
        assert_eq!(codes[99], 2);
        assert_eq!(codes[50], 0);

        let decoded = Board::from_codes(&codes).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn test_board_from_codes_rejects_bad_input() {
        assert!(Board::from_codes(&[0; 99]).is_none());
        let mut codes = vec![0u8; CELL_COUNT];
        codes[3] = 7;
        assert!(Board::from_codes(&codes).is_none());
    }
}
