//! Player identification and per-player data storage.
//!
//! ## Player
//!
//! The game is strictly two-player. `Player` is a closed enum rather than
//! a numeric id so that "the other player" is always `opponent()` and never
//! an arithmetic trick.
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by a fixed two-slot array for O(1) access.
//! Supports iteration and indexing by `Player`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Both players, in processing order (One is always scanned first).
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Slot index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// Display number (1-based), as used in board cell codes and logs.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Parse a 1-based player number.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Player> {
        match number {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Per-player data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use mapduel::core::{Player, PlayerMap};
///
/// let mut pieces: PlayerMap<u32> = PlayerMap::with_value(10);
/// pieces[Player::Two] = 7;
///
/// assert_eq!(pieces[Player::One], 10);
/// assert_eq!(pieces[Player::Two], 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(factory: impl Fn(Player) -> T) -> Self {
        Self {
            data: [factory(Player::One), factory(Player::Two)],
        }
    }

    /// Create a new PlayerMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: Player) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: Player) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (Player, &T) pairs, Player::One first.
    pub fn iter(&self) -> impl Iterator<Item = (Player, &T)> {
        Player::BOTH.iter().map(move |&p| (p, self.get(p)))
    }

    /// Apply a function to both entries, producing a new map.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> PlayerMap<U> {
        PlayerMap {
            data: [f(&self.data[0]), f(&self.data[1])],
        }
    }
}

impl<T> Index<Player> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: Player) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<Player> for PlayerMap<T> {
    fn index_mut(&mut self, player: Player) -> &mut Self::Output {
        self.get_mut(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
        assert_eq!(Player::One.opponent().opponent(), Player::One);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(Player::One.number(), 1);
        assert_eq!(Player::Two.number(), 2);
        assert_eq!(Player::from_number(1), Some(Player::One));
        assert_eq!(Player::from_number(2), Some(Player::Two));
        assert_eq!(Player::from_number(0), None);
        assert_eq!(Player::from_number(3), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Player::One), "Player 1");
        assert_eq!(format!("{}", Player::Two), "Player 2");
    }

    #[test]
    fn test_player_map_new() {
        let map: PlayerMap<u32> = PlayerMap::new(|p| p.number() as u32 * 10);

        assert_eq!(map[Player::One], 10);
        assert_eq!(map[Player::Two], 20);
    }

    #[test]
    fn test_player_map_mutation() {
        let mut map: PlayerMap<Vec<u8>> = PlayerMap::with_default();

        map[Player::One].push(5);

        assert_eq!(map[Player::One], vec![5]);
        assert!(map[Player::Two].is_empty());
    }

    #[test]
    fn test_player_map_iter_order() {
        let map: PlayerMap<u8> = PlayerMap::new(|p| p.number());
        let pairs: Vec<_> = map.iter().collect();

        assert_eq!(pairs, vec![(Player::One, &1), (Player::Two, &2)]);
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<u8> = PlayerMap::new(|p| p.number());
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }
}
