//! Seats, per-seat storage, and the player roster.
//!
//! ## PlayerId
//!
//! Seat index inside one game. Seat order is turn order.
//!
//! ## PlayerMap
//!
//! Per-seat storage backed by `Vec` for O(1) access, indexable by `PlayerId`.
//! Unlike a fixed-size map it grows as players are seated.
//!
//! ## Player / Carpet
//!
//! A `Player` owns its carpet. The carpet's placements live in the game's
//! `CarpetLayer`; the `Carpet` value only records identity, owner and colour.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use thiserror::Error;

use super::entity::{CarpetId, UserId};

/// Seat index, 0-based. The first seated player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats for a game with `player_count` players.
    ///
    /// ```
    /// use marrakech::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::all(4).collect();
    /// assert_eq!(seats.len(), 4);
    /// assert_eq!(seats[3], PlayerId::new(3));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ```
/// use marrakech::core::{PlayerId, PlayerMap};
///
/// let mut coins: PlayerMap<u32> = PlayerMap::new();
/// let first = coins.push(30);
/// let second = coins.push(30);
///
/// coins[second] -= 2;
/// assert_eq!(coins[first], 30);
/// assert_eq!(coins[second], 28);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Append an entry for the next seat and return that seat.
    pub fn push(&mut self, value: T) -> PlayerId {
        assert!(self.data.len() < u8::MAX as usize, "At most 255 seats supported");
        let id = PlayerId(self.data.len() as u8);
        self.data.push(value);
        id
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// True when no seat exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a seat's data, if the seat exists.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Get a seat's data mutably, if the seat exists.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Iterate over `(PlayerId, &T)` in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over `(PlayerId, &mut T)` in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate over all seats.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Default for PlayerMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PlayerMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let data: Vec<T> = iter.into_iter().collect();
        assert!(data.len() <= u8::MAX as usize, "At most 255 seats supported");
        Self { data }
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

/// Carpet colour. Also the tag used to count visible area at the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    /// The four colours of a standard box, in palette order.
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no colour.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown carpet colour {0:?}")]
pub struct ParseColorError(pub String);

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "blue" => Ok(Color::Blue),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

/// A carpet: identity, owner and colour tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Carpet {
    pub id: CarpetId,
    pub owner: PlayerId,
    pub color: Color,
}

/// A seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// External identity.
    pub user: UserId,
    /// Seat, which is also the turn position.
    pub seat: PlayerId,
    pub color: Color,
    /// Never negative; reaching zero eliminates the player.
    pub coins: u32,
    /// False once eliminated. Never flips back.
    pub active: bool,
    /// Number of carpet placements made so far.
    pub carpets_placed: u32,
    /// The carpet this player lays.
    pub carpet: Carpet,
}

impl Player {
    /// Create an active player with `coins` and one carpet.
    #[must_use]
    pub fn new(user: UserId, seat: PlayerId, color: Color, carpet: CarpetId, coins: u32) -> Self {
        Self {
            user,
            seat,
            color,
            coins,
            active: true,
            carpets_placed: 0,
            carpet: Carpet {
                id: carpet,
                owner: seat,
                color,
            },
        }
    }

    /// True when this player owns `carpet`.
    #[must_use]
    pub fn owns(&self, carpet: CarpetId) -> bool {
        self.carpet.id == carpet
    }
}
