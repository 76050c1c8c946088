//! Entity identification.
//!
//! Three kinds of identity cross the engine boundary:
//!
//! - `GameId`: one match, owned by whoever hosts the engine
//! - `UserId`: an external account; the engine never looks inside it
//! - `CarpetId`: a carpet, allocated by the game that seats its owner
//!
//! Seat positions inside a game use `PlayerId` (see `core::player`), which is
//! a dense index and never leaves the game it belongs to.
//!
//! ```
//! use marrakech::core::{CarpetId, GameId, UserId};
//!
//! let game = GameId::new(7);
//! let user = UserId::new(42);
//! let carpet = CarpetId::new(1);
//!
//! assert_eq!(game.raw(), 7);
//! assert_eq!(format!("{}", user), "User(42)");
//! assert_eq!(carpet.next(), CarpetId::new(2));
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of a single game instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    /// Create a new game ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Game({})", self.0)
    }
}

/// External user identity.
///
/// A `Player` refers to its user by this key only. Nothing in the engine
/// holds a live reference back from a user to a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User({})", self.0)
    }
}

/// Identifier of a carpet within one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CarpetId(pub u32);

impl CarpetId {
    /// The first ID a fresh game hands out.
    pub const FIRST: CarpetId = CarpetId(1);

    /// Create a new carpet ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The ID allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for CarpetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Carpet({})", self.0)
    }
}
